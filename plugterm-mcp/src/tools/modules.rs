//! Module registry tools.

use parking_lot::Mutex;
use plugterm_modules::ModuleManager;
use serde_json::Value;

use super::{tool_error, tool_json};

/// `modules_list`: one entry per registered module.
pub fn handle_modules_list(manager: &Mutex<ModuleManager>) -> Value {
    let mgr = manager.lock();
    let modules: Vec<Value> = mgr
        .module_names()
        .into_iter()
        .map(|name| {
            let description = mgr
                .get_module(&name)
                .map(|m| m.description().to_string())
                .unwrap_or_default();
            let capabilities: Vec<&str> = mgr
                .capabilities(&name)
                .map(|caps| caps.iter().map(|c| c.name()).collect())
                .unwrap_or_default();
            serde_json::json!({
                "name": name,
                "description": description,
                "active": mgr.is_active(&name),
                "priority": mgr.get_priority(&name),
                "capabilities": capabilities,
            })
        })
        .collect();
    tool_json(&serde_json::json!({ "modules": modules }))
}

/// `module_set_active`: activate or deactivate by name.
pub fn handle_module_set_active(manager: &Mutex<ModuleManager>, arguments: &Value) -> Value {
    let Some(name) = arguments.get("name").and_then(Value::as_str) else {
        return tool_error("Missing 'name' argument");
    };
    let Some(active) = arguments.get("active").and_then(Value::as_bool) else {
        return tool_error("Missing 'active' argument (boolean)");
    };

    let mut mgr = manager.lock();
    if active {
        if let Err(e) = mgr.activate(name) {
            return tool_error(&e.to_string());
        }
    } else if !mgr.deactivate(name) {
        return tool_error(&format!("module '{name}' is not registered"));
    }
    tool_json(&serde_json::json!({
        "name": name,
        "active": mgr.is_active(name),
    }))
}
