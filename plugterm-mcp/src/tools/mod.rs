//! Tool registration, descriptors, and dispatch for the MCP server.
//!
//! This module owns the tool registry: it builds the `tools/list` response and
//! dispatches `tools/call` requests to the appropriate per-tool handler.

pub mod modules;
pub mod terminal;

use parking_lot::Mutex;
use plugterm_modules::ModuleManager;
use serde_json::Value;

pub use modules::{handle_module_set_active, handle_modules_list};
pub use terminal::{handle_terminal_info, handle_terminal_mark_dirty};

// ---------------------------------------------------------------------------
// Tool descriptors
// ---------------------------------------------------------------------------

fn empty_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

fn tool(name: &str, description: &str, input_schema: Value) -> Value {
    serde_json::json!({
        "name": name,
        "description": description,
        "inputSchema": input_schema
    })
}

/// Handle the `tools/list` request.
pub fn handle_tools_list() -> Value {
    serde_json::json!({
        "tools": [
            tool(
                "modules_list",
                "List registered modules with their activation state, priority and capabilities, in registration order.",
                empty_schema()
            ),
            tool(
                "module_set_active",
                "Activate or deactivate a registered module by name.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "active": { "type": "boolean" }
                    },
                    "required": ["name", "active"]
                })
            ),
            tool(
                "terminal_info",
                "Report terminal size, title and window-system backend.",
                empty_schema()
            ),
            tool(
                "terminal_mark_dirty",
                "Schedule terminal rows for repaint. Without 'row', every row is marked.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "row": { "type": "integer", "minimum": 0 }
                    }
                })
            ),
        ]
    })
}

/// Handle the `tools/call` request.
pub fn handle_tools_call(manager: &Mutex<ModuleManager>, params: Option<Value>) -> Value {
    let params = match params {
        Some(p) => p,
        None => {
            return tool_error("Missing params for tools/call");
        }
    };

    let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));

    log::debug!("[mcp] tools/call {name}");
    match name {
        "modules_list" => handle_modules_list(manager),
        "module_set_active" => handle_module_set_active(manager, &arguments),
        "terminal_info" => handle_terminal_info(manager),
        "terminal_mark_dirty" => handle_terminal_mark_dirty(manager, &arguments),
        _ => tool_error(&format!("Unknown tool: {name}")),
    }
}

// ---------------------------------------------------------------------------
// Result helpers (shared by tool handlers in submodules)
// ---------------------------------------------------------------------------

/// Build a tool error result.
pub fn tool_error(message: &str) -> Value {
    serde_json::json!({
        "isError": true,
        "content": [{
            "type": "text",
            "text": message
        }]
    })
}

/// Build a successful tool result carrying `payload` as JSON text.
pub fn tool_json(payload: &Value) -> Value {
    let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    serde_json::json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    })
}
