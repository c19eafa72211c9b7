//! Terminal service tools.

use parking_lot::Mutex;
use plugterm_modules::{ModuleManager, TerminalMode};
use serde_json::Value;

use super::{tool_error, tool_json};

/// `terminal_info`: size, title and backend.
pub fn handle_terminal_info(manager: &Mutex<ModuleManager>) -> Value {
    let services = manager.lock().services().clone();
    let Some(terminal) = services.terminal() else {
        return tool_error("No terminal is attached");
    };
    let backend = services
        .backend_kind()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tool_json(&serde_json::json!({
        "rows": terminal.rows(),
        "cols": terminal.cols(),
        "title": terminal.title(),
        "alt_screen": terminal.mode(TerminalMode::AltScreen),
        "backend": backend,
        "window_focused": services.window().map(|w| w.is_focused()),
    }))
}

/// `terminal_mark_dirty`: mark one row, or all rows, and queue a redraw.
pub fn handle_terminal_mark_dirty(manager: &Mutex<ModuleManager>, arguments: &Value) -> Value {
    let services = manager.lock().services().clone();
    let Some(terminal) = services.terminal() else {
        return tool_error("No terminal is attached");
    };

    let marked = match arguments.get("row") {
        None | Some(Value::Null) => {
            terminal.mark_all_dirty();
            terminal.rows()
        }
        Some(row) => {
            let Some(row) = row.as_u64() else {
                return tool_error("'row' must be a non-negative integer");
            };
            let row = row as usize;
            if row >= terminal.rows() {
                return tool_error(&format!(
                    "row {row} is out of range (terminal has {} rows)",
                    terminal.rows()
                ));
            }
            terminal.mark_dirty(row);
            1
        }
    };
    services.queue_redraw();
    tool_json(&serde_json::json!({ "marked": marked }))
}
