//! Minimal MCP (Model Context Protocol) server over stdio.
//!
//! Reads line-delimited JSON-RPC 2.0 from stdin and writes responses to stdout.
//! Exposes tools that inspect and drive a running module manager:
//! - `modules_list`: registered modules, state, priority and capabilities
//! - `module_set_active`: activate or deactivate a module
//! - `terminal_info`: terminal size, title and backend
//! - `terminal_mark_dirty`: schedule rows for repaint
//!
//! # Module layout
//!
//! - [`jsonrpc`]: JSON-RPC 2.0 wire types, response helpers, and output framing
//! - [`tools`]: tool registration, descriptors, and dispatch

pub mod jsonrpc;
pub mod tools;

use std::io::{BufRead, Write};
use std::sync::OnceLock;

use parking_lot::Mutex;
use plugterm_modules::ModuleManager;

use jsonrpc::{
    IncomingMessage, Response, method_not_found, parse_error, send_response, success_response,
};
use tools::{handle_tools_call, handle_tools_list};

/// MCP protocol version.
pub(crate) const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialization.
pub(crate) const SERVER_NAME: &str = "plugterm";

/// Application version set by the main crate.
static APP_VERSION: OnceLock<String> = OnceLock::new();

/// Set the application version reported by `initialize`.
pub fn set_app_version(version: impl Into<String>) {
    let _ = APP_VERSION.set(version.into());
}

/// Get the application version, falling back to the crate version if not set.
pub(crate) fn get_app_version() -> &'static str {
    APP_VERSION
        .get()
        .map(|s| s.as_str())
        .unwrap_or(env!("CARGO_PKG_VERSION"))
}

fn handle_initialize() -> serde_json::Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": get_app_version()
        }
    })
}

/// JSON-RPC request handler bound to a module manager.
pub struct McpServer<'a> {
    manager: &'a Mutex<ModuleManager>,
}

impl<'a> McpServer<'a> {
    pub fn new(manager: &'a Mutex<ModuleManager>) -> Self {
        Self { manager }
    }

    /// Handle one line of input. Returns `None` for blank lines,
    /// notifications and messages without a method.
    pub fn handle_line(&self, line: &str) -> Option<Response> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        log::trace!("[mcp] <- {trimmed}");

        let msg: IncomingMessage = match serde_json::from_str(trimmed) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("[mcp] Parse error: {e}");
                return Some(parse_error());
            }
        };

        let Some(method) = msg.method.as_deref() else {
            log::debug!("[mcp] Ignoring message without method");
            return None;
        };

        // Notifications (no id) never get a response.
        let Some(id) = msg.id else {
            log::debug!("[mcp] Notification: {method}");
            return None;
        };

        let response = match method {
            "initialize" => success_response(id, handle_initialize()),
            "tools/list" => success_response(id, handle_tools_list()),
            "tools/call" => success_response(id, handle_tools_call(self.manager, msg.params)),
            _ => method_not_found(id, method),
        };
        Some(response)
    }

    /// Serve until `reader` is exhausted or fails.
    pub fn serve(&self, reader: impl BufRead, mut writer: impl Write) {
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    log::error!("[mcp] Error reading input: {e}");
                    break;
                }
            };
            if let Some(response) = self.handle_line(&line) {
                send_response(&mut writer, &response);
            }
        }
    }
}

/// Run the MCP server loop on stdio. Returns when stdin is closed so callers
/// can run destructors and exit cleanly.
pub fn run_mcp_server(manager: &Mutex<ModuleManager>) {
    log::info!("[mcp] Starting plugterm MCP server v{}", get_app_version());
    let stdin = std::io::stdin();
    McpServer::new(manager).serve(stdin.lock(), std::io::stdout());
    log::info!("[mcp] stdin closed, exiting");
}
