//! Cross-platform desktop notification delivery.
//!
//! Abstracts over:
//! - **macOS**: `osascript` AppleScript `display notification` command
//! - **Windows / Linux**: the `notify_rust` crate
//!
//! Callers use [`deliver_desktop_notification`] so platform differences live
//! only here.

/// Fallback title when the sender did not supply one.
const DEFAULT_TITLE: &str = "plugterm";

/// Escape a string for embedding inside an AppleScript double-quoted string.
///
/// Backslashes must be escaped first so the later replacements are not
/// double-escaped.
pub fn escape_for_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Deliver a native desktop notification.
///
/// Blocks until the notification daemon (or `osascript`) answers, so call it
/// from a delivery thread, never from dispatch. Failures are logged as
/// warnings. `timeout_ms` is ignored on macOS, where the OS controls the
/// display duration.
pub fn deliver_desktop_notification(title: &str, message: &str, timeout_ms: u32) {
    let title = if title.is_empty() { DEFAULT_TITLE } else { title };

    #[cfg(not(target_os = "macos"))]
    {
        use notify_rust::Notification;
        if let Err(e) = Notification::new()
            .summary(title)
            .body(message)
            .timeout(notify_rust::Timeout::Milliseconds(timeout_ms))
            .show()
        {
            log::warn!("Failed to send desktop notification: {}", e);
        }
    }

    #[cfg(target_os = "macos")]
    {
        let _ = timeout_ms;
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            escape_for_applescript(message),
            escape_for_applescript(title),
        );
        // Reaped here so the child does not linger as a zombie.
        if let Err(e) = std::process::Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .spawn()
            .and_then(|mut child| child.wait())
        {
            log::warn!("Failed to send macOS desktop notification: {}", e);
        }
    }
}
