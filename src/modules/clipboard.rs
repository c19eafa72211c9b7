//! Copy-on-select: completed selections go to the system clipboard.
//!
//! On X11 and Wayland the copied text is served by the process that owns the
//! selection, so the module keeps one `arboard::Clipboard` open for as long as
//! it is active.

use plugterm_modules::{
    Module, ModuleConfig, ModuleError, ModuleResult, SelectionHandler, ServiceLocator,
};

pub const NAME: &str = "clipboard";

/// Selections longer than this are truncated before copying.
pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

/// Which selection buffer receives the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Clipboard,
    /// X11/Wayland primary selection. Falls back to the clipboard elsewhere.
    Primary,
    Both,
}

impl CopyTarget {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "clipboard" => Some(CopyTarget::Clipboard),
            "primary" => Some(CopyTarget::Primary),
            "both" => Some(CopyTarget::Both),
            _ => None,
        }
    }
}

type Sink = Box<dyn FnMut(&str, CopyTarget) -> Result<(), String> + Send>;

/// Truncate `text` to at most `max` bytes without splitting a character.
pub fn truncate_at_char_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

pub struct ClipboardModule {
    max_bytes: usize,
    target: CopyTarget,
    /// Overrides the system clipboard when set.
    sink: Option<Sink>,
    /// Open from activate to deactivate.
    system: Option<arboard::Clipboard>,
}

impl ClipboardModule {
    pub fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            target: CopyTarget::Clipboard,
            sink: None,
            system: None,
        }
    }

    /// Send copied text to `sink` instead of the system clipboard.
    pub fn with_sink(
        sink: impl FnMut(&str, CopyTarget) -> Result<(), String> + Send + 'static,
    ) -> Self {
        Self {
            sink: Some(Box::new(sink)),
            ..Self::new()
        }
    }

    fn copy(&mut self, text: &str) -> Result<(), String> {
        match (&mut self.sink, &mut self.system) {
            (Some(sink), _) => sink(text, self.target),
            (None, Some(clipboard)) => copy_to_system(clipboard, text, self.target),
            (None, None) => Err("Clipboard not available".to_string()),
        }
    }
}

impl Default for ClipboardModule {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_to_system(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    target: CopyTarget,
) -> Result<(), String> {
    if target != CopyTarget::Primary {
        clipboard
            .set_text(text.to_string())
            .map_err(|e| format!("Failed to set clipboard text: {}", e))?;
    }
    if target != CopyTarget::Clipboard {
        copy_to_primary(clipboard, text, target)?;
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_to_primary(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _target: CopyTarget,
) -> Result<(), String> {
    use arboard::SetExtLinux;

    clipboard
        .set()
        .clipboard(arboard::LinuxClipboardKind::Primary)
        .text(text.to_string())
        .map_err(|e| format!("Failed to set primary selection: {}", e))
}

#[cfg(not(target_os = "linux"))]
fn copy_to_primary(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    target: CopyTarget,
) -> Result<(), String> {
    // No primary selection here; `Both` already wrote the clipboard.
    if target == CopyTarget::Both {
        return Ok(());
    }
    clipboard
        .set_text(text.to_string())
        .map_err(|e| format!("Failed to set clipboard text: {}", e))
}

impl SelectionHandler for ClipboardModule {
    fn on_selection_done(&mut self, text: &str, length: usize) -> ModuleResult {
        if length == 0 {
            return Ok(());
        }
        let text = truncate_at_char_boundary(text, self.max_bytes);
        if text.len() < length {
            log::warn!(
                "Selection of {} bytes truncated to {} before copying",
                length,
                text.len()
            );
        }
        self.copy(text).map_err(ModuleError::Handler)?;
        log::debug!("Copied {} bytes to {:?}", text.len(), self.target);
        Ok(())
    }
}

impl Module for ClipboardModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Copies finished selections to the clipboard"
    }

    fn configure(&mut self, config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        self.max_bytes = config.get_or("max_bytes", DEFAULT_MAX_BYTES).max(1);
        if let Some(target) = config.get::<String>("target")? {
            self.target = CopyTarget::parse(&target).ok_or_else(|| {
                ModuleError::Config(format!("{NAME}.target: unknown target '{target}'"))
            })?;
        }
        Ok(())
    }

    fn activate(&mut self, _services: &ServiceLocator) -> ModuleResult {
        if self.sink.is_none() && self.system.is_none() {
            // Headless sessions have no clipboard; copies then fail per selection.
            self.system = arboard::Clipboard::new()
                .map_err(|e| log::warn!("Clipboard not available: {}", e))
                .ok();
        }
        Ok(())
    }

    fn deactivate(&mut self) {
        self.system = None;
    }

    fn as_selection_handler(&mut self) -> Option<&mut dyn SelectionHandler> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_truncate_at_char_boundary() {
        assert_eq!(truncate_at_char_boundary("hello", 10), "hello");
        assert_eq!(truncate_at_char_boundary("hello", 3), "hel");
        // 'é' is two bytes; cutting inside it backs off to the boundary
        assert_eq!(truncate_at_char_boundary("aé", 2), "a");
        assert_eq!(truncate_at_char_boundary("aé", 3), "aé");
    }

    #[test]
    fn test_copies_selection() {
        let copied = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&copied);
        let mut module = ClipboardModule::with_sink(move |text, target| {
            sink.lock().unwrap().push((text.to_string(), target));
            Ok(())
        });
        module.on_selection_done("ls -la", 6).unwrap();
        module.on_selection_done("", 0).unwrap();
        assert_eq!(
            *copied.lock().unwrap(),
            vec![("ls -la".to_string(), CopyTarget::Clipboard)]
        );
    }

    #[test]
    fn test_sink_failure_is_handler_error() {
        let mut module = ClipboardModule::with_sink(|_, _| Err("no display".to_string()));
        let err = module.on_selection_done("x", 1).unwrap_err();
        assert!(matches!(err, ModuleError::Handler(ref m) if m == "no display"));
    }

    #[test]
    fn test_copy_without_open_clipboard_fails() {
        // Never activated, so no system clipboard is held
        let mut module = ClipboardModule::new();
        let err = module.on_selection_done("x", 1).unwrap_err();
        assert!(matches!(err, ModuleError::Handler(ref m) if m == "Clipboard not available"));
    }

    #[test]
    fn test_target_parse() {
        assert_eq!(CopyTarget::parse("Primary"), Some(CopyTarget::Primary));
        assert_eq!(CopyTarget::parse("both"), Some(CopyTarget::Both));
        assert_eq!(CopyTarget::parse("secondary"), None);
    }
}
