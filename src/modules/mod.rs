//! Built-in modules shipped with plugterm.
//!
//! Each module is registered under its `NAME` and stays inactive until its
//! config section enables it.

pub mod background;
pub mod box_drawing;
pub mod clipboard;
pub mod fallback_font;
pub mod font_zoom;
pub mod notify;
pub mod sync_update;
pub mod visual_bell;

use plugterm_modules::Module;

/// Fresh instances of every built-in module, in registration order.
pub fn builtin_modules() -> Vec<Box<dyn Module>> {
    vec![
        Box::new(sync_update::SyncUpdateModule::new()),
        Box::new(notify::NotifyModule::new()),
        Box::new(visual_bell::VisualBellModule::new()),
        Box::new(box_drawing::BoxDrawingModule::new()),
        Box::new(background::BackgroundModule::new()),
        Box::new(font_zoom::FontZoomModule::new()),
        Box::new(clipboard::ClipboardModule::new()),
        Box::new(fallback_font::FallbackFontModule::new()),
    ]
}
