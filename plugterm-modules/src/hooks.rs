//! The hook catalog: named integration points in the terminal.
//!
//! A hook point is bound to at most one [`Capability`]. Hooks without a
//! capability are declared extension points that nothing dispatches yet;
//! wiring one up means giving it a capability here and adding a typed
//! dispatch function on the manager. Registration and ordering never look
//! at individual hooks.

use std::fmt;

use crate::capability::{Capability, DispatchPolicy};

/// Named integration points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookPoint {
    // Input
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    Motion,
    Scroll,

    // Rendering
    PreRender,
    PostRender,
    RenderBackground,
    RenderLine,
    RenderGlyph,
    RenderCursor,
    RenderSelection,
    RenderOverlay,
    GlyphTransform,

    // Fonts and colours
    FontLoad,
    FontFallback,
    ColorQuery,

    // Window
    WindowCreate,
    WindowResize,
    WindowClose,
    FocusIn,
    FocusOut,

    // Terminal
    Bell,
    TitleChange,
    IconChange,
    EscapeString,
    ModeChange,
    CursorChange,
    ScrollRegionChange,
    ChildExit,

    // Selection and clipboard
    SelectionStart,
    SelectionChange,
    SelectionDone,
    ClipboardCopy,
    ClipboardPaste,
    UrlDetect,
}

impl HookPoint {
    /// Every hook point in the catalog.
    pub const ALL: [HookPoint; 37] = [
        HookPoint::KeyPress,
        HookPoint::KeyRelease,
        HookPoint::ButtonPress,
        HookPoint::ButtonRelease,
        HookPoint::Motion,
        HookPoint::Scroll,
        HookPoint::PreRender,
        HookPoint::PostRender,
        HookPoint::RenderBackground,
        HookPoint::RenderLine,
        HookPoint::RenderGlyph,
        HookPoint::RenderCursor,
        HookPoint::RenderSelection,
        HookPoint::RenderOverlay,
        HookPoint::GlyphTransform,
        HookPoint::FontLoad,
        HookPoint::FontFallback,
        HookPoint::ColorQuery,
        HookPoint::WindowCreate,
        HookPoint::WindowResize,
        HookPoint::WindowClose,
        HookPoint::FocusIn,
        HookPoint::FocusOut,
        HookPoint::Bell,
        HookPoint::TitleChange,
        HookPoint::IconChange,
        HookPoint::EscapeString,
        HookPoint::ModeChange,
        HookPoint::CursorChange,
        HookPoint::ScrollRegionChange,
        HookPoint::ChildExit,
        HookPoint::SelectionStart,
        HookPoint::SelectionChange,
        HookPoint::SelectionDone,
        HookPoint::ClipboardCopy,
        HookPoint::ClipboardPaste,
        HookPoint::UrlDetect,
    ];

    /// The capability interface whose operation this hook invokes, or `None`
    /// for declared-but-unwired hooks.
    pub const fn capability(self) -> Option<Capability> {
        match self {
            HookPoint::Bell => Some(Capability::Bell),
            HookPoint::EscapeString => Some(Capability::EscapeString),
            HookPoint::KeyPress => Some(Capability::Input),
            HookPoint::RenderOverlay => Some(Capability::RenderOverlay),
            HookPoint::RenderBackground => Some(Capability::Background),
            HookPoint::SelectionDone => Some(Capability::Selection),
            HookPoint::GlyphTransform => Some(Capability::GlyphTransform),
            HookPoint::PreRender => Some(Capability::RenderGate),
            _ => None,
        }
    }

    /// Dispatch policy, inherited from the bound capability.
    pub const fn policy(self) -> Option<DispatchPolicy> {
        match self.capability() {
            Some(capability) => Some(capability.policy()),
            None => None,
        }
    }

    /// `true` if the hook is bound to a capability and can be dispatched.
    pub const fn is_wired(self) -> bool {
        self.capability().is_some()
    }

    /// Hooks bound to `capability`.
    pub fn for_capability(capability: Capability) -> impl Iterator<Item = HookPoint> {
        Self::ALL
            .into_iter()
            .filter(move |hook| hook.capability() == Some(capability))
    }

    /// snake_case name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            HookPoint::KeyPress => "key_press",
            HookPoint::KeyRelease => "key_release",
            HookPoint::ButtonPress => "button_press",
            HookPoint::ButtonRelease => "button_release",
            HookPoint::Motion => "motion",
            HookPoint::Scroll => "scroll",
            HookPoint::PreRender => "pre_render",
            HookPoint::PostRender => "post_render",
            HookPoint::RenderBackground => "render_background",
            HookPoint::RenderLine => "render_line",
            HookPoint::RenderGlyph => "render_glyph",
            HookPoint::RenderCursor => "render_cursor",
            HookPoint::RenderSelection => "render_selection",
            HookPoint::RenderOverlay => "render_overlay",
            HookPoint::GlyphTransform => "glyph_transform",
            HookPoint::FontLoad => "font_load",
            HookPoint::FontFallback => "font_fallback",
            HookPoint::ColorQuery => "color_query",
            HookPoint::WindowCreate => "window_create",
            HookPoint::WindowResize => "window_resize",
            HookPoint::WindowClose => "window_close",
            HookPoint::FocusIn => "focus_in",
            HookPoint::FocusOut => "focus_out",
            HookPoint::Bell => "bell",
            HookPoint::TitleChange => "title_change",
            HookPoint::IconChange => "icon_change",
            HookPoint::EscapeString => "escape_string",
            HookPoint::ModeChange => "mode_change",
            HookPoint::CursorChange => "cursor_change",
            HookPoint::ScrollRegionChange => "scroll_region_change",
            HookPoint::ChildExit => "child_exit",
            HookPoint::SelectionStart => "selection_start",
            HookPoint::SelectionChange => "selection_change",
            HookPoint::SelectionDone => "selection_done",
            HookPoint::ClipboardCopy => "clipboard_copy",
            HookPoint::ClipboardPaste => "clipboard_paste",
            HookPoint::UrlDetect => "url_detect",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_no_duplicates() {
        let names: HashSet<&str> = HookPoint::ALL.iter().map(|h| h.name()).collect();
        assert_eq!(names.len(), HookPoint::ALL.len());
    }

    #[test]
    fn test_every_capability_is_wired_exactly_once() {
        for capability in Capability::ALL {
            let hooks: Vec<HookPoint> = HookPoint::for_capability(capability).collect();
            assert_eq!(hooks.len(), 1, "{capability} wired to {hooks:?}");
        }
    }

    #[test]
    fn test_unwired_hooks_have_no_policy() {
        assert!(!HookPoint::FocusIn.is_wired());
        assert_eq!(HookPoint::TitleChange.policy(), None);
        assert_eq!(HookPoint::Bell.policy(), Some(DispatchPolicy::Broadcast));
        assert_eq!(
            HookPoint::KeyPress.policy(),
            Some(DispatchPolicy::FirstConsumerWins)
        );
    }
}
