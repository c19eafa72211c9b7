//! Cross-platform keyboard modifier helpers.
//!
//! `Ctrl` is both the OS-level shortcut modifier and the source of POSIX
//! control codes inside a terminal. plugterm therefore uses a different
//! "primary" modifier per platform:
//!
//! | Platform | Primary modifier |
//! |---|---|
//! | macOS | `Cmd` (`SUPER`) |
//! | Windows / Linux | `Ctrl` (`CONTROL`) |
//!
//! Shortcuts that must not clobber Ctrl-only terminal bindings also require
//! Shift.

use plugterm_modules::Modifiers;

/// `true` when the platform's primary modifier and Shift are both held:
///
/// - macOS: `Cmd+Shift`
/// - Windows/Linux: `Ctrl+Shift`
pub fn primary_modifier_with_shift(mods: Modifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        mods.contains(Modifiers::SUPER) && mods.contains(Modifiers::SHIFT)
    }
    #[cfg(not(target_os = "macos"))]
    {
        mods.contains(Modifiers::CONTROL) && mods.contains(Modifiers::SHIFT)
    }
}
