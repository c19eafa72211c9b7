//! Platform abstraction layer for plugterm.
//!
//! Platform-specific behaviour lives here instead of inline
//! `#[cfg(target_os = ...)]` blocks at call sites. Every public function has a
//! single cross-platform signature; branching happens inside the body.
//!
//! | Function | Description |
//! |---|---|
//! | [`deliver_desktop_notification`] | Send a native desktop notification |
//! | [`primary_modifier_with_shift`] | Whether the platform's primary modifier plus Shift is held |

mod modifiers;
mod notify;

pub use modifiers::primary_modifier_with_shift;
pub use notify::{deliver_desktop_notification, escape_for_applescript};
