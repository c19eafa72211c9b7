//! The unit of registration.
//!
//! A module is any type implementing [`Module`]. Identity and lifecycle
//! callbacks all have defaults, so the smallest useful module overrides
//! `name` and one `as_*` capability query:
//!
//! ```
//! use plugterm_modules::{BellHandler, Module, ModuleResult};
//!
//! struct Beeper;
//!
//! impl BellHandler for Beeper {
//!     fn on_bell(&mut self) -> ModuleResult {
//!         Ok(())
//!     }
//! }
//!
//! impl Module for Beeper {
//!     fn name(&self) -> &str {
//!         "beeper"
//!     }
//!     fn as_bell_handler(&mut self) -> Option<&mut dyn BellHandler> {
//!         Some(self)
//!     }
//! }
//! ```

use plugterm_config::ModuleConfig;

use crate::capability::{
    BackgroundProvider, BellHandler, Capabilities, Capability, EscapeStringHandler,
    GlyphTransform, InputHandler, RenderGate, RenderOverlay, SelectionHandler,
};
use crate::error::ModuleResult;
use crate::services::ServiceLocator;

/// Runs before everything else at the same hook.
pub const PRIORITY_HIGH: i32 = -100;
pub const PRIORITY_DEFAULT: i32 = 0;
/// Runs after everything else at the same hook.
pub const PRIORITY_LOW: i32 = 100;

/// Activation state as tracked by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleState {
    #[default]
    Inactive,
    Active,
}

/// A pluggable behavior.
///
/// The manager owns registered modules and calls into them only from the
/// event-loop thread. `Send` is required so the process-wide default manager
/// can live in a static.
pub trait Module: Send {
    /// Registry key. Must be unique and stable for the process lifetime.
    fn name(&self) -> &str {
        "unknown"
    }

    fn description(&self) -> &str {
        ""
    }

    /// Priority assigned at registration. The manager owns the live value
    /// afterwards (see `ModuleManager::set_priority`).
    fn default_priority(&self) -> i32 {
        PRIORITY_DEFAULT
    }

    /// Apply a configuration snapshot. May be called before activation and
    /// again at any later time.
    fn configure(&mut self, _config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        Ok(())
    }

    /// Start providing the feature. On error the module stays inactive.
    fn activate(&mut self, _services: &ServiceLocator) -> ModuleResult {
        Ok(())
    }

    /// Stop providing the feature and cancel any pending timers. Only called
    /// on an active module.
    fn deactivate(&mut self) {}

    // ── Capability queries ──────────────────────────────────────────────
    //
    // Sampled once at registration. Implementations return `Some(self)` for
    // every interface the type implements.

    fn as_bell_handler(&mut self) -> Option<&mut dyn BellHandler> {
        None
    }

    fn as_escape_string_handler(&mut self) -> Option<&mut dyn EscapeStringHandler> {
        None
    }

    fn as_input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        None
    }

    fn as_render_overlay(&mut self) -> Option<&mut dyn RenderOverlay> {
        None
    }

    fn as_background_provider(&mut self) -> Option<&mut dyn BackgroundProvider> {
        None
    }

    fn as_selection_handler(&mut self) -> Option<&mut dyn SelectionHandler> {
        None
    }

    fn as_glyph_transform(&mut self) -> Option<&mut dyn GlyphTransform> {
        None
    }

    fn as_render_gate(&mut self) -> Option<&mut dyn RenderGate> {
        None
    }
}

impl Capabilities {
    /// Probe which interfaces `module` implements.
    pub fn probe(module: &mut dyn Module) -> Capabilities {
        let mut set = Capabilities::empty();
        for capability in Capability::ALL {
            let implemented = match capability {
                Capability::Bell => module.as_bell_handler().is_some(),
                Capability::EscapeString => module.as_escape_string_handler().is_some(),
                Capability::Input => module.as_input_handler().is_some(),
                Capability::RenderOverlay => module.as_render_overlay().is_some(),
                Capability::Background => module.as_background_provider().is_some(),
                Capability::Selection => module.as_selection_handler().is_some(),
                Capability::GlyphTransform => module.as_glyph_transform().is_some(),
                Capability::RenderGate => module.as_render_gate().is_some(),
            };
            if implemented {
                set.insert(capability);
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{EscapeKind, Modifiers};
    use crate::services::Terminal;

    struct Bare;
    impl Module for Bare {}

    struct Multi;

    impl BellHandler for Multi {
        fn on_bell(&mut self) -> ModuleResult {
            Ok(())
        }
    }

    impl InputHandler for Multi {
        fn on_key_event(&mut self, _: u32, _: u32, _: Modifiers) -> ModuleResult<bool> {
            Ok(false)
        }
    }

    impl EscapeStringHandler for Multi {
        fn on_escape_string(
            &mut self,
            _: EscapeKind,
            _: &[u8],
            _: Option<&dyn Terminal>,
        ) -> ModuleResult<bool> {
            Ok(false)
        }
    }

    impl Module for Multi {
        fn name(&self) -> &str {
            "multi"
        }
        fn as_bell_handler(&mut self) -> Option<&mut dyn BellHandler> {
            Some(self)
        }
        fn as_input_handler(&mut self) -> Option<&mut dyn InputHandler> {
            Some(self)
        }
        fn as_escape_string_handler(&mut self) -> Option<&mut dyn EscapeStringHandler> {
            Some(self)
        }
    }

    #[test]
    fn test_defaults() {
        let mut bare = Bare;
        assert_eq!(bare.name(), "unknown");
        assert_eq!(bare.description(), "");
        assert_eq!(bare.default_priority(), PRIORITY_DEFAULT);
        assert!(bare.activate(&ServiceLocator::new()).is_ok());
        assert!(Capabilities::probe(&mut bare).is_empty());
    }

    #[test]
    fn test_probe_multiple_interfaces() {
        let caps = Capabilities::probe(&mut Multi);
        assert!(caps.contains(Capability::Bell));
        assert!(caps.contains(Capability::Input));
        assert!(caps.contains(Capability::EscapeString));
        assert!(!caps.contains(Capability::RenderOverlay));
        assert_eq!(caps.iter().count(), 3);
    }
}
