//! Font zoom shortcuts.
//!
//! Primary modifier + Shift (`Ctrl+Shift` or `Cmd+Shift` on macOS) with
//! `+`, `-` or `0` grows, shrinks or resets the font scale. Keypad keys work
//! too. Ctrl-only chords are left to the PTY.

use plugterm_modules::{
    InputHandler, Module, ModuleConfig, ModuleResult, Modifiers, ServiceLocator,
};

use crate::platform::primary_modifier_with_shift;

pub const NAME: &str = "font-zoom";

pub const DEFAULT_STEP: f32 = 0.1;

// X11 keysyms
const KEY_EQUAL: u32 = 0x3d;
const KEY_PLUS: u32 = 0x2b;
const KEY_KP_ADD: u32 = 0xffab;
const KEY_MINUS: u32 = 0x2d;
const KEY_UNDERSCORE: u32 = 0x5f;
const KEY_KP_SUBTRACT: u32 = 0xffad;
const KEY_0: u32 = 0x30;
const KEY_PAREN_RIGHT: u32 = 0x29;
const KEY_KP_0: u32 = 0xffb0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomAction {
    In,
    Out,
    Reset,
}

/// Map a key chord to a zoom action.
pub fn zoom_action(keyval: u32, modifiers: Modifiers) -> Option<ZoomAction> {
    if !primary_modifier_with_shift(modifiers) {
        return None;
    }
    match keyval {
        KEY_EQUAL | KEY_PLUS | KEY_KP_ADD => Some(ZoomAction::In),
        KEY_MINUS | KEY_UNDERSCORE | KEY_KP_SUBTRACT => Some(ZoomAction::Out),
        KEY_0 | KEY_PAREN_RIGHT | KEY_KP_0 => Some(ZoomAction::Reset),
        _ => None,
    }
}

pub struct FontZoomModule {
    step: f32,
    services: Option<ServiceLocator>,
}

impl FontZoomModule {
    pub fn new() -> Self {
        Self {
            step: DEFAULT_STEP,
            services: None,
        }
    }
}

impl Default for FontZoomModule {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler for FontZoomModule {
    fn on_key_event(
        &mut self,
        keyval: u32,
        _keycode: u32,
        modifiers: Modifiers,
    ) -> ModuleResult<bool> {
        let Some(action) = zoom_action(keyval, modifiers) else {
            return Ok(false);
        };
        let Some(services) = self.services.as_ref() else {
            return Ok(false);
        };
        let Some(fonts) = services.font_cache() else {
            log::warn!("Font zoom requested but no font cache is available");
            return Ok(false);
        };

        let current = fonts.scale();
        let target = match action {
            ZoomAction::In => current + self.step,
            ZoomAction::Out => current - self.step,
            ZoomAction::Reset => 1.0,
        };
        fonts.set_scale(target);
        log::info!("Font scale {:.2} -> {:.2}", current, fonts.scale());

        if let Some(terminal) = services.terminal() {
            terminal.mark_all_dirty();
        }
        services.queue_redraw();
        Ok(true)
    }
}

impl Module for FontZoomModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Zooms the font with Ctrl+Shift +/-/0"
    }

    fn configure(&mut self, config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        let step: f32 = config.get_or("step", DEFAULT_STEP);
        self.step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_STEP
        };
        Ok(())
    }

    fn activate(&mut self, services: &ServiceLocator) -> ModuleResult {
        self.services = Some(services.clone());
        Ok(())
    }

    fn as_input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "macos")]
    const PRIMARY: Modifiers = Modifiers::SUPER;
    #[cfg(not(target_os = "macos"))]
    const PRIMARY: Modifiers = Modifiers::CONTROL;

    #[test]
    fn test_zoom_action() {
        let chord = PRIMARY | Modifiers::SHIFT;
        assert_eq!(zoom_action(KEY_PLUS, chord), Some(ZoomAction::In));
        assert_eq!(zoom_action(KEY_KP_SUBTRACT, chord), Some(ZoomAction::Out));
        assert_eq!(zoom_action(KEY_PAREN_RIGHT, chord), Some(ZoomAction::Reset));
        assert_eq!(zoom_action(u32::from(b'a'), chord), None);
    }

    #[test]
    fn test_requires_shift() {
        assert_eq!(zoom_action(KEY_MINUS, PRIMARY), None);
        assert_eq!(zoom_action(KEY_MINUS, Modifiers::SHIFT), None);
    }

    #[test]
    fn test_not_consumed_without_services() {
        let mut module = FontZoomModule::new();
        let consumed = module
            .on_key_event(KEY_PLUS, 0, PRIMARY | Modifiers::SHIFT)
            .unwrap();
        assert!(!consumed);
    }
}
