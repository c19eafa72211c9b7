//! Capability interfaces a module may implement.
//!
//! Each interface carries exactly one operation and a fixed
//! [`DispatchPolicy`]. A module opts in by implementing the trait and
//! returning itself from the matching `Module::as_*` query; the manager
//! samples those queries once at registration into a [`Capabilities`] set.

use std::fmt;

use crate::error::ModuleResult;
use crate::services::Terminal;

/// How the manager walks a dispatch list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchPolicy {
    /// Every active module is invoked, in order, regardless of earlier results.
    Broadcast,
    /// Modules are invoked in order until one reports the event handled.
    FirstConsumerWins,
}

/// Identifier of a capability interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Bell,
    EscapeString,
    Input,
    RenderOverlay,
    Background,
    Selection,
    GlyphTransform,
    RenderGate,
}

impl Capability {
    /// All capability interfaces known to this build.
    pub const ALL: [Capability; 8] = [
        Capability::Bell,
        Capability::EscapeString,
        Capability::Input,
        Capability::RenderOverlay,
        Capability::Background,
        Capability::Selection,
        Capability::GlyphTransform,
        Capability::RenderGate,
    ];

    /// Dispatch policy declared by the interface.
    pub const fn policy(self) -> DispatchPolicy {
        match self {
            Capability::Bell
            | Capability::RenderOverlay
            | Capability::Background
            | Capability::Selection => DispatchPolicy::Broadcast,
            Capability::EscapeString
            | Capability::Input
            | Capability::GlyphTransform
            | Capability::RenderGate => DispatchPolicy::FirstConsumerWins,
        }
    }

    /// Interface name used in logs and the `modules` CLI listing.
    pub const fn name(self) -> &'static str {
        match self {
            Capability::Bell => "BellHandler",
            Capability::EscapeString => "EscapeStringHandler",
            Capability::Input => "InputHandler",
            Capability::RenderOverlay => "RenderOverlay",
            Capability::Background => "BackgroundProvider",
            Capability::Selection => "SelectionHandler",
            Capability::GlyphTransform => "GlyphTransform",
            Capability::RenderGate => "RenderGate",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of interfaces one module implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const fn empty() -> Self {
        Capabilities(0)
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Capabilities::empty();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Capability::name).collect();
        if names.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

/// Which string-type escape sequence carried a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeKind {
    /// Operating System Command (`ESC ]`)
    Osc,
    /// Device Control String (`ESC P`)
    Dcs,
    /// Application Program Command (`ESC _`)
    Apc,
    /// Privacy Message (`ESC ^`)
    Pm,
}

impl fmt::Display for EscapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EscapeKind::Osc => "OSC",
            EscapeKind::Dcs => "DCS",
            EscapeKind::Apc => "APC",
            EscapeKind::Pm => "PM",
        })
    }
}

/// Keyboard modifier mask delivered with key events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1 << 0);
    pub const CONTROL: Modifiers = Modifiers(1 << 2);
    pub const ALT: Modifiers = Modifiers(1 << 3);
    pub const SUPER: Modifiers = Modifiers(1 << 26);

    pub const fn from_bits(bits: u32) -> Self {
        Modifiers(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// `true` if every modifier in `other` is held.
    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Straight-alpha RGBA colour used by drawing modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 0xff)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

/// Drawing surface handed to render-time capabilities.
///
/// Coordinates are in physical pixels relative to the window's content area.
pub trait RenderContext {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);

    /// Foreground colour of the cell currently being drawn. Only meaningful
    /// during glyph transforms; other hooks see the theme foreground.
    fn foreground(&self) -> Rgba {
        Rgba::new(0xff, 0xff, 0xff, 0xff)
    }
}

// ── Interfaces ──────────────────────────────────────────────────────────────

/// Reacts to the terminal bell (BEL). Broadcast.
pub trait BellHandler {
    fn on_bell(&mut self) -> ModuleResult;
}

/// Consumes string-type escape sequences (OSC, DCS, ...). First consumer wins.
///
/// `bytes` is the payload between the introducer and the terminator.
pub trait EscapeStringHandler {
    fn on_escape_string(
        &mut self,
        kind: EscapeKind,
        bytes: &[u8],
        terminal: Option<&dyn Terminal>,
    ) -> ModuleResult<bool>;
}

/// Intercepts key presses before they reach the PTY. First consumer wins.
pub trait InputHandler {
    fn on_key_event(&mut self, keyval: u32, keycode: u32, modifiers: Modifiers)
    -> ModuleResult<bool>;
}

/// Draws on top of the rendered terminal. Broadcast.
pub trait RenderOverlay {
    fn on_render_overlay(
        &mut self,
        ctx: &mut dyn RenderContext,
        width: u32,
        height: u32,
    ) -> ModuleResult;
}

/// Draws beneath the terminal cells. Broadcast.
pub trait BackgroundProvider {
    fn on_render_background(
        &mut self,
        ctx: &mut dyn RenderContext,
        width: u32,
        height: u32,
    ) -> ModuleResult;
}

/// Notified when the user finishes a selection. Broadcast.
///
/// `length` is the byte length of `text`.
pub trait SelectionHandler {
    fn on_selection_done(&mut self, text: &str, length: usize) -> ModuleResult;
}

/// Replaces the font rasterizer for individual glyphs. First consumer wins.
pub trait GlyphTransform {
    #[allow(clippy::too_many_arguments)]
    fn on_glyph_transform(
        &mut self,
        rune: char,
        ctx: &mut dyn RenderContext,
        px: f32,
        py: f32,
        cell_width: f32,
        cell_height: f32,
    ) -> ModuleResult<bool>;
}

/// Asked before each frame; returning `true` suppresses the frame.
/// First consumer wins.
pub trait RenderGate {
    fn on_pre_render(&mut self) -> ModuleResult<bool>;
}
