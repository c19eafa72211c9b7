//! Recording render target for the headless host.

use plugterm_modules::{RenderContext, Rgba};

/// One `fill_rect` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgba,
}

/// [`RenderContext`] that records every fill instead of drawing it.
#[derive(Debug, Clone)]
pub struct HeadlessCanvas {
    fills: Vec<FillRect>,
    foreground: Rgba,
}

impl HeadlessCanvas {
    pub fn new() -> Self {
        Self::with_foreground(Rgba::new(0xff, 0xff, 0xff, 0xff))
    }

    pub fn with_foreground(foreground: Rgba) -> Self {
        Self {
            fills: Vec::new(),
            foreground,
        }
    }

    pub fn fills(&self) -> &[FillRect] {
        &self.fills
    }

    pub fn clear(&mut self) {
        self.fills.clear();
    }
}

impl Default for HeadlessCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for HeadlessCanvas {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.fills.push(FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn foreground(&self) -> Rgba {
        self.foreground
    }
}
