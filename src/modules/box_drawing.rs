//! Procedural box-drawing glyphs.
//!
//! Light and heavy lines, corners, tees, crosses and half lines from the Box
//! Drawing block (U+2500–U+257F) are drawn as filled rectangles so adjacent
//! cells join without gaps. Dashed, double and arc forms are left to the font.

use plugterm_modules::{
    GlyphTransform, Module, ModuleConfig, ModuleResult, RenderContext, ServiceLocator,
};

pub const NAME: &str = "box-drawing";

/// Light line thickness as a fraction of cell height.
const LINE_THICKNESS: f32 = 0.12;
/// Heavy line thickness as a fraction of cell height.
const HEAVY_LINE_THICKNESS: f32 = 0.20;

const NONE: u8 = 0;
const LIGHT: u8 = 1;
const HEAVY: u8 = 2;

/// Arm weights `[up, down, left, right]` for U+2500..=U+254B. All-`NONE`
/// rows are the dashed forms.
#[rustfmt::skip]
const LINES: [[u8; 4]; 76] = [
    [0, 0, 1, 1], [0, 0, 2, 2], [1, 1, 0, 0], [2, 2, 0, 0], // ─ ━ │ ┃
    [0; 4], [0; 4], [0; 4], [0; 4], [0; 4], [0; 4], [0; 4], [0; 4], // dashes
    [0, 1, 0, 1], [0, 1, 0, 2], [0, 2, 0, 1], [0, 2, 0, 2], // ┌ ┍ ┎ ┏
    [0, 1, 1, 0], [0, 1, 2, 0], [0, 2, 1, 0], [0, 2, 2, 0], // ┐ ┑ ┒ ┓
    [1, 0, 0, 1], [1, 0, 0, 2], [2, 0, 0, 1], [2, 0, 0, 2], // └ ┕ ┖ ┗
    [1, 0, 1, 0], [1, 0, 2, 0], [2, 0, 1, 0], [2, 0, 2, 0], // ┘ ┙ ┚ ┛
    [1, 1, 0, 1], [1, 1, 0, 2], [2, 1, 0, 1], [1, 2, 0, 1], // ├ ┝ ┞ ┟
    [2, 2, 0, 1], [2, 1, 0, 2], [1, 2, 0, 2], [2, 2, 0, 2], // ┠ ┡ ┢ ┣
    [1, 1, 1, 0], [1, 1, 2, 0], [2, 1, 1, 0], [1, 2, 1, 0], // ┤ ┥ ┦ ┧
    [2, 2, 1, 0], [2, 1, 2, 0], [1, 2, 2, 0], [2, 2, 2, 0], // ┨ ┩ ┪ ┫
    [0, 1, 1, 1], [0, 1, 2, 1], [0, 1, 1, 2], [0, 1, 2, 2], // ┬ ┭ ┮ ┯
    [0, 2, 1, 1], [0, 2, 2, 1], [0, 2, 1, 2], [0, 2, 2, 2], // ┰ ┱ ┲ ┳
    [1, 0, 1, 1], [1, 0, 2, 1], [1, 0, 1, 2], [1, 0, 2, 2], // ┴ ┵ ┶ ┷
    [2, 0, 1, 1], [2, 0, 2, 1], [2, 0, 1, 2], [2, 0, 2, 2], // ┸ ┹ ┺ ┻
    [1, 1, 1, 1], [1, 1, 2, 1], [1, 1, 1, 2], [1, 1, 2, 2], // ┼ ┽ ┾ ┿
    [2, 1, 1, 1], [1, 2, 1, 1], [2, 2, 1, 1], [2, 1, 2, 1], // ╀ ╁ ╂ ╃
    [2, 1, 1, 2], [1, 2, 2, 1], [1, 2, 1, 2], [2, 1, 2, 2], // ╄ ╅ ╆ ╇
    [1, 2, 2, 2], [2, 2, 2, 1], [2, 2, 1, 2], [2, 2, 2, 2], // ╈ ╉ ╊ ╋
];

/// Half lines U+2574..=U+257F.
#[rustfmt::skip]
const HALF_LINES: [[u8; 4]; 12] = [
    [0, 0, 1, 0], [1, 0, 0, 0], [0, 0, 0, 1], [0, 1, 0, 0], // ╴ ╵ ╶ ╷
    [0, 0, 2, 0], [2, 0, 0, 0], [0, 0, 0, 2], [0, 2, 0, 0], // ╸ ╹ ╺ ╻
    [0, 0, 1, 2], [1, 2, 0, 0], [0, 0, 2, 1], [2, 1, 0, 0], // ╼ ╽ ╾ ╿
];

/// Arm weights `[up, down, left, right]` for `rune`, or `None` if it is not
/// drawn procedurally.
pub fn line_arms(rune: char) -> Option<[u8; 4]> {
    let cp = rune as u32;
    let arms = match cp {
        0x2500..=0x254B => LINES[(cp - 0x2500) as usize],
        0x2574..=0x257F => HALF_LINES[(cp - 0x2574) as usize],
        _ => return None,
    };
    if arms == [NONE; 4] { None } else { Some(arms) }
}

/// A rectangle in normalized cell coordinates (0.0..=1.0 on both axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Segment {
    fn horizontal(x_start: f32, x_end: f32, thickness: f32) -> Self {
        Self {
            x: x_start,
            y: 0.5 - thickness / 2.0,
            width: x_end - x_start,
            height: thickness,
        }
    }

    fn vertical(y_start: f32, y_end: f32, thickness_x: f32) -> Self {
        Self {
            x: 0.5 - thickness_x / 2.0,
            y: y_start,
            width: thickness_x,
            height: y_end - y_start,
        }
    }
}

/// Segments for `rune`. `aspect_ratio` is cell height / cell width, used so
/// vertical and horizontal lines look equally thick.
pub fn line_segments(rune: char, light: f32, aspect_ratio: f32) -> Option<Vec<Segment>> {
    let [up, down, left, right] = line_arms(rune)?;
    let heavy = light * HEAVY_LINE_THICKNESS / LINE_THICKNESS;
    let thickness = |weight: u8| match weight {
        LIGHT => light,
        HEAVY => heavy,
        _ => 0.0,
    };

    let mut segments = Vec::with_capacity(4);
    // Each arm runs from the cell edge past the centre by half its own
    // thickness so joints are filled.
    if left != NONE {
        let t = thickness(left);
        segments.push(Segment::horizontal(0.0, 0.5 + t * aspect_ratio / 2.0, t));
    }
    if right != NONE {
        let t = thickness(right);
        segments.push(Segment::horizontal(0.5 - t * aspect_ratio / 2.0, 1.0, t));
    }
    if up != NONE {
        let t = thickness(up);
        segments.push(Segment::vertical(0.0, 0.5 + t / 2.0, t * aspect_ratio));
    }
    if down != NONE {
        let t = thickness(down);
        segments.push(Segment::vertical(0.5 - t / 2.0, 1.0, t * aspect_ratio));
    }
    Some(segments)
}

pub struct BoxDrawingModule {
    thickness: f32,
}

impl BoxDrawingModule {
    pub fn new() -> Self {
        Self {
            thickness: LINE_THICKNESS,
        }
    }
}

impl Default for BoxDrawingModule {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphTransform for BoxDrawingModule {
    fn on_glyph_transform(
        &mut self,
        rune: char,
        ctx: &mut dyn RenderContext,
        px: f32,
        py: f32,
        cell_width: f32,
        cell_height: f32,
    ) -> ModuleResult<bool> {
        if cell_width <= 0.0 || cell_height <= 0.0 {
            return Ok(false);
        }
        let Some(segments) = line_segments(rune, self.thickness, cell_height / cell_width) else {
            return Ok(false);
        };
        let color = ctx.foreground();
        for s in segments {
            ctx.fill_rect(
                px + s.x * cell_width,
                py + s.y * cell_height,
                s.width * cell_width,
                s.height * cell_height,
                color,
            );
        }
        Ok(true)
    }
}

impl Module for BoxDrawingModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Draws box-drawing characters procedurally"
    }

    fn configure(&mut self, config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        let thickness: f32 = config.get_or("line_thickness", LINE_THICKNESS);
        self.thickness = thickness.clamp(0.02, 0.5);
        Ok(())
    }

    fn as_glyph_transform(&mut self) -> Option<&mut dyn GlyphTransform> {
        Some(self)
    }
}
