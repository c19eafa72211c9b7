//! Headless host: the services modules talk to, and the glue that turns a
//! terminal output stream into module dispatches and frames.
//!
//! # Frame pipeline
//!
//! 1. `PreRender` gate: a module may veto the frame (synchronized updates)
//! 2. `RenderBackground`
//! 3. Glyphs of the current line; `GlyphTransform` may claim each cell
//! 4. `RenderOverlay`
//! 5. Dirty rows are drained

pub mod render;
pub mod stream;
pub mod terminal;
pub mod timer;
pub mod window;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use plugterm_config::BackendSetting;
use plugterm_fonts::SystemFontCache;
use plugterm_modules::{
    BackendKind, EscapeKind, FontCache, Modifiers, ModuleManager, Terminal, Window,
};

pub use render::{FillRect, HeadlessCanvas};
pub use stream::{EscapeScanner, StreamEvent};
pub use terminal::HeadlessTerminal;
pub use timer::TimerQueue;
pub use window::HeadlessWindow;

/// Unscaled cell size in pixels.
pub const BASE_CELL_WIDTH: f32 = 8.0;
pub const BASE_CELL_HEIGHT: f32 = 16.0;

/// Resolve the configured backend against the session environment.
pub fn resolve_backend(setting: BackendSetting) -> BackendKind {
    match setting {
        BackendSetting::X11 => BackendKind::X11,
        BackendSetting::Wayland => BackendKind::Wayland,
        BackendSetting::Headless => BackendKind::Headless,
        BackendSetting::Auto => {
            let set = |var: &str| std::env::var_os(var).is_some_and(|v| !v.is_empty());
            if set("WAYLAND_DISPLAY") {
                BackendKind::Wayland
            } else if set("DISPLAY") {
                BackendKind::X11
            } else {
                BackendKind::Headless
            }
        }
    }
}

/// Outcome of one [`Host::render_frame`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// A `RenderGate` vetoed the frame; nothing was drawn.
    pub skipped: bool,
    pub fills: Vec<FillRect>,
    /// Cells drawn by a `GlyphTransform` module.
    pub glyphs_transformed: usize,
    /// Cells left to the font rasterizer.
    pub glyphs_rasterized: usize,
    pub dirty_rows: Vec<usize>,
}

/// The headless host's services and stream state.
pub struct Host {
    pub terminal: Arc<HeadlessTerminal>,
    pub window: Arc<HeadlessWindow>,
    pub timers: Arc<TimerQueue>,
    pub fonts: Arc<SystemFontCache>,
    scanner: EscapeScanner,
    /// Text after the last newline, as drawn by the frame pipeline.
    line: String,
    frames_rendered: u64,
    frames_skipped: u64,
}

impl Host {
    pub fn new(fonts: SystemFontCache) -> Self {
        Self {
            terminal: Arc::new(HeadlessTerminal::default()),
            window: Arc::new(HeadlessWindow::default()),
            timers: Arc::new(TimerQueue::new()),
            fonts: Arc::new(fonts),
            scanner: EscapeScanner::new(),
            line: String::new(),
            frames_rendered: 0,
            frames_skipped: 0,
        }
    }

    /// Hand every service to `manager` and complete startup.
    pub fn install(&self, manager: &mut ModuleManager, backend: BackendKind) {
        manager.set_terminal(&self.terminal);
        manager.set_window(&self.window);
        manager.set_font_cache(&self.fonts);
        manager.set_scheduler(&self.timers);
        manager.set_backend_kind(backend);
        manager.complete_startup();
    }

    /// Scan `bytes` and dispatch what they contain. Text is written to `out`.
    pub fn feed(
        &mut self,
        manager: &mut ModuleManager,
        bytes: &[u8],
        out: &mut impl Write,
    ) -> io::Result<()> {
        for event in self.scanner.feed(bytes) {
            match event {
                StreamEvent::Text(text) => {
                    out.write_all(&text)?;
                    self.track_line(&text);
                }
                StreamEvent::Bell => manager.dispatch_bell(),
                StreamEvent::EscapeString(kind, payload) => {
                    if manager.dispatch_escape_string(kind, &payload) {
                        continue;
                    }
                    self.handle_unclaimed(kind, &payload, out)?;
                }
            }
        }
        out.flush()
    }

    /// Host fallback for escape strings no module consumed: OSC 0/2 set the
    /// title, everything else is passed through verbatim.
    fn handle_unclaimed(
        &mut self,
        kind: EscapeKind,
        payload: &[u8],
        out: &mut impl Write,
    ) -> io::Result<()> {
        if kind == EscapeKind::Osc {
            let text = String::from_utf8_lossy(payload);
            if let Some(title) = text.strip_prefix("0;").or_else(|| text.strip_prefix("2;")) {
                self.terminal.set_title(title);
                return Ok(());
            }
        }
        let introducer = match kind {
            EscapeKind::Osc => b']',
            EscapeKind::Dcs => b'P',
            EscapeKind::Apc => b'_',
            EscapeKind::Pm => b'^',
        };
        out.write_all(&[0x1b, introducer])?;
        out.write_all(payload)?;
        out.write_all(b"\x1b\\")
    }

    fn track_line(&mut self, text: &[u8]) {
        let text = String::from_utf8_lossy(text);
        let tail = match text.rfind('\n') {
            Some(idx) => {
                self.line.clear();
                &text[idx + 1..]
            }
            None => &text[..],
        };
        self.line.extend(tail.chars().filter(|c| !c.is_control()));
        let cols = self.terminal.cols();
        if self.line.chars().count() > cols {
            self.line = self.line.chars().skip(self.line.chars().count() - cols).collect();
        }
        self.terminal.mark_dirty(self.terminal.rows().saturating_sub(1));
        self.window.queue_redraw();
    }

    /// Window focus changed.
    pub fn set_focus(&self, manager: &mut ModuleManager, focused: bool) {
        self.window.set_focused(focused);
        manager.notify_focus(focused);
    }

    /// Offer a key press to input handlers. `false` means the key should go
    /// to the PTY.
    pub fn key_event(
        &self,
        manager: &mut ModuleManager,
        keyval: u32,
        keycode: u32,
        modifiers: Modifiers,
    ) -> bool {
        manager.dispatch_key_event(keyval, keycode, modifiers)
    }

    /// The user finished selecting `text`.
    pub fn selection_done(&self, manager: &mut ModuleManager, text: &str) {
        if !text.is_empty() {
            manager.dispatch_selection_done(text);
        }
    }

    /// Fire due timers, then render if a redraw is pending.
    pub fn poll(&mut self, manager: &mut ModuleManager, now: Instant) -> Option<FrameReport> {
        let fired = self.timers.fire_due(now);
        if fired > 0 {
            log::trace!("{} timers fired", fired);
        }
        if self.window.take_redraw_request() {
            Some(self.render_frame(manager))
        } else {
            None
        }
    }

    /// Run the frame pipeline once.
    pub fn render_frame(&mut self, manager: &mut ModuleManager) -> FrameReport {
        if manager.dispatch_pre_render() {
            self.frames_skipped += 1;
            log::trace!("Frame skipped by render gate");
            return FrameReport {
                skipped: true,
                ..FrameReport::default()
            };
        }

        let (width, height) = self.window.size();
        let mut canvas = HeadlessCanvas::new();
        manager.dispatch_render_background(&mut canvas, width, height);

        let scale = self.fonts.scale();
        let cell_width = BASE_CELL_WIDTH * scale;
        let cell_height = BASE_CELL_HEIGHT * scale;
        let py = self.terminal.rows().saturating_sub(1) as f32 * cell_height;
        let mut report = FrameReport::default();
        for (col, rune) in self.line.chars().enumerate() {
            if rune == ' ' {
                continue;
            }
            let px = col as f32 * cell_width;
            if manager.dispatch_glyph_transform(
                rune,
                &mut canvas,
                px,
                py,
                cell_width,
                cell_height,
            ) {
                report.glyphs_transformed += 1;
            } else {
                report.glyphs_rasterized += 1;
            }
        }

        manager.dispatch_render_overlay(&mut canvas, width, height);

        self.frames_rendered += 1;
        report.fills = canvas.fills().to_vec();
        report.dirty_rows = self.terminal.take_dirty();
        report
    }

    /// `(rendered, skipped)` frame counts.
    pub fn frame_counts(&self) -> (u64, u64) {
        (self.frames_rendered, self.frames_skipped)
    }

    pub fn current_line(&self) -> &str {
        &self.line
    }
}
