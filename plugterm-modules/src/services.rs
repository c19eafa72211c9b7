//! Service locator: shared resources modules may reach without owning them.
//!
//! The host owns the terminal, window, font cache and scheduler. It hands
//! the locator `Weak` references once at startup; modules receive a cheap
//! clone of the [`ServiceLocator`] in `configure`/`activate` and upgrade a
//! handle only for the duration of a call. If the host tears a subsystem
//! down first, the handle simply reads as absent.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

/// Terminal mode flags modules may query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalMode {
    ApplicationCursor,
    ApplicationKeypad,
    AltScreen,
    BracketedPaste,
    MouseReporting,
    CursorVisible,
    AutoWrap,
    SynchronizedOutput,
}

/// Read/trigger-only view of the terminal.
pub trait Terminal: Send + Sync {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    /// Schedule `row` for repaint on the next frame.
    fn mark_dirty(&self, row: usize);
    fn title(&self) -> String;
    fn mode(&self, mode: TerminalMode) -> bool;

    fn mark_all_dirty(&self) {
        for row in 0..self.rows() {
            self.mark_dirty(row);
        }
    }
}

/// The toplevel window.
pub trait Window: Send + Sync {
    /// Request a redraw (expose) on the next event-loop iteration.
    fn queue_redraw(&self);
    fn is_focused(&self) -> bool;
    /// Content area size in physical pixels.
    fn size(&self) -> (u32, u32);
}

/// Font cache shared by the renderer and font-related modules.
pub trait FontCache: Send + Sync {
    /// `true` if `family` resolves to an installed face.
    fn has_family(&self, family: &str) -> bool;
    /// Append `family` to the fallback chain. Returns `false` if it cannot be
    /// resolved or is already present.
    fn add_fallback(&self, family: &str) -> bool;
    fn remove_fallback(&self, family: &str) -> bool;
    fn fallbacks(&self) -> Vec<String>;
    fn scale(&self) -> f32;
    fn set_scale(&self, scale: f32);
}

/// Which window-system backend the host is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    X11,
    Wayland,
    Headless,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::X11 => "x11",
            BackendKind::Wayland => "wayland",
            BackendKind::Headless => "headless",
        })
    }
}

/// Identifier of a scheduled timer.
pub type TimerId = u64;

/// Callback run by the scheduler on the event-loop thread.
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// Host scheduling primitive for one-shot timers.
///
/// Callbacks run on the event-loop thread. A module that schedules a timer
/// owns it and must cancel it in `deactivate`.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId;
    /// Returns `false` if the timer already fired or was never scheduled.
    fn cancel(&self, id: TimerId) -> bool;
}

#[derive(Default)]
struct Handles {
    terminal: OnceLock<Weak<dyn Terminal>>,
    window: OnceLock<Weak<dyn Window>>,
    font_cache: OnceLock<Weak<dyn FontCache>>,
    scheduler: OnceLock<Weak<dyn Scheduler>>,
    backend: OnceLock<BackendKind>,
}

/// Cheaply cloneable view of the host's shared services.
///
/// Every handle is set at most once; a second `set_*` call is rejected and
/// logged. Getters return `None` until the handle is set, and again after
/// the host drops the underlying object.
#[derive(Clone, Default)]
pub struct ServiceLocator {
    handles: Arc<Handles>,
}

impl ServiceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_terminal<T: Terminal + 'static>(&self, terminal: &Arc<T>) -> bool {
        let weak: Weak<dyn Terminal> = Arc::<T>::downgrade(terminal);
        set_once(&self.handles.terminal, weak, "terminal")
    }

    pub fn set_window<W: Window + 'static>(&self, window: &Arc<W>) -> bool {
        let weak: Weak<dyn Window> = Arc::<W>::downgrade(window);
        set_once(&self.handles.window, weak, "window")
    }

    pub fn set_font_cache<F: FontCache + 'static>(&self, font_cache: &Arc<F>) -> bool {
        let weak: Weak<dyn FontCache> = Arc::<F>::downgrade(font_cache);
        set_once(&self.handles.font_cache, weak, "font cache")
    }

    pub fn set_scheduler<S: Scheduler + 'static>(&self, scheduler: &Arc<S>) -> bool {
        let weak: Weak<dyn Scheduler> = Arc::<S>::downgrade(scheduler);
        set_once(&self.handles.scheduler, weak, "scheduler")
    }

    pub fn set_backend_kind(&self, backend: BackendKind) -> bool {
        set_once(&self.handles.backend, backend, "backend kind")
    }

    pub fn terminal(&self) -> Option<Arc<dyn Terminal>> {
        self.handles.terminal.get().and_then(Weak::upgrade)
    }

    pub fn window(&self) -> Option<Arc<dyn Window>> {
        self.handles.window.get().and_then(Weak::upgrade)
    }

    pub fn font_cache(&self) -> Option<Arc<dyn FontCache>> {
        self.handles.font_cache.get().and_then(Weak::upgrade)
    }

    pub fn scheduler(&self) -> Option<Arc<dyn Scheduler>> {
        self.handles.scheduler.get().and_then(Weak::upgrade)
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.handles.backend.get().copied()
    }

    /// Ask the window, if any, to redraw.
    pub fn queue_redraw(&self) {
        if let Some(window) = self.window() {
            window.queue_redraw();
        }
    }
}

impl fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("terminal", &self.terminal().is_some())
            .field("window", &self.window().is_some())
            .field("font_cache", &self.font_cache().is_some())
            .field("scheduler", &self.scheduler().is_some())
            .field("backend", &self.backend_kind())
            .finish()
    }
}

fn set_once<T>(cell: &OnceLock<T>, value: T, what: &str) -> bool {
    if cell.set(value).is_err() {
        log::warn!("Service {what} was already set; ignoring replacement");
        return false;
    }
    log::debug!("Service {what} registered");
    true
}
