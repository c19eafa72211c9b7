//! Window stand-in for the headless host.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use plugterm_modules::Window;

/// Headless [`Window`]: counts redraw requests and tracks focus.
#[derive(Debug)]
pub struct HeadlessWindow {
    redraws: AtomicUsize,
    pending: AtomicBool,
    focused: AtomicBool,
    width: AtomicU32,
    height: AtomicU32,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            redraws: AtomicUsize::new(0),
            pending: AtomicBool::new(false),
            focused: AtomicBool::new(true),
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
        }
    }

    /// Total redraw requests since creation.
    pub fn redraw_count(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }

    /// Consume the pending redraw request, if any.
    pub fn take_redraw_request(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    pub fn set_size(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::SeqCst);
        self.height.store(height, Ordering::SeqCst);
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl Window for HeadlessWindow {
    fn queue_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
        self.pending.store(true, Ordering::SeqCst);
    }

    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn size(&self) -> (u32, u32) {
        (
            self.width.load(Ordering::SeqCst),
            self.height.load(Ordering::SeqCst),
        )
    }
}
