//! In-memory terminal used by the headless host.
//!
//! Tracks the parts of terminal state modules can observe: size, title,
//! mode flags and the set of rows scheduled for repaint. There is no cell
//! grid; text written to the host is passed through.

use std::collections::{BTreeSet, HashSet};

use parking_lot::Mutex;
use plugterm_modules::{Terminal, TerminalMode};

#[derive(Debug)]
struct State {
    rows: usize,
    cols: usize,
    title: String,
    modes: HashSet<TerminalMode>,
    dirty: BTreeSet<usize>,
}

/// Headless [`Terminal`] implementation.
#[derive(Debug)]
pub struct HeadlessTerminal {
    state: Mutex<State>,
}

impl HeadlessTerminal {
    pub fn new(rows: usize, cols: usize) -> Self {
        let modes = HashSet::from([TerminalMode::CursorVisible, TerminalMode::AutoWrap]);
        Self {
            state: Mutex::new(State {
                rows,
                cols,
                title: String::new(),
                modes,
                dirty: BTreeSet::new(),
            }),
        }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().title = title.into();
    }

    pub fn set_mode(&self, mode: TerminalMode, enabled: bool) {
        let mut state = self.state.lock();
        if enabled {
            state.modes.insert(mode);
        } else {
            state.modes.remove(&mode);
        }
    }

    /// Resize; rows beyond the new height are dropped from the dirty set and
    /// every remaining row is marked dirty.
    pub fn resize(&self, rows: usize, cols: usize) {
        let mut state = self.state.lock();
        state.rows = rows;
        state.cols = cols;
        state.dirty = (0..rows).collect();
    }

    pub fn is_dirty(&self, row: usize) -> bool {
        self.state.lock().dirty.contains(&row)
    }

    /// Drain the dirty rows, in ascending order.
    pub fn take_dirty(&self) -> Vec<usize> {
        std::mem::take(&mut self.state.lock().dirty)
            .into_iter()
            .collect()
    }
}

impl Default for HeadlessTerminal {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

impl Terminal for HeadlessTerminal {
    fn rows(&self) -> usize {
        self.state.lock().rows
    }

    fn cols(&self) -> usize {
        self.state.lock().cols
    }

    fn mark_dirty(&self, row: usize) {
        let mut state = self.state.lock();
        if row < state.rows {
            state.dirty.insert(row);
        } else {
            log::trace!("mark_dirty: row {} out of range ({} rows)", row, state.rows);
        }
    }

    fn title(&self) -> String {
        self.state.lock().title.clone()
    }

    fn mode(&self, mode: TerminalMode) -> bool {
        self.state.lock().modes.contains(&mode)
    }

    fn mark_all_dirty(&self) {
        let mut state = self.state.lock();
        state.dirty = (0..state.rows).collect();
    }
}
