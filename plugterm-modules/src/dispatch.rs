//! Per-hook dispatch lists.
//!
//! Entries are kept sorted by `(priority, sequence)`: lower priority first,
//! registration order breaking ties. Insertion keeps the list sorted; a
//! priority change only marks it dirty and the next walk re-sorts.

/// One module's slot in a hook's dispatch list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DispatchEntry {
    pub name: String,
    pub priority: i32,
    pub sequence: u64,
}

impl DispatchEntry {
    fn key(&self) -> (i32, u64) {
        (self.priority, self.sequence)
    }
}

#[derive(Debug, Default)]
pub(crate) struct DispatchList {
    entries: Vec<DispatchEntry>,
    dirty: bool,
}

impl DispatchList {
    /// Insert at the sorted position.
    pub fn insert(&mut self, entry: DispatchEntry) {
        self.ensure_sorted();
        let key = entry.key();
        let idx = self.entries.partition_point(|e| e.key() <= key);
        self.entries.insert(idx, entry);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    /// Update a module's priority. The list is re-sorted lazily.
    pub fn set_priority(&mut self, name: &str, priority: i32) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                if entry.priority != priority {
                    entry.priority = priority;
                    self.dirty = true;
                }
                true
            }
            None => false,
        }
    }

    pub fn ensure_sorted(&mut self) {
        if self.dirty {
            self.entries.sort_by_key(DispatchEntry::key);
            self.dirty = false;
        }
    }

    /// Entries in dispatch order. Callers must `ensure_sorted` first.
    pub fn entries(&self) -> &[DispatchEntry] {
        debug_assert!(!self.dirty, "dispatch list read while unsorted");
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
