//! One-shot timer queue polled by the host event loop.
//!
//! The queue never spawns threads: the loop asks for [`TimerQueue::next_deadline`],
//! waits for input until then, and calls [`TimerQueue::fire_due`]. Callbacks
//! therefore run on the event-loop thread. They are invoked with the queue
//! unlocked, so a callback may schedule or cancel timers.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use plugterm_modules::{Scheduler, TimerCallback, TimerId};

struct Pending {
    deadline: Instant,
    callback: TimerCallback,
}

struct State {
    next_id: TimerId,
    timers: BTreeMap<TimerId, Pending>,
}

/// Host [`Scheduler`] implementation.
pub struct TimerQueue {
    state: Mutex<State>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                timers: BTreeMap::new(),
            }),
        }
    }

    pub fn schedule_at(&self, deadline: Instant, callback: TimerCallback) -> TimerId {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.timers.insert(id, Pending { deadline, callback });
        id
    }

    pub fn len(&self) -> usize {
        self.state.lock().timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.lock().timers.values().map(|p| p.deadline).min()
    }

    /// Run every timer whose deadline is at or before `now`, earliest first
    /// (ties in scheduling order). Returns how many fired.
    pub fn fire_due(&self, now: Instant) -> usize {
        let mut due: Vec<(Instant, TimerId, TimerCallback)> = {
            let mut state = self.state.lock();
            let ids: Vec<TimerId> = state
                .timers
                .iter()
                .filter(|(_, p)| p.deadline <= now)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| {
                    state
                        .timers
                        .remove(&id)
                        .map(|p| (p.deadline, id, p.callback))
                })
                .collect()
        };
        due.sort_by_key(|(deadline, id, _)| (*deadline, *id));

        let fired = due.len();
        for (_, id, callback) in due {
            if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
                log::error!("Timer {} callback panicked", id);
            }
        }
        fired
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = self.schedule_at(Instant::now() + delay, callback);
        log::trace!("Scheduled timer {} in {:?}", id, delay);
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.state.lock().timers.remove(&id).is_some()
    }
}
