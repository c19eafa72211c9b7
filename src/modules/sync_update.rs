//! Synchronized updates: suppress rendering while an application repaints.
//!
//! `DCS = 1 s ST` begins an update, `DCS = 2 s ST` ends it. While an update
//! is pending (or the terminal reports synchronized-output mode), the
//! pre-render gate asks the host to skip frames. A safety timeout ends a
//! forgotten update so the screen cannot freeze.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use plugterm_modules::{
    EscapeKind, EscapeStringHandler, Module, ModuleConfig, ModuleResult, PRIORITY_HIGH,
    RenderGate, ServiceLocator, Terminal, TerminalMode, TimerId,
};

pub const NAME: &str = "sync-update";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(150);

const BEGIN: &[u8] = b"=1s";
const END: &[u8] = b"=2s";

#[derive(Debug, Default)]
struct SyncState {
    pending: bool,
    timer: Option<TimerId>,
    /// Bumped on every begin so a stale timeout cannot end a newer update.
    generation: u64,
}

pub struct SyncUpdateModule {
    timeout: Duration,
    state: Arc<Mutex<SyncState>>,
    services: Option<ServiceLocator>,
}

impl SyncUpdateModule {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            state: Arc::new(Mutex::new(SyncState::default())),
            services: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending
    }

    fn begin(&mut self) {
        let services = self.services.clone().unwrap_or_default();
        let mut state = self.state.lock();
        if state.pending {
            return;
        }
        state.pending = true;
        state.generation += 1;
        let generation = state.generation;
        log::trace!("Synchronized update begin (generation {})", generation);

        let Some(scheduler) = services.scheduler() else {
            log::warn!("No scheduler; synchronized update has no safety timeout");
            return;
        };
        let shared = Arc::clone(&self.state);
        let timer_services = services.clone();
        state.timer = Some(scheduler.schedule(
            self.timeout,
            Box::new(move || {
                let mut state = shared.lock();
                if state.pending && state.generation == generation {
                    log::debug!("Synchronized update timed out; forcing end");
                    state.pending = false;
                    state.timer = None;
                    drop(state);
                    repaint(&timer_services);
                }
            }),
        ));
    }

    fn end(&mut self) {
        let services = self.services.clone().unwrap_or_default();
        let timer = {
            let mut state = self.state.lock();
            if !state.pending {
                return;
            }
            state.pending = false;
            state.timer.take()
        };
        if let (Some(id), Some(scheduler)) = (timer, services.scheduler()) {
            scheduler.cancel(id);
        }
        log::trace!("Synchronized update end");
        repaint(&services);
    }
}

impl Default for SyncUpdateModule {
    fn default() -> Self {
        Self::new()
    }
}

fn repaint(services: &ServiceLocator) {
    if let Some(terminal) = services.terminal() {
        terminal.mark_all_dirty();
    }
    services.queue_redraw();
}

impl EscapeStringHandler for SyncUpdateModule {
    fn on_escape_string(
        &mut self,
        kind: EscapeKind,
        bytes: &[u8],
        _terminal: Option<&dyn Terminal>,
    ) -> ModuleResult<bool> {
        if kind != EscapeKind::Dcs {
            return Ok(false);
        }
        match bytes {
            BEGIN => self.begin(),
            END => self.end(),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl RenderGate for SyncUpdateModule {
    fn on_pre_render(&mut self) -> ModuleResult<bool> {
        if self.state.lock().pending {
            return Ok(true);
        }
        let mode = self
            .services
            .as_ref()
            .and_then(ServiceLocator::terminal)
            .is_some_and(|t| t.mode(TerminalMode::SynchronizedOutput));
        Ok(mode)
    }
}

impl Module for SyncUpdateModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Suppresses rendering during DCS synchronized updates"
    }

    fn default_priority(&self) -> i32 {
        PRIORITY_HIGH
    }

    fn configure(&mut self, config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        let timeout_ms: u64 = config.get_or("timeout_ms", DEFAULT_TIMEOUT.as_millis() as u64);
        self.timeout = Duration::from_millis(timeout_ms.max(1));
        Ok(())
    }

    fn activate(&mut self, services: &ServiceLocator) -> ModuleResult {
        self.services = Some(services.clone());
        Ok(())
    }

    fn deactivate(&mut self) {
        let timer = {
            let mut state = self.state.lock();
            state.pending = false;
            state.timer.take()
        };
        if let Some(id) = timer {
            if let Some(scheduler) = self.services.as_ref().and_then(ServiceLocator::scheduler) {
                scheduler.cancel(id);
            }
        }
    }

    fn as_escape_string_handler(&mut self) -> Option<&mut dyn EscapeStringHandler> {
        Some(self)
    }

    fn as_render_gate(&mut self) -> Option<&mut dyn RenderGate> {
        Some(self)
    }
}
