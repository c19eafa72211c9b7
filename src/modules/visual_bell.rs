//! Visual bell: flash the viewport when the terminal rings.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use plugterm_modules::{
    BellHandler, Module, ModuleConfig, ModuleError, ModuleResult, RenderContext, RenderOverlay,
    Rgba, ServiceLocator, TimerId,
};

pub const NAME: &str = "visual-bell";

pub const DEFAULT_DURATION: Duration = Duration::from_millis(100);
pub const DEFAULT_COLOR: Rgba = Rgba::new(0xff, 0xff, 0xff, 0x40);

#[derive(Debug, Default)]
struct FlashState {
    flashing: bool,
    timer: Option<TimerId>,
    generation: u64,
}

pub struct VisualBellModule {
    duration: Duration,
    color: Rgba,
    state: Arc<Mutex<FlashState>>,
    services: Option<ServiceLocator>,
}

impl VisualBellModule {
    pub fn new() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            color: DEFAULT_COLOR,
            state: Arc::new(Mutex::new(FlashState::default())),
            services: None,
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.state.lock().flashing
    }

    fn scheduler_cancel(&self, id: TimerId) {
        if let Some(scheduler) = self.services.as_ref().and_then(ServiceLocator::scheduler) {
            scheduler.cancel(id);
        }
    }
}

impl Default for VisualBellModule {
    fn default() -> Self {
        Self::new()
    }
}

impl BellHandler for VisualBellModule {
    fn on_bell(&mut self) -> ModuleResult {
        let services = self.services.clone().unwrap_or_default();
        let previous = {
            let mut state = self.state.lock();
            state.flashing = true;
            state.generation += 1;
            state.timer.take()
        };
        // A bell during a flash restarts it.
        if let Some(id) = previous {
            self.scheduler_cancel(id);
        }

        if let Some(scheduler) = services.scheduler() {
            let shared = Arc::clone(&self.state);
            let generation = shared.lock().generation;
            let timer_services = services.clone();
            let id = scheduler.schedule(
                self.duration,
                Box::new(move || {
                    let mut state = shared.lock();
                    if state.generation == generation {
                        state.flashing = false;
                        state.timer = None;
                        drop(state);
                        timer_services.queue_redraw();
                    }
                }),
            );
            self.state.lock().timer = Some(id);
        }

        services.queue_redraw();
        Ok(())
    }
}

impl RenderOverlay for VisualBellModule {
    fn on_render_overlay(
        &mut self,
        ctx: &mut dyn RenderContext,
        width: u32,
        height: u32,
    ) -> ModuleResult {
        let mut state = self.state.lock();
        if !state.flashing {
            return Ok(());
        }
        ctx.fill_rect(0.0, 0.0, width as f32, height as f32, self.color);
        // Without a scheduler the flash lasts exactly one frame.
        if state.timer.is_none() {
            state.flashing = false;
        }
        Ok(())
    }
}

impl Module for VisualBellModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Flashes the window on BEL"
    }

    fn configure(&mut self, config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        let duration_ms: u64 = config.get_or("duration_ms", DEFAULT_DURATION.as_millis() as u64);
        self.duration = Duration::from_millis(duration_ms);

        if let Some(hex) = config.get::<String>("color")? {
            self.color = Rgba::from_hex(&hex).ok_or_else(|| {
                ModuleError::Config(format!("{NAME}.color: invalid colour '{hex}'"))
            })?;
        }
        Ok(())
    }

    fn activate(&mut self, services: &ServiceLocator) -> ModuleResult {
        self.services = Some(services.clone());
        Ok(())
    }

    fn deactivate(&mut self) {
        let timer = {
            let mut state = self.state.lock();
            state.flashing = false;
            state.timer.take()
        };
        if let Some(id) = timer {
            self.scheduler_cancel(id);
        }
    }

    fn as_bell_handler(&mut self) -> Option<&mut dyn BellHandler> {
        Some(self)
    }

    fn as_render_overlay(&mut self) -> Option<&mut dyn RenderOverlay> {
        Some(self)
    }
}
