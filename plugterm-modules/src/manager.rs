//! Module registry and dispatch engine.
//!
//! [`ModuleManager`] owns every registered module, keeps one sorted
//! dispatch list per wired hook point, and routes host events into active
//! modules. It is also the service locator modules use to reach the
//! terminal, window, font cache and scheduler.
//!
//! # Startup order
//!
//! 1. `ModuleManager::new()` (or [`ModuleManager::get_default`])
//! 2. `register` each module
//! 3. set the service handles (`set_terminal`, `set_window`, ...)
//! 4. [`ModuleManager::complete_startup`]
//! 5. `apply_config` (configure + activate enabled modules)
//!
//! Dispatch before `complete_startup` is refused and logged.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use plugterm_config::{Config, ModuleConfig};

use crate::capability::{
    Capabilities, Capability, DispatchPolicy, EscapeKind, Modifiers, RenderContext,
};
use crate::dispatch::{DispatchEntry, DispatchList};
use crate::error::{ModuleError, ModuleResult};
use crate::hooks::HookPoint;
use crate::module::{Module, ModuleState};
use crate::services::{BackendKind, FontCache, Scheduler, ServiceLocator, Terminal, Window};

/// Identifier returned by [`ModuleManager::subscribe_focus`].
pub type SubscriptionId = u64;

type FocusCallback = Box<dyn FnMut(bool) + Send>;

/// A registered module plus the bookkeeping the manager keeps for it.
struct ModuleSlot {
    module: Box<dyn Module>,
    sequence: u64,
    priority: i32,
    state: ModuleState,
    capabilities: Capabilities,
}

/// Registry, dispatch engine and service locator.
pub struct ModuleManager {
    /// Next registration sequence number.
    next_sequence: u64,
    /// Registered modules keyed by name.
    modules: HashMap<String, ModuleSlot>,
    /// Dispatch lists keyed by wired hook point.
    hooks: HashMap<HookPoint, DispatchList>,
    /// Shared service handles.
    services: ServiceLocator,
    /// Capability-less focus subscribers.
    focus_subscribers: Vec<(SubscriptionId, FocusCallback)>,
    next_subscription: SubscriptionId,
    started: bool,
    warned_not_started: bool,
}

static DEFAULT_MANAGER: OnceLock<Mutex<ModuleManager>> = OnceLock::new();

impl ModuleManager {
    /// Create an empty manager with no services.
    pub fn new() -> Self {
        Self {
            next_sequence: 0,
            modules: HashMap::new(),
            hooks: HashMap::new(),
            services: ServiceLocator::new(),
            focus_subscribers: Vec::new(),
            next_subscription: 1,
            started: false,
            warned_not_started: false,
        }
    }

    /// The process-wide manager, constructed on first access.
    ///
    /// Lock it only from the event-loop thread and never from inside a
    /// module callback (the lock is already held there).
    pub fn get_default() -> &'static Mutex<ModuleManager> {
        DEFAULT_MANAGER.get_or_init(|| {
            log::debug!("Creating default module manager");
            Mutex::new(ModuleManager::new())
        })
    }

    // ── Registry ────────────────────────────────────────────────────────

    /// Register a module.
    ///
    /// Returns `false` and leaves every existing module untouched if a
    /// module with the same name is already registered.
    pub fn register(&mut self, mut module: Box<dyn Module>) -> bool {
        let name = module.name().to_string();
        if self.modules.contains_key(&name) {
            log::warn!("Module '{}' is already registered; ignoring duplicate", name);
            return false;
        }

        let capabilities = Capabilities::probe(module.as_mut());
        let priority = module.default_priority();
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        for hook in HookPoint::ALL {
            let Some(capability) = hook.capability() else {
                continue;
            };
            if capabilities.contains(capability) {
                self.hooks.entry(hook).or_default().insert(DispatchEntry {
                    name: name.clone(),
                    priority,
                    sequence,
                });
            }
        }

        log::info!(
            "Registered module '{}' (priority={}, capabilities=[{}])",
            name,
            priority,
            capabilities
        );
        self.modules.insert(
            name,
            ModuleSlot {
                module,
                sequence,
                priority,
                state: ModuleState::Inactive,
                capabilities,
            },
        );
        true
    }

    /// Remove a module from the registry and every dispatch list.
    ///
    /// The module is not deactivated; use [`take_module`](Self::take_module)
    /// to get it back and shut it down explicitly.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.take_module(name).is_some()
    }

    /// Unregister a module and hand ownership back to the caller.
    pub fn take_module(&mut self, name: &str) -> Option<Box<dyn Module>> {
        let slot = self.modules.remove(name)?;
        for list in self.hooks.values_mut() {
            list.remove(name);
        }
        log::info!("Unregistered module '{}'", name);
        Some(slot.module)
    }

    pub fn get_module(&self, name: &str) -> Option<&dyn Module> {
        self.modules.get(name).map(|slot| slot.module.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Registered module names in registration order.
    pub fn module_names(&self) -> Vec<String> {
        let mut slots: Vec<(&String, u64)> = self
            .modules
            .iter()
            .map(|(name, slot)| (name, slot.sequence))
            .collect();
        slots.sort_by_key(|(_, sequence)| *sequence);
        slots.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// Capability set computed at registration.
    pub fn capabilities(&self, name: &str) -> Option<Capabilities> {
        self.modules.get(name).map(|slot| slot.capabilities)
    }

    /// Module names in the order `hook` would invoke them (inactive
    /// modules included).
    pub fn hook_order(&mut self, hook: HookPoint) -> Vec<String> {
        match self.hooks.get_mut(&hook) {
            Some(list) => {
                list.ensure_sorted();
                list.entries().iter().map(|e| e.name.clone()).collect()
            }
            None => Vec::new(),
        }
    }

    // ── Priority ────────────────────────────────────────────────────────

    /// Change a module's priority. Every dispatch list containing it is
    /// re-sorted before its next walk.
    pub fn set_priority(&mut self, name: &str, priority: i32) -> bool {
        let Some(slot) = self.modules.get_mut(name) else {
            log::warn!("set_priority: no module named '{}'", name);
            return false;
        };
        if slot.priority == priority {
            return true;
        }
        log::debug!(
            "Module '{}' priority {} -> {}",
            name,
            slot.priority,
            priority
        );
        slot.priority = priority;
        for list in self.hooks.values_mut() {
            list.set_priority(name, priority);
        }
        true
    }

    pub fn get_priority(&self, name: &str) -> Option<i32> {
        self.modules.get(name).map(|slot| slot.priority)
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Hand a configuration snapshot to a module.
    pub fn configure(&mut self, name: &str, config: &ModuleConfig) -> ModuleResult {
        let services = self.services.clone();
        let slot = self
            .modules
            .get_mut(name)
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))?;
        let module = &mut slot.module;
        guarded(name, "configure", || module.configure(config, &services))
    }

    /// Activate a module. Idempotent: an active module is left alone and
    /// `Ok` is returned without calling its `activate` again.
    pub fn activate(&mut self, name: &str) -> ModuleResult {
        let services = self.services.clone();
        let slot = self
            .modules
            .get_mut(name)
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))?;
        if slot.state == ModuleState::Active {
            log::debug!("Module '{}' already active", name);
            return Ok(());
        }

        let module = &mut slot.module;
        match guarded(name, "activate", || module.activate(&services)) {
            Ok(()) => {
                slot.state = ModuleState::Active;
                log::info!("Activated module '{}'", name);
                Ok(())
            }
            Err(e) => {
                log::warn!("Module '{}' failed to activate: {}", name, e);
                Err(match e {
                    ModuleError::Activation { .. } => e,
                    other => ModuleError::activation(name, other.to_string()),
                })
            }
        }
    }

    /// Deactivate a module. No-op when already inactive. Returns `false` if
    /// no such module is registered.
    pub fn deactivate(&mut self, name: &str) -> bool {
        let Some(slot) = self.modules.get_mut(name) else {
            return false;
        };
        if slot.state == ModuleState::Inactive {
            return true;
        }
        let module = &mut slot.module;
        let _ = guarded(name, "deactivate", || {
            module.deactivate();
            Ok(())
        });
        slot.state = ModuleState::Inactive;
        log::info!("Deactivated module '{}'", name);
        true
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.state(name) == Some(ModuleState::Active)
    }

    pub fn state(&self, name: &str) -> Option<ModuleState> {
        self.modules.get(name).map(|slot| slot.state)
    }

    /// Deactivate every active module, latest registration first.
    pub fn deactivate_all(&mut self) {
        let mut names = self.module_names();
        names.reverse();
        for name in names {
            self.deactivate(&name);
        }
    }

    /// Configure every registered module from `config`, apply configured
    /// priority overrides, then activate enabled modules and deactivate
    /// disabled ones.
    ///
    /// Returns the failures encountered; none of them stop the remaining
    /// modules from being processed.
    pub fn apply_config(&mut self, config: &Config) -> Vec<ModuleError> {
        let mut failures = Vec::new();

        for name in config.modules.keys() {
            if !self.modules.contains_key(name) {
                log::warn!("Config has a section for unknown module '{}'", name);
            }
        }

        for name in self.module_names() {
            let snapshot = config.module_config(&name);
            if let Err(e) = self.configure(&name, &snapshot) {
                log::warn!("Module '{}' rejected its configuration: {}", name, e);
                failures.push(e);
                continue;
            }
            if let Some(priority) = snapshot.priority() {
                self.set_priority(&name, priority);
            }
            if snapshot.is_enabled() {
                if let Err(e) = self.activate(&name) {
                    failures.push(e);
                }
            } else {
                self.deactivate(&name);
            }
        }

        failures
    }

    // ── Services ────────────────────────────────────────────────────────

    /// The locator modules receive. Hosts may also use it to set handles.
    pub fn services(&self) -> &ServiceLocator {
        &self.services
    }

    pub fn set_terminal<T: Terminal + 'static>(&self, terminal: &Arc<T>) -> bool {
        self.services.set_terminal(terminal)
    }

    pub fn set_window<W: Window + 'static>(&self, window: &Arc<W>) -> bool {
        self.services.set_window(window)
    }

    pub fn set_font_cache<F: FontCache + 'static>(&self, font_cache: &Arc<F>) -> bool {
        self.services.set_font_cache(font_cache)
    }

    pub fn set_scheduler<S: Scheduler + 'static>(&self, scheduler: &Arc<S>) -> bool {
        self.services.set_scheduler(scheduler)
    }

    pub fn set_backend_kind(&self, backend: BackendKind) -> bool {
        self.services.set_backend_kind(backend)
    }

    pub fn get_terminal(&self) -> Option<Arc<dyn Terminal>> {
        self.services.terminal()
    }

    pub fn get_window(&self) -> Option<Arc<dyn Window>> {
        self.services.window()
    }

    pub fn get_font_cache(&self) -> Option<Arc<dyn FontCache>> {
        self.services.font_cache()
    }

    pub fn get_scheduler(&self) -> Option<Arc<dyn Scheduler>> {
        self.services.scheduler()
    }

    pub fn get_backend_kind(&self) -> Option<BackendKind> {
        self.services.backend_kind()
    }

    /// Mark the end of startup. Dispatch is refused until this is called.
    pub fn complete_startup(&mut self) {
        if !self.started {
            log::info!(
                "Module manager started with {} modules ({:?})",
                self.modules.len(),
                self.services
            );
        }
        self.started = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // ── Focus subscription ──────────────────────────────────────────────

    /// Subscribe to window focus changes. Delivered outside the hook system,
    /// in subscription order, regardless of module activation.
    pub fn subscribe_focus(
        &mut self,
        callback: impl FnMut(bool) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.focus_subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe_focus(&mut self, id: SubscriptionId) -> bool {
        let before = self.focus_subscribers.len();
        self.focus_subscribers.retain(|(sub, _)| *sub != id);
        self.focus_subscribers.len() != before
    }

    /// Called by the host when the window gains or loses focus.
    pub fn notify_focus(&mut self, focused: bool) {
        for (id, callback) in &mut self.focus_subscribers {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(focused))).is_err() {
                log::error!("Focus subscriber {} panicked", id);
            }
        }
    }

    // ── Typed dispatch ──────────────────────────────────────────────────

    pub fn dispatch_bell(&mut self) {
        self.walk(HookPoint::Bell, |module| {
            module
                .as_bell_handler()
                .map(|handler| handler.on_bell().map(|()| false))
        });
    }

    /// Returns `true` if a module consumed the sequence.
    pub fn dispatch_escape_string(&mut self, kind: EscapeKind, bytes: &[u8]) -> bool {
        let terminal = self.services.terminal();
        self.walk(HookPoint::EscapeString, |module| {
            module
                .as_escape_string_handler()
                .map(|handler| handler.on_escape_string(kind, bytes, terminal.as_deref()))
        })
    }

    /// Returns `true` if a module consumed the key.
    pub fn dispatch_key_event(&mut self, keyval: u32, keycode: u32, modifiers: Modifiers) -> bool {
        self.walk(HookPoint::KeyPress, |module| {
            module
                .as_input_handler()
                .map(|handler| handler.on_key_event(keyval, keycode, modifiers))
        })
    }

    /// Returns `true` if a module drew the glyph; the renderer must then skip
    /// its own rasterization for this cell.
    pub fn dispatch_glyph_transform(
        &mut self,
        rune: char,
        ctx: &mut dyn RenderContext,
        px: f32,
        py: f32,
        cell_width: f32,
        cell_height: f32,
    ) -> bool {
        self.walk(HookPoint::GlyphTransform, |module| {
            module.as_glyph_transform().map(|handler| {
                handler.on_glyph_transform(rune, &mut *ctx, px, py, cell_width, cell_height)
            })
        })
    }

    pub fn dispatch_render_overlay(
        &mut self,
        ctx: &mut dyn RenderContext,
        width: u32,
        height: u32,
    ) {
        self.walk(HookPoint::RenderOverlay, |module| {
            module.as_render_overlay().map(|handler| {
                handler
                    .on_render_overlay(&mut *ctx, width, height)
                    .map(|()| false)
            })
        });
    }

    pub fn dispatch_render_background(
        &mut self,
        ctx: &mut dyn RenderContext,
        width: u32,
        height: u32,
    ) {
        self.walk(HookPoint::RenderBackground, |module| {
            module.as_background_provider().map(|handler| {
                handler
                    .on_render_background(&mut *ctx, width, height)
                    .map(|()| false)
            })
        });
    }

    pub fn dispatch_selection_done(&mut self, text: &str) {
        self.walk(HookPoint::SelectionDone, |module| {
            module
                .as_selection_handler()
                .map(|handler| handler.on_selection_done(text, text.len()).map(|()| false))
        });
    }

    /// Returns `true` if a module asked for this frame to be skipped.
    pub fn dispatch_pre_render(&mut self) -> bool {
        self.walk(HookPoint::PreRender, |module| {
            module.as_render_gate().map(|handler| handler.on_pre_render())
        })
    }

    /// Walk `hook`'s dispatch list, invoking `invoke` on each active module
    /// and applying the hook's policy.
    ///
    /// `invoke` returns `None` if the module does not expose the capability
    /// (a module whose `as_*` answer changed after registration), otherwise
    /// the handler's result. Handler errors and panics are logged and count
    /// as "not handled"; the walk continues with the next module.
    fn walk<F>(&mut self, hook: HookPoint, mut invoke: F) -> bool
    where
        F: FnMut(&mut dyn Module) -> Option<ModuleResult<bool>>,
    {
        let Some(policy) = hook.policy() else {
            log::warn!("Hook '{}' has no capability bound; nothing to dispatch", hook);
            return false;
        };
        if !self.started {
            if !self.warned_not_started {
                log::warn!(
                    "Dispatch of '{}' before complete_startup(); ignoring until startup completes",
                    hook
                );
                self.warned_not_started = true;
            }
            return false;
        }

        let Self { modules, hooks, .. } = self;
        let Some(list) = hooks.get_mut(&hook) else {
            return false;
        };
        list.ensure_sorted();

        for entry in list.entries() {
            let Some(slot) = modules.get_mut(&entry.name) else {
                continue;
            };
            if slot.state != ModuleState::Active {
                continue;
            }

            let module = slot.module.as_mut();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| invoke(module)));
            let handled = match outcome {
                Ok(Some(Ok(handled))) => handled,
                Ok(Some(Err(e))) => {
                    log::warn!("Module '{}' failed in '{}': {}", entry.name, hook, e);
                    false
                }
                Ok(None) => {
                    log::error!(
                        "Module '{}' is listed for '{}' but no longer exposes {}",
                        entry.name,
                        hook,
                        hook.capability().map(Capability::name).unwrap_or("?")
                    );
                    false
                }
                Err(_) => {
                    log::error!("Module '{}' panicked in '{}'", entry.name, hook);
                    false
                }
            };

            if handled && policy == DispatchPolicy::FirstConsumerWins {
                log::trace!("'{}' consumed by module '{}'", hook, entry.name);
                return true;
            }
        }
        false
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModuleManager {
    fn drop(&mut self) {
        self.deactivate_all();
    }
}

/// Run a lifecycle callback, converting a panic into an error.
fn guarded(name: &str, what: &str, f: impl FnOnce() -> ModuleResult) -> ModuleResult {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            log::error!("Module '{}' panicked in {}", name, what);
            Err(ModuleError::Handler(format!("{what} panicked")))
        }
    }
}
