//! Shared integration test helpers for plugterm.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{ProbeModule, headless_host, started_manager};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use parking_lot::Mutex;
use plugterm::host::Host;
use plugterm_fonts::SystemFontCache;
use plugterm_modules::{
    BellHandler, EscapeKind, EscapeStringHandler, FontCache, InputHandler, Modifiers, Module,
    ModuleError, ModuleManager, ModuleResult, ServiceLocator, Terminal,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Event log shared between a test and the modules it registers.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Host with an empty font database, so tests never scan system fonts.
pub fn headless_host() -> Host {
    Host::new(SystemFontCache::empty())
}

/// A manager wired to `host`'s services with startup completed.
pub fn started_manager(host: &Host) -> ModuleManager {
    let mut manager = ModuleManager::new();
    host.install(&mut manager, plugterm_modules::BackendKind::Headless);
    manager
}

/// What a [`ProbeModule`] does when a hook reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Record the call and report "handled".
    Consume,
    /// Record the call and let dispatch continue.
    Pass,
    /// Record the call, then fail.
    Fail,
    /// Record the call, then panic.
    Panic,
}

/// Configurable module that records every callback into a [`Journal`].
pub struct ProbeModule {
    name: String,
    priority: i32,
    journal: Journal,
    bell: Option<Reaction>,
    escape: Option<Reaction>,
    key: Option<Reaction>,
    fail_activate: bool,
}

impl ProbeModule {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            priority: 0,
            journal: Arc::clone(journal),
            bell: None,
            escape: None,
            key: None,
            fail_activate: false,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn on_bell(mut self, reaction: Reaction) -> Self {
        self.bell = Some(reaction);
        self
    }

    pub fn on_escape(mut self, reaction: Reaction) -> Self {
        self.escape = Some(reaction);
        self
    }

    pub fn on_key(mut self, reaction: Reaction) -> Self {
        self.key = Some(reaction);
        self
    }

    pub fn failing_activate(mut self) -> Self {
        self.fail_activate = true;
        self
    }

    pub fn boxed(self) -> Box<dyn Module> {
        Box::new(self)
    }

    fn record(&self, event: &str) {
        self.journal.lock().push(format!("{}:{}", self.name, event));
    }

    fn react(&self, event: &str, reaction: Option<Reaction>) -> ModuleResult<bool> {
        self.record(event);
        match reaction {
            Some(Reaction::Consume) => Ok(true),
            Some(Reaction::Pass) | None => Ok(false),
            Some(Reaction::Fail) => Err(ModuleError::Handler(format!("{} failed", self.name))),
            Some(Reaction::Panic) => panic!("{} panicked", self.name),
        }
    }
}

impl BellHandler for ProbeModule {
    fn on_bell(&mut self) -> ModuleResult {
        self.react("bell", self.bell).map(|_| ())
    }
}

impl EscapeStringHandler for ProbeModule {
    fn on_escape_string(
        &mut self,
        _kind: EscapeKind,
        _bytes: &[u8],
        _terminal: Option<&dyn Terminal>,
    ) -> ModuleResult<bool> {
        self.react("escape", self.escape)
    }
}

impl InputHandler for ProbeModule {
    fn on_key_event(&mut self, _: u32, _: u32, _: Modifiers) -> ModuleResult<bool> {
        self.react("key", self.key)
    }
}

impl Module for ProbeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_priority(&self) -> i32 {
        self.priority
    }

    fn activate(&mut self, _services: &ServiceLocator) -> ModuleResult {
        self.record("activate");
        if self.fail_activate {
            return Err(ModuleError::activation(&self.name, "probe refused"));
        }
        Ok(())
    }

    fn deactivate(&mut self) {
        self.record("deactivate");
    }

    fn as_bell_handler(&mut self) -> Option<&mut dyn BellHandler> {
        if self.bell.is_some() { Some(self) } else { None }
    }

    fn as_escape_string_handler(&mut self) -> Option<&mut dyn EscapeStringHandler> {
        if self.escape.is_some() { Some(self) } else { None }
    }

    fn as_input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        if self.key.is_some() { Some(self) } else { None }
    }
}

/// In-memory font cache with a fixed set of installed families.
pub struct FakeFontCache {
    installed: HashSet<String>,
    state: Mutex<(Vec<String>, f32)>,
}

impl FakeFontCache {
    pub fn new(installed: &[&str]) -> Self {
        Self {
            installed: installed.iter().map(|s| s.to_string()).collect(),
            state: Mutex::new((Vec::new(), 1.0)),
        }
    }
}

impl FontCache for FakeFontCache {
    fn has_family(&self, family: &str) -> bool {
        self.installed.contains(family)
    }

    fn add_fallback(&self, family: &str) -> bool {
        let mut state = self.state.lock();
        if !self.installed.contains(family) || state.0.iter().any(|f| f == family) {
            return false;
        }
        state.0.push(family.to_string());
        true
    }

    fn remove_fallback(&self, family: &str) -> bool {
        let mut state = self.state.lock();
        let before = state.0.len();
        state.0.retain(|f| f != family);
        state.0.len() != before
    }

    fn fallbacks(&self) -> Vec<String> {
        self.state.lock().0.clone()
    }

    fn scale(&self) -> f32 {
        self.state.lock().1
    }

    fn set_scale(&self, scale: f32) {
        self.state.lock().1 = scale.clamp(0.25, 4.0);
    }
}
