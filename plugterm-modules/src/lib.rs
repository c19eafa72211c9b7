//! Module runtime for the plugterm terminal emulator.
//!
//! Features live in [`Module`]s. A module declares which capability
//! interfaces it implements; the [`ModuleManager`] samples those once at
//! registration, files the module under every hook point bound to one of
//! them, and later routes host events to active modules in priority order.
//!
//! - [`capability`]: the handler interfaces and their payload types
//! - [`hooks`]: the catalog of hook points and their capability bindings
//! - [`module`]: the [`Module`] trait and priority constants
//! - [`services`]: host services reachable through the [`ServiceLocator`]
//! - [`manager`]: registry, dispatch engine and process-wide default

pub mod capability;
mod dispatch;
pub mod error;
pub mod hooks;
pub mod manager;
pub mod module;
pub mod services;

pub use capability::{
    BackgroundProvider, BellHandler, Capabilities, Capability, DispatchPolicy, EscapeKind,
    EscapeStringHandler, GlyphTransform, InputHandler, Modifiers, RenderContext, RenderGate,
    RenderOverlay, Rgba, SelectionHandler,
};
pub use error::{ModuleError, ModuleResult};
pub use hooks::HookPoint;
pub use manager::{ModuleManager, SubscriptionId};
pub use module::{Module, ModuleState, PRIORITY_DEFAULT, PRIORITY_HIGH, PRIORITY_LOW};
pub use services::{
    BackendKind, FontCache, Scheduler, ServiceLocator, Terminal, TerminalMode, TimerCallback,
    TimerId, Window,
};

pub use plugterm_config::ModuleConfig;
