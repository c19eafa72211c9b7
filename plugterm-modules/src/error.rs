//! Typed error types for plugterm-modules.
//!
//! Nothing in the module runtime is fatal: these errors are returned to the
//! host as values (activation failures, missing modules) or logged and
//! swallowed by the dispatch engine (handler failures).

use thiserror::Error;

/// Errors produced by modules and by the [`ModuleManager`](crate::ModuleManager).
#[derive(Debug, Error)]
pub enum ModuleError {
    /// No module is registered under the requested name.
    #[error("module '{0}' is not registered")]
    NotFound(String),

    /// A module's own `activate` callback failed. The module stays registered
    /// and inactive.
    #[error("module '{module}' failed to activate: {reason}")]
    Activation {
        /// Name of the module that failed.
        module: String,
        /// Human-readable failure reason reported by the module.
        reason: String,
    },

    /// A shared service the module depends on has not been provided by the host.
    #[error("service '{0}' is not available")]
    MissingService(&'static str),

    /// The module's configuration section could not be interpreted.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A capability handler failed while processing an event.
    #[error("handler failed: {0}")]
    Handler(String),
}

impl ModuleError {
    /// Convenience constructor for [`ModuleError::Activation`].
    pub fn activation(module: impl Into<String>, reason: impl Into<String>) -> Self {
        ModuleError::Activation {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

impl From<plugterm_config::ConfigError> for ModuleError {
    fn from(e: plugterm_config::ConfigError) -> Self {
        ModuleError::Config(e.to_string())
    }
}

/// Result alias used by capability handlers and lifecycle callbacks.
pub type ModuleResult<T = ()> = Result<T, ModuleError>;
