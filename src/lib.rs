// Library exports for testing and potential library use
//
// Locking: the module manager lives behind a `parking_lot::Mutex`
// (`ModuleManager::get_default`). Service implementations are `Send + Sync`
// and guard their own state, so timer callbacks and module handlers never
// need the manager lock.

/// Application version (root crate version, for use by sub-crates).
/// Sub-crates should receive this via parameter rather than using
/// `env!("CARGO_PKG_VERSION")` which resolves to the sub-crate's version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod host;
pub mod modules;
pub mod platform;
