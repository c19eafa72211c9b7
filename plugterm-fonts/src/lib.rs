//! Font discovery and fallback chain management for plugterm.
//!
//! This crate provides:
//! - System font discovery through `fontdb`
//! - A mutable, ordered fallback chain shared by the renderer and modules
//! - A global font scale used for zooming
//!
//! [`SystemFontCache`] implements the `FontCache` service from
//! `plugterm-modules`, so the host hands one to the module manager at
//! startup and font-related modules reach it through the service locator.

pub mod error;
pub mod font_cache;

pub use error::FontError;
pub use font_cache::{FALLBACK_FAMILIES, MAX_SCALE, MIN_SCALE, SystemFontCache};
