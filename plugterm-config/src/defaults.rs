//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on config
//! fields so that a partially-written YAML file still deserializes.

pub fn bool_true() -> bool {
    true
}
