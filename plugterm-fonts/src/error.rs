//! Typed error types for plugterm-fonts.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading fonts into the cache.
#[derive(Debug, Error)]
pub enum FontError {
    /// A font file could not be read.
    #[error("failed to load font file '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data contained no face `fontdb` could parse.
    #[error("no usable font faces in {0}")]
    NoFaces(String),
}
