//! Shared font cache with an ordered fallback chain.
//!
//! The face database is populated once (system fonts plus any explicitly
//! loaded files) and read concurrently afterwards. The fallback chain and the
//! zoom scale are mutable through `&self` so the cache can be shared as an
//! `Arc` between the renderer and modules.

mod fallbacks;
mod loader;

use std::path::Path;

use fontdb::Database;
use parking_lot::RwLock;
use plugterm_modules::FontCache;

use crate::error::FontError;

pub use fallbacks::FALLBACK_FAMILIES;

/// Smallest accepted font scale.
pub const MIN_SCALE: f32 = 0.25;
/// Largest accepted font scale.
pub const MAX_SCALE: f32 = 4.0;

struct State {
    /// Fallback families in lookup order, canonical names.
    fallbacks: Vec<String>,
    scale: f32,
}

/// Font cache backed by a `fontdb` database.
pub struct SystemFontCache {
    db: Database,
    state: RwLock<State>,
}

impl SystemFontCache {
    /// Create a cache populated with the system's installed fonts.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::info!("Loaded {} system font faces", db.len());
        Self::with_database(db)
    }

    /// Create a cache with no faces. Fonts can be added with
    /// [`load_font_file`](Self::load_font_file) before the cache is shared.
    pub fn empty() -> Self {
        Self::with_database(Database::new())
    }

    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            state: RwLock::new(State {
                fallbacks: Vec::new(),
                scale: 1.0,
            }),
        }
    }

    /// Append every installed family from [`FALLBACK_FAMILIES`] to the chain.
    pub fn with_default_fallbacks(self) -> Self {
        let added = FALLBACK_FAMILIES
            .iter()
            .filter(|family| self.add_fallback(family))
            .count();
        log::info!("Default fallback chain has {} families", added);
        self
    }

    /// Load a font file (TTF/OTF/TTC) into the database.
    pub fn load_font_file(&mut self, path: &Path) -> Result<usize, FontError> {
        let before = self.db.len();
        self.db
            .load_font_file(path)
            .map_err(|source| FontError::Load {
                path: path.to_path_buf(),
                source,
            })?;
        let added = self.db.len() - before;
        if added == 0 {
            return Err(FontError::NoFaces(path.display().to_string()));
        }
        log::debug!("Loaded {} faces from {}", added, path.display());
        Ok(added)
    }

    /// Load in-memory font data into the database.
    pub fn load_font_data(&mut self, data: Vec<u8>) -> Result<usize, FontError> {
        let before = self.db.len();
        self.db.load_font_data(data);
        let added = self.db.len() - before;
        if added == 0 {
            return Err(FontError::NoFaces("font data".to_string()));
        }
        Ok(added)
    }

    /// Number of faces in the database.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn resolve(&self, family: &str) -> Option<String> {
        let canonical = loader::canonical_family(&self.db, family)?;
        loader::query_family(&self.db, &canonical).map(|_| canonical)
    }
}

impl Default for SystemFontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FontCache for SystemFontCache {
    fn has_family(&self, family: &str) -> bool {
        self.resolve(family).is_some()
    }

    fn add_fallback(&self, family: &str) -> bool {
        let Some(canonical) = self.resolve(family) else {
            log::debug!("Fallback font '{}' is not installed", family);
            return false;
        };
        let mut state = self.state.write();
        if state.fallbacks.iter().any(|f| *f == canonical) {
            return false;
        }
        log::debug!("Added fallback font: {}", canonical);
        state.fallbacks.push(canonical);
        true
    }

    fn remove_fallback(&self, family: &str) -> bool {
        let mut state = self.state.write();
        let before = state.fallbacks.len();
        state.fallbacks.retain(|f| !f.eq_ignore_ascii_case(family));
        state.fallbacks.len() != before
    }

    fn fallbacks(&self) -> Vec<String> {
        self.state.read().fallbacks.clone()
    }

    fn scale(&self) -> f32 {
        self.state.read().scale
    }

    fn set_scale(&self, scale: f32) {
        if !scale.is_finite() {
            log::warn!("Ignoring non-finite font scale {}", scale);
            return;
        }
        let clamped = scale.clamp(MIN_SCALE, MAX_SCALE);
        if clamped != scale {
            log::debug!("Font scale {} clamped to {}", scale, clamped);
        }
        self.state.write().scale = clamped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache_resolves_nothing() {
        let cache = SystemFontCache::empty();
        assert_eq!(cache.face_count(), 0);
        assert!(!cache.has_family("DejaVu Sans"));
        assert!(!cache.add_fallback("DejaVu Sans"));
        assert!(cache.fallbacks().is_empty());
    }

    #[test]
    fn test_scale_is_clamped() {
        let cache = SystemFontCache::empty();
        assert_eq!(cache.scale(), 1.0);
        cache.set_scale(1.5);
        assert_eq!(cache.scale(), 1.5);
        cache.set_scale(100.0);
        assert_eq!(cache.scale(), MAX_SCALE);
        cache.set_scale(0.0);
        assert_eq!(cache.scale(), MIN_SCALE);
        cache.set_scale(f32::NAN);
        assert_eq!(cache.scale(), MIN_SCALE);
    }

    #[test]
    fn test_invalid_font_data_is_rejected() {
        let mut cache = SystemFontCache::empty();
        assert!(matches!(
            cache.load_font_data(vec![0u8; 64]),
            Err(FontError::NoFaces(_))
        ));
    }
}
