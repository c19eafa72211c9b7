//! Adds configured families to the font cache's fallback chain.

use plugterm_modules::{Module, ModuleConfig, ModuleError, ModuleResult, ServiceLocator};

pub const NAME: &str = "fallback-font";

#[derive(Default)]
pub struct FallbackFontModule {
    families: Vec<String>,
    /// Families this module added, for removal on deactivate.
    registered: Vec<String>,
    services: Option<ServiceLocator>,
}

impl FallbackFontModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_families<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: families.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn registered(&self) -> &[String] {
        &self.registered
    }
}

impl Module for FallbackFontModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Registers extra fallback font families"
    }

    fn configure(&mut self, config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        if let Some(families) = config.get::<Vec<String>>("families")? {
            self.families = families;
        }
        Ok(())
    }

    fn activate(&mut self, services: &ServiceLocator) -> ModuleResult {
        let cache = services
            .font_cache()
            .ok_or(ModuleError::MissingService("font cache"))?;
        if self.families.is_empty() {
            return Err(ModuleError::activation(NAME, "no families configured"));
        }

        let mut resolved = 0;
        self.registered.clear();
        for family in &self.families {
            if !cache.has_family(family) {
                log::warn!("Fallback font '{}' not available", family);
                continue;
            }
            resolved += 1;
            // Already in the chain: counts as resolved but is not ours to remove.
            if cache.add_fallback(family) {
                self.registered.push(family.clone());
            }
        }

        if resolved == 0 {
            return Err(ModuleError::activation(
                NAME,
                format!("none of {:?} could be resolved", self.families),
            ));
        }
        log::info!("Registered fallback fonts: {:?}", self.registered);
        self.services = Some(services.clone());
        Ok(())
    }

    fn deactivate(&mut self) {
        let registered = std::mem::take(&mut self.registered);
        let Some(cache) = self.services.as_ref().and_then(ServiceLocator::font_cache) else {
            return;
        };
        for family in &registered {
            cache.remove_fallback(family);
        }
    }
}
