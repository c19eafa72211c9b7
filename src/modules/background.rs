//! Solid background tint drawn beneath the terminal cells.

use plugterm_modules::{
    BackgroundProvider, Module, ModuleConfig, ModuleError, ModuleResult, PRIORITY_HIGH,
    RenderContext, Rgba, ServiceLocator,
};

pub const NAME: &str = "background";

pub const DEFAULT_COLOR: Rgba = Rgba::new(0x1e, 0x1e, 0x2e, 0xff);

pub struct BackgroundModule {
    color: Rgba,
}

impl BackgroundModule {
    pub fn new() -> Self {
        Self {
            color: DEFAULT_COLOR,
        }
    }

    pub fn color(&self) -> Rgba {
        self.color
    }
}

impl Default for BackgroundModule {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundProvider for BackgroundModule {
    fn on_render_background(
        &mut self,
        ctx: &mut dyn RenderContext,
        width: u32,
        height: u32,
    ) -> ModuleResult {
        if width == 0 || height == 0 {
            return Ok(());
        }
        ctx.fill_rect(0.0, 0.0, width as f32, height as f32, self.color);
        Ok(())
    }
}

impl Module for BackgroundModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Fills the window background with a solid colour"
    }

    // Drawn first so other providers can layer on top.
    fn default_priority(&self) -> i32 {
        PRIORITY_HIGH
    }

    fn configure(&mut self, config: &ModuleConfig, _services: &ServiceLocator) -> ModuleResult {
        if let Some(hex) = config.get::<String>("color")? {
            self.color = Rgba::from_hex(&hex).ok_or_else(|| {
                ModuleError::Config(format!("{NAME}.color: invalid colour '{hex}'"))
            })?;
        }
        Ok(())
    }

    fn as_background_provider(&mut self) -> Option<&mut dyn BackgroundProvider> {
        Some(self)
    }
}
