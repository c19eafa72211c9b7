//! Default fallback chain.

/// Fallback font families in priority order.
///
/// Used by [`SystemFontCache::with_default_fallbacks`](super::SystemFontCache::with_default_fallbacks);
/// families that are not installed are skipped.
pub const FALLBACK_FAMILIES: &[&str] = &[
    // Nerd Fonts (icon/symbol support)
    "Symbols Nerd Font",
    "JetBrainsMono Nerd Font",
    // CJK
    "Noto Sans CJK JP",
    "Noto Sans CJK SC",
    "Noto Sans CJK KR",
    // Monochrome symbols before emoji so dingbats prefer outline rendering
    "Noto Sans Symbols",
    "Noto Sans Symbols 2",
    "DejaVu Sans",
    "Symbola",
    // Color emoji
    "Noto Color Emoji",
    "Apple Color Emoji",
    "Segoe UI Emoji",
];
