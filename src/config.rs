use crate::error::{GuiError, GuiResult};
use crate::text::FontDescriptor;

/// Context-wide settings fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GuiConfig {
    pub base_dpi_x: f32,
    pub base_dpi_y: f32,
    /// Font used by elements that inherit every font property. `size` is in points.
    pub default_font: FontDescriptor,
    /// Width of the text cursor, in points.
    pub text_cursor_width: f32,
    /// Logs each validated layout facet at trace level.
    pub trace_layout: bool,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            base_dpi_x: 96.0,
            base_dpi_y: 96.0,
            default_font: FontDescriptor::new("default", 9.0),
            text_cursor_width: 1.0,
            trace_layout: false,
        }
    }
}

impl GuiConfig {
    /// Defaults overlaid with `BOXGUI_*` environment variables.
    pub fn from_env() -> GuiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GuiResult<Self> {
        let mut config = Self::default();
        if let Some(dpi) = lookup("BOXGUI_BASE_DPI") {
            let dpi = parse_positive("BOXGUI_BASE_DPI", &dpi)?;
            config.base_dpi_x = dpi;
            config.base_dpi_y = dpi;
        }
        if let Some(family) = lookup("BOXGUI_DEFAULT_FONT_FAMILY") {
            config.default_font.family = family.into();
        }
        if let Some(size) = lookup("BOXGUI_DEFAULT_FONT_SIZE") {
            config.default_font.size = parse_positive("BOXGUI_DEFAULT_FONT_SIZE", &size)?;
        }
        config.trace_layout = lookup("BOXGUI_TRACE_LAYOUT").is_some();
        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> GuiResult<f32> {
    match raw.trim().parse::<f32>() {
        Ok(value) if value > 0.0 && value.is_finite() => Ok(value),
        _ => Err(GuiError::InvalidConfig {
            key,
            value: raw.to_string(),
        }),
    }
}
