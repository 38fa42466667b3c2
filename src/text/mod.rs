//! Font collaborator interface and the in-core text layout built on top of it.

#[cfg(feature = "cosmic-text")]
mod cosmic;
mod layout;

#[cfg(feature = "cosmic-text")]
pub use cosmic::*;
pub use layout::*;

use crate::style::Color;
use smol_str::SmolStr;

/// Opaque key for a font acquired from a [`FontProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    Thin,
    Light,
    #[default]
    Normal,
    Medium,
    Bold,
    Black,
}

impl FontWeight {
    pub const fn to_css_weight(self) -> u16 {
        match self {
            Self::Thin => 100,
            Self::Light => 300,
            Self::Normal => 400,
            Self::Medium => 500,
            Self::Bold => 700,
            Self::Black => 900,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontSlant {
    #[default]
    None,
    Italic,
    Oblique,
}

/// A fully resolved font request. `size` is in pixels, DPI already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub family: SmolStr,
    pub size: f32,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl FontDescriptor {
    pub fn new(family: impl Into<SmolStr>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Normal,
            slant: FontSlant::None,
        }
    }
}

/// Measures and rasterizes text. Implementations own the font reference counts.
pub trait FontProvider {
    fn acquire_font(&mut self, descriptor: &FontDescriptor) -> Option<FontHandle>;
    fn release_font(&mut self, font: FontHandle);
    fn line_height(&self, font: FontHandle) -> f32;
    /// Advance width of `text` laid out on a single line.
    fn measure_string(&mut self, font: FontHandle, text: &str) -> f32;
    /// Rasterizes a single line into a tightly packed RGBA8 buffer of `width * height`.
    fn rasterize_string(
        &mut self,
        font: FontHandle,
        text: &str,
        color: Color,
        width: u32,
        height: u32,
        buffer: &mut [u8],
    );
}
