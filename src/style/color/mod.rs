mod hex_color;

pub use hex_color::*;

/// Straight-alpha RGBA8 color as stored in element styles and handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`. Malformed input yields transparent.
    pub fn hex(raw: &str) -> Self {
        HexColor::new(raw).into_color()
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

pub trait ColorLike {
    fn to_rgba_u8(&self) -> [u8; 4];
}

impl ColorLike for Color {
    fn to_rgba_u8(&self) -> [u8; 4] {
        Color::to_rgba_u8(*self)
    }
}

pub trait IntoColor {
    fn into_color(self) -> Color;
}

impl IntoColor for Color {
    fn into_color(self) -> Color {
        self
    }
}

impl IntoColor for &str {
    fn into_color(self) -> Color {
        Color::hex(self)
    }
}

impl IntoColor for String {
    fn into_color(self) -> Color {
        Color::hex(&self)
    }
}

impl IntoColor for HexColor<'_> {
    fn into_color(self) -> Color {
        let [r, g, b, a] = self.to_rgba_u8();
        Color::rgba(r, g, b, a)
    }
}
