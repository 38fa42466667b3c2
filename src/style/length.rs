/// A box-model scalar: magnitude plus how it is interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Device pixels, used as-is.
    Px(f32),
    /// Scaled by the owning surface's DPI over the context's base DPI.
    Pt(f32),
    /// Relative to the container, or a flex share when the parent flexes children.
    Percent(f32),
    /// Computed from content.
    Auto,
}

impl Length {
    pub const ZERO: Length = Length::Px(0.0);
    pub const UNBOUNDED: Length = Length::Px(f32::MAX);

    pub const fn px(value: f32) -> Self {
        Self::Px(value)
    }

    pub const fn pt(value: f32) -> Self {
        Self::Pt(value)
    }

    pub const fn percent(value: f32) -> Self {
        Self::Percent(value)
    }

    pub const fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }

    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    pub const fn is_dpi_scaled(self) -> bool {
        matches!(self, Self::Pt(_))
    }

    pub const fn percent_value(self) -> f32 {
        match self {
            Self::Percent(v) => v,
            _ => 0.0,
        }
    }

    /// Resolves against `percent_base` with `dpi_scale` applied to points.
    /// `Auto` has no fixed value and resolves to `None`.
    pub fn resolve(self, percent_base: f32, dpi_scale: f32) -> Option<f32> {
        match self {
            Self::Px(v) => Some(v),
            Self::Pt(v) => Some(v * dpi_scale),
            Self::Percent(v) => Some(percent_base * v / 100.0),
            Self::Auto => None,
        }
    }

    /// Resolution for border, margin and padding widths, which have no container
    /// context of their own: percent and auto collapse to zero.
    pub fn resolve_edge(self, dpi_scale: f32) -> f32 {
        match self {
            Self::Px(v) => v.max(0.0),
            Self::Pt(v) => (v * dpi_scale).max(0.0),
            Self::Percent(_) | Self::Auto => 0.0,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f32> for Length {
    fn from(value: f32) -> Self {
        Self::Px(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Length;

    #[test]
    fn resolve_applies_dpi_only_to_points() {
        assert_eq!(Length::px(10.0).resolve(500.0, 2.0), Some(10.0));
        assert_eq!(Length::pt(10.0).resolve(500.0, 2.0), Some(20.0));
        assert_eq!(Length::percent(10.0).resolve(500.0, 2.0), Some(50.0));
        assert_eq!(Length::Auto.resolve(500.0, 2.0), None);
    }

    #[test]
    fn edges_ignore_percent_and_auto() {
        assert_eq!(Length::percent(50.0).resolve_edge(1.0), 0.0);
        assert_eq!(Length::Auto.resolve_edge(1.0), 0.0);
        assert_eq!(Length::pt(2.0).resolve_edge(1.5), 3.0);
        assert_eq!(Length::px(-4.0).resolve_edge(1.0), 0.0);
    }
}
