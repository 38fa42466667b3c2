use bitflags::bitflags;

bitflags! {
    /// Facets of an element's layout awaiting validation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayoutFlags: u32 {
        const WIDTH = 1 << 0;
        const HEIGHT = 1 << 1;
        const POSITION = 1 << 2;
        const TEXT = 1 << 3;
        /// Treat the next width validation as a change even if the outer size is equal.
        const FORCE_WIDTH = 1 << 4;
        const FORCE_HEIGHT = 1 << 5;
        const FORCE_POSITION = 1 << 6;

        const SIZE = Self::WIDTH.bits() | Self::HEIGHT.bits();
        const ALL = Self::WIDTH.bits() | Self::HEIGHT.bits() | Self::POSITION.bits() | Self::TEXT.bits();
        const FORCE_ALL = Self::FORCE_WIDTH.bits() | Self::FORCE_HEIGHT.bits() | Self::FORCE_POSITION.bits();
    }
}

bitflags! {
    /// What changed during the current validation pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayoutChanges: u32 {
        const WIDTH = 1 << 0;
        const HEIGHT = 1 << 1;
        const POSITION = 1 << 2;

        const SIZE = Self::WIDTH.bits() | Self::HEIGHT.bits();
    }
}

/// Resolved per-side widths in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeWidths {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl EdgeWidths {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn along(&self, horizontal: bool) -> f32 {
        if horizontal { self.horizontal() } else { self.vertical() }
    }

    pub fn leading(&self, horizontal: bool) -> f32 {
        if horizontal { self.left } else { self.top }
    }
}

/// Computed geometry of one element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementLayout {
    pub unclamped_width: f32,
    pub unclamped_height: f32,
    pub width: f32,
    pub height: f32,
    /// Border-box origin relative to the parent's border-box origin (or the surface for
    /// top-level and absolutely positioned elements).
    pub relative_x: f32,
    pub relative_y: f32,
    pub absolute_x: f32,
    pub absolute_y: f32,
    pub border: EdgeWidths,
    pub margin: EdgeWidths,
    pub padding: EdgeWidths,
    /// Scroll offset applied to children.
    pub inner_offset_x: f32,
    pub inner_offset_y: f32,
    pub invalid: LayoutFlags,
    pub changed: LayoutChanges,
    /// Set while the element sits in the validation work-list.
    pub(crate) queued: bool,
    /// Set while the element sits in the changed list.
    pub(crate) in_changed_list: bool,
}

impl ElementLayout {
    pub fn outer_width(&self) -> f32 {
        self.width + self.margin.horizontal()
    }

    pub fn outer_height(&self) -> f32 {
        self.height + self.margin.vertical()
    }

    pub fn outer_size(&self, horizontal: bool) -> f32 {
        if horizontal {
            self.outer_width()
        } else {
            self.outer_height()
        }
    }

    pub fn size(&self, horizontal: bool) -> f32 {
        if horizontal { self.width } else { self.height }
    }

    pub fn inner_width(&self) -> f32 {
        (self.width - self.border.horizontal() - self.padding.horizontal()).max(0.0)
    }

    pub fn inner_height(&self) -> f32 {
        (self.height - self.border.vertical() - self.padding.vertical()).max(0.0)
    }

    pub fn is_pending(&self) -> bool {
        self.queued
    }
}
