use crate::style::{Color, Length};
use crate::text::{FontSlant, FontWeight};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// Flow layout, stacked with auto-positioned siblings along the parent's child axis.
    #[default]
    Auto,
    /// Offset from a corner of the parent (or surface).
    Relative,
    /// Offset from a corner of the owning surface.
    Absolute,
}

/// Which box edge a measurement is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxBoundary {
    /// The border box.
    Outer,
    /// Inside the border.
    InnerBorder,
    /// Inside border and padding.
    #[default]
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildAxis {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClippingMode {
    /// Clipped against the parent unless absolutely positioned.
    #[default]
    Default,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundRepeat {
    /// Drawn once at natural size, placed by alignment.
    #[default]
    None,
    Repeat,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cursor {
    #[default]
    Arrow,
    Text,
    Pointer,
    Crosshair,
    Move,
    EwResize,
    NsResize,
    NeswResize,
    NwseResize,
    NotAllowed,
    Wait,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Top, Side::Right, Side::Bottom];
}

/// A differently colored run along one border edge, measured from the edge's start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderMask {
    pub offset: f32,
    pub length: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sides<T> {
    pub left: T,
    pub top: T,
    pub right: T,
    pub bottom: T,
}

impl<T: Copy> Sides<T> {
    pub const fn uniform(value: T) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub fn get(&self, side: Side) -> T {
        match side {
            Side::Left => self.left,
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, side: Side, value: T) {
        match side {
            Side::Left => self.left = value,
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
        }
    }
}

impl Sides<Length> {
    pub fn any_dpi_scaled(&self) -> bool {
        Side::ALL.iter().any(|side| self.get(*side).is_dpi_scaled())
    }
}

/// The per-element property store.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub max_width: Length,
    pub min_height: Length,
    pub max_height: Length,

    pub margin: Sides<Length>,
    pub padding: Sides<Length>,
    pub border_width: Sides<Length>,
    pub border_color: Sides<Color>,
    pub border_mask: Sides<Option<BorderMask>>,

    pub positioning: Positioning,
    pub left: Length,
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub right_has_priority: bool,
    pub bottom_has_priority: bool,
    pub position_origin: BoxBoundary,

    pub child_axis: ChildAxis,
    pub horizontal_align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
    pub flex_children_width: bool,
    pub flex_children_height: bool,
    pub children_width_boundary: BoxBoundary,
    pub children_height_boundary: BoxBoundary,
    pub clipping_boundary: BoxBoundary,
    pub clipping_mode: ClippingMode,
    pub visible: bool,

    pub background_color: Color,
    pub background_boundary: BoxBoundary,
    pub background_image: Option<SmolStr>,
    pub background_image_color: Color,
    pub background_repeat_x: BackgroundRepeat,
    pub background_repeat_y: BackgroundRepeat,

    pub text: String,
    pub text_color: Color,
    pub font_family: Option<SmolStr>,
    pub font_size: Option<Length>,
    pub font_weight: Option<FontWeight>,
    pub font_slant: Option<FontSlant>,

    pub cursor: Option<Cursor>,
    pub pass_through: bool,
    pub focus_on_click: bool,
    pub editable_text: bool,
    pub multiline_text: bool,
    pub scroll_on_wheel: bool,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::ZERO,
            max_width: Length::UNBOUNDED,
            min_height: Length::ZERO,
            max_height: Length::UNBOUNDED,
            margin: Sides::uniform(Length::ZERO),
            padding: Sides::uniform(Length::ZERO),
            border_width: Sides::uniform(Length::ZERO),
            border_color: Sides::uniform(Color::BLACK),
            border_mask: Sides::uniform(None),
            positioning: Positioning::Auto,
            left: Length::ZERO,
            top: Length::ZERO,
            right: Length::ZERO,
            bottom: Length::ZERO,
            right_has_priority: false,
            bottom_has_priority: false,
            position_origin: BoxBoundary::Inner,
            child_axis: ChildAxis::Vertical,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            flex_children_width: false,
            flex_children_height: false,
            children_width_boundary: BoxBoundary::Inner,
            children_height_boundary: BoxBoundary::Inner,
            clipping_boundary: BoxBoundary::Inner,
            clipping_mode: ClippingMode::Default,
            visible: true,
            background_color: Color::WHITE,
            background_boundary: BoxBoundary::InnerBorder,
            background_image: None,
            background_image_color: Color::WHITE,
            background_repeat_x: BackgroundRepeat::None,
            background_repeat_y: BackgroundRepeat::None,
            text: String::new(),
            text_color: Color::BLACK,
            font_family: None,
            font_size: None,
            font_weight: None,
            font_slant: None,
            cursor: None,
            pass_through: false,
            focus_on_click: false,
            editable_text: false,
            multiline_text: false,
            scroll_on_wheel: false,
        }
    }
}

impl ElementStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this element is clipped against its parent's children-clipping rect.
    pub fn is_clipped_by_parent(&self) -> bool {
        match self.clipping_mode {
            ClippingMode::Default => self.positioning != Positioning::Absolute,
            ClippingMode::Enabled => true,
            ClippingMode::Disabled => false,
        }
    }

    pub fn has_any_dpi_scaled_edges(&self) -> bool {
        self.margin.any_dpi_scaled()
            || self.padding.any_dpi_scaled()
            || self.border_width.any_dpi_scaled()
    }

    pub fn flexes_children_along(&self, horizontal: bool) -> bool {
        if horizontal {
            self.flex_children_width && self.child_axis == ChildAxis::Horizontal
        } else {
            self.flex_children_height && self.child_axis == ChildAxis::Vertical
        }
    }
}
