use crate::view::{ElementId, Rect};
use slotmap::new_key_type;
use smol_str::SmolStr;

new_key_type! {
    pub struct SurfaceId;
}

/// A paint destination, typically one per OS window.
pub(crate) struct Surface {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) dpi_x: f32,
    pub(crate) dpi_y: f32,
    pub(crate) first_element: Option<ElementId>,
    pub(crate) last_element: Option<ElementId>,
    /// Accumulated dirty area, already clipped to the surface bounds.
    pub(crate) invalid_rect: Rect,
    pub(crate) id: Option<SmolStr>,
}

impl Surface {
    pub(crate) fn new(width: f32, height: f32, dpi_x: f32, dpi_y: f32) -> Self {
        Self {
            width,
            height,
            dpi_x,
            dpi_y,
            first_element: None,
            last_element: None,
            invalid_rect: Rect::EMPTY,
            id: None,
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}
