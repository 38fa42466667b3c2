mod base_component;
mod context;
mod surface;

pub use base_component::{ElementId, Point, Rect};
pub(crate) use base_component::Element;
pub use context::*;
pub use surface::SurfaceId;
pub(crate) use surface::Surface;
