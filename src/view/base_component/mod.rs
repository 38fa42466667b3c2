mod core;
mod element;

pub use self::core::*;
pub use element::ElementId;
pub(crate) use element::Element;
