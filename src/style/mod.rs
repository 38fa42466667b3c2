mod color;
mod element_style;
mod layout_state;
mod length;

pub use color::*;
pub use element_style::*;
pub use layout_state::*;
pub use length::*;
