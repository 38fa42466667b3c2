//! A retained-mode GUI core: an element tree with box-model layout, batched
//! incremental invalidation, dirty-rect painting through a pluggable renderer,
//! and mouse/keyboard dispatch with hover, capture and focus tracking.

pub mod config;
pub mod error;
pub mod renderer;
pub mod resources;
pub mod style;
pub mod text;
pub mod ui;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use config::GuiConfig;
pub use error::{GuiError, GuiResult};
pub use renderer::{GuiRenderer, TextRun};
pub use resources::{FileImageManager, ImageHandle, ImageResourceManager};
pub use text::{FontDescriptor, FontHandle, FontProvider};
pub use view::{ElementId, GuiContext, Rect, SurfaceId};
