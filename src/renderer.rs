//! Platform renderer collaborator.

use crate::resources::{ImageFormat, ImageHandle};
use crate::style::Color;
use crate::text::FontHandle;
use crate::view::{Rect, SurfaceId};

/// A single pre-laid-out line of text. `x`/`y` is the top-left of the line box.
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub font: FontHandle,
    pub x: f32,
    pub y: f32,
    pub line_height: f32,
    pub color: Color,
}

/// Drawing backend driven by surface painting. All coordinates are surface pixels.
pub trait GuiRenderer {
    fn begin_paint_surface(&mut self, surface: SurfaceId, width: f32, height: f32);
    fn end_paint_surface(&mut self, surface: SurfaceId);
    fn set_clip_rect(&mut self, rect: Rect);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    /// Draws the `source` sub-rectangle (image pixels) of `image` stretched over `rect`.
    fn draw_textured_rect(&mut self, rect: Rect, image: ImageHandle, source: Rect, tint: Color);
    /// Returns false when the backend cannot draw text itself; the caller then
    /// rasterizes the run and hands it to [`GuiRenderer::draw_raw_image`].
    fn draw_text(&mut self, _run: &TextRun<'_>) -> bool {
        false
    }
    fn draw_raw_image(
        &mut self,
        x: f32,
        y: f32,
        width: u32,
        height: u32,
        format: ImageFormat,
        data: &[u8],
    );
    /// Called when the first element starts using `image`.
    fn initialize_image(
        &mut self,
        image: ImageHandle,
        width: u32,
        height: u32,
        format: ImageFormat,
        data: &[u8],
    );
    /// Called when the last element stops using `image`.
    fn uninitialize_image(&mut self, image: ImageHandle);
}
