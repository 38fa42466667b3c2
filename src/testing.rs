//! Deterministic collaborators for unit tests.

use crate::renderer::{GuiRenderer, TextRun};
use crate::resources::{FileImageManager, ImageFormat, ImageHandle};
use crate::style::Color;
use crate::text::{FontDescriptor, FontHandle, FontProvider};
use crate::ui::ElementEvent;
use crate::view::{ElementId, GuiContext, Rect, SurfaceId};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Every glyph advances by the same width.
pub(crate) struct MonoFontProvider {
    advance: f32,
    line_height: f32,
    fonts: FxHashMap<FontHandle, u32>,
    next: u64,
}

impl MonoFontProvider {
    pub(crate) fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
            fonts: FxHashMap::default(),
            next: 1,
        }
    }
}

impl FontProvider for MonoFontProvider {
    fn acquire_font(&mut self, _descriptor: &FontDescriptor) -> Option<FontHandle> {
        let handle = FontHandle(self.next);
        self.next += 1;
        self.fonts.insert(handle, 1);
        Some(handle)
    }

    fn release_font(&mut self, font: FontHandle) {
        self.fonts.remove(&font);
    }

    fn line_height(&self, _font: FontHandle) -> f32 {
        self.line_height
    }

    fn measure_string(&mut self, _font: FontHandle, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn rasterize_string(
        &mut self,
        _font: FontHandle,
        _text: &str,
        color: Color,
        _width: u32,
        _height: u32,
        buffer: &mut [u8],
    ) {
        for pixel in buffer.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color.to_rgba_u8());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCommand {
    BeginPaint { surface: SurfaceId, width: f32, height: f32 },
    EndPaint { surface: SurfaceId },
    Clip(Rect),
    Rect { rect: Rect, color: Color },
    Textured { rect: Rect, image: ImageHandle, source: Rect, tint: Color },
    Text { text: String, x: f32, y: f32 },
    RawImage { x: f32, y: f32, width: u32, height: u32 },
    InitImage(ImageHandle),
    UninitImage(ImageHandle),
}

/// Logs every call into a shared command list.
pub(crate) struct RecordingRenderer {
    log: Rc<RefCell<Vec<DrawCommand>>>,
    draws_text: bool,
}

impl RecordingRenderer {
    pub(crate) fn new(log: Rc<RefCell<Vec<DrawCommand>>>, draws_text: bool) -> Self {
        Self { log, draws_text }
    }

    fn push(&self, command: DrawCommand) {
        self.log.borrow_mut().push(command);
    }
}

impl GuiRenderer for RecordingRenderer {
    fn begin_paint_surface(&mut self, surface: SurfaceId, width: f32, height: f32) {
        self.push(DrawCommand::BeginPaint { surface, width, height });
    }

    fn end_paint_surface(&mut self, surface: SurfaceId) {
        self.push(DrawCommand::EndPaint { surface });
    }

    fn set_clip_rect(&mut self, rect: Rect) {
        self.push(DrawCommand::Clip(rect));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCommand::Rect { rect, color });
    }

    fn draw_textured_rect(&mut self, rect: Rect, image: ImageHandle, source: Rect, tint: Color) {
        self.push(DrawCommand::Textured { rect, image, source, tint });
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> bool {
        if self.draws_text {
            self.push(DrawCommand::Text {
                text: run.text.to_string(),
                x: run.x,
                y: run.y,
            });
        }
        self.draws_text
    }

    fn draw_raw_image(&mut self, x: f32, y: f32, width: u32, height: u32, _format: ImageFormat, _data: &[u8]) {
        self.push(DrawCommand::RawImage { x, y, width, height });
    }

    fn initialize_image(&mut self, image: ImageHandle, _width: u32, _height: u32, _format: ImageFormat, _data: &[u8]) {
        self.push(DrawCommand::InitImage(image));
    }

    fn uninitialize_image(&mut self, image: ImageHandle) {
        self.push(DrawCommand::UninitImage(image));
    }
}

/// Context with a recording renderer, an 8x10 monospace font and a 4x4
/// `tile.png` image.
pub(crate) fn recording_context() -> (GuiContext, Rc<RefCell<Vec<DrawCommand>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut images = FileImageManager::new();
    images.register_rgba("tile.png", 4, 4, vec![255; 4 * 4 * 4]);
    let ctx = GuiContext::default()
        .with_renderer(Box::new(RecordingRenderer::new(log.clone(), true)))
        .with_font_provider(Box::new(MonoFontProvider::new(8.0, 10.0)))
        .with_image_manager(Box::new(images));
    (ctx, log)
}

/// Context with a monospace font and an 800x600 surface at 96 DPI.
pub(crate) fn mono_context(advance: f32, line_height: f32) -> (GuiContext, SurfaceId) {
    let mut ctx = GuiContext::default().with_font_provider(Box::new(MonoFontProvider::new(advance, line_height)));
    let surface = ctx.create_surface(800.0, 600.0, 96.0, 96.0);
    (ctx, surface)
}

pub(crate) type EventLog = Rc<RefCell<Vec<(ElementId, ElementEvent)>>>;

/// A shared log and a handler that appends to it.
pub(crate) fn event_log() -> (EventLog, impl Fn(&mut GuiContext, ElementId, &ElementEvent) + Clone + 'static) {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let handler = move |_: &mut GuiContext, id: ElementId, event: &ElementEvent| {
        sink.borrow_mut().push((id, event.clone()));
    };
    (log, handler)
}

/// Clip rects in call order.
pub(crate) fn clip_rects(log: &[DrawCommand]) -> Vec<Rect> {
    log.iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::Clip(rect) => Some(*rect),
            _ => None,
        })
        .collect()
}

#[track_caller]
pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
mod tests {
    use super::{DrawCommand, MonoFontProvider, RecordingRenderer};
    use crate::renderer::GuiRenderer;
    use crate::style::Color;
    use crate::text::{FontDescriptor, FontProvider};
    use crate::view::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn recording_collaborators_are_deterministic() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut renderer = RecordingRenderer::new(log.clone(), false);
        renderer.set_clip_rect(Rect::EMPTY);
        assert_eq!(log.borrow().as_slice(), &[DrawCommand::Clip(Rect::EMPTY)]);

        let mut fonts = MonoFontProvider::new(5.0, 7.0);
        let font = fonts.acquire_font(&FontDescriptor::new("mono", 9.0)).expect("font");
        assert_eq!(fonts.measure_string(font, "abc"), 15.0);
        let mut buffer = vec![0u8; 8];
        fonts.rasterize_string(font, "a", Color::rgb(1, 2, 3), 2, 1, &mut buffer);
        assert_eq!(buffer, vec![1, 2, 3, 255, 1, 2, 3, 255]);
    }
}
