//! Dirty-rect tracking, clipped traversal and element painting.

use super::GuiContext;
use super::layout::{align_horizontal, align_vertical};
use crate::error::GuiError;
use crate::renderer::{GuiRenderer, TextRun};
use crate::resources::{ImageFormat, ImageHandle};
use crate::style::{BackgroundRepeat, BorderMask, Color};
use crate::text::FontProvider;
use crate::view::{ElementId, Rect, SurfaceId};

/// One span of an image along an axis: where it lands and which image pixels it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    start: f32,
    end: f32,
    src_start: f32,
    src_end: f32,
}

/// Spans covering `[area_start, area_end)` for an image of `image_len` pixels.
/// `align` is 0 for leading, 0.5 for centered and 1 for trailing placement.
fn image_spans(repeat: BackgroundRepeat, area_start: f32, area_end: f32, image_len: f32, align: f32) -> Vec<Span> {
    let area_len = area_end - area_start;
    if area_len <= 0.0 || image_len <= 0.0 {
        return Vec::new();
    }
    // (placement start, placement length) in surface pixels
    let tiles: Vec<(f32, f32)> = match repeat {
        BackgroundRepeat::None => vec![(area_start + (area_len - image_len) * align, image_len)],
        BackgroundRepeat::Stretch => vec![(area_start, area_len)],
        BackgroundRepeat::Repeat => {
            let count = (area_len / image_len).ceil();
            let first = area_start + (area_len - count * image_len) * align;
            (0..count as usize)
                .map(|i| (first + i as f32 * image_len, image_len))
                .collect()
        }
    };
    tiles
        .into_iter()
        .filter_map(|(pos, len)| {
            let start = pos.max(area_start);
            let end = (pos + len).min(area_end);
            if end <= start {
                return None;
            }
            let scale = image_len / len;
            Some(Span {
                start,
                end,
                src_start: (start - pos) * scale,
                src_end: (end - pos) * scale,
            })
        })
        .collect()
}

fn draw_border_edge(
    renderer: &mut dyn GuiRenderer,
    edge: Rect,
    horizontal: bool,
    color: Color,
    mask: Option<BorderMask>,
) {
    if !edge.has_area() {
        return;
    }
    let Some(mask) = mask.filter(|m| m.length > 0.0) else {
        if !color.is_transparent() {
            renderer.draw_rect(edge, color);
        }
        return;
    };
    let (start, end) = if horizontal {
        (edge.left, edge.right)
    } else {
        (edge.top, edge.bottom)
    };
    let mask_start = (start + mask.offset).clamp(start, end);
    let mask_end = (mask_start + mask.length).clamp(start, end);
    let segments = [
        (start, mask_start, color),
        (mask_start, mask_end, mask.color),
        (mask_end, end, color),
    ];
    for (from, to, color) in segments {
        if to <= from || color.is_transparent() {
            continue;
        }
        let rect = if horizontal {
            Rect::new(from, edge.top, to, edge.bottom)
        } else {
            Rect::new(edge.left, from, edge.right, to)
        };
        renderer.draw_rect(rect, color);
    }
}

impl GuiContext {
    /// Unions `rect` into the surface's dirty area.
    pub(crate) fn invalidate_rect(&mut self, surface: SurfaceId, rect: Rect) {
        let Some(s) = self.surfaces.get_mut(surface) else {
            return;
        };
        let rect = rect.clamp(&s.bounds());
        if rect.has_area() {
            s.invalid_rect = s.invalid_rect.union(&rect);
        }
    }

    pub fn invalidate_surface_rect(&mut self, surface: SurfaceId, rect: Rect) {
        if !self.checked_surface(surface, "invalidate_surface_rect") {
            return;
        }
        self.batched(|ctx| ctx.invalidate_rect(surface, rect));
    }

    pub(crate) fn invalidate_whole_surface(&mut self, surface: SurfaceId) {
        if let Some(bounds) = self.surfaces.get(surface).map(|s| s.bounds()) {
            self.invalidate_rect(surface, bounds);
        }
    }

    /// Marks the element's current footprint dirty.
    pub(crate) fn invalidate_element_rect(&mut self, id: ElementId) {
        let Some(el) = self.live(id) else {
            return;
        };
        let Some(surface) = el.surface else {
            return;
        };
        let Some(mut rect) = self.element_absolute_rect(id) else {
            return;
        };
        if el.style.is_clipped_by_parent() {
            if let Some(clip) = el.parent.and_then(|p| self.children_clip_rect(p)) {
                rect = rect.clamp(&clip);
            }
        }
        self.invalidate_rect(surface, rect);
    }

    pub(crate) fn invalidate_subtree_rects(&mut self, id: ElementId) {
        for element in self.subtree(id) {
            self.invalidate_element_rect(element);
        }
    }

    /// The rect children of `id` are clipped against.
    pub(crate) fn children_clip_rect(&self, id: ElementId) -> Option<Rect> {
        let boundary = self.live(id)?.style.clipping_boundary;
        self.element_boundary_rect(id, boundary)
    }

    /// Visits every visible element of `surface` in paint order with its
    /// absolute rect clamped to the effective clip. Painting and hit-testing
    /// both go through here so they agree on what is visible.
    pub(crate) fn clipped_traversal<F>(&self, surface: SurfaceId, clip: Rect, visit: &mut F)
    where
        F: FnMut(ElementId, Rect),
    {
        let top_level: Vec<ElementId> = self.surface_elements(surface).collect();
        for id in top_level {
            self.clipped_visit(id, clip, clip, visit);
        }
    }

    fn clipped_visit<F>(&self, id: ElementId, clip: Rect, root_clip: Rect, visit: &mut F)
    where
        F: FnMut(ElementId, Rect),
    {
        let Some(el) = self.live(id) else {
            return;
        };
        if !el.style.visible {
            return;
        }
        let clip = if el.style.is_clipped_by_parent() {
            clip
        } else {
            root_clip
        };
        let Some(rect) = self.element_absolute_rect(id) else {
            return;
        };
        let visible = rect.clamp(&clip);
        if visible.has_area() {
            visit(id, visible);
        }

        let children_clip = self
            .children_clip_rect(id)
            .map(|r| r.clamp(&clip))
            .unwrap_or(Rect::EMPTY);
        let children: Vec<ElementId> = self.children(id).collect();
        for child in children {
            let constrained = self
                .live(child)
                .is_some_and(|c| c.style.is_clipped_by_parent());
            if constrained && !children_clip.has_area() {
                continue;
            }
            self.clipped_visit(child, children_clip, root_clip, visit);
        }
    }

    /// Topmost element at surface point `(x, y)` that is not pass-through.
    pub fn find_element_under_point(&self, surface: SurfaceId, x: f32, y: f32) -> Option<ElementId> {
        let bounds = self.surfaces.get(surface)?.bounds();
        let mut hit = None;
        self.clipped_traversal(surface, bounds, &mut |id, rect| {
            if rect.contains(x, y) && self.live(id).is_some_and(|el| !el.style.pass_through) {
                hit = Some(id);
            }
        });
        hit
    }

    /// Paints the dirty area of every surface and resets it.
    pub(crate) fn paint_invalid_surfaces(&mut self) {
        let dirty: Vec<(SurfaceId, Rect)> = self
            .surfaces
            .iter_mut()
            .filter_map(|(id, s)| {
                let rect = std::mem::replace(&mut s.invalid_rect, Rect::EMPTY);
                rect.has_area().then_some((id, rect))
            })
            .collect();
        for (surface, rect) in dirty {
            self.paint_region(surface, rect);
        }
    }

    /// Repaints `rect` of `surface`, e.g. after the host window was exposed.
    /// Inside a batch the area is only marked dirty.
    pub fn paint_surface(&mut self, surface: SurfaceId, rect: Rect) {
        if !self.checked_surface(surface, "paint_surface") {
            return;
        }
        if self.layout.batch_depth > 0 {
            self.invalidate_rect(surface, rect);
        } else {
            self.paint_region(surface, rect);
        }
    }

    fn paint_region(&mut self, surface: SurfaceId, rect: Rect) {
        let Some((width, height, bounds)) = self.surfaces.get(surface).map(|s| (s.width, s.height, s.bounds())) else {
            return;
        };
        let region = rect.clamp(&bounds);
        if !region.has_area() {
            return;
        }
        let Some(mut renderer) = self.renderer.take() else {
            return;
        };
        let mut fonts = self.fonts.take();
        log::debug!("painting {surface:?} region {region:?}");

        renderer.begin_paint_surface(surface, width, height);
        renderer.set_clip_rect(region);
        self.clipped_traversal(surface, region, &mut |id, clip| {
            self.paint_element(renderer.as_mut(), &mut fonts, id, clip);
        });
        renderer.end_paint_surface(surface);

        self.renderer = Some(renderer);
        self.fonts = fonts;
    }

    fn paint_element(
        &self,
        renderer: &mut dyn GuiRenderer,
        fonts: &mut Option<Box<dyn FontProvider>>,
        id: ElementId,
        clip: Rect,
    ) {
        let Some(el) = self.live(id) else {
            return;
        };
        let style = &el.style;
        renderer.set_clip_rect(clip);

        if !style.background_color.is_transparent() {
            if let Some(area) = self.element_boundary_rect(id, style.background_boundary) {
                if area.has_area() {
                    renderer.draw_rect(area, style.background_color);
                }
            }
        }
        if let Some(image) = el.background_image {
            self.paint_background_image(renderer, id, image);
        }
        self.paint_text(renderer, fonts, id, clip);
        self.paint_text_cursor(renderer, id);
        self.paint_borders(renderer, id);
    }

    fn paint_background_image(&self, renderer: &mut dyn GuiRenderer, id: ElementId, image: ImageHandle) {
        let Some(el) = self.live(id) else {
            return;
        };
        let style = &el.style;
        let Some(data) = self.images.as_deref().and_then(|images| images.image_data(image)) else {
            return;
        };
        let Some(area) = self.element_boundary_rect(id, style.background_boundary) else {
            return;
        };
        let xs = image_spans(
            style.background_repeat_x,
            area.left,
            area.right,
            data.width as f32,
            align_horizontal(style.horizontal_align, 1.0),
        );
        let ys = image_spans(
            style.background_repeat_y,
            area.top,
            area.bottom,
            data.height as f32,
            align_vertical(style.vertical_align, 1.0),
        );
        for y in &ys {
            for x in &xs {
                renderer.draw_textured_rect(
                    Rect::new(x.start, y.start, x.end, y.end),
                    image,
                    Rect::new(x.src_start, y.src_start, x.src_end, y.src_end),
                    style.background_image_color,
                );
            }
        }
    }

    fn paint_text(
        &self,
        renderer: &mut dyn GuiRenderer,
        fonts: &mut Option<Box<dyn FontProvider>>,
        id: ElementId,
        clip: Rect,
    ) {
        let Some(el) = self.live(id) else {
            return;
        };
        let Some(layout) = el.text_layout.as_ref() else {
            return;
        };
        let Some(font) = layout.font() else {
            return;
        };
        let Some(inner) = self.element_inner_rect(id) else {
            return;
        };
        let text_clip = clip.clamp(&inner);
        if !text_clip.has_area() {
            return;
        }
        renderer.set_clip_rect(text_clip);
        for line in layout.lines() {
            let text = layout.line_text(line);
            if text.is_empty() {
                continue;
            }
            let run = TextRun {
                text,
                font,
                x: inner.left + line.x,
                y: inner.top + line.y,
                line_height: layout.line_height(),
                color: el.style.text_color,
            };
            if renderer.draw_text(&run) {
                continue;
            }
            let Some(fonts) = fonts.as_deref_mut() else {
                continue;
            };
            let width = line.width.ceil() as u32;
            let height = layout.line_height().ceil() as u32;
            if width == 0 || height == 0 {
                continue;
            }
            let mut buffer = vec![0u8; (width * height) as usize * ImageFormat::Rgba8.bytes_per_pixel()];
            fonts.rasterize_string(font, text, run.color, width, height, &mut buffer);
            renderer.draw_raw_image(run.x, run.y, width, height, ImageFormat::Rgba8, &buffer);
        }
        renderer.set_clip_rect(clip);
    }

    fn paint_text_cursor(&self, renderer: &mut dyn GuiRenderer, id: ElementId) {
        let Some(cursor) = self.input.text_cursor.filter(|c| c.element == id && c.visible) else {
            return;
        };
        let Some(el) = self.live(id) else {
            return;
        };
        let Some(layout) = el.text_layout.as_ref() else {
            return;
        };
        let Some(inner) = self.element_inner_rect(id) else {
            return;
        };
        let (x, y) = layout.cursor_position(cursor.index);
        let width = self.config.text_cursor_width * self.dpi_scale(el.surface, true);
        let rect = Rect::from_xywh(inner.left + x, inner.top + y, width, layout.line_height());
        renderer.draw_rect(rect, el.style.text_color);
    }

    /// Top is shortened by the right edge, right by the bottom edge and bottom by
    /// the left edge; the left edge always spans the full height.
    fn paint_borders(&self, renderer: &mut dyn GuiRenderer, id: ElementId) {
        let Some(el) = self.live(id) else {
            return;
        };
        let Some(rect) = self.element_absolute_rect(id) else {
            return;
        };
        let border = el.layout.border;
        let colors = &el.style.border_color;
        let masks = &el.style.border_mask;

        let top = Rect::new(rect.left, rect.top, rect.right - border.right, rect.top + border.top);
        let right = Rect::new(rect.right - border.right, rect.top, rect.right, rect.bottom - border.bottom);
        let bottom = Rect::new(rect.left + border.left, rect.bottom - border.bottom, rect.right, rect.bottom);
        let left = Rect::new(rect.left, rect.top, rect.left + border.left, rect.bottom);

        draw_border_edge(renderer, top, true, colors.top, masks.top);
        draw_border_edge(renderer, right, false, colors.right, masks.right);
        draw_border_edge(renderer, bottom, true, colors.bottom, masks.bottom);
        draw_border_edge(renderer, left, false, colors.left, masks.left);
    }

    /// Adds an element reference to `image`; the renderer uploads it on the first.
    pub(crate) fn retain_image(&mut self, image: ImageHandle) {
        let count = self.image_refs.entry(image).or_insert(0);
        *count += 1;
        if *count != 1 {
            return;
        }
        let Some(renderer) = self.renderer.as_deref_mut() else {
            return;
        };
        match self.images.as_deref().and_then(|images| images.image_data(image)) {
            Some(data) => renderer.initialize_image(image, data.width, data.height, data.format, data.pixels),
            None => log::warn!("{}", GuiError::UnknownImage(image)),
        }
    }

    /// Drops an element reference to `image`, in the manager and in the renderer.
    pub(crate) fn release_image(&mut self, image: ImageHandle) {
        if let Some(images) = self.images.as_deref_mut() {
            images.release_image(image);
        }
        let Some(count) = self.image_refs.get_mut(&image) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count > 0 {
            return;
        }
        self.image_refs.remove(&image);
        if let Some(renderer) = self.renderer.as_deref_mut() {
            renderer.uninitialize_image(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Span, image_spans};
    use crate::style::{BackgroundRepeat, BorderMask, BoxBoundary, Color, Length, Positioning, Side};
    use crate::testing::{DrawCommand, MonoFontProvider, RecordingRenderer, clip_rects, recording_context};
    use crate::view::{GuiContext, Rect, SurfaceId};
    use std::cell::RefCell;
    use std::rc::Rc;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn sized(ctx: &mut GuiContext, surface: SurfaceId, width: f32, height: f32) -> crate::view::ElementId {
        let el = ctx.create_element();
        ctx.set_element_width(el, Length::px(width));
        ctx.set_element_height(el, Length::px(height));
        ctx.set_element_surface(el, Some(surface));
        el
    }

    fn drawn_rects(log: &[DrawCommand]) -> Vec<(Rect, Color)> {
        log.iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Rect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn repeat_spans_crop_the_last_tile() {
        let spans = image_spans(BackgroundRepeat::Repeat, 0.0, 10.0, 4.0, 0.0);
        assert_eq!(spans.len(), 3);
        assert_eq!(
            spans[2],
            Span {
                start: 8.0,
                end: 10.0,
                src_start: 0.0,
                src_end: 2.0
            }
        );
        let trailing = image_spans(BackgroundRepeat::Repeat, 0.0, 10.0, 4.0, 1.0);
        assert_eq!(trailing[0].start, 0.0);
        assert_eq!(trailing[0].src_start, 2.0);
    }

    #[test]
    fn stretch_maps_the_whole_image() {
        let spans = image_spans(BackgroundRepeat::Stretch, 5.0, 25.0, 4.0, 0.5);
        assert_eq!(
            spans,
            vec![Span {
                start: 5.0,
                end: 25.0,
                src_start: 0.0,
                src_end: 4.0
            }]
        );
        let centered = image_spans(BackgroundRepeat::None, 0.0, 20.0, 4.0, 0.5);
        assert_eq!(centered[0].start, 8.0);
    }

    #[test]
    fn paint_order_is_background_text_then_borders() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let el = ctx.create_element();
        ctx.set_element_background_color(el, RED);
        for side in Side::ALL {
            ctx.set_element_border_width(el, side, Length::px(2.0));
            ctx.set_element_border_color(el, side, BLUE);
        }
        ctx.set_element_text(el, "hi");
        ctx.set_element_surface(el, Some(surface));

        let log = log.borrow();
        let begin = log
            .iter()
            .rposition(|cmd| matches!(cmd, DrawCommand::BeginPaint { .. }))
            .expect("painted");
        let frame = &log[begin..];
        let bg = frame
            .iter()
            .position(|cmd| matches!(cmd, DrawCommand::Rect { color, .. } if *color == RED))
            .expect("background");
        let text = frame
            .iter()
            .position(|cmd| matches!(cmd, DrawCommand::Text { text, .. } if text == "hi"))
            .expect("text");
        let first_border = frame
            .iter()
            .position(|cmd| matches!(cmd, DrawCommand::Rect { color, .. } if *color == BLUE))
            .expect("border");
        assert!(bg < text && text < first_border);
        assert_eq!(drawn_rects(frame).iter().filter(|(_, c)| *c == BLUE).count(), 4);
    }

    #[test]
    fn text_is_rasterized_when_the_backend_cannot_draw_it() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = GuiContext::default()
            .with_renderer(Box::new(RecordingRenderer::new(log.clone(), false)))
            .with_font_provider(Box::new(MonoFontProvider::new(8.0, 10.0)));
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let el = ctx.create_element();
        ctx.set_element_padding(el, Side::Left, Length::px(3.0));
        ctx.set_element_text(el, "abc");
        ctx.set_element_surface(el, Some(surface));

        assert!(log.borrow().contains(&DrawCommand::RawImage {
            x: 3.0,
            y: 0.0,
            width: 24,
            height: 10
        }));
    }

    #[test]
    fn border_corners_follow_fixed_priority() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let el = ctx.create_element();
        ctx.set_element_width(el, Length::px(40.0));
        ctx.set_element_height(el, Length::px(30.0));
        ctx.set_element_background_color(el, Color::TRANSPARENT);
        let widths = [(Side::Left, 1.0), (Side::Top, 2.0), (Side::Right, 3.0), (Side::Bottom, 4.0)];
        for (side, width) in widths {
            ctx.set_element_border_width(el, side, Length::px(width));
        }
        ctx.set_element_border_color(el, Side::Top, Color::rgb(1, 0, 0));
        ctx.set_element_border_color(el, Side::Right, Color::rgb(2, 0, 0));
        ctx.set_element_border_color(el, Side::Bottom, Color::rgb(3, 0, 0));
        ctx.set_element_border_color(el, Side::Left, Color::rgb(4, 0, 0));
        log.borrow_mut().clear();
        ctx.set_element_surface(el, Some(surface));

        let rects = drawn_rects(&log.borrow());
        let find = |color: Color| rects.iter().find(|(_, c)| *c == color).map(|(r, _)| *r);
        assert_eq!(find(Color::rgb(1, 0, 0)), Some(Rect::new(0.0, 0.0, 37.0, 2.0)));
        assert_eq!(find(Color::rgb(2, 0, 0)), Some(Rect::new(37.0, 0.0, 40.0, 26.0)));
        assert_eq!(find(Color::rgb(3, 0, 0)), Some(Rect::new(1.0, 26.0, 40.0, 30.0)));
        assert_eq!(find(Color::rgb(4, 0, 0)), Some(Rect::new(0.0, 0.0, 1.0, 30.0)));
    }

    #[test]
    fn border_mask_splits_an_edge_in_three() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let el = ctx.create_element();
        ctx.set_element_width(el, Length::px(40.0));
        ctx.set_element_height(el, Length::px(10.0));
        ctx.set_element_background_color(el, Color::TRANSPARENT);
        ctx.set_element_border_width(el, Side::Top, Length::px(1.0));
        ctx.set_element_border_color(el, Side::Top, BLUE);
        ctx.set_element_border_mask(
            el,
            Side::Top,
            Some(BorderMask {
                offset: 10.0,
                length: 5.0,
                color: RED,
            }),
        );
        log.borrow_mut().clear();
        ctx.set_element_surface(el, Some(surface));

        let rects = drawn_rects(&log.borrow());
        assert_eq!(
            rects,
            vec![
                (Rect::new(0.0, 0.0, 10.0, 1.0), BLUE),
                (Rect::new(10.0, 0.0, 15.0, 1.0), RED),
                (Rect::new(15.0, 0.0, 40.0, 1.0), BLUE),
            ]
        );
    }

    #[test]
    fn style_change_repaints_only_the_element() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(200.0, 200.0, 96.0, 96.0);
        let el = ctx.create_element();
        ctx.set_element_width(el, Length::px(30.0));
        ctx.set_element_height(el, Length::px(20.0));
        ctx.set_element_margin(el, Side::Left, Length::px(50.0));
        ctx.set_element_surface(el, Some(surface));
        log.borrow_mut().clear();

        ctx.set_element_background_color(el, RED);
        assert_eq!(clip_rects(&log.borrow()).first(), Some(&Rect::new(50.0, 0.0, 80.0, 20.0)));

        log.borrow_mut().clear();
        ctx.set_element_background_color(el, RED);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn tiled_background_image_covers_the_area() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let el = sized(&mut ctx, surface, 10.0, 6.0);
        ctx.set_element_background_boundary(el, BoxBoundary::Outer);
        ctx.set_element_background_repeat_x(el, BackgroundRepeat::Repeat);
        log.borrow_mut().clear();
        assert!(ctx.set_element_background_image(el, Some("tile.png")));

        let log = log.borrow();
        let textured: Vec<(Rect, Rect)> = log
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Textured { rect, source, .. } => Some((*rect, *source)),
                _ => None,
            })
            .collect();
        assert_eq!(
            textured,
            vec![
                (Rect::new(0.0, 0.0, 4.0, 4.0), Rect::new(0.0, 0.0, 4.0, 4.0)),
                (Rect::new(4.0, 0.0, 8.0, 4.0), Rect::new(0.0, 0.0, 4.0, 4.0)),
                (Rect::new(8.0, 0.0, 10.0, 4.0), Rect::new(0.0, 0.0, 2.0, 4.0)),
            ]
        );
    }

    #[test]
    fn renderer_sees_only_first_and_last_image_reference() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let a = sized(&mut ctx, surface, 10.0, 10.0);
        let b = sized(&mut ctx, surface, 10.0, 10.0);
        assert!(ctx.set_element_background_image(a, Some("tile.png")));
        assert!(ctx.set_element_background_image(b, Some("tile.png")));
        assert!(!ctx.set_element_background_image(b, Some("missing.png")));
        let count = |log: &[DrawCommand], init: bool| {
            log.iter()
                .filter(|cmd| {
                    if init {
                        matches!(cmd, DrawCommand::InitImage(_))
                    } else {
                        matches!(cmd, DrawCommand::UninitImage(_))
                    }
                })
                .count()
        };
        assert_eq!(count(&log.borrow(), true), 1);

        ctx.delete_element(a);
        assert_eq!(count(&log.borrow(), false), 0);
        ctx.set_element_background_image(b, None);
        assert_eq!(count(&log.borrow(), false), 1);
    }

    #[test]
    fn hit_testing_respects_clipping_and_pass_through() {
        let (mut ctx, _) = recording_context();
        let surface = ctx.create_surface(300.0, 300.0, 96.0, 96.0);
        let parent = sized(&mut ctx, surface, 100.0, 20.0);
        let clipped = ctx.create_element();
        ctx.append_child_element(parent, clipped);
        ctx.set_element_width(clipped, Length::px(50.0));
        ctx.set_element_height(clipped, Length::px(20.0));
        ctx.set_element_margin(clipped, Side::Left, Length::px(90.0));
        let floating = ctx.create_element();
        ctx.append_child_element(parent, floating);
        ctx.set_element_positioning(floating, Positioning::Absolute);
        ctx.set_element_left(floating, Length::px(150.0));
        ctx.set_element_width(floating, Length::px(20.0));
        ctx.set_element_height(floating, Length::px(20.0));

        assert_eq!(ctx.find_element_under_point(surface, 95.0, 5.0), Some(clipped));
        assert_eq!(ctx.find_element_under_point(surface, 120.0, 5.0), None);
        assert_eq!(ctx.find_element_under_point(surface, 155.0, 5.0), Some(floating));

        ctx.set_element_pass_through(clipped, true);
        assert_eq!(ctx.find_element_under_point(surface, 95.0, 5.0), Some(parent));
    }
}
