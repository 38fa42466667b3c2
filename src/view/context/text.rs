//! Text validation, font inheritance and text-cursor editing.

use super::GuiContext;
use super::layout::boundary_edges;
use crate::style::{BoxBoundary, LayoutFlags, Length};
use crate::text::{FontDescriptor, FontProvider, TextLayout, TextLayoutBounds};
use crate::ui::ElementEvent;
use crate::view::ElementId;

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

impl GuiContext {
    /// Font request for `id`, with unset properties inherited from the nearest
    /// ancestor that sets them and finally from the configured default.
    pub(crate) fn resolve_font_descriptor(&self, id: ElementId) -> FontDescriptor {
        let default = &self.config.default_font;
        let mut family = None;
        let mut weight = None;
        let mut slant = None;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(el) = self.elements.get(current) else {
                break;
            };
            family = family.or_else(|| el.style.font_family.clone());
            weight = weight.or(el.style.font_weight);
            slant = slant.or(el.style.font_slant);
            cursor = el.parent;
        }
        FontDescriptor {
            family: family.unwrap_or_else(|| default.family.clone()),
            size: self.resolve_font_size(Some(id)),
            weight: weight.unwrap_or(default.weight),
            slant: slant.unwrap_or(default.slant),
        }
    }

    /// Font size in pixels. Points are scaled by the vertical DPI factor and
    /// percentages refer to the inherited size.
    fn resolve_font_size(&self, id: Option<ElementId>) -> f32 {
        let Some(el) = id.and_then(|id| self.elements.get(id)) else {
            return self.config.default_font.size;
        };
        let scale = self.dpi_scale(el.surface, false);
        match el.style.font_size {
            Some(Length::Px(size)) => size,
            Some(Length::Pt(size)) => size * scale,
            Some(Length::Percent(pct)) => self.resolve_font_size(el.parent) * pct / 100.0,
            Some(Length::Auto) | None => match el.parent {
                Some(parent) => self.resolve_font_size(Some(parent)),
                None => self.config.default_font.size * scale,
            },
        }
    }

    pub(crate) fn validate_text(&mut self, id: ElementId) {
        let Some(el) = self.live_mut(id) else {
            return;
        };
        el.layout.invalid.remove(LayoutFlags::TEXT);
        let needs_layout = !el.style.text.is_empty() || el.style.editable_text;
        let old_extent = el.text_layout.as_ref().map(TextLayout::extent).unwrap_or_default();

        if !needs_layout {
            let old = el.font.take();
            el.text_layout = None;
            if let (Some((font, _)), Some(fonts)) = (old, self.fonts.as_deref_mut()) {
                fonts.release_font(font);
            }
            self.after_text_extent(id, old_extent, (0.0, 0.0));
            return;
        }

        let descriptor = self.resolve_font_descriptor(id);
        self.update_element_font(id, descriptor);

        let Some(el) = self.elements.get(id) else {
            return;
        };
        let layout = el.layout;
        let inset = boundary_edges(&layout, BoxBoundary::Inner);
        let bounds = TextLayoutBounds {
            wrap_width: (el.style.multiline_text && !el.style.width.is_auto())
                .then(|| layout.inner_width()),
            container_width: layout.width - inset.horizontal(),
            container_height: layout.height - inset.vertical(),
            horizontal_align: el.style.horizontal_align,
            vertical_align: el.style.vertical_align,
        };
        let font = el.font.as_ref().map(|(handle, _)| *handle);
        let provider: Option<&mut dyn FontProvider> = match self.fonts.as_deref_mut() {
            Some(fonts) => Some(fonts),
            None => None,
        };
        let text_layout = TextLayout::build(provider, font, &el.style.text, &bounds);
        let new_extent = text_layout.extent();
        if self.config.trace_layout {
            log::trace!("{id:?} text extent = {new_extent:?}");
        }
        if let Some(el) = self.live_mut(id) {
            el.text_layout = Some(text_layout);
        }
        self.clamp_text_cursor();
        self.invalidate_element_rect(id);
        self.after_text_extent(id, old_extent, new_extent);
    }

    fn after_text_extent(&mut self, id: ElementId, old: (f32, f32), new: (f32, f32)) {
        let Some(el) = self.live(id) else {
            return;
        };
        let mut flags = LayoutFlags::empty();
        if old.0 != new.0 && el.style.width.is_auto() {
            flags |= LayoutFlags::WIDTH;
        }
        if old.1 != new.1 && el.style.height.is_auto() {
            flags |= LayoutFlags::HEIGHT;
        }
        if !flags.is_empty() {
            self.invalidate_element_layout(id, flags);
        }
    }

    /// Swaps the element's font for `descriptor`, releasing the previous one.
    fn update_element_font(&mut self, id: ElementId, descriptor: FontDescriptor) {
        let Some(el) = self.elements.get_mut(id) else {
            return;
        };
        if el.font.as_ref().is_some_and(|(_, current)| *current == descriptor) {
            return;
        }
        let old = el.font.take();
        let Some(fonts) = self.fonts.as_deref_mut() else {
            return;
        };
        if let Some((handle, _)) = old {
            fonts.release_font(handle);
        }
        match fonts.acquire_font(&descriptor) {
            Some(handle) => el.font = Some((handle, descriptor)),
            None => log::warn!("font unavailable: {descriptor:?}"),
        }
    }

    /// Invalidates text on `id` and every descendant inheriting its font.
    pub(crate) fn invalidate_subtree_text(&mut self, id: ElementId) {
        for element in self.subtree(id) {
            self.invalidate_element_layout(element, LayoutFlags::TEXT);
        }
    }

    pub fn set_element_text(&mut self, id: ElementId, text: &str) {
        if !self.checked(id, "set_element_text") {
            return;
        }
        if self.elements[id].style.text == text {
            return;
        }
        self.batched(|ctx| {
            ctx.elements[id].style.text = text.to_string();
            ctx.invalidate_element_layout(id, LayoutFlags::TEXT);
        });
    }

    pub fn element_text(&self, id: ElementId) -> Option<&str> {
        self.live(id).map(|el| el.style.text.as_str())
    }

    pub fn element_text_layout(&self, id: ElementId) -> Option<&TextLayout> {
        self.live(id).and_then(|el| el.text_layout.as_ref())
    }

    /// Places the text cursor in `id` before character `index`.
    pub fn set_text_cursor(&mut self, id: ElementId, index: usize) {
        if !self.checked(id, "set_text_cursor") {
            return;
        }
        let count = self.elements[id].style.text.chars().count();
        self.batched(|ctx| {
            if let Some(old) = ctx.input.text_cursor.map(|c| c.element) {
                ctx.invalidate_element_rect(old);
            }
            ctx.input.text_cursor = Some(super::TextCursor {
                element: id,
                index: index.min(count),
                visible: true,
            });
            ctx.invalidate_element_rect(id);
        });
    }

    pub fn text_cursor(&self) -> Option<super::TextCursor> {
        self.input.text_cursor
    }

    /// Shows or hides the cursor without moving it, for host-driven blinking.
    pub fn set_text_cursor_visible(&mut self, visible: bool) {
        let Some(cursor) = self.input.text_cursor.as_mut() else {
            return;
        };
        if cursor.visible == visible {
            return;
        }
        cursor.visible = visible;
        let element = cursor.element;
        self.batched(|ctx| ctx.invalidate_element_rect(element));
    }

    fn clamp_text_cursor(&mut self) {
        let Some(cursor) = self.input.text_cursor.as_mut() else {
            return;
        };
        if let Some(el) = self.elements.get(cursor.element) {
            cursor.index = cursor.index.min(el.style.text.chars().count());
        }
    }

    /// Moves the cursor of the focused editable element. Returns false when the
    /// move does not apply.
    pub(crate) fn move_text_cursor(&mut self, id: ElementId, to: impl FnOnce(&TextLayout, usize) -> usize) -> bool {
        let Some(cursor) = self.input.text_cursor.filter(|c| c.element == id) else {
            return false;
        };
        let Some(layout) = self.live(id).and_then(|el| el.text_layout.as_ref()) else {
            return false;
        };
        let index = to(layout, cursor.index).min(layout.char_count());
        self.set_text_cursor(id, index);
        true
    }

    /// Replaces `remove` characters after the cursor (or before it, when
    /// `backwards`) with `insert`, then posts `TextChanged`.
    pub(crate) fn edit_text_at_cursor(&mut self, id: ElementId, insert: &str, remove: usize, backwards: bool) {
        let Some(cursor) = self.input.text_cursor.filter(|c| c.element == id) else {
            return;
        };
        let Some(el) = self.live(id) else {
            return;
        };
        let text = &el.style.text;
        let (start_char, end_char) = if backwards {
            (cursor.index.saturating_sub(remove), cursor.index)
        } else {
            (cursor.index, cursor.index + remove)
        };
        let start = byte_offset(text, start_char);
        let end = byte_offset(text, end_char);
        if start == end && insert.is_empty() {
            return;
        }
        let mut edited = String::with_capacity(text.len() + insert.len());
        edited.push_str(&text[..start]);
        edited.push_str(insert);
        edited.push_str(&text[end..]);
        let new_index = start_char + insert.chars().count();

        self.batched(|ctx| {
            ctx.set_element_text(id, &edited);
            ctx.set_text_cursor(id, new_index);
            ctx.post_event(id, ElementEvent::TextChanged);
        });
    }
}
