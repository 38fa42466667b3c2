//! Inbound input: hover tracking, capture, focus and text editing keys.

use super::GuiContext;
use crate::style::{ChildAxis, Cursor};
use crate::ui::{ElementEvent, Key, KeyModifiers, MouseButton};
use crate::view::{ElementId, SurfaceId};

/// Pixels scrolled per wheel notch, before DPI scaling.
const WHEEL_STEP: f32 = 20.0;

/// Caret inside an element's text, placed before character `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCursor {
    pub element: ElementId,
    pub index: usize,
    pub visible: bool,
}

#[derive(Default)]
pub(crate) struct InputState {
    pub(crate) capture: Option<ElementId>,
    /// Literal hit target; its ancestors count as hovered too.
    pub(crate) hovered: Option<ElementId>,
    /// Elements sent MouseEnter without a matching MouseLeave yet. Lags
    /// the hovered chain while capture suppresses notifications.
    pub(crate) notified: Vec<ElementId>,
    pub(crate) focus: Option<ElementId>,
    pub(crate) surface_under_mouse: Option<SurfaceId>,
    pub(crate) mouse_x: f32,
    pub(crate) mouse_y: f32,
    pub(crate) cursor: Cursor,
    pub(crate) text_cursor: Option<TextCursor>,
    /// Layout changed under a stationary mouse; hit-test again.
    pub(crate) hover_dirty: bool,
}

impl GuiContext {
    pub fn on_mouse_enter(&mut self, surface: SurfaceId, x: f32, y: f32) {
        self.on_mouse_move(surface, x, y);
    }

    pub fn on_mouse_move(&mut self, surface: SurfaceId, x: f32, y: f32) {
        if !self.checked_surface(surface, "on_mouse_move") {
            return;
        }
        self.batched(|ctx| {
            if ctx.input.surface_under_mouse != Some(surface) {
                if ctx.input.surface_under_mouse.is_some() {
                    ctx.update_hovered(None);
                }
                ctx.input.surface_under_mouse = Some(surface);
            }
            ctx.input.mouse_x = x;
            ctx.input.mouse_y = y;
            let hit = ctx.find_element_under_point(surface, x, y);
            ctx.update_hovered(hit);
            if let Some(target) = ctx.mouse_target() {
                let (x, y) = ctx.to_local(target, x, y);
                ctx.post_event(target, ElementEvent::MouseMove { x, y });
            }
        });
    }

    pub fn on_mouse_leave(&mut self, surface: SurfaceId) {
        if self.input.surface_under_mouse != Some(surface) {
            return;
        }
        self.batched(|ctx| {
            ctx.update_hovered(None);
            ctx.input.surface_under_mouse = None;
        });
    }

    pub fn on_mouse_button_pressed(&mut self, button: MouseButton) {
        self.batched(|ctx| {
            let Some(target) = ctx.mouse_target() else {
                return;
            };
            let (x, y) = ctx.to_local(target, ctx.input.mouse_x, ctx.input.mouse_y);
            ctx.post_event(target, ElementEvent::MouseButtonDown { button, x, y });
            let Some(el) = ctx.live(target) else {
                return;
            };
            let (focus_on_click, editable) = (el.style.focus_on_click, el.style.editable_text);
            if focus_on_click {
                ctx.set_keyboard_focus(Some(target));
            }
            if editable && ctx.input.focus == Some(target) {
                ctx.place_text_cursor_at_mouse(target);
            }
        });
    }

    pub fn on_mouse_button_released(&mut self, button: MouseButton) {
        self.batched(|ctx| {
            if let Some(target) = ctx.mouse_target() {
                let (x, y) = ctx.to_local(target, ctx.input.mouse_x, ctx.input.mouse_y);
                ctx.post_event(target, ElementEvent::MouseButtonUp { button, x, y });
            }
        });
    }

    pub fn on_mouse_button_double_clicked(&mut self, button: MouseButton) {
        self.batched(|ctx| {
            if let Some(target) = ctx.mouse_target() {
                let (x, y) = ctx.to_local(target, ctx.input.mouse_x, ctx.input.mouse_y);
                ctx.post_event(target, ElementEvent::MouseButtonDoubleClick { button, x, y });
            }
        });
    }

    /// `delta` is in notches, positive away from the user. The nearest
    /// scrollable ancestor of the target scrolls its children.
    pub fn on_mouse_wheel(&mut self, delta: f32) {
        self.batched(|ctx| {
            let Some(target) = ctx.mouse_target() else {
                return;
            };
            ctx.post_event(target, ElementEvent::MouseWheel { delta });
            let scrollable = ctx
                .ancestor_chain(Some(target))
                .into_iter()
                .find(|id| ctx.live(*id).is_some_and(|el| el.style.scroll_on_wheel));
            if let Some(id) = scrollable {
                ctx.scroll_by(id, delta);
            }
        });
    }

    pub fn on_key_pressed(&mut self, key: Key, modifiers: KeyModifiers) {
        let Some(focus) = self.keyboard_focus() else {
            return;
        };
        self.batched(|ctx| {
            ctx.post_event(focus, ElementEvent::KeyPressed { key, modifiers });
            let Some(el) = ctx.live(focus) else {
                return;
            };
            if !el.style.editable_text {
                return;
            }
            let multiline = el.style.multiline_text;
            match key {
                Key::Left => {
                    ctx.move_text_cursor(focus, |_, index| index.saturating_sub(1));
                }
                Key::Right => {
                    ctx.move_text_cursor(focus, |_, index| index + 1);
                }
                Key::Home => {
                    ctx.move_text_cursor(focus, |layout, index| layout.line_start(index));
                }
                Key::End => {
                    ctx.move_text_cursor(focus, |layout, index| layout.line_end(index));
                }
                Key::Up | Key::Down => {
                    let down = key == Key::Down;
                    ctx.move_text_cursor(focus, |layout, index| {
                        let (x, y) = layout.cursor_position(index);
                        let line_height = layout.line_height();
                        let target_y = if down {
                            y + line_height * 1.5
                        } else {
                            y - line_height * 0.5
                        };
                        layout.char_index_at(x, target_y)
                    });
                }
                Key::Backspace => ctx.edit_text_at_cursor(focus, "", 1, true),
                Key::Delete => ctx.edit_text_at_cursor(focus, "", 1, false),
                Key::Enter if multiline => ctx.edit_text_at_cursor(focus, "\n", 0, false),
                _ => {}
            }
        });
    }

    pub fn on_key_released(&mut self, key: Key, modifiers: KeyModifiers) {
        if let Some(focus) = self.keyboard_focus() {
            self.batched(|ctx| ctx.post_event(focus, ElementEvent::KeyReleased { key, modifiers }));
        }
    }

    /// Inserts `ch` at the text cursor when the focused element is editable.
    pub fn on_printable_key_down(&mut self, ch: char) {
        let Some(focus) = self.keyboard_focus() else {
            return;
        };
        self.batched(|ctx| {
            ctx.post_event(focus, ElementEvent::PrintableKeyDown { ch });
            let editable = ctx.live(focus).is_some_and(|el| el.style.editable_text);
            if editable && !ch.is_control() {
                let mut buffer = [0u8; 4];
                ctx.edit_text_at_cursor(focus, ch.encode_utf8(&mut buffer), 0, false);
            }
        });
    }

    /// Moves keyboard focus, posting `LoseFocus` and `ReceiveFocus`. Editable
    /// elements get the text cursor at the end of their text.
    pub fn set_keyboard_focus(&mut self, id: Option<ElementId>) {
        if let Some(id) = id {
            if !self.checked(id, "set_keyboard_focus") {
                return;
            }
        }
        if self.input.focus == id {
            return;
        }
        self.batched(|ctx| {
            let old = std::mem::replace(&mut ctx.input.focus, id);
            if let Some(old) = old {
                if ctx.input.text_cursor.is_some_and(|c| c.element == old) {
                    ctx.input.text_cursor = None;
                    ctx.invalidate_element_rect(old);
                }
                ctx.post_event(old, ElementEvent::LoseFocus);
            }
            let Some(new) = id.filter(|new| ctx.input.focus == Some(*new)) else {
                return;
            };
            if let Some(el) = ctx.live(new) {
                if el.style.editable_text {
                    let end = el.style.text.chars().count();
                    ctx.set_text_cursor(new, end);
                }
            }
            ctx.post_event(new, ElementEvent::ReceiveFocus);
        });
    }

    pub fn release_keyboard_focus(&mut self) {
        self.set_keyboard_focus(None);
    }

    pub fn keyboard_focus(&self) -> Option<ElementId> {
        self.input.focus.filter(|id| self.live(*id).is_some())
    }

    /// Routes all mouse input to `id` until released with `None`. Enter and
    /// leave are suppressed for every other element meanwhile.
    pub fn set_mouse_event_capture(&mut self, id: Option<ElementId>) {
        if let Some(id) = id {
            if !self.checked(id, "set_mouse_event_capture") {
                return;
            }
        }
        if self.input.capture == id {
            return;
        }
        self.batched(|ctx| {
            ctx.input.capture = id;
            ctx.sync_hover_notifications();
            ctx.input.hover_dirty = true;
        });
    }

    pub fn mouse_event_capture(&self) -> Option<ElementId> {
        self.input.capture.filter(|id| self.live(*id).is_some())
    }

    /// The literal hit target under the mouse.
    pub fn hovered_element(&self) -> Option<ElementId> {
        self.input.hovered.filter(|id| self.live(*id).is_some())
    }

    /// Whether `id` or one of its descendants is under the mouse.
    pub fn is_element_hovered(&self, id: ElementId) -> bool {
        self.hovered_element()
            .is_some_and(|hovered| self.is_ancestor_or_self(id, hovered))
    }

    pub fn current_cursor(&self) -> Cursor {
        self.input.cursor
    }

    pub fn mouse_position(&self) -> Option<(SurfaceId, f32, f32)> {
        self.input
            .surface_under_mouse
            .map(|surface| (surface, self.input.mouse_x, self.input.mouse_y))
    }

    fn mouse_target(&self) -> Option<ElementId> {
        self.mouse_event_capture().or_else(|| self.hovered_element())
    }

    fn to_local(&self, id: ElementId, x: f32, y: f32) -> (f32, f32) {
        match self.element_absolute_position(id) {
            Some((ax, ay)) => (x - ax, y - ay),
            None => (x, y),
        }
    }

    /// `id` followed by its live ancestors, innermost first.
    fn ancestor_chain(&self, id: Option<ElementId>) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(id) = current {
            let Some(el) = self.live(id) else {
                break;
            };
            chain.push(id);
            current = el.parent;
        }
        chain
    }

    /// Changes the hit target and brings enter/leave notifications in line.
    pub(crate) fn update_hovered(&mut self, hit: Option<ElementId>) {
        if self.input.hovered == hit {
            return;
        }
        self.input.hovered = hit;
        self.sync_hover_notifications();
        self.update_cursor();
    }

    /// Diffs the notified chain against the hovered chain, posting leave
    /// inner-to-outer and enter outer-to-inner. Under capture only the
    /// capturing element changes state; everyone else keeps what they were
    /// last told until the capture is released.
    fn sync_hover_notifications(&mut self) {
        let hovered = self.ancestor_chain(self.hovered_element());
        let capture = self.mouse_event_capture();
        let mut notified = std::mem::take(&mut self.input.notified);
        notified.retain(|id| self.live(*id).is_some());

        let target: Vec<ElementId> = match capture {
            None => hovered,
            Some(c) => notified
                .iter()
                .copied()
                .filter(|id| *id != c && !hovered.contains(id))
                .chain(
                    hovered
                        .iter()
                        .copied()
                        .filter(|id| *id == c || notified.contains(id)),
                )
                .collect(),
        };
        let leaving: Vec<ElementId> = notified
            .iter()
            .copied()
            .filter(|id| !target.contains(id))
            .collect();
        let entering: Vec<ElementId> = target
            .iter()
            .rev()
            .copied()
            .filter(|id| !notified.contains(id))
            .collect();
        self.input.notified = target;

        for id in leaving {
            self.post_event(id, ElementEvent::MouseLeave);
        }
        for id in entering {
            self.post_event(id, ElementEvent::MouseEnter);
        }
    }

    /// Re-runs the hit test after layout moved things under a stationary mouse.
    pub(crate) fn update_hover_after_layout(&mut self) {
        if !std::mem::take(&mut self.input.hover_dirty) {
            return;
        }
        let Some(surface) = self.input.surface_under_mouse else {
            return;
        };
        if !self.surfaces.contains_key(surface) {
            self.input.surface_under_mouse = None;
            self.update_hovered(None);
            return;
        }
        let hit = self.find_element_under_point(surface, self.input.mouse_x, self.input.mouse_y);
        self.update_hovered(hit);
        self.update_cursor();
    }

    /// Cursor of the nearest hovered ancestor that sets one.
    fn resolve_cursor(&self) -> Cursor {
        self.ancestor_chain(self.hovered_element())
            .into_iter()
            .find_map(|id| self.live(id).and_then(|el| el.style.cursor))
            .unwrap_or_default()
    }

    fn update_cursor(&mut self) {
        let cursor = self.resolve_cursor();
        if cursor == self.input.cursor {
            return;
        }
        self.input.cursor = cursor;
        log::debug!("cursor changed to {cursor:?}");
        let globals: Vec<_> = self.global_handlers.iter().map(|(_, h)| h.clone()).collect();
        for handler in globals {
            handler.on_cursor_changed(self, cursor);
        }
    }

    fn place_text_cursor_at_mouse(&mut self, id: ElementId) {
        let Some(inner) = self.element_inner_rect(id) else {
            return;
        };
        let Some(layout) = self.live(id).and_then(|el| el.text_layout.as_ref()) else {
            return;
        };
        let index = layout.char_index_at(self.input.mouse_x - inner.left, self.input.mouse_y - inner.top);
        self.set_text_cursor(id, index);
    }

    /// Range the children of `id` can scroll through along its child axis.
    fn scroll_extent(&self, id: ElementId) -> (f32, f32) {
        let Some(el) = self.live(id) else {
            return (0.0, 0.0);
        };
        let inner = (el.layout.inner_width(), el.layout.inner_height());
        let (mut right, mut bottom) = (0.0f32, 0.0f32);
        for child in self.children(id) {
            let Some(ch) = self.live(child) else {
                continue;
            };
            let l = &ch.layout;
            right = right.max(l.relative_x + l.width + l.margin.right - el.layout.border.left - el.layout.padding.left);
            bottom = bottom.max(l.relative_y + l.height + l.margin.bottom - el.layout.border.top - el.layout.padding.top);
        }
        ((right - inner.0).max(0.0), (bottom - inner.1).max(0.0))
    }

    fn scroll_by(&mut self, id: ElementId, delta: f32) {
        let Some(el) = self.live(id) else {
            return;
        };
        let horizontal = el.style.child_axis == ChildAxis::Horizontal;
        let step = delta * WHEEL_STEP * self.dpi_scale(el.surface, horizontal);
        let (x, y) = (el.layout.inner_offset_x, el.layout.inner_offset_y);
        let (range_x, range_y) = self.scroll_extent(id);
        let (x, y) = if horizontal {
            ((x + step).clamp(-range_x, 0.0), y)
        } else {
            (x, (y + step).clamp(-range_y, 0.0))
        };
        self.set_element_inner_offset(id, x, y);
    }
}
