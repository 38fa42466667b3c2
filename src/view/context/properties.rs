//! Style setters and getters.
//!
//! Every setter is a no-op when the value is unchanged. Otherwise it stores the
//! value and invalidates exactly the layout facets and screen area that depend on
//! it, inside a batch.

use super::GuiContext;
use crate::style::{
    BackgroundRepeat, BorderMask, BoxBoundary, ChildAxis, ClippingMode, Color, Cursor,
    ElementStyle, HorizontalAlign, LayoutFlags, Length, Positioning, Side, VerticalAlign,
};
use crate::text::{FontSlant, FontWeight};
use crate::view::ElementId;
use smol_str::SmolStr;

impl GuiContext {
    /// Stores `value` in the field selected by `field`. Returns the previous
    /// value when it changed.
    fn replace_style<T: PartialEq>(
        &mut self,
        id: ElementId,
        op: &str,
        value: T,
        field: impl FnOnce(&mut ElementStyle) -> &mut T,
    ) -> Option<T> {
        if !self.checked(id, op) {
            return None;
        }
        let slot = field(&mut self.elements[id].style);
        if *slot == value {
            return None;
        }
        Some(std::mem::replace(slot, value))
    }

    fn invalidate_layout(&mut self, id: ElementId, flags: LayoutFlags) {
        self.batched(|ctx| ctx.invalidate_element_layout(id, flags));
    }

    fn repaint(&mut self, id: ElementId) {
        self.batched(|ctx| ctx.invalidate_element_rect(id));
    }

    /// Invalidates the percent-sized children of `id` on both axes.
    fn invalidate_percent_children(&mut self, id: ElementId) {
        let targets: Vec<(ElementId, LayoutFlags)> = self
            .children(id)
            .filter_map(|child| {
                let style = &self.live(child)?.style;
                let mut flags = LayoutFlags::empty();
                if style.width.is_percent() || style.min_width.is_percent() || style.max_width.is_percent() {
                    flags |= LayoutFlags::WIDTH;
                }
                if style.height.is_percent() || style.min_height.is_percent() || style.max_height.is_percent() {
                    flags |= LayoutFlags::HEIGHT;
                }
                (!flags.is_empty()).then_some((child, flags))
            })
            .collect();
        for (child, flags) in targets {
            self.invalidate_element_layout(child, flags);
        }
    }

    fn invalidate_children_positions(&mut self, id: ElementId) {
        let children: Vec<ElementId> = self.children(id).collect();
        for child in children {
            self.invalidate_element_layout(child, LayoutFlags::POSITION);
        }
    }

    fn set_axis_size(&mut self, id: ElementId, horizontal: bool, length: Length) {
        let op = if horizontal { "set_element_width" } else { "set_element_height" };
        let old = self.replace_style(id, op, length, |s| {
            if horizontal { &mut s.width } else { &mut s.height }
        });
        let Some(old) = old else {
            return;
        };
        self.batched(|ctx| {
            let mut flags = if horizontal { LayoutFlags::WIDTH } else { LayoutFlags::HEIGHT };
            if ctx.elements[id].text_layout.is_some() {
                flags |= LayoutFlags::TEXT;
            }
            ctx.invalidate_element_layout(id, flags);
            if old.is_percent() != length.is_percent() || old.is_auto() != length.is_auto() {
                let parent = ctx.elements[id].parent;
                ctx.invalidate_child_group(parent);
            }
        });
    }

    pub fn set_element_width(&mut self, id: ElementId, width: Length) {
        self.set_axis_size(id, true, width);
    }

    pub fn set_element_height(&mut self, id: ElementId, height: Length) {
        self.set_axis_size(id, false, height);
    }

    pub fn set_element_min_width(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_min_width", value, |s| &mut s.min_width).is_some() {
            self.invalidate_layout(id, LayoutFlags::WIDTH);
        }
    }

    pub fn set_element_max_width(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_max_width", value, |s| &mut s.max_width).is_some() {
            self.invalidate_layout(id, LayoutFlags::WIDTH);
        }
    }

    pub fn set_element_min_height(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_min_height", value, |s| &mut s.min_height).is_some() {
            self.invalidate_layout(id, LayoutFlags::HEIGHT);
        }
    }

    pub fn set_element_max_height(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_max_height", value, |s| &mut s.max_height).is_some() {
            self.invalidate_layout(id, LayoutFlags::HEIGHT);
        }
    }

    /// Margins change the outer size even when the border box stays put.
    pub fn set_element_margin(&mut self, id: ElementId, side: Side, value: Length) {
        if !self.checked(id, "set_element_margin") || self.elements[id].style.margin.get(side) == value {
            return;
        }
        self.elements[id].style.margin.set(side, value);
        self.batched(|ctx| {
            ctx.resolve_edges(id);
            ctx.invalidate_element_layout(
                id,
                LayoutFlags::SIZE | LayoutFlags::FORCE_WIDTH | LayoutFlags::FORCE_HEIGHT | LayoutFlags::POSITION,
            );
        });
    }

    pub fn set_element_padding(&mut self, id: ElementId, side: Side, value: Length) {
        if !self.checked(id, "set_element_padding") || self.elements[id].style.padding.get(side) == value {
            return;
        }
        self.elements[id].style.padding.set(side, value);
        self.batched(|ctx| ctx.on_inner_edges_changed(id));
    }

    pub fn set_element_border_width(&mut self, id: ElementId, side: Side, value: Length) {
        if !self.checked(id, "set_element_border_width") || self.elements[id].style.border_width.get(side) == value {
            return;
        }
        self.elements[id].style.border_width.set(side, value);
        self.batched(|ctx| ctx.on_inner_edges_changed(id));
    }

    /// Border or padding moved the content box.
    fn on_inner_edges_changed(&mut self, id: ElementId) {
        self.resolve_edges(id);
        let style = &self.elements[id].style;
        let mut flags = LayoutFlags::TEXT;
        if style.width.is_auto() {
            flags |= LayoutFlags::WIDTH;
        }
        if style.height.is_auto() {
            flags |= LayoutFlags::HEIGHT;
        }
        self.invalidate_element_layout(id, flags);
        self.invalidate_percent_children(id);
        self.invalidate_children_positions(id);
        self.invalidate_element_rect(id);
    }

    pub fn set_element_border_color(&mut self, id: ElementId, side: Side, color: Color) {
        if !self.checked(id, "set_element_border_color") || self.elements[id].style.border_color.get(side) == color {
            return;
        }
        self.elements[id].style.border_color.set(side, color);
        self.repaint(id);
    }

    pub fn set_element_border_mask(&mut self, id: ElementId, side: Side, mask: Option<BorderMask>) {
        if !self.checked(id, "set_element_border_mask") || self.elements[id].style.border_mask.get(side) == mask {
            return;
        }
        self.elements[id].style.border_mask.set(side, mask);
        self.repaint(id);
    }

    pub fn set_element_positioning(&mut self, id: ElementId, positioning: Positioning) {
        if self
            .replace_style(id, "set_element_positioning", positioning, |s| &mut s.positioning)
            .is_none()
        {
            return;
        }
        self.batched(|ctx| {
            ctx.invalidate_element_layout(id, LayoutFlags::SIZE | LayoutFlags::POSITION | LayoutFlags::FORCE_POSITION);
            let parent = ctx.elements[id].parent;
            ctx.invalidate_child_group(parent);
            ctx.invalidate_subtree_rects(id);
            ctx.input.hover_dirty = true;
        });
    }

    pub fn set_element_left(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_left", value, |s| &mut s.left).is_some() {
            self.invalidate_layout(id, LayoutFlags::POSITION);
        }
    }

    pub fn set_element_top(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_top", value, |s| &mut s.top).is_some() {
            self.invalidate_layout(id, LayoutFlags::POSITION);
        }
    }

    pub fn set_element_right(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_right", value, |s| &mut s.right).is_some() {
            self.invalidate_layout(id, LayoutFlags::POSITION);
        }
    }

    pub fn set_element_bottom(&mut self, id: ElementId, value: Length) {
        if self.replace_style(id, "set_element_bottom", value, |s| &mut s.bottom).is_some() {
            self.invalidate_layout(id, LayoutFlags::POSITION);
        }
    }

    /// Anchor horizontally by `right` instead of `left`.
    pub fn set_element_right_priority(&mut self, id: ElementId, enabled: bool) {
        if self
            .replace_style(id, "set_element_right_priority", enabled, |s| &mut s.right_has_priority)
            .is_some()
        {
            self.invalidate_layout(id, LayoutFlags::POSITION);
        }
    }

    pub fn set_element_bottom_priority(&mut self, id: ElementId, enabled: bool) {
        if self
            .replace_style(id, "set_element_bottom_priority", enabled, |s| &mut s.bottom_has_priority)
            .is_some()
        {
            self.invalidate_layout(id, LayoutFlags::POSITION);
        }
    }

    /// Which box of the parent relative offsets are measured from.
    pub fn set_element_position_origin(&mut self, id: ElementId, boundary: BoxBoundary) {
        if self
            .replace_style(id, "set_element_position_origin", boundary, |s| &mut s.position_origin)
            .is_some()
        {
            self.invalidate_layout(id, LayoutFlags::POSITION);
        }
    }

    /// Pins the element at `(x, y)` from its parent's top-left, switching flow
    /// elements to relative positioning.
    pub fn set_element_position(&mut self, id: ElementId, x: f32, y: f32) {
        if !self.checked(id, "set_element_position") {
            return;
        }
        self.batched(|ctx| {
            if ctx.elements[id].style.positioning == Positioning::Auto {
                ctx.set_element_positioning(id, Positioning::Relative);
            }
            ctx.set_element_left(id, Length::px(x));
            ctx.set_element_top(id, Length::px(y));
            ctx.set_element_right_priority(id, false);
            ctx.set_element_bottom_priority(id, false);
        });
    }

    pub fn set_element_child_axis(&mut self, id: ElementId, axis: ChildAxis) {
        if self.replace_style(id, "set_element_child_axis", axis, |s| &mut s.child_axis).is_none() {
            return;
        }
        self.batched(|ctx| {
            ctx.invalidate_child_group(Some(id));
            ctx.invalidate_percent_children(id);
        });
    }

    pub fn set_element_horizontal_align(&mut self, id: ElementId, align: HorizontalAlign) {
        if self
            .replace_style(id, "set_element_horizontal_align", align, |s| &mut s.horizontal_align)
            .is_some()
        {
            self.batched(|ctx| ctx.on_alignment_changed(id));
        }
    }

    pub fn set_element_vertical_align(&mut self, id: ElementId, align: VerticalAlign) {
        if self
            .replace_style(id, "set_element_vertical_align", align, |s| &mut s.vertical_align)
            .is_some()
        {
            self.batched(|ctx| ctx.on_alignment_changed(id));
        }
    }

    fn on_alignment_changed(&mut self, id: ElementId) {
        self.invalidate_element_layout(id, LayoutFlags::TEXT);
        if let Some(first) = self.first_auto_positioned(self.children(id).collect()) {
            self.invalidate_element_layout(first, LayoutFlags::POSITION);
        }
    }

    pub fn set_element_flex_children_width(&mut self, id: ElementId, enabled: bool) {
        if self
            .replace_style(id, "set_element_flex_children_width", enabled, |s| &mut s.flex_children_width)
            .is_some()
        {
            self.batched(|ctx| {
                ctx.invalidate_child_group(Some(id));
                ctx.invalidate_percent_children(id);
            });
        }
    }

    pub fn set_element_flex_children_height(&mut self, id: ElementId, enabled: bool) {
        if self
            .replace_style(id, "set_element_flex_children_height", enabled, |s| &mut s.flex_children_height)
            .is_some()
        {
            self.batched(|ctx| {
                ctx.invalidate_child_group(Some(id));
                ctx.invalidate_percent_children(id);
            });
        }
    }

    /// Which box of this element 100% refers to for its children's widths.
    pub fn set_element_children_width_boundary(&mut self, id: ElementId, boundary: BoxBoundary) {
        if self
            .replace_style(id, "set_element_children_width_boundary", boundary, |s| {
                &mut s.children_width_boundary
            })
            .is_some()
        {
            self.batched(|ctx| {
                ctx.invalidate_percent_children(id);
                ctx.invalidate_children_positions(id);
            });
        }
    }

    pub fn set_element_children_height_boundary(&mut self, id: ElementId, boundary: BoxBoundary) {
        if self
            .replace_style(id, "set_element_children_height_boundary", boundary, |s| {
                &mut s.children_height_boundary
            })
            .is_some()
        {
            self.batched(|ctx| {
                ctx.invalidate_percent_children(id);
                ctx.invalidate_children_positions(id);
            });
        }
    }

    pub fn set_element_clipping_boundary(&mut self, id: ElementId, boundary: BoxBoundary) {
        if !self.checked(id, "set_element_clipping_boundary") {
            return;
        }
        self.batched(|ctx| {
            ctx.invalidate_subtree_rects(id);
            if ctx
                .replace_style(id, "set_element_clipping_boundary", boundary, |s| &mut s.clipping_boundary)
                .is_some()
            {
                ctx.invalidate_subtree_rects(id);
                ctx.input.hover_dirty = true;
            }
        });
    }

    pub fn set_element_clipping_mode(&mut self, id: ElementId, mode: ClippingMode) {
        if !self.checked(id, "set_element_clipping_mode") {
            return;
        }
        self.batched(|ctx| {
            ctx.invalidate_subtree_rects(id);
            if ctx
                .replace_style(id, "set_element_clipping_mode", mode, |s| &mut s.clipping_mode)
                .is_some()
            {
                ctx.invalidate_subtree_rects(id);
                ctx.input.hover_dirty = true;
            }
        });
    }

    /// Invisible elements lay out as 0x0, take no flow space and are neither
    /// painted nor hit.
    pub fn set_element_visible(&mut self, id: ElementId, visible: bool) {
        if !self.checked(id, "set_element_visible") || self.elements[id].style.visible == visible {
            return;
        }
        self.batched(|ctx| {
            ctx.invalidate_subtree_rects(id);
            ctx.elements[id].style.visible = visible;
            ctx.invalidate_element_layout(id, LayoutFlags::ALL | LayoutFlags::FORCE_ALL);
            let parent = ctx.elements[id].parent;
            ctx.invalidate_child_group(parent);
            ctx.invalidate_subtree_rects(id);
            ctx.input.hover_dirty = true;
        });
    }

    pub fn set_element_background_color(&mut self, id: ElementId, color: Color) {
        if self
            .replace_style(id, "set_element_background_color", color, |s| &mut s.background_color)
            .is_some()
        {
            self.repaint(id);
        }
    }

    pub fn set_element_background_boundary(&mut self, id: ElementId, boundary: BoxBoundary) {
        if self
            .replace_style(id, "set_element_background_boundary", boundary, |s| &mut s.background_boundary)
            .is_some()
        {
            self.repaint(id);
        }
    }

    /// Sets or clears the background image. Returns false, leaving the element
    /// untouched, when the image cannot be acquired.
    pub fn set_element_background_image(&mut self, id: ElementId, path: Option<&str>) -> bool {
        if !self.checked(id, "set_element_background_image") {
            return false;
        }
        if self.elements[id].style.background_image.as_deref() == path {
            return true;
        }
        let image = match path {
            Some(path) => {
                let Some(images) = self.images.as_deref_mut() else {
                    log::warn!("set_element_background_image: no image manager for {path}");
                    return false;
                };
                match images.acquire_image(path) {
                    Ok(image) => Some(image),
                    Err(err) => {
                        log::warn!("{err}");
                        return false;
                    }
                }
            }
            None => None,
        };
        self.batched(|ctx| {
            if let Some(image) = image {
                ctx.retain_image(image);
            }
            let el = &mut ctx.elements[id];
            el.style.background_image = path.map(SmolStr::new);
            let old = std::mem::replace(&mut el.background_image, image);
            if let Some(old) = old {
                ctx.release_image(old);
            }
            ctx.invalidate_element_rect(id);
        });
        true
    }

    pub fn set_element_background_image_color(&mut self, id: ElementId, color: Color) {
        if self
            .replace_style(id, "set_element_background_image_color", color, |s| &mut s.background_image_color)
            .is_some()
        {
            self.repaint(id);
        }
    }

    pub fn set_element_background_repeat_x(&mut self, id: ElementId, repeat: BackgroundRepeat) {
        if self
            .replace_style(id, "set_element_background_repeat_x", repeat, |s| &mut s.background_repeat_x)
            .is_some()
        {
            self.repaint(id);
        }
    }

    pub fn set_element_background_repeat_y(&mut self, id: ElementId, repeat: BackgroundRepeat) {
        if self
            .replace_style(id, "set_element_background_repeat_y", repeat, |s| &mut s.background_repeat_y)
            .is_some()
        {
            self.repaint(id);
        }
    }

    pub fn set_element_text_color(&mut self, id: ElementId, color: Color) {
        if self
            .replace_style(id, "set_element_text_color", color, |s| &mut s.text_color)
            .is_some()
        {
            self.repaint(id);
        }
    }

    /// `None` inherits the family from the nearest ancestor that sets one.
    pub fn set_element_font_family(&mut self, id: ElementId, family: Option<&str>) {
        let family = family.map(SmolStr::new);
        if self
            .replace_style(id, "set_element_font_family", family, |s| &mut s.font_family)
            .is_some()
        {
            self.batched(|ctx| ctx.invalidate_subtree_text(id));
        }
    }

    /// Percentages refer to the inherited size.
    pub fn set_element_font_size(&mut self, id: ElementId, size: Option<Length>) {
        if self
            .replace_style(id, "set_element_font_size", size, |s| &mut s.font_size)
            .is_some()
        {
            self.batched(|ctx| ctx.invalidate_subtree_text(id));
        }
    }

    pub fn set_element_font_weight(&mut self, id: ElementId, weight: Option<FontWeight>) {
        if self
            .replace_style(id, "set_element_font_weight", weight, |s| &mut s.font_weight)
            .is_some()
        {
            self.batched(|ctx| ctx.invalidate_subtree_text(id));
        }
    }

    pub fn set_element_font_slant(&mut self, id: ElementId, slant: Option<FontSlant>) {
        if self
            .replace_style(id, "set_element_font_slant", slant, |s| &mut s.font_slant)
            .is_some()
        {
            self.batched(|ctx| ctx.invalidate_subtree_text(id));
        }
    }

    pub fn set_element_multiline_text(&mut self, id: ElementId, enabled: bool) {
        if self
            .replace_style(id, "set_element_multiline_text", enabled, |s| &mut s.multiline_text)
            .is_some()
        {
            self.invalidate_layout(id, LayoutFlags::TEXT);
        }
    }

    pub fn set_element_editable_text(&mut self, id: ElementId, enabled: bool) {
        if self
            .replace_style(id, "set_element_editable_text", enabled, |s| &mut s.editable_text)
            .is_none()
        {
            return;
        }
        self.batched(|ctx| {
            if !enabled && ctx.input.text_cursor.is_some_and(|c| c.element == id) {
                ctx.input.text_cursor = None;
            }
            ctx.invalidate_element_layout(id, LayoutFlags::TEXT);
        });
    }

    /// `None` inherits the cursor from the nearest ancestor that sets one.
    pub fn set_element_cursor(&mut self, id: ElementId, cursor: Option<Cursor>) {
        if self
            .replace_style(id, "set_element_cursor", cursor, |s| &mut s.cursor)
            .is_some()
        {
            self.batched(|ctx| ctx.input.hover_dirty = true);
        }
    }

    /// Pass-through elements are skipped by hit testing; their children are not.
    pub fn set_element_pass_through(&mut self, id: ElementId, enabled: bool) {
        if self
            .replace_style(id, "set_element_pass_through", enabled, |s| &mut s.pass_through)
            .is_some()
        {
            self.batched(|ctx| ctx.input.hover_dirty = true);
        }
    }

    pub fn set_element_focus_on_click(&mut self, id: ElementId, enabled: bool) {
        self.replace_style(id, "set_element_focus_on_click", enabled, |s| &mut s.focus_on_click);
    }

    pub fn set_element_scroll_on_wheel(&mut self, id: ElementId, enabled: bool) {
        self.replace_style(id, "set_element_scroll_on_wheel", enabled, |s| &mut s.scroll_on_wheel);
    }

    /// Scroll offset applied to the absolute positions of all children.
    pub fn set_element_inner_offset(&mut self, id: ElementId, x: f32, y: f32) {
        let Some(el) = self.live_mut(id) else {
            log::warn!("set_element_inner_offset: stale or deleted element {id:?}");
            return;
        };
        if el.layout.inner_offset_x == x && el.layout.inner_offset_y == y {
            return;
        }
        el.layout.inner_offset_x = x;
        el.layout.inner_offset_y = y;
        self.batched(|ctx| {
            let children: Vec<ElementId> = ctx.children(id).collect();
            ctx.layout.absolute_dirty.extend(children);
            ctx.invalidate_element_rect(id);
            ctx.input.hover_dirty = true;
        });
    }

    pub fn element_inner_offset(&self, id: ElementId) -> Option<(f32, f32)> {
        self.live(id)
            .map(|el| (el.layout.inner_offset_x, el.layout.inner_offset_y))
    }
}
