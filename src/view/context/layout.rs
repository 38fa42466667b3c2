//! Incremental box layout.
//!
//! Each element validates its width, text, height and position facets
//! independently. A facet whose result changes invalidates the facets of other
//! elements that depend on it; the batch keeps draining the work-list until no
//! element is pending.

use super::GuiContext;
use crate::style::{
    BoxBoundary, ChildAxis, EdgeWidths, ElementLayout, ElementStyle, HorizontalAlign,
    LayoutChanges, LayoutFlags, Length, Positioning, Sides, VerticalAlign,
};
use crate::ui::ElementEvent;
use crate::view::{Element, ElementId, Rect, SurfaceId};

fn size_flag(horizontal: bool) -> LayoutFlags {
    if horizontal { LayoutFlags::WIDTH } else { LayoutFlags::HEIGHT }
}

fn force_flag(horizontal: bool) -> LayoutFlags {
    if horizontal {
        LayoutFlags::FORCE_WIDTH
    } else {
        LayoutFlags::FORCE_HEIGHT
    }
}

fn change_flag(horizontal: bool) -> LayoutChanges {
    if horizontal {
        LayoutChanges::WIDTH
    } else {
        LayoutChanges::HEIGHT
    }
}

/// (size, min, max) for one axis.
fn axis_lengths(style: &ElementStyle, horizontal: bool) -> (Length, Length, Length) {
    if horizontal {
        (style.width, style.min_width, style.max_width)
    } else {
        (style.height, style.min_height, style.max_height)
    }
}

pub(crate) fn align_horizontal(align: HorizontalAlign, free: f32) -> f32 {
    match align {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => free * 0.5,
        HorizontalAlign::Right => free,
    }
}

pub(crate) fn align_vertical(align: VerticalAlign, free: f32) -> f32 {
    match align {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Center => free * 0.5,
        VerticalAlign::Bottom => free,
    }
}

/// Inset from the border box to the given boundary.
pub(crate) fn boundary_edges(layout: &ElementLayout, boundary: BoxBoundary) -> EdgeWidths {
    match boundary {
        BoxBoundary::Outer => EdgeWidths::default(),
        BoxBoundary::InnerBorder => layout.border,
        BoxBoundary::Inner => EdgeWidths {
            left: layout.border.left + layout.padding.left,
            top: layout.border.top + layout.padding.top,
            right: layout.border.right + layout.padding.right,
            bottom: layout.border.bottom + layout.padding.bottom,
        },
    }
}

fn resolve_sides(sides: &Sides<Length>, scale_x: f32, scale_y: f32) -> EdgeWidths {
    EdgeWidths {
        left: sides.left.resolve_edge(scale_x),
        top: sides.top.resolve_edge(scale_y),
        right: sides.right.resolve_edge(scale_x),
        bottom: sides.bottom.resolve_edge(scale_y),
    }
}

/// Border-box origin for an element anchored inside `container`.
fn anchored_offset(el: &Element, container: Rect, base: (f32, f32), scale: (f32, f32)) -> (f32, f32) {
    let style = &el.style;
    let layout = &el.layout;
    let x = if style.right_has_priority {
        let right = style.right.resolve(base.0, scale.0).unwrap_or(0.0);
        container.right - right - layout.width - layout.margin.right
    } else {
        let left = style.left.resolve(base.0, scale.0).unwrap_or(0.0);
        container.left + left + layout.margin.left
    };
    let y = if style.bottom_has_priority {
        let bottom = style.bottom.resolve(base.1, scale.1).unwrap_or(0.0);
        container.bottom - bottom - layout.height - layout.margin.bottom
    } else {
        let top = style.top.resolve(base.1, scale.1).unwrap_or(0.0);
        container.top + top + layout.margin.top
    };
    (x, y)
}

impl GuiContext {
    /// Re-derives border, margin and padding widths from the style.
    pub(crate) fn resolve_edges(&mut self, id: ElementId) {
        let Some(el) = self.live(id) else {
            return;
        };
        let scale_x = self.dpi_scale(el.surface, true);
        let scale_y = self.dpi_scale(el.surface, false);
        let border = resolve_sides(&el.style.border_width, scale_x, scale_y);
        let margin = resolve_sides(&el.style.margin, scale_x, scale_y);
        let padding = resolve_sides(&el.style.padding, scale_x, scale_y);
        if let Some(el) = self.live_mut(id) {
            el.layout.border = border;
            el.layout.margin = margin;
            el.layout.padding = padding;
        }
    }

    /// Re-derives DPI-scaled values and fully invalidates every element on
    /// `surface`, or on every surface when `None`.
    pub(crate) fn invalidate_dpi(&mut self, surface: Option<SurfaceId>) {
        let ids: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|(_, el)| el.is_alive() && el.surface.is_some())
            .filter(|(_, el)| surface.is_none() || el.surface == surface)
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            if self.live(id).is_some_and(|el| el.style.has_any_dpi_scaled_edges()) {
                self.resolve_edges(id);
            }
            self.invalidate_element_layout(id, LayoutFlags::ALL | LayoutFlags::FORCE_ALL);
        }
    }

    /// Invalidates what depends on the membership of `parent`'s child list: its
    /// auto size, flexed children and the flow group.
    pub(crate) fn invalidate_child_group(&mut self, parent: Option<ElementId>) {
        let Some(parent) = parent else {
            return;
        };
        let Some(p) = self.live(parent) else {
            return;
        };
        let mut parent_flags = LayoutFlags::empty();
        if p.style.width.is_auto() {
            parent_flags |= LayoutFlags::WIDTH;
        }
        if p.style.height.is_auto() {
            parent_flags |= LayoutFlags::HEIGHT;
        }
        let flex_x = p.style.flexes_children_along(true);
        let flex_y = p.style.flexes_children_along(false);

        let mut flexed = Vec::new();
        for child in self.children(parent) {
            let Some(el) = self.live(child) else {
                continue;
            };
            if !el.is_auto_positioned() {
                continue;
            }
            let mut flags = LayoutFlags::empty();
            if flex_x && el.style.width.is_percent() {
                flags |= LayoutFlags::WIDTH;
            }
            if flex_y && el.style.height.is_percent() {
                flags |= LayoutFlags::HEIGHT;
            }
            if !flags.is_empty() {
                flexed.push((child, flags));
            }
        }

        if !parent_flags.is_empty() {
            self.invalidate_element_layout(parent, parent_flags);
        }
        for (child, flags) in flexed {
            self.invalidate_element_layout(child, flags);
        }
        if let Some(first) = self.first_auto_positioned(self.children(parent).collect()) {
            self.invalidate_element_layout(first, LayoutFlags::POSITION);
        }
    }

    pub(crate) fn first_auto_positioned(&self, ids: Vec<ElementId>) -> Option<ElementId> {
        ids.into_iter()
            .find(|id| self.live(*id).is_some_and(|el| el.is_auto_positioned()))
    }

    fn invalid_flags(&self, id: ElementId) -> LayoutFlags {
        self.live(id)
            .map(|el| el.layout.invalid)
            .unwrap_or_default()
    }

    pub(crate) fn validate_pending(&mut self) {
        while let Some(id) = self.layout.work_list.pop_front() {
            let Some(el) = self.live_mut(id) else {
                continue;
            };
            el.layout.queued = false;
            self.validate_element(id);
        }
    }

    fn validate_element(&mut self, id: ElementId) {
        if self.invalid_flags(id).contains(LayoutFlags::WIDTH) {
            self.validate_size(id, true);
        }
        if self.invalid_flags(id).contains(LayoutFlags::TEXT) {
            self.validate_text(id);
        }
        if self.invalid_flags(id).contains(LayoutFlags::HEIGHT) {
            self.validate_size(id, false);
        }
        if self.invalid_flags(id).contains(LayoutFlags::POSITION) {
            self.validate_position(id);
        }
        if let Some(el) = self.live_mut(id) {
            if !el.layout.invalid.intersects(LayoutFlags::ALL) {
                el.layout.invalid = LayoutFlags::empty();
            }
        }
    }

    pub(crate) fn ensure_size_valid(&mut self, id: ElementId, horizontal: bool) {
        if self.invalid_flags(id).contains(size_flag(horizontal)) {
            self.validate_size(id, horizontal);
        }
    }

    fn validate_size(&mut self, id: ElementId, horizontal: bool) {
        let Some(el) = self.live_mut(id) else {
            return;
        };
        let forced = el.layout.invalid.contains(force_flag(horizontal));
        el.layout.invalid.remove(size_flag(horizontal) | force_flag(horizontal));
        let (size, min, max) = axis_lengths(&el.style, horizontal);
        let visible = el.style.visible;
        let old_outer = el.layout.outer_size(horizontal);

        let (unclamped, clamped) = if visible {
            if size.is_auto() && self.invalid_flags(id).contains(LayoutFlags::TEXT) {
                self.validate_text(id);
                if let Some(el) = self.live_mut(id) {
                    el.layout.invalid.remove(size_flag(horizontal));
                }
            }
            let unclamped = self.calculate_size(id, horizontal, size, true);
            let min = self.calculate_size(id, horizontal, min, false);
            let max = self.calculate_size(id, horizontal, max, false);
            (unclamped, unclamped.min(max).max(min))
        } else {
            (0.0, 0.0)
        };

        let trace = self.config.trace_layout;
        let Some(el) = self.live_mut(id) else {
            return;
        };
        if horizontal {
            el.layout.unclamped_width = unclamped;
            el.layout.width = clamped;
        } else {
            el.layout.unclamped_height = unclamped;
            el.layout.height = clamped;
        }
        let new_outer = el.layout.outer_size(horizontal);
        if trace {
            log::trace!(
                "{id:?} {} = {clamped} (unclamped {unclamped})",
                if horizontal { "width" } else { "height" }
            );
        }
        if forced || new_outer != old_outer {
            self.on_size_changed(id, horizontal);
        }
    }

    fn calculate_size(&mut self, id: ElementId, horizontal: bool, length: Length, allow_flex: bool) -> f32 {
        let Some(el) = self.live(id) else {
            return 0.0;
        };
        match length {
            Length::Px(value) => value,
            Length::Pt(value) => value * self.dpi_scale(el.surface, horizontal),
            Length::Percent(pct) => {
                let flexed = allow_flex
                    && el.is_auto_positioned()
                    && el
                        .parent
                        .and_then(|p| self.live(p))
                        .is_some_and(|p| p.style.flexes_children_along(horizontal));
                if flexed {
                    self.flex_share(id, horizontal, pct)
                } else {
                    self.size_for_relative_sizing(id, horizontal) * pct / 100.0
                }
            }
            Length::Auto => self.auto_size(id, horizontal),
        }
    }

    /// The size that 100% refers to for `id`: the parent's box at its
    /// children-size boundary, or the surface when top-level.
    pub(crate) fn size_for_relative_sizing(&self, id: ElementId, horizontal: bool) -> f32 {
        let Some(el) = self.live(id) else {
            return 0.0;
        };
        match el.parent.and_then(|p| self.live(p)) {
            Some(parent) => {
                let boundary = if horizontal {
                    parent.style.children_width_boundary
                } else {
                    parent.style.children_height_boundary
                };
                let inset = boundary_edges(&parent.layout, boundary);
                (parent.layout.size(horizontal) - inset.along(horizontal)).max(0.0)
            }
            None => el
                .surface
                .and_then(|s| self.surfaces.get(s))
                .map(|s| if horizontal { s.width } else { s.height })
                .unwrap_or(0.0),
        }
    }

    /// `pct` of the space left after margins and fixed-size siblings, relative to
    /// the sum of all flexed siblings' percentages.
    fn flex_share(&mut self, id: ElementId, horizontal: bool, pct: f32) -> f32 {
        let Some(parent) = self.live(id).and_then(|el| el.parent) else {
            return 0.0;
        };
        let available = self.size_for_relative_sizing(id, horizontal);
        let group: Vec<ElementId> = self
            .children(parent)
            .filter(|s| {
                self.live(*s)
                    .is_some_and(|el| el.style.visible && el.is_auto_positioned())
            })
            .collect();

        let mut used = 0.0;
        let mut total_pct = 0.0;
        for sibling in group {
            let Some(el) = self.live(sibling) else {
                continue;
            };
            used += el.layout.margin.along(horizontal);
            match axis_lengths(&el.style, horizontal).0 {
                Length::Percent(p) => total_pct += p,
                _ => {
                    if sibling != id {
                        self.ensure_size_valid(sibling, horizontal);
                    }
                    used += self
                        .live(sibling)
                        .map(|el| el.layout.size(horizontal))
                        .unwrap_or(0.0);
                }
            }
        }
        if total_pct <= 0.0 {
            return 0.0;
        }
        (available - used).max(0.0) * pct / total_pct
    }

    fn auto_size(&mut self, id: ElementId, horizontal: bool) -> f32 {
        let Some(el) = self.live(id) else {
            return 0.0;
        };
        let edges = el.layout.border.along(horizontal) + el.layout.padding.along(horizontal);
        let content = if el.first_child.is_some() {
            self.children_extent(id, horizontal)
        } else {
            el.text_layout
                .as_ref()
                .map(|text| {
                    let (w, h) = text.extent();
                    if horizontal { w } else { h }
                })
                .unwrap_or(0.0)
        };
        edges + content
    }

    /// Flow extent of the auto-positioned children: summed along the child axis,
    /// maximum across it. Percent-sized children depend on this element and are
    /// left out.
    fn children_extent(&mut self, id: ElementId, horizontal: bool) -> f32 {
        let Some(el) = self.live(id) else {
            return 0.0;
        };
        let along = (el.style.child_axis == ChildAxis::Horizontal) == horizontal;
        let children: Vec<ElementId> = self.children(id).collect();
        let mut extent = 0.0f32;
        for child in children {
            let Some(ch) = self.live(child) else {
                continue;
            };
            if !ch.style.visible
                || !ch.is_auto_positioned()
                || axis_lengths(&ch.style, horizontal).0.is_percent()
            {
                continue;
            }
            self.ensure_size_valid(child, horizontal);
            let outer = self
                .live(child)
                .map(|ch| ch.layout.outer_size(horizontal))
                .unwrap_or(0.0);
            if along {
                extent += outer;
            } else {
                extent = extent.max(outer);
            }
        }
        extent
    }

    fn on_size_changed(&mut self, id: ElementId, horizontal: bool) {
        self.mark_changed(id, change_flag(horizontal));
        let flag = size_flag(horizontal);
        let Some(el) = self.live(id) else {
            return;
        };
        let parent = el.parent;
        let auto_positioned = el.is_auto_positioned();
        let percent_sized = axis_lengths(&el.style, horizontal).0.is_percent();
        let far_anchored = !auto_positioned
            && if horizontal {
                el.style.right_has_priority
            } else {
                el.style.bottom_has_priority
            };
        let has_text = el.text_layout.is_some();

        let children: Vec<ElementId> = self.children(id).collect();
        let mut dependants = Vec::new();
        for child in &children {
            let Some(ch) = self.live(*child) else {
                continue;
            };
            let (size, min, max) = axis_lengths(&ch.style, horizontal);
            let mut flags = LayoutFlags::empty();
            if size.is_percent() || min.is_percent() || max.is_percent() {
                flags |= flag;
            }
            if ch.style.positioning == Positioning::Relative {
                flags |= LayoutFlags::POSITION;
            }
            if !flags.is_empty() {
                dependants.push((*child, flags));
            }
        }
        if let Some(first) = self.first_auto_positioned(children) {
            dependants.push((first, LayoutFlags::POSITION));
        }

        if let Some(parent) = parent.filter(|p| self.live(*p).is_some()) {
            let siblings: Vec<ElementId> = self.children(parent).collect();
            let p = &self.elements[parent];
            if auto_positioned && p.style.flexes_children_along(horizontal) {
                for sibling in &siblings {
                    if *sibling == id {
                        continue;
                    }
                    if self.live(*sibling).is_some_and(|s| {
                        s.is_auto_positioned() && axis_lengths(&s.style, horizontal).0.is_percent()
                    }) {
                        dependants.push((*sibling, flag));
                    }
                }
            }
            if auto_positioned {
                if axis_lengths(&p.style, horizontal).0.is_auto() && !percent_sized {
                    dependants.push((parent, flag));
                }
                if let Some(first) = self.first_auto_positioned(siblings) {
                    dependants.push((first, LayoutFlags::POSITION));
                }
            }
        }
        if has_text {
            dependants.push((id, LayoutFlags::TEXT));
        }
        if far_anchored {
            dependants.push((id, LayoutFlags::POSITION));
        }

        for (target, flags) in dependants {
            self.invalidate_element_layout(target, flags);
        }
    }

    fn validate_position(&mut self, id: ElementId) {
        let Some(el) = self.live_mut(id) else {
            return;
        };
        let forced = el.layout.invalid.contains(LayoutFlags::FORCE_POSITION);
        el.layout.invalid.remove(LayoutFlags::POSITION | LayoutFlags::FORCE_POSITION);
        let positioning = el.style.positioning;
        let parent = el.parent;
        let margin = el.layout.margin;

        match (positioning, parent) {
            (Positioning::Auto, Some(parent)) => self.layout_flow_group(parent, id, forced),
            (Positioning::Auto, None) => {
                self.apply_relative_position(id, margin.left, margin.top, forced)
            }
            (Positioning::Relative, _) => {
                let (x, y) = self.relative_offset(id);
                self.apply_relative_position(id, x, y, forced);
            }
            (Positioning::Absolute, _) => {
                let (x, y) = self.absolute_offset(id);
                self.apply_relative_position(id, x, y, forced);
            }
        }
    }

    /// Offset from a corner of the parent (or surface), pulled inward according
    /// to the element's position origin.
    fn relative_offset(&mut self, id: ElementId) -> (f32, f32) {
        self.ensure_size_valid(id, true);
        self.ensure_size_valid(id, false);
        let base = (
            self.size_for_relative_sizing(id, true),
            self.size_for_relative_sizing(id, false),
        );
        let Some(el) = self.live(id) else {
            return (0.0, 0.0);
        };
        let scale = (self.dpi_scale(el.surface, true), self.dpi_scale(el.surface, false));
        let container = match el.parent.and_then(|p| self.live(p)) {
            Some(parent) => {
                let inset = boundary_edges(&parent.layout, el.style.position_origin);
                Rect::new(
                    inset.left,
                    inset.top,
                    parent.layout.width - inset.right,
                    parent.layout.height - inset.bottom,
                )
            }
            None => self.surface_bounds(el.surface),
        };
        anchored_offset(el, container, base, scale)
    }

    /// Offset from a corner of the owning surface; percentages refer to the
    /// surface size.
    fn absolute_offset(&mut self, id: ElementId) -> (f32, f32) {
        self.ensure_size_valid(id, true);
        self.ensure_size_valid(id, false);
        let Some(el) = self.live(id) else {
            return (0.0, 0.0);
        };
        let container = self.surface_bounds(el.surface);
        let scale = (self.dpi_scale(el.surface, true), self.dpi_scale(el.surface, false));
        anchored_offset(el, container, (container.width(), container.height()), scale)
    }

    fn surface_bounds(&self, surface: Option<SurfaceId>) -> Rect {
        surface
            .and_then(|s| self.surfaces.get(s))
            .map(|s| s.bounds())
            .unwrap_or(Rect::EMPTY)
    }

    /// Positions every auto-positioned child of `parent` as one group.
    fn layout_flow_group(&mut self, parent: ElementId, trigger: ElementId, forced: bool) {
        let Some(p) = self.live(parent) else {
            return;
        };
        let horizontal = p.style.child_axis == ChildAxis::Horizontal;
        let h_align = p.style.horizontal_align;
        let v_align = p.style.vertical_align;
        let inset = boundary_edges(&p.layout, BoxBoundary::Inner);
        let container_w = p.layout.inner_width();
        let container_h = p.layout.inner_height();

        let members: Vec<ElementId> = self
            .children(parent)
            .filter(|c| self.live(*c).is_some_and(|el| el.is_auto_positioned()))
            .collect();

        let mut along = 0.0f32;
        let mut cross = 0.0f32;
        for member in &members {
            if !self.live(*member).is_some_and(|el| el.style.visible) {
                continue;
            }
            self.ensure_size_valid(*member, true);
            self.ensure_size_valid(*member, false);
            if let Some(el) = self.live(*member) {
                along += el.layout.outer_size(horizontal);
                cross = cross.max(el.layout.outer_size(!horizontal));
            }
        }
        let (group_w, group_h) = if horizontal { (along, cross) } else { (cross, along) };
        let start_x = inset.left + align_horizontal(h_align, container_w - group_w);
        let start_y = inset.top + align_vertical(v_align, container_h - group_h);

        let mut cursor = 0.0f32;
        for member in members {
            let Some(el) = self.live_mut(member) else {
                continue;
            };
            let member_forced = el.layout.invalid.contains(LayoutFlags::FORCE_POSITION)
                || (member == trigger && forced);
            el.layout.invalid.remove(LayoutFlags::POSITION | LayoutFlags::FORCE_POSITION);
            let layout = el.layout;
            let (x, y) = if !el.style.visible {
                if horizontal {
                    (start_x + cursor, start_y)
                } else {
                    (start_x, start_y + cursor)
                }
            } else if horizontal {
                let x = start_x + cursor + layout.margin.left;
                let y = start_y
                    + align_vertical(v_align, group_h - layout.outer_height())
                    + layout.margin.top;
                cursor += layout.outer_width();
                (x, y)
            } else {
                let x = start_x
                    + align_horizontal(h_align, group_w - layout.outer_width())
                    + layout.margin.left;
                let y = start_y + cursor + layout.margin.top;
                cursor += layout.outer_height();
                (x, y)
            };
            self.apply_relative_position(member, x, y, member_forced);
        }
    }

    fn apply_relative_position(&mut self, id: ElementId, x: f32, y: f32, forced: bool) {
        let trace = self.config.trace_layout;
        let Some(el) = self.live_mut(id) else {
            return;
        };
        if !forced && el.layout.relative_x == x && el.layout.relative_y == y {
            return;
        }
        el.layout.relative_x = x;
        el.layout.relative_y = y;
        if trace {
            log::trace!("{id:?} position = ({x}, {y})");
        }
        self.mark_changed(id, LayoutChanges::POSITION);
        self.layout.absolute_dirty.push(id);
    }

    pub(crate) fn mark_changed(&mut self, id: ElementId, changes: LayoutChanges) {
        let Some(el) = self.live_mut(id) else {
            return;
        };
        el.layout.changed |= changes;
        if !el.layout.in_changed_list {
            el.layout.in_changed_list = true;
            self.layout.changed.push(id);
        }
    }

    /// Recomputes absolute positions below every element whose relative position
    /// (or scroll offset) changed, repainting old and new footprints.
    pub(crate) fn update_absolute_positions(&mut self) {
        let dirty = std::mem::take(&mut self.layout.absolute_dirty);
        for root in dirty {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                let Some(el) = self.live(id) else {
                    continue;
                };
                let (base_x, base_y) = match (el.style.positioning, el.parent.and_then(|p| self.live(p))) {
                    (Positioning::Absolute, _) | (_, None) => (0.0, 0.0),
                    (_, Some(parent)) => (
                        parent.layout.absolute_x + parent.layout.inner_offset_x,
                        parent.layout.absolute_y + parent.layout.inner_offset_y,
                    ),
                };
                let x = base_x + el.layout.relative_x;
                let y = base_y + el.layout.relative_y;
                if x != el.layout.absolute_x || y != el.layout.absolute_y {
                    self.invalidate_element_rect(id);
                    if let Some(el) = self.live_mut(id) {
                        el.layout.absolute_x = x;
                        el.layout.absolute_y = y;
                    }
                    self.invalidate_element_rect(id);
                }
                stack.extend(self.children(id));
            }
        }
    }

    /// Posts size/move notifications. Change flags are cleared before any handler
    /// runs so handlers may delete or mutate freely.
    pub(crate) fn post_layout_events(&mut self) {
        let changed = std::mem::take(&mut self.layout.changed);
        if changed.is_empty() {
            return;
        }
        self.input.hover_dirty = true;
        let mut events = Vec::with_capacity(changed.len());
        for id in changed {
            let Some(el) = self.live_mut(id) else {
                continue;
            };
            let changes = std::mem::take(&mut el.layout.changed);
            el.layout.in_changed_list = false;
            let l = el.layout;
            let event = match (
                changes.intersects(LayoutChanges::SIZE),
                changes.contains(LayoutChanges::POSITION),
            ) {
                (true, true) => ElementEvent::SizeAndMove {
                    x: l.relative_x,
                    y: l.relative_y,
                    width: l.width,
                    height: l.height,
                },
                (true, false) => ElementEvent::Size {
                    width: l.width,
                    height: l.height,
                },
                (false, true) => ElementEvent::Move {
                    x: l.relative_x,
                    y: l.relative_y,
                },
                (false, false) => continue,
            };
            events.push((id, event));
        }
        for (id, _) in &events {
            self.invalidate_element_rect(*id);
        }
        for (id, event) in events {
            self.post_event(id, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::style::{ChildAxis, HorizontalAlign, Length, Positioning, Side, VerticalAlign};
    use crate::testing::{assert_close, event_log};
    use crate::ui::ElementEvent;
    use crate::view::{ElementId, GuiContext, SurfaceId};

    fn surface_ctx(width: f32, height: f32) -> (GuiContext, SurfaceId) {
        let mut ctx = GuiContext::default();
        let surface = ctx.create_surface(width, height, 96.0, 96.0);
        (ctx, surface)
    }

    fn top_level(ctx: &mut GuiContext, surface: SurfaceId) -> ElementId {
        let el = ctx.create_element();
        ctx.set_element_surface(el, Some(surface));
        el
    }

    fn child_of(ctx: &mut GuiContext, parent: ElementId) -> ElementId {
        let el = ctx.create_element();
        ctx.append_child_element(parent, el);
        el
    }

    #[test]
    fn empty_auto_element_is_border_plus_padding() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let el = top_level(&mut ctx, surface);
        for side in Side::ALL {
            ctx.set_element_padding(el, side, Length::px(5.0));
            ctx.set_element_border_width(el, side, Length::px(2.0));
        }
        assert_eq!(ctx.element_size(el), Some((14.0, 14.0)));
    }

    #[test]
    fn percent_width_ignores_sibling_count() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_width(parent, Length::px(300.0));
        ctx.set_element_padding(parent, Side::Left, Length::px(10.0));
        ctx.set_element_padding(parent, Side::Right, Length::px(10.0));
        let children: Vec<_> = (0..3).map(|_| child_of(&mut ctx, parent)).collect();
        for child in &children {
            ctx.set_element_width(*child, Length::percent(50.0));
        }
        for child in children {
            assert_eq!(ctx.element_size(child).map(|s| s.0), Some(140.0));
        }
    }

    #[test]
    fn auto_parent_wraps_points_sized_child() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let a = top_level(&mut ctx, surface);
        ctx.set_element_width(a, Length::percent(50.0));
        ctx.set_element_child_axis(a, ChildAxis::Vertical);
        let b = child_of(&mut ctx, a);
        ctx.set_element_width(b, Length::pt(100.0));
        ctx.set_element_height(b, Length::pt(40.0));

        assert_eq!(ctx.element_size(a), Some((400.0, 40.0)));
        assert_eq!(ctx.element_position(b), Some((0.0, 0.0)));
    }

    #[test]
    fn flexed_children_split_remaining_space() {
        let (mut ctx, surface) = surface_ctx(2000.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_width(parent, Length::px(1000.0));
        ctx.set_element_child_axis(parent, ChildAxis::Horizontal);
        ctx.set_element_flex_children_width(parent, true);
        let a = child_of(&mut ctx, parent);
        let b = child_of(&mut ctx, parent);
        ctx.set_element_width(a, Length::percent(30.0));
        ctx.set_element_width(b, Length::percent(70.0));

        assert_eq!(ctx.element_size(a).map(|s| s.0), Some(300.0));
        assert_eq!(ctx.element_size(b).map(|s| s.0), Some(700.0));
        assert_eq!(ctx.element_position(b), Some((300.0, 0.0)));
    }

    #[test]
    fn flex_shares_fill_space_left_by_fixed_siblings_and_margins() {
        let (mut ctx, surface) = surface_ctx(2000.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_width(parent, Length::px(900.0));
        ctx.set_element_child_axis(parent, ChildAxis::Horizontal);
        ctx.set_element_flex_children_width(parent, true);
        let fixed = child_of(&mut ctx, parent);
        ctx.set_element_width(fixed, Length::px(200.0));
        let flexed: Vec<_> = [1.0, 2.0, 4.0]
            .into_iter()
            .map(|pct| {
                let el = child_of(&mut ctx, parent);
                ctx.set_element_width(el, Length::percent(pct));
                ctx.set_element_margin(el, Side::Left, Length::px(5.0));
                el
            })
            .collect();

        let total: f32 = flexed
            .iter()
            .filter_map(|el| ctx.element_size(*el))
            .map(|s| s.0)
            .sum();
        assert_close(total, 900.0 - 200.0 - 15.0);
        assert_close(ctx.element_size(flexed[2]).map(|s| s.0).unwrap_or(0.0), 685.0 * 4.0 / 7.0);

        // Growing the fixed sibling shrinks the shares.
        ctx.set_element_width(fixed, Length::px(325.0));
        assert_close(ctx.element_size(flexed[0]).map(|s| s.0).unwrap_or(0.0), 80.0);
    }

    #[test]
    fn flex_with_zero_total_percent_allocates_nothing() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_width(parent, Length::px(400.0));
        ctx.set_element_child_axis(parent, ChildAxis::Horizontal);
        ctx.set_element_flex_children_width(parent, true);
        let child = child_of(&mut ctx, parent);
        ctx.set_element_width(child, Length::percent(0.0));
        assert_eq!(ctx.element_size(child).map(|s| s.0), Some(0.0));
    }

    #[test]
    fn absolute_top_reads_the_top_offset() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_margin(parent, Side::Left, Length::px(50.0));
        let el = child_of(&mut ctx, parent);
        ctx.set_element_positioning(el, Positioning::Absolute);
        ctx.set_element_left(el, Length::px(10.0));
        ctx.set_element_top(el, Length::px(30.0));

        assert_eq!(ctx.element_position(el), Some((10.0, 30.0)));
        assert_eq!(ctx.element_absolute_position(el), Some((10.0, 30.0)));
    }

    #[test]
    fn absolute_percent_offsets_refer_to_the_surface() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_width(parent, Length::px(100.0));
        let el = child_of(&mut ctx, parent);
        ctx.set_element_positioning(el, Positioning::Absolute);
        ctx.set_element_width(el, Length::px(40.0));
        ctx.set_element_right(el, Length::percent(10.0));
        ctx.set_element_right_priority(el, true);
        assert_eq!(ctx.element_position(el).map(|p| p.0), Some(800.0 - 80.0 - 40.0));
    }

    #[test]
    fn relative_right_anchor_tracks_own_width() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_width(parent, Length::px(200.0));
        ctx.set_element_height(parent, Length::px(100.0));
        ctx.set_element_border_width(parent, Side::Right, Length::px(4.0));
        let el = child_of(&mut ctx, parent);
        ctx.set_element_positioning(el, Positioning::Relative);
        ctx.set_element_width(el, Length::px(50.0));
        ctx.set_element_right(el, Length::px(10.0));
        ctx.set_element_right_priority(el, true);
        assert_eq!(ctx.element_position(el), Some((136.0, 0.0)));

        ctx.set_element_width(el, Length::px(60.0));
        assert_eq!(ctx.element_position(el), Some((126.0, 0.0)));
    }

    #[test]
    fn set_position_round_trips() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        let el = child_of(&mut ctx, parent);
        ctx.set_element_position(el, 12.5, 40.0);
        assert_eq!(ctx.element_style(el).map(|s| s.positioning), Some(Positioning::Relative));
        assert_eq!(ctx.element_position(el), Some((12.5, 40.0)));
    }

    #[test]
    fn flow_group_is_aligned_inside_the_parent() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        ctx.set_element_width(parent, Length::px(300.0));
        ctx.set_element_height(parent, Length::px(100.0));
        ctx.set_element_child_axis(parent, ChildAxis::Horizontal);
        ctx.set_element_horizontal_align(parent, HorizontalAlign::Center);
        ctx.set_element_vertical_align(parent, VerticalAlign::Bottom);
        let a = child_of(&mut ctx, parent);
        let b = child_of(&mut ctx, parent);
        ctx.set_element_width(a, Length::px(50.0));
        ctx.set_element_height(a, Length::px(20.0));
        ctx.set_element_width(b, Length::px(50.0));
        ctx.set_element_height(b, Length::px(40.0));

        assert_eq!(ctx.element_position(a), Some((100.0, 80.0)));
        assert_eq!(ctx.element_position(b), Some((150.0, 60.0)));

        ctx.set_element_horizontal_align(parent, HorizontalAlign::Right);
        assert_eq!(ctx.element_position(a), Some((200.0, 80.0)));
    }

    #[test]
    fn invisible_elements_take_no_flow_space() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        let a = child_of(&mut ctx, parent);
        let b = child_of(&mut ctx, parent);
        for el in [a, b] {
            ctx.set_element_width(el, Length::px(30.0));
            ctx.set_element_height(el, Length::px(10.0));
        }
        assert_eq!(ctx.element_position(b), Some((0.0, 10.0)));

        ctx.set_element_visible(a, false);
        assert_eq!(ctx.element_size(a), Some((0.0, 0.0)));
        assert_eq!(ctx.element_position(b), Some((0.0, 0.0)));
        assert_eq!(ctx.element_size(parent), Some((30.0, 10.0)));

        ctx.set_element_visible(a, true);
        assert_eq!(ctx.element_size(a), Some((30.0, 10.0)));
        assert_eq!(ctx.element_position(b), Some((0.0, 10.0)));
    }

    #[test]
    fn min_and_max_clamp_computed_size() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let el = top_level(&mut ctx, surface);
        ctx.set_element_min_width(el, Length::px(25.0));
        assert_eq!(ctx.element_size(el).map(|s| s.0), Some(25.0));
        ctx.set_element_width(el, Length::percent(100.0));
        ctx.set_element_max_width(el, Length::percent(50.0));
        assert_eq!(ctx.element_size(el).map(|s| s.0), Some(400.0));
        assert_eq!(ctx.element_layout(el).map(|l| l.unclamped_width), Some(800.0));
    }

    #[test]
    fn dpi_change_rescales_points() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let el = top_level(&mut ctx, surface);
        ctx.set_element_width(el, Length::pt(100.0));
        ctx.set_element_height(el, Length::px(10.0));
        ctx.set_element_margin(el, Side::Left, Length::pt(4.0));
        ctx.set_surface_dpi(surface, 192.0, 96.0);
        assert_eq!(ctx.element_size(el), Some((200.0, 10.0)));
        assert_eq!(ctx.element_position(el), Some((8.0, 0.0)));

        ctx.set_base_dpi(192.0, 192.0);
        assert_eq!(ctx.element_size(el), Some((100.0, 10.0)));
    }

    #[test]
    fn dpi_change_rescales_point_edges_only() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let pixels = top_level(&mut ctx, surface);
        ctx.set_element_padding(pixels, Side::Left, Length::px(6.0));
        let points = top_level(&mut ctx, surface);
        ctx.set_element_padding(points, Side::Left, Length::pt(6.0));

        ctx.set_surface_dpi(surface, 192.0, 96.0);
        assert_eq!(ctx.element_layout(pixels).map(|l| l.padding.left), Some(6.0));
        assert_eq!(ctx.element_layout(points).map(|l| l.padding.left), Some(12.0));
    }

    #[test]
    fn absolute_positions_accumulate_with_inner_offset() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let root = top_level(&mut ctx, surface);
        ctx.set_element_margin(root, Side::Left, Length::px(20.0));
        ctx.set_element_padding(root, Side::Top, Length::px(5.0));
        let child = child_of(&mut ctx, root);
        let grandchild = child_of(&mut ctx, child);
        ctx.set_element_margin(grandchild, Side::Left, Length::px(3.0));
        assert_eq!(ctx.element_absolute_position(grandchild), Some((23.0, 5.0)));

        ctx.set_element_inner_offset(root, 0.0, -50.0);
        assert_eq!(ctx.element_absolute_position(child), Some((20.0, -45.0)));
        assert_eq!(ctx.element_absolute_position(grandchild), Some((23.0, -45.0)));
        assert_eq!(ctx.element_position(child), Some((0.0, 5.0)));
    }

    #[test]
    fn growing_a_sibling_moves_the_next_one() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        let a = child_of(&mut ctx, parent);
        let b = child_of(&mut ctx, parent);
        ctx.set_element_height(a, Length::px(10.0));
        let (log, handler) = event_log();
        ctx.attach_event_handler(b, handler.clone());
        ctx.attach_event_handler(parent, handler);

        ctx.set_element_height(a, Length::px(25.0));
        let events = log.borrow();
        assert!(events.contains(&(b, ElementEvent::Move { x: 0.0, y: 25.0 })));
        assert!(events.contains(&(parent, ElementEvent::Size { width: 0.0, height: 25.0 })));
    }

    #[test]
    fn removing_children_shrinks_auto_parent() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let parent = top_level(&mut ctx, surface);
        let a = child_of(&mut ctx, parent);
        let b = child_of(&mut ctx, parent);
        for el in [a, b] {
            ctx.set_element_width(el, Length::px(10.0));
            ctx.set_element_height(el, Length::px(10.0));
        }
        assert_eq!(ctx.element_size(parent), Some((10.0, 20.0)));
        ctx.delete_element(a);
        assert_eq!(ctx.element_size(parent), Some((10.0, 10.0)));
        assert_eq!(ctx.element_position(b), Some((0.0, 0.0)));
        ctx.detach_element(b);
        assert_eq!(ctx.element_size(parent), Some((0.0, 0.0)));
    }

    #[test]
    fn surface_resize_reflows_percent_elements() {
        let (mut ctx, surface) = surface_ctx(800.0, 600.0);
        let el = top_level(&mut ctx, surface);
        ctx.set_element_width(el, Length::percent(25.0));
        ctx.set_element_height(el, Length::percent(50.0));
        ctx.set_surface_size(surface, 400.0, 200.0);
        assert_eq!(ctx.element_size(el), Some((100.0, 100.0)));
    }
}
