//! Element and surface lifecycle, tree links and geometry queries.

use super::GuiContext;
use super::layout::boundary_edges;
use crate::style::{BoxBoundary, ElementLayout, ElementStyle, LayoutFlags, Positioning};
use crate::view::{Element, ElementId, Rect, Surface, SurfaceId};
use smol_str::SmolStr;

/// Whoever holds an element in its child list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Owner {
    Element(ElementId),
    Surface(SurfaceId),
}

impl GuiContext {
    pub fn create_surface(&mut self, width: f32, height: f32, dpi_x: f32, dpi_y: f32) -> SurfaceId {
        let id = self.surfaces.insert(Surface::new(width, height, dpi_x, dpi_y));
        log::debug!("created surface {id:?} {width}x{height} @ {dpi_x}x{dpi_y} dpi");
        self.batched(|ctx| ctx.invalidate_whole_surface(id));
        id
    }

    /// Detaches every top-level element (they survive, without a surface) and
    /// removes the surface.
    pub fn destroy_surface(&mut self, surface: SurfaceId) {
        if !self.checked_surface(surface, "destroy_surface") {
            return;
        }
        self.batched(|ctx| {
            let top_level: Vec<ElementId> = ctx.surface_elements(surface).collect();
            for element in top_level {
                ctx.set_element_surface(element, None);
            }
            if ctx.input.surface_under_mouse == Some(surface) {
                ctx.update_hovered(None);
                ctx.input.surface_under_mouse = None;
            }
            ctx.surfaces.remove(surface);
        });
        log::debug!("destroyed surface {surface:?}");
    }

    pub fn surface_exists(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(surface)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.keys()
    }

    pub fn set_surface_size(&mut self, surface: SurfaceId, width: f32, height: f32) {
        if !self.checked_surface(surface, "set_surface_size") {
            return;
        }
        let s = &mut self.surfaces[surface];
        if s.width == width && s.height == height {
            return;
        }
        s.width = width;
        s.height = height;
        s.invalid_rect = s.invalid_rect.clamp(&s.bounds());
        self.batched(|ctx| {
            ctx.invalidate_whole_surface(surface);
            let dependants: Vec<(ElementId, LayoutFlags)> = ctx
                .elements
                .iter()
                .filter(|(_, el)| el.is_alive() && el.surface == Some(surface))
                .filter_map(|(id, el)| {
                    if el.parent.is_none() {
                        Some((id, LayoutFlags::SIZE | LayoutFlags::POSITION))
                    } else if el.style.positioning == Positioning::Absolute {
                        Some((id, LayoutFlags::POSITION))
                    } else {
                        None
                    }
                })
                .collect();
            for (id, flags) in dependants {
                ctx.invalidate_element_layout(id, flags);
            }
        });
    }

    pub fn surface_size(&self, surface: SurfaceId) -> Option<(f32, f32)> {
        self.surfaces.get(surface).map(|s| (s.width, s.height))
    }

    pub fn set_surface_dpi(&mut self, surface: SurfaceId, dpi_x: f32, dpi_y: f32) {
        if !self.checked_surface(surface, "set_surface_dpi") {
            return;
        }
        let s = &mut self.surfaces[surface];
        if s.dpi_x == dpi_x && s.dpi_y == dpi_y {
            return;
        }
        s.dpi_x = dpi_x;
        s.dpi_y = dpi_y;
        self.batched(|ctx| {
            ctx.invalidate_dpi(Some(surface));
            ctx.invalidate_whole_surface(surface);
        });
    }

    pub fn surface_dpi(&self, surface: SurfaceId) -> Option<(f32, f32)> {
        self.surfaces.get(surface).map(|s| (s.dpi_x, s.dpi_y))
    }

    /// Changes the reference DPI that points are defined against.
    pub fn set_base_dpi(&mut self, dpi_x: f32, dpi_y: f32) {
        debug_assert!(dpi_x > 0.0 && dpi_y > 0.0, "base dpi must be positive");
        if dpi_x <= 0.0 || dpi_y <= 0.0 {
            log::warn!("ignoring non-positive base dpi {dpi_x}x{dpi_y}");
            return;
        }
        if self.config.base_dpi_x == dpi_x && self.config.base_dpi_y == dpi_y {
            return;
        }
        self.config.base_dpi_x = dpi_x;
        self.config.base_dpi_y = dpi_y;
        let surfaces: Vec<SurfaceId> = self.surfaces.keys().collect();
        self.batched(|ctx| {
            ctx.invalidate_dpi(None);
            for surface in surfaces {
                ctx.invalidate_whole_surface(surface);
            }
        });
    }

    pub fn set_surface_id(&mut self, surface: SurfaceId, id: Option<&str>) {
        if let Some(s) = self.surfaces.get_mut(surface) {
            s.id = id.map(SmolStr::new);
        }
    }

    pub fn surface_id(&self, surface: SurfaceId) -> Option<&str> {
        self.surfaces.get(surface).and_then(|s| s.id.as_deref())
    }

    pub fn find_surface_by_id(&self, id: &str) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .find(|(_, s)| s.id.as_deref() == Some(id))
            .map(|(key, _)| key)
    }

    pub fn top_level_elements(&self, surface: SurfaceId) -> Vec<ElementId> {
        self.surface_elements(surface).collect()
    }

    /// Creates a detached element with default style.
    pub fn create_element(&mut self) -> ElementId {
        let id = self.elements.insert(Element::new());
        self.batched(|ctx| ctx.invalidate_element_layout(id, LayoutFlags::ALL));
        id
    }

    /// False for stale handles and for elements deleted in the current batch.
    pub fn element_exists(&self, id: ElementId) -> bool {
        self.live(id).is_some()
    }

    /// Deletes `id` and its subtree. The element is unlinked and dropped from
    /// capture, focus and hover immediately; its storage is released when the
    /// outermost batch ends.
    pub fn delete_element(&mut self, id: ElementId) {
        if self.live(id).is_none() {
            return;
        }
        self.batched(|ctx| {
            let parent = ctx.elements[id].parent;
            ctx.detach_element_inner(id);
            let subtree = ctx.subtree(id);
            let contains = |other: Option<ElementId>| other.is_some_and(|e| subtree.contains(&e));

            if contains(ctx.input.capture) {
                ctx.input.capture = None;
            }
            if contains(ctx.input.focus) {
                ctx.input.focus = None;
            }
            if contains(ctx.input.text_cursor.map(|c| c.element)) {
                ctx.input.text_cursor = None;
            }
            if contains(ctx.input.hovered) {
                ctx.input.hovered = parent;
            }
            for element in subtree {
                if let Some(el) = ctx.elements.get_mut(element) {
                    el.pending_deletion = true;
                    el.layout.invalid = LayoutFlags::empty();
                    ctx.layout.pending_deletions.push(element);
                }
            }
        });
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child_element(&mut self, parent: ElementId, child: ElementId) {
        self.insert_child_element(parent, child, None);
    }

    /// Inserts `child` before `before`, or last when `before` is `None`.
    pub fn insert_child_element(&mut self, parent: ElementId, child: ElementId, before: Option<ElementId>) {
        if !self.checked(parent, "insert_child_element") || !self.checked(child, "insert_child_element") {
            return;
        }
        if self.is_ancestor_or_self(child, parent) {
            debug_assert!(false, "element cannot become its own descendant");
            log::warn!("insert_child_element: {child:?} is an ancestor of {parent:?}");
            return;
        }
        if let Some(before) = before {
            if before == child {
                return;
            }
            if self.live(before).and_then(|el| el.parent) != Some(parent) {
                debug_assert!(false, "insertion point is not a child of the parent");
                log::warn!("insert_child_element: {before:?} is not a child of {parent:?}");
                return;
            }
        }
        self.batched(|ctx| {
            ctx.detach_element_inner(child);
            ctx.link(child, Owner::Element(parent), before);
            let surface = ctx.elements[parent].surface;
            ctx.assign_surface(child, surface);
            ctx.invalidate_element_layout(child, LayoutFlags::ALL | LayoutFlags::FORCE_POSITION);
            ctx.invalidate_child_group(Some(parent));
            ctx.input.hover_dirty = true;
        });
    }

    /// Removes `id` from its parent or surface. The subtree survives, detached.
    pub fn detach_element(&mut self, id: ElementId) {
        if !self.checked(id, "detach_element") {
            return;
        }
        self.batched(|ctx| ctx.detach_element_inner(id));
    }

    /// Makes a parentless element top-level on `surface`, or removes it from its
    /// surface when `None`.
    pub fn set_element_surface(&mut self, id: ElementId, surface: Option<SurfaceId>) {
        if !self.checked(id, "set_element_surface") {
            return;
        }
        if self.elements[id].parent.is_some() {
            debug_assert!(false, "only parentless elements can be attached to a surface");
            log::warn!("set_element_surface: {id:?} has a parent");
            return;
        }
        if let Some(surface) = surface {
            if !self.checked_surface(surface, "set_element_surface") {
                return;
            }
        }
        if self.elements[id].surface == surface {
            return;
        }
        self.batched(|ctx| {
            ctx.detach_element_inner(id);
            if let Some(surface) = surface {
                ctx.link(id, Owner::Surface(surface), None);
                ctx.assign_surface(id, Some(surface));
                ctx.invalidate_element_layout(id, LayoutFlags::ALL | LayoutFlags::FORCE_POSITION);
            }
        });
    }

    fn owner_of(&self, id: ElementId) -> Option<Owner> {
        let el = self.elements.get(id)?;
        match (el.parent, el.surface) {
            (Some(parent), _) => Some(Owner::Element(parent)),
            (None, Some(surface)) => Some(Owner::Surface(surface)),
            (None, None) => None,
        }
    }

    fn owner_ends(&self, owner: Owner) -> (Option<ElementId>, Option<ElementId>) {
        match owner {
            Owner::Element(id) => self
                .elements
                .get(id)
                .map(|el| (el.first_child, el.last_child))
                .unwrap_or_default(),
            Owner::Surface(id) => self
                .surfaces
                .get(id)
                .map(|s| (s.first_element, s.last_element))
                .unwrap_or_default(),
        }
    }

    fn set_owner_ends(&mut self, owner: Owner, first: Option<ElementId>, last: Option<ElementId>) {
        match owner {
            Owner::Element(id) => {
                if let Some(el) = self.elements.get_mut(id) {
                    el.first_child = first;
                    el.last_child = last;
                }
            }
            Owner::Surface(id) => {
                if let Some(s) = self.surfaces.get_mut(id) {
                    s.first_element = first;
                    s.last_element = last;
                }
            }
        }
    }

    fn link(&mut self, child: ElementId, owner: Owner, before: Option<ElementId>) {
        let (mut first, mut last) = self.owner_ends(owner);
        let prev = match before {
            Some(before) => self.elements[before].prev_sibling,
            None => last,
        };
        {
            let el = &mut self.elements[child];
            el.prev_sibling = prev;
            el.next_sibling = before;
            el.parent = match owner {
                Owner::Element(parent) => Some(parent),
                Owner::Surface(_) => None,
            };
        }
        match prev {
            Some(prev) => self.elements[prev].next_sibling = Some(child),
            None => first = Some(child),
        }
        match before {
            Some(before) => self.elements[before].prev_sibling = Some(child),
            None => last = Some(child),
        }
        self.set_owner_ends(owner, first, last);
    }

    fn unlink(&mut self, child: ElementId, owner: Owner) {
        let (mut first, mut last) = self.owner_ends(owner);
        let (prev, next) = {
            let el = &mut self.elements[child];
            let links = (el.prev_sibling, el.next_sibling);
            el.prev_sibling = None;
            el.next_sibling = None;
            el.parent = None;
            links
        };
        match prev {
            Some(prev) => self.elements[prev].next_sibling = next,
            None => first = next,
        }
        match next {
            Some(next) => self.elements[next].prev_sibling = prev,
            None => last = prev,
        }
        self.set_owner_ends(owner, first, last);
    }

    fn detach_element_inner(&mut self, id: ElementId) {
        let Some(owner) = self.owner_of(id) else {
            return;
        };
        self.invalidate_subtree_rects(id);
        self.unlink(id, owner);
        if let Owner::Element(parent) = owner {
            self.invalidate_child_group(Some(parent));
        }
        self.assign_surface(id, None);
        self.invalidate_element_layout(id, LayoutFlags::ALL | LayoutFlags::FORCE_POSITION);
        self.input.hover_dirty = true;
    }

    /// Propagates the owning surface through a subtree. Elements that change
    /// surface re-derive their DPI-dependent values.
    fn assign_surface(&mut self, root: ElementId, surface: Option<SurfaceId>) {
        if self.elements.get(root).is_some_and(|el| el.surface == surface) {
            return;
        }
        for id in self.subtree(root) {
            if let Some(el) = self.elements.get_mut(id) {
                el.surface = surface;
            }
            self.resolve_edges(id);
            self.invalidate_element_layout(id, LayoutFlags::ALL | LayoutFlags::FORCE_ALL);
        }
    }

    pub fn element_parent(&self, id: ElementId) -> Option<ElementId> {
        self.live(id).and_then(|el| el.parent)
    }

    pub fn element_first_child(&self, id: ElementId) -> Option<ElementId> {
        self.live(id).and_then(|el| el.first_child)
    }

    pub fn element_last_child(&self, id: ElementId) -> Option<ElementId> {
        self.live(id).and_then(|el| el.last_child)
    }

    pub fn element_next_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.live(id).and_then(|el| el.next_sibling)
    }

    pub fn element_prev_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.live(id).and_then(|el| el.prev_sibling)
    }

    pub fn element_children(&self, id: ElementId) -> Vec<ElementId> {
        if self.live(id).is_none() {
            return Vec::new();
        }
        self.children(id).collect()
    }

    pub fn element_surface(&self, id: ElementId) -> Option<SurfaceId> {
        self.live(id).and_then(|el| el.surface)
    }

    pub fn set_element_id(&mut self, element: ElementId, id: Option<&str>) {
        if let Some(el) = self.live_mut(element) {
            el.id = id.map(SmolStr::new);
        }
    }

    pub fn element_id(&self, element: ElementId) -> Option<&str> {
        self.live(element).and_then(|el| el.id.as_deref())
    }

    pub fn find_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, el)| el.is_alive() && el.id.as_deref() == Some(id))
            .map(|(key, _)| key)
    }

    pub fn element_style(&self, id: ElementId) -> Option<&ElementStyle> {
        self.live(id).map(|el| &el.style)
    }

    pub fn element_layout(&self, id: ElementId) -> Option<&ElementLayout> {
        self.live(id).map(|el| &el.layout)
    }

    pub fn element_size(&self, id: ElementId) -> Option<(f32, f32)> {
        self.live(id).map(|el| (el.layout.width, el.layout.height))
    }

    /// Border-box origin relative to the parent (or surface, for top-level and
    /// absolutely positioned elements).
    pub fn element_position(&self, id: ElementId) -> Option<(f32, f32)> {
        self.live(id)
            .map(|el| (el.layout.relative_x, el.layout.relative_y))
    }

    pub fn element_absolute_position(&self, id: ElementId) -> Option<(f32, f32)> {
        self.live(id)
            .map(|el| (el.layout.absolute_x, el.layout.absolute_y))
    }

    /// Border box in surface coordinates.
    pub fn element_absolute_rect(&self, id: ElementId) -> Option<Rect> {
        self.live(id).map(|el| {
            Rect::from_xywh(
                el.layout.absolute_x,
                el.layout.absolute_y,
                el.layout.width,
                el.layout.height,
            )
        })
    }

    pub(crate) fn element_boundary_rect(&self, id: ElementId, boundary: BoxBoundary) -> Option<Rect> {
        let rect = self.element_absolute_rect(id)?;
        let inset = boundary_edges(&self.live(id)?.layout, boundary);
        Some(rect.inset(inset.left, inset.top, inset.right, inset.bottom))
    }

    /// Content box (inside border and padding) in surface coordinates.
    pub fn element_inner_rect(&self, id: ElementId) -> Option<Rect> {
        self.element_boundary_rect(id, BoxBoundary::Inner)
    }

    /// Bounds of the laid-out text block in surface coordinates.
    pub fn element_text_rect(&self, id: ElementId) -> Option<Rect> {
        let inner = self.element_inner_rect(id)?;
        let layout = self.live(id)?.text_layout.as_ref()?;
        let first = layout.lines().first()?;
        let left = layout.lines().iter().map(|line| line.x).fold(f32::MAX, f32::min);
        let (width, height) = layout.extent();
        Some(Rect::from_xywh(inner.left + left, inner.top + first.y, width, height))
    }
}

#[cfg(test)]
mod tests {
    use crate::style::Length;
    use crate::testing::recording_context;
    use crate::view::GuiContext;

    #[test]
    fn sibling_links_stay_consistent() {
        let mut ctx = GuiContext::default();
        let parent = ctx.create_element();
        let a = ctx.create_element();
        let b = ctx.create_element();
        let c = ctx.create_element();
        ctx.append_child_element(parent, a);
        ctx.append_child_element(parent, c);
        ctx.insert_child_element(parent, b, Some(c));
        assert_eq!(ctx.element_children(parent), vec![a, b, c]);
        assert_eq!(ctx.element_prev_sibling(c), Some(b));
        assert_eq!(ctx.element_next_sibling(a), Some(b));

        ctx.detach_element(a);
        assert_eq!(ctx.element_first_child(parent), Some(b));
        assert_eq!(ctx.element_prev_sibling(b), None);
        ctx.detach_element(c);
        assert_eq!(ctx.element_last_child(parent), Some(b));
        ctx.detach_element(b);
        assert_eq!(ctx.element_first_child(parent), None);
        assert_eq!(ctx.element_last_child(parent), None);
    }

    #[test]
    fn surface_assignment_reaches_the_whole_subtree() {
        let mut ctx = GuiContext::default();
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let root = ctx.create_element();
        let child = ctx.create_element();
        let grandchild = ctx.create_element();
        ctx.append_child_element(root, child);
        ctx.append_child_element(child, grandchild);
        ctx.set_element_surface(root, Some(surface));
        assert_eq!(ctx.element_surface(grandchild), Some(surface));
        assert_eq!(ctx.top_level_elements(surface), vec![root]);

        ctx.detach_element(child);
        assert_eq!(ctx.element_surface(grandchild), None);
        ctx.append_child_element(root, child);
        assert_eq!(ctx.element_surface(grandchild), Some(surface));

        ctx.destroy_surface(surface);
        assert!(ctx.element_exists(root));
        assert_eq!(ctx.element_surface(grandchild), None);
    }

    #[test]
    fn moving_an_element_reparents_it() {
        let mut ctx = GuiContext::default();
        let first = ctx.create_element();
        let second = ctx.create_element();
        let child = ctx.create_element();
        ctx.append_child_element(first, child);
        ctx.append_child_element(second, child);
        assert!(ctx.element_children(first).is_empty());
        assert_eq!(ctx.element_parent(child), Some(second));
    }

    #[test]
    fn deleting_the_capturing_element_clears_capture() {
        let mut ctx = GuiContext::default();
        let parent = ctx.create_element();
        let child = ctx.create_element();
        ctx.append_child_element(parent, child);
        ctx.set_mouse_event_capture(Some(child));
        ctx.set_keyboard_focus(Some(child));
        assert_eq!(ctx.mouse_event_capture(), Some(child));

        ctx.delete_element(parent);
        assert_eq!(ctx.mouse_event_capture(), None);
        assert_eq!(ctx.keyboard_focus(), None);
        assert!(!ctx.element_exists(child));
        ctx.set_element_width(child, Length::px(3.0));
        assert_eq!(ctx.element_size(child), None);
    }

    #[test]
    fn deletion_is_deferred_until_the_batch_ends() {
        let mut ctx = GuiContext::default();
        let el = ctx.create_element();
        ctx.begin_batch();
        ctx.delete_element(el);
        assert!(!ctx.element_exists(el));
        assert!(ctx.elements.contains_key(el));
        ctx.end_batch();
        assert!(!ctx.elements.contains_key(el));
    }

    #[test]
    fn ids_are_searchable() {
        let mut ctx = GuiContext::default();
        let surface = ctx.create_surface(10.0, 10.0, 96.0, 96.0);
        ctx.set_surface_id(surface, Some("main"));
        let el = ctx.create_element();
        ctx.set_element_id(el, Some("ok-button"));
        assert_eq!(ctx.find_element_by_id("ok-button"), Some(el));
        assert_eq!(ctx.find_surface_by_id("main"), Some(surface));
        ctx.delete_element(el);
        assert_eq!(ctx.find_element_by_id("ok-button"), None);
    }

    #[test]
    fn detaching_repaints_the_old_footprint() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(100.0, 100.0, 96.0, 96.0);
        let el = ctx.create_element();
        ctx.set_element_width(el, Length::px(10.0));
        ctx.set_element_height(el, Length::px(10.0));
        ctx.set_element_surface(el, Some(surface));
        log.borrow_mut().clear();

        ctx.detach_element(el);
        let clips = crate::testing::clip_rects(&log.borrow());
        assert_eq!(clips.first().map(|r| (r.width(), r.height())), Some((10.0, 10.0)));
    }
}
