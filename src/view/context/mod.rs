//! The GUI context: element arena, layout engine, painting and event dispatch.

mod batch;
mod input;
mod layout;
mod painting;
mod properties;
mod text;
mod tree;

use crate::config::GuiConfig;
use crate::renderer::GuiRenderer;
use crate::resources::{ImageHandle, ImageResourceManager};
use crate::style::LayoutFlags;
use crate::text::FontProvider;
use crate::ui::{ElementEvent, ElementEventHandler, EventHandlerId, GlobalEventHandler};
use crate::view::{Element, ElementId, Surface, SurfaceId};
use batch::LayoutContext;
use input::InputState;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::rc::Rc;

pub use input::TextCursor;

/// Owns every element and surface and drives layout, painting and input.
///
/// All mutators run inside a batch: validation, painting and deferred deletion
/// happen when the outermost batch ends. Handlers invoked from inside the context
/// may call back into any public method.
pub struct GuiContext {
    config: GuiConfig,
    elements: SlotMap<ElementId, Element>,
    surfaces: SlotMap<SurfaceId, Surface>,
    layout: LayoutContext,
    input: InputState,
    renderer: Option<Box<dyn GuiRenderer>>,
    fonts: Option<Box<dyn FontProvider>>,
    images: Option<Box<dyn ImageResourceManager>>,
    /// Core-side image references; the renderer sees only 0->1 and 1->0 transitions.
    image_refs: FxHashMap<ImageHandle, u32>,
    global_handlers: Vec<(EventHandlerId, Rc<dyn GlobalEventHandler>)>,
}

impl Default for GuiContext {
    fn default() -> Self {
        Self::new(GuiConfig::default())
    }
}

impl GuiContext {
    pub fn new(config: GuiConfig) -> Self {
        Self {
            config,
            elements: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            layout: LayoutContext::default(),
            input: InputState::default(),
            renderer: None,
            fonts: None,
            images: None,
            image_refs: FxHashMap::default(),
            global_handlers: Vec::new(),
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn GuiRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_font_provider(mut self, fonts: Box<dyn FontProvider>) -> Self {
        self.set_font_provider(Some(fonts));
        self
    }

    pub fn with_image_manager(mut self, images: Box<dyn ImageResourceManager>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn set_renderer(&mut self, renderer: Option<Box<dyn GuiRenderer>>) {
        self.renderer = renderer;
        let surfaces: Vec<SurfaceId> = self.surfaces.keys().collect();
        self.batched(|ctx| {
            for surface in surfaces {
                ctx.invalidate_whole_surface(surface);
            }
        });
    }

    /// Replaces the font provider. Handles from the previous provider are dropped
    /// and every element's text is measured again.
    pub fn set_font_provider(&mut self, fonts: Option<Box<dyn FontProvider>>) {
        let ids: Vec<ElementId> = self.elements.keys().collect();
        if let Some(old) = self.fonts.as_deref_mut() {
            for id in &ids {
                if let Some((handle, _)) = self.elements[*id].font.take() {
                    old.release_font(handle);
                }
            }
        }
        self.fonts = fonts;
        self.batched(|ctx| {
            for id in ids {
                if ctx.live(id).is_some() {
                    ctx.invalidate_element_layout(id, LayoutFlags::TEXT);
                }
            }
        });
    }

    pub fn image_manager_mut(&mut self) -> Option<&mut (dyn ImageResourceManager + 'static)> {
        self.images.as_deref_mut()
    }

    pub fn font_provider_mut(&mut self) -> Option<&mut (dyn FontProvider + 'static)> {
        self.fonts.as_deref_mut()
    }

    /// Registers a handler for events posted to `element`. Handlers run in
    /// registration order.
    pub fn attach_event_handler(
        &mut self,
        element: ElementId,
        handler: impl ElementEventHandler + 'static,
    ) -> Option<EventHandlerId> {
        let el = self.live_mut(element)?;
        let id = EventHandlerId::next();
        el.handlers.push((id, Rc::new(handler)));
        Some(id)
    }

    pub fn detach_event_handler(&mut self, element: ElementId, handler: EventHandlerId) -> bool {
        let Some(el) = self.live_mut(element) else {
            return false;
        };
        let before = el.handlers.len();
        el.handlers.retain(|(id, _)| *id != handler);
        el.handlers.len() != before
    }

    pub fn add_global_event_handler(&mut self, handler: Rc<dyn GlobalEventHandler>) -> EventHandlerId {
        let id = EventHandlerId::next();
        self.global_handlers.push((id, handler));
        id
    }

    pub fn remove_global_event_handler(&mut self, handler: EventHandlerId) -> bool {
        let before = self.global_handlers.len();
        self.global_handlers.retain(|(id, _)| *id != handler);
        self.global_handlers.len() != before
    }

    /// Delivers `event` to the element's handlers, then to the global handlers.
    /// Stops as soon as a handler deletes the element.
    pub(crate) fn post_event(&mut self, element: ElementId, event: ElementEvent) {
        let Some(el) = self.live(element) else {
            return;
        };
        let handlers: Vec<_> = el.handlers.iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            if self.live(element).is_none() {
                return;
            }
            handler.handle_event(self, element, &event);
        }
        let globals: Vec<_> = self.global_handlers.iter().map(|(_, h)| h.clone()).collect();
        for handler in globals {
            if self.live(element).is_none() {
                return;
            }
            handler.handle_element_event(self, element, &event);
        }
    }

    pub(crate) fn live(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id).filter(|el| el.is_alive())
    }

    pub(crate) fn live_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id).filter(|el| el.is_alive())
    }

    /// Like [`Self::live`], but logs stale handles passed to a public mutator.
    pub(crate) fn checked(&self, id: ElementId, op: &str) -> bool {
        let ok = self.live(id).is_some();
        if !ok {
            log::warn!("{op}: stale or deleted element {id:?}");
        }
        ok
    }

    pub(crate) fn checked_surface(&self, id: SurfaceId, op: &str) -> bool {
        let ok = self.surfaces.contains_key(id);
        if !ok {
            log::warn!("{op}: unknown surface {id:?}");
        }
        ok
    }

    /// Surface DPI over base DPI for one axis; 1 for detached elements.
    pub(crate) fn dpi_scale(&self, surface: Option<SurfaceId>, horizontal: bool) -> f32 {
        let Some(surface) = surface.and_then(|id| self.surfaces.get(id)) else {
            return 1.0;
        };
        if horizontal {
            surface.dpi_x / self.config.base_dpi_x
        } else {
            surface.dpi_y / self.config.base_dpi_y
        }
    }

    pub(crate) fn children(&self, id: ElementId) -> Siblings<'_> {
        Siblings {
            elements: &self.elements,
            next: self.elements.get(id).and_then(|el| el.first_child),
        }
    }

    pub(crate) fn surface_elements(&self, surface: SurfaceId) -> Siblings<'_> {
        Siblings {
            elements: &self.elements,
            next: self.surfaces.get(surface).and_then(|s| s.first_element),
        }
    }

    /// The element itself followed by all of its descendants, depth first.
    pub(crate) fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children: Vec<ElementId> = self.children(next).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub(crate) fn is_ancestor_or_self(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.elements.get(id).and_then(|el| el.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

/// Iterates a sibling chain in tree order.
pub(crate) struct Siblings<'a> {
    elements: &'a SlotMap<ElementId, Element>,
    next: Option<ElementId>,
}

impl Iterator for Siblings<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let current = self.next?;
        self.next = self.elements.get(current).and_then(|el| el.next_sibling);
        Some(current)
    }
}
