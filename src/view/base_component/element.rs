use crate::resources::ImageHandle;
use crate::style::{ElementLayout, ElementStyle};
use crate::text::{FontDescriptor, FontHandle, TextLayout};
use crate::ui::{ElementEventHandler, EventHandlerId};
use crate::view::SurfaceId;
use slotmap::new_key_type;
use smol_str::SmolStr;
use std::rc::Rc;

new_key_type! {
    /// Generation-checked handle to an element. Stale handles resolve to nothing.
    pub struct ElementId;
}

/// One node of the element tree.
///
/// Parents own their children: deleting an element deletes its subtree. Top-level
/// elements have no parent and are linked through the sibling fields in their
/// surface's element list.
pub(crate) struct Element {
    pub(crate) style: ElementStyle,
    pub(crate) layout: ElementLayout,
    pub(crate) parent: Option<ElementId>,
    pub(crate) first_child: Option<ElementId>,
    pub(crate) last_child: Option<ElementId>,
    pub(crate) prev_sibling: Option<ElementId>,
    pub(crate) next_sibling: Option<ElementId>,
    pub(crate) surface: Option<SurfaceId>,
    pub(crate) text_layout: Option<TextLayout>,
    pub(crate) font: Option<(FontHandle, FontDescriptor)>,
    pub(crate) background_image: Option<ImageHandle>,
    pub(crate) handlers: Vec<(EventHandlerId, Rc<dyn ElementEventHandler>)>,
    pub(crate) id: Option<SmolStr>,
    pub(crate) pending_deletion: bool,
}

impl Element {
    pub(crate) fn new() -> Self {
        Self {
            style: ElementStyle::new(),
            layout: ElementLayout::default(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            surface: None,
            text_layout: None,
            font: None,
            background_image: None,
            handlers: Vec::new(),
            id: None,
            pending_deletion: false,
        }
    }

    pub(crate) fn is_auto_positioned(&self) -> bool {
        self.style.positioning == crate::style::Positioning::Auto
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.pending_deletion
    }
}
