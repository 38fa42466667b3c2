use super::GuiContext;
use crate::style::LayoutFlags;
use crate::view::ElementId;
use std::collections::VecDeque;

/// Cross-cutting state of one validation pass.
#[derive(Default)]
pub(crate) struct LayoutContext {
    pub(crate) batch_depth: u32,
    /// Elements with pending layout flags, in invalidation order.
    pub(crate) work_list: VecDeque<ElementId>,
    /// Elements whose size or relative position changed since events were last posted.
    pub(crate) changed: Vec<ElementId>,
    /// Roots of subtrees whose absolute positions are stale.
    pub(crate) absolute_dirty: Vec<ElementId>,
    pub(crate) pending_deletions: Vec<ElementId>,
}

impl LayoutContext {
    fn has_pending_layout(&self) -> bool {
        !self.work_list.is_empty() || !self.absolute_dirty.is_empty() || !self.changed.is_empty()
    }
}

impl GuiContext {
    pub fn begin_batch(&mut self) {
        self.layout.batch_depth += 1;
    }

    /// Closes a batch. Closing the outermost one validates layout to a fixed point,
    /// paints dirty surfaces and then destroys elements deleted during the batch.
    pub fn end_batch(&mut self) {
        match self.layout.batch_depth {
            0 => {
                debug_assert!(false, "end_batch without matching begin_batch");
                log::warn!("end_batch without matching begin_batch");
            }
            1 => self.resolve_batch(),
            _ => self.layout.batch_depth -= 1,
        }
    }

    pub fn batch_depth(&self) -> u32 {
        self.layout.batch_depth
    }

    pub(crate) fn batched<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_batch();
        let result = f(self);
        self.end_batch();
        result
    }

    /// Runs with the depth held at 1, so begin/end pairs issued by handlers stay nested.
    fn resolve_batch(&mut self) {
        let mut rounds = 0u32;
        loop {
            self.layout.batch_depth = 1;
            if !self.layout.has_pending_layout() && !self.input.hover_dirty {
                break;
            }
            rounds += 1;
            self.validate_pending();
            self.update_absolute_positions();
            self.post_layout_events();
            self.update_hover_after_layout();
        }
        if rounds > 0 {
            log::debug!("batch resolved in {rounds} round(s)");
        }

        self.layout.batch_depth = 1;
        self.paint_invalid_surfaces();
        self.layout.batch_depth = 1;
        self.flush_pending_deletions();
        self.layout.batch_depth = 0;
    }

    /// ORs `flags` into the element's invalid set. Newly queued elements repaint
    /// their current footprint so a shrinking layout leaves nothing behind.
    pub(crate) fn invalidate_element_layout(&mut self, id: ElementId, flags: LayoutFlags) {
        let Some(el) = self.live_mut(id) else {
            return;
        };
        el.layout.invalid |= flags;
        if el.layout.queued {
            return;
        }
        el.layout.queued = true;
        self.layout.work_list.push_back(id);
        self.invalidate_element_rect(id);
    }

    fn flush_pending_deletions(&mut self) {
        let pending = std::mem::take(&mut self.layout.pending_deletions);
        for id in pending {
            let Some(el) = self.elements.remove(id) else {
                continue;
            };
            if let (Some((font, _)), Some(fonts)) = (el.font, self.fonts.as_deref_mut()) {
                fonts.release_font(font);
            }
            if let Some(image) = el.background_image {
                self.release_image(image);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::style::Length;
    use crate::testing::{recording_context, DrawCommand};
    use crate::ui::ElementEvent;
    use crate::view::{ElementId, GuiContext};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn nested_batches_defer_painting_to_the_outermost_end() {
        let (mut ctx, log) = recording_context();
        let surface = ctx.create_surface(200.0, 100.0, 96.0, 96.0);
        log.borrow_mut().clear();

        ctx.begin_batch();
        ctx.begin_batch();
        let el = ctx.create_element();
        ctx.set_element_width(el, Length::px(50.0));
        ctx.set_element_height(el, Length::px(20.0));
        ctx.set_element_surface(el, Some(surface));
        ctx.end_batch();
        assert_eq!(ctx.batch_depth(), 1);
        assert!(log.borrow().is_empty());
        assert_eq!(ctx.element_size(el), Some((0.0, 0.0)));

        ctx.end_batch();
        assert_eq!(ctx.batch_depth(), 0);
        assert_eq!(ctx.element_size(el), Some((50.0, 20.0)));
        assert!(log
            .borrow()
            .iter()
            .any(|cmd| matches!(cmd, DrawCommand::BeginPaint { .. })));
    }

    #[test]
    fn unbalanced_begin_in_handler_does_not_leak_a_batch() {
        let mut ctx = GuiContext::default();
        let el = ctx.create_element();
        ctx.attach_event_handler(el, |ctx: &mut GuiContext, _: ElementId, event: &ElementEvent| {
            if matches!(event, ElementEvent::Size { .. }) {
                ctx.begin_batch();
            }
        });
        ctx.set_element_width(el, Length::px(10.0));
        assert_eq!(ctx.batch_depth(), 0);
    }

    #[test]
    fn redundant_writes_validate_once() {
        let mut ctx = GuiContext::default();
        let el = ctx.create_element();
        let sizes = Rc::new(RefCell::new(0));
        let counter = sizes.clone();
        ctx.attach_event_handler(el, move |_: &mut GuiContext, _: ElementId, event: &ElementEvent| {
            if matches!(event, ElementEvent::Size { .. }) {
                *counter.borrow_mut() += 1;
            }
        });
        ctx.set_element_width(el, Length::px(120.0));
        ctx.set_element_width(el, Length::px(120.0));
        assert_eq!(*sizes.borrow(), 1);
        assert!(!ctx.element_layout(el).expect("live").is_pending());
    }

    #[test]
    fn handler_mutations_are_validated_in_the_same_resolution() {
        let mut ctx = GuiContext::default();
        let a = ctx.create_element();
        let b = ctx.create_element();
        ctx.attach_event_handler(a, move |ctx: &mut GuiContext, _: ElementId, event: &ElementEvent| {
            if let ElementEvent::Size { width, .. } = event {
                ctx.set_element_width(b, Length::px(width * 2.0));
            }
        });
        ctx.set_element_width(a, Length::px(30.0));
        assert_eq!(ctx.element_size(b).map(|s| s.0), Some(60.0));
        assert_eq!(ctx.batch_depth(), 0);
    }
}
