use crate::style::Cursor;
use crate::view::{ElementId, GuiContext};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Non-printable keys. Printable input arrives separately as characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Other(u32),
}

/// Notifications delivered to elements. Mouse coordinates are element-local,
/// measured from the element's border-box origin.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    Size { width: f32, height: f32 },
    Move { x: f32, y: f32 },
    SizeAndMove { x: f32, y: f32, width: f32, height: f32 },
    MouseEnter,
    MouseLeave,
    MouseMove { x: f32, y: f32 },
    MouseButtonDown { button: MouseButton, x: f32, y: f32 },
    MouseButtonUp { button: MouseButton, x: f32, y: f32 },
    MouseButtonDoubleClick { button: MouseButton, x: f32, y: f32 },
    MouseWheel { delta: f32 },
    KeyPressed { key: Key, modifiers: KeyModifiers },
    KeyReleased { key: Key, modifiers: KeyModifiers },
    PrintableKeyDown { ch: char },
    ReceiveFocus,
    LoseFocus,
    /// The element's text was edited through keyboard input.
    TextChanged,
}

/// Receives events posted to one element.
///
/// Handlers may freely mutate the context; the element may be gone by the time
/// the next handler in line would run, in which case it is skipped.
pub trait ElementEventHandler {
    fn handle_event(&self, ctx: &mut GuiContext, element: ElementId, event: &ElementEvent);
}

impl<F> ElementEventHandler for F
where
    F: Fn(&mut GuiContext, ElementId, &ElementEvent),
{
    fn handle_event(&self, ctx: &mut GuiContext, element: ElementId, event: &ElementEvent) {
        self(ctx, element, event)
    }
}

/// Observes every event posted by a context, after the element's own handlers.
pub trait GlobalEventHandler {
    fn handle_element_event(
        &self,
        _ctx: &mut GuiContext,
        _element: ElementId,
        _event: &ElementEvent,
    ) {
    }

    /// The resolved cursor for the element under the mouse changed.
    fn on_cursor_changed(&self, _ctx: &mut GuiContext, _cursor: Cursor) {}
}

/// Returned by handler registration; used to detach the handler again.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandlerId(u64);

impl EventHandlerId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for EventHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandlerId({})", self.0)
    }
}
