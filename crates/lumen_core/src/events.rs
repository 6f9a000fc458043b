//! Host events and listener registration
//!
//! The host translates its native input (window resize, wheel, pointer,
//! clicks) into `Event`s and hands them to an `EventDispatcher`. Primitives
//! register listeners on mount and must remove every one of them on unmount;
//! `listener_count` exists so tests can verify that.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::geometry::{Point, Size};
use crate::tree::ElementId;

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

/// Event discriminant used for listener registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Resize,
    Scroll,
    Wheel,
    Touch,
    PointerMove,
    PointerEnter,
    PointerLeave,
    PointerOver,
    PointerOut,
    Click,
}

/// An input or environment event delivered by the host
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Viewport changed size
    Resize { size: Size, device_pixel_ratio: f32 },
    /// Scroll offset changed (emitted after the document was updated)
    Scroll { scroll_y: f32 },
    /// Wheel input, positive scrolls down
    Wheel { delta_y: f32 },
    /// Touch drag input, positive scrolls down
    Touch { delta_y: f32 },
    /// Pointer moved, position in viewport coordinates
    PointerMove { position: Point },
    /// Pointer entered the document
    PointerEnter,
    /// Pointer left the document
    PointerLeave,
    /// Pointer entered an element (bubbles from the deepest target)
    PointerOver { target: ElementId },
    /// Pointer left an element
    PointerOut { target: ElementId },
    /// Primary button click on an element
    Click { target: ElementId },
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::Resize { .. } => EventType::Resize,
            Event::Scroll { .. } => EventType::Scroll,
            Event::Wheel { .. } => EventType::Wheel,
            Event::Touch { .. } => EventType::Touch,
            Event::PointerMove { .. } => EventType::PointerMove,
            Event::PointerEnter => EventType::PointerEnter,
            Event::PointerLeave => EventType::PointerLeave,
            Event::PointerOver { .. } => EventType::PointerOver,
            Event::PointerOut { .. } => EventType::PointerOut,
            Event::Click { .. } => EventType::Click,
        }
    }
}

type ListenerFn = Rc<RefCell<dyn FnMut(&Event)>>;

struct Listener {
    event_type: EventType,
    callback: ListenerFn,
}

#[derive(Default)]
struct DispatcherInner {
    listeners: SlotMap<ListenerId, Listener>,
}

/// Listener registry shared by the host and every mounted primitive
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    inner: Rc<RefCell<DispatcherInner>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of `event_type`
    pub fn add_listener<F>(&self, event_type: EventType, callback: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.inner.borrow_mut().listeners.insert(Listener {
            event_type,
            callback: Rc::new(RefCell::new(callback)),
        })
    }

    /// Remove a listener; returns false if it was already gone
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(id).is_some()
    }

    /// Deliver `event` to every listener registered for its type
    ///
    /// The listener list is snapshotted first, so handlers may add or remove
    /// listeners. A listener removed by an earlier handler in the same
    /// dispatch is skipped. Returns how many listeners ran.
    pub fn dispatch(&self, event: &Event) -> usize {
        let event_type = event.event_type();
        let snapshot: Vec<(ListenerId, ListenerFn)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, l)| l.event_type == event_type)
            .map(|(id, l)| (id, Rc::clone(&l.callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.inner.borrow().listeners.contains_key(id) {
                continue;
            }
            // A listener that re-dispatches into itself is skipped rather
            // than re-entered.
            let Ok(mut callback) = callback.try_borrow_mut() else {
                tracing::trace!("skipping re-entrant listener for {:?}", event_type);
                continue;
            };
            (*callback)(event);
            delivered += 1;
        }
        delivered
    }

    /// Number of listeners registered for `event_type`
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|l| l.event_type == event_type)
            .count()
    }

    /// Total number of registered listeners
    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}
