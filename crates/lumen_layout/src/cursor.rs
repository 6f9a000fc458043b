//! Custom cursor
//!
//! A ring and a dot that trail the pointer. Each frame both move a fixed
//! fraction of the remaining distance, the dot faster than the ring. Links,
//! buttons and `data-cursor-hover` elements put the cursor in its hover
//! state; `data-cursor-text` shows a label inside the ring.
//!
//! The cursor shows on the first pointer move and hides when the pointer
//! leaves the document. Coming back is handled by the next move, which snaps
//! the ring and dot to the pointer instead of sliding them in.
//!
//! Touch devices have no pointer to follow, so nothing is mounted there.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use lumen_animation::{FrameControl, FrameScheduler, FrameTask};
use lumen_core::{
    Display, Element, ElementId, Event, EventDispatcher, EventType, ListenerId, Point,
    SharedDocument,
};

#[derive(Clone, Debug, PartialEq)]
pub struct CursorOptions {
    /// Fraction of the distance the ring covers per frame
    pub ring_follow: f32,
    /// Fraction of the distance the dot covers per frame
    pub dot_follow: f32,
    /// Class put on the document root while the cursor is shown
    pub active_class: String,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            ring_follow: 0.15,
            dot_follow: 0.35,
            active_class: "custom-cursor-active".to_string(),
        }
    }
}

/// Snapshot of the cursor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CursorState {
    pub pointer: Point,
    pub ring: Point,
    pub dot: Point,
    pub visible: bool,
    pub hovering: bool,
    pub text: Option<String>,
}

struct CursorInner {
    document: SharedDocument,
    events: EventDispatcher,
    options: CursorOptions,
    state: CursorState,
    ring: ElementId,
    dot: ElementId,
    label: ElementId,
    frame: Option<FrameTask>,
    listeners: Vec<ListenerId>,
}

/// Mounted custom cursor
pub struct CustomCursor {
    inner: Rc<RefCell<CursorInner>>,
}

impl CustomCursor {
    /// Create the cursor elements and start following the pointer
    ///
    /// Returns `None` on touch devices.
    pub fn mount(
        document: SharedDocument,
        scheduler: &FrameScheduler,
        events: &EventDispatcher,
        options: CursorOptions,
    ) -> Option<Self> {
        if document.borrow().preferences.touch_device {
            tracing::debug!("touch device, custom cursor not mounted");
            return None;
        }

        let created = {
            let mut doc = document.borrow_mut();
            let tree = &mut doc.tree;
            let root = tree.root();
            tree.append_element(root, "div").and_then(|ring| {
                let label = tree.append_element(ring, "span")?;
                let dot = tree.append_element(root, "div")?;
                Ok((ring, label, dot))
            })
        };
        let (ring, label, dot) = match created {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(%err, "could not create cursor elements");
                return None;
            }
        };
        {
            let mut doc = document.borrow_mut();
            doc.tree.add_class(ring, "custom-cursor");
            doc.tree.add_class(label, "custom-cursor__text");
            doc.tree.add_class(dot, "custom-cursor__dot");
        }

        let inner = Rc::new(RefCell::new(CursorInner {
            document,
            events: events.clone(),
            options,
            state: CursorState::default(),
            ring,
            dot,
            label,
            frame: None,
            listeners: Vec::new(),
        }));

        let listeners = [
            EventType::PointerMove,
            EventType::PointerLeave,
            EventType::PointerOver,
            EventType::PointerOut,
        ]
        .into_iter()
        .map(|event_type| {
            let weak = Rc::downgrade(&inner);
            events.add_listener(event_type, move |event| {
                if let Some(inner) = weak.upgrade() {
                    handle_event(&inner, event);
                }
            })
        })
        .collect();

        let weak = Rc::downgrade(&inner);
        let frame = scheduler.request_frame(move |_| follow(&weak));

        {
            let mut state = inner.borrow_mut();
            state.listeners = listeners;
            state.frame = Some(frame);
        }
        render(&inner);
        tracing::debug!("custom cursor mounted");
        Some(Self { inner })
    }

    pub fn state(&self) -> CursorState {
        self.inner.borrow().state.clone()
    }

    pub fn ring_element(&self) -> ElementId {
        self.inner.borrow().ring
    }

    pub fn dot_element(&self) -> ElementId {
        self.inner.borrow().dot
    }

    /// Remove listeners, the frame task, the root class and the elements
    pub fn unmount(&self) {
        let (listeners, frame, events, document, ring, dot, class) = {
            let mut inner = self.inner.borrow_mut();
            (
                std::mem::take(&mut inner.listeners),
                inner.frame.take(),
                inner.events.clone(),
                Rc::clone(&inner.document),
                inner.ring,
                inner.dot,
                inner.options.active_class.clone(),
            )
        };
        if listeners.is_empty() && frame.is_none() {
            return;
        }
        for id in listeners {
            events.remove_listener(id);
        }
        drop(frame);

        let mut doc = document.borrow_mut();
        let root = doc.tree.root();
        doc.tree.remove_class(root, &class);
        doc.tree.remove(ring);
        doc.tree.remove(dot);
        tracing::debug!("custom cursor unmounted");
    }
}

impl Drop for CustomCursor {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn is_hover_target(element: &Element) -> bool {
    matches!(element.tag(), Some("a") | Some("button")) || element.attribute("data-cursor-hover").is_some()
}

fn handle_event(inner: &Rc<RefCell<CursorInner>>, event: &Event) {
    {
        let mut guard = inner.borrow_mut();
        let CursorInner {
            document,
            options,
            state,
            ..
        } = &mut *guard;
        match event {
            Event::PointerMove { position } => {
                state.pointer = *position;
                if !state.visible {
                    // First move after mounting or re-entering
                    state.visible = true;
                    state.ring = *position;
                    state.dot = *position;
                    let mut doc = document.borrow_mut();
                    let root = doc.tree.root();
                    doc.tree.add_class(root, &options.active_class);
                }
            }
            Event::PointerLeave => {
                state.visible = false;
                let mut doc = document.borrow_mut();
                let root = doc.tree.root();
                doc.tree.remove_class(root, &options.active_class);
            }
            Event::PointerOver { target } => {
                let doc = document.borrow();
                if doc.tree.closest(*target, is_hover_target).is_some() {
                    state.hovering = true;
                    let text = doc
                        .tree
                        .closest(*target, |el| el.attribute("data-cursor-text").is_some())
                        .and_then(|id| doc.tree.attribute(id, "data-cursor-text"));
                    if let Some(text) = text {
                        state.text = Some(text.to_string());
                    }
                }
            }
            Event::PointerOut { target } => {
                let doc = document.borrow();
                if doc.tree.closest(*target, is_hover_target).is_some() {
                    state.hovering = false;
                    state.text = None;
                }
            }
            _ => return,
        }
    }
    render(inner);
}

fn follow(inner: &Weak<RefCell<CursorInner>>) -> FrameControl {
    let Some(inner) = inner.upgrade() else {
        return FrameControl::Done;
    };
    {
        let mut guard = inner.borrow_mut();
        let ring_follow = guard.options.ring_follow;
        let dot_follow = guard.options.dot_follow;
        let state = &mut guard.state;
        state.ring = approach(state.ring, state.pointer, ring_follow);
        state.dot = approach(state.dot, state.pointer, dot_follow);
    }
    render(&inner);
    FrameControl::Continue
}

fn approach(from: Point, to: Point, factor: f32) -> Point {
    Point::new(from.x + (to.x - from.x) * factor, from.y + (to.y - from.y) * factor)
}

/// Mirror the cursor state onto its elements
fn render(inner: &Rc<RefCell<CursorInner>>) {
    let guard = inner.borrow();
    let Ok(mut doc) = guard.document.try_borrow_mut() else {
        return;
    };
    let tree = &mut doc.tree;
    let state = &guard.state;

    for (id, position, base) in [
        (guard.ring, state.ring, "custom-cursor"),
        (guard.dot, state.dot, "custom-cursor__dot"),
    ] {
        if let Some(style) = tree.style_mut(id) {
            style.translate_x = position.x;
            style.translate_y = position.y;
        }
        for (modifier, on) in [("visible", state.visible), ("hovering", state.hovering)] {
            let class = format!("{base}--{modifier}");
            if on {
                tree.add_class(id, &class);
            } else {
                tree.remove_class(id, &class);
            }
        }
    }

    let text = state.text.clone().unwrap_or_default();
    if tree.text_content(guard.label) != text {
        if let Err(err) = tree.set_text(guard.label, text) {
            tracing::trace!(%err, "cursor label is gone");
        }
    }
    if let Some(style) = tree.style_mut(guard.label) {
        style.display = if state.text.is_some() {
            Display::Inline
        } else {
            Display::None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Document, Viewport};

    struct Page {
        doc: SharedDocument,
        scheduler: FrameScheduler,
        events: EventDispatcher,
    }

    fn page(touch: bool) -> Page {
        let mut doc = Document::new(Viewport::default());
        doc.preferences.touch_device = touch;
        Page {
            doc: doc.into_shared(),
            scheduler: FrameScheduler::new(),
            events: EventDispatcher::new(),
        }
    }

    fn mount(p: &Page) -> Option<CustomCursor> {
        CustomCursor::mount(Rc::clone(&p.doc), &p.scheduler, &p.events, CursorOptions::default())
    }

    fn root_active(p: &Page) -> bool {
        let doc = p.doc.borrow();
        doc.tree.has_class(doc.tree.root(), "custom-cursor-active")
    }

    #[test]
    fn test_not_mounted_on_touch_devices() {
        let p = page(true);
        assert!(mount(&p).is_none());
        assert_eq!(p.events.total_listeners(), 0);
        assert_eq!(p.scheduler.task_count(), 0);
    }

    #[test]
    fn test_follow_factors() {
        let p = page(false);
        let cursor = mount(&p).unwrap();

        p.events.dispatch(&Event::PointerMove {
            position: Point::new(0.0, 0.0),
        });
        assert!(cursor.state().visible);
        assert!(root_active(&p));

        p.events.dispatch(&Event::PointerMove {
            position: Point::new(100.0, 200.0),
        });
        p.scheduler.tick(0.0);
        let state = cursor.state();
        assert!((state.ring.x - 15.0).abs() < 1e-4);
        assert!((state.ring.y - 30.0).abs() < 1e-4);
        assert!((state.dot.x - 35.0).abs() < 1e-4);

        p.scheduler.tick(16.0);
        assert!((cursor.state().ring.x - 27.75).abs() < 1e-4);
        let doc = p.doc.borrow();
        assert!((doc.tree.style(cursor.ring_element()).unwrap().translate_x - 27.75).abs() < 1e-4);
    }

    #[test]
    fn test_first_move_snaps() {
        let p = page(false);
        let cursor = mount(&p).unwrap();
        p.events.dispatch(&Event::PointerMove {
            position: Point::new(400.0, 300.0),
        });
        assert_eq!(cursor.state().ring, Point::new(400.0, 300.0));
        assert_eq!(cursor.state().dot, Point::new(400.0, 300.0));

        p.events.dispatch(&Event::PointerLeave);
        assert!(!cursor.state().visible);
        assert!(!root_active(&p));
    }

    #[test]
    fn test_reentering_snaps_and_marks_root() {
        let p = page(false);
        let cursor = mount(&p).unwrap();
        p.events.dispatch(&Event::PointerMove {
            position: Point::new(10.0, 10.0),
        });
        p.events.dispatch(&Event::PointerLeave);
        p.events.dispatch(&Event::PointerEnter);
        assert!(!cursor.state().visible);

        p.events.dispatch(&Event::PointerMove {
            position: Point::new(900.0, 500.0),
        });
        let state = cursor.state();
        assert!(state.visible);
        assert!(root_active(&p));
        assert_eq!(state.ring, Point::new(900.0, 500.0));
        assert_eq!(state.dot, Point::new(900.0, 500.0));
        assert!(p
            .doc
            .borrow()
            .tree
            .has_class(cursor.ring_element(), "custom-cursor--visible"));
    }

    #[test]
    fn test_hover_and_text() {
        let p = page(false);
        let cursor = mount(&p).unwrap();
        let (card, inner) = {
            let mut doc = p.doc.borrow_mut();
            let root = doc.tree.root();
            let card = doc.tree.append_element(root, "div").unwrap();
            doc.tree.set_attribute(card, "data-cursor-hover", "");
            doc.tree.set_attribute(card, "data-cursor-text", "View");
            let inner = doc.tree.append_element(card, "img").unwrap();
            (card, inner)
        };

        p.events.dispatch(&Event::PointerOver { target: inner });
        let state = cursor.state();
        assert!(state.hovering);
        assert_eq!(state.text.as_deref(), Some("View"));
        {
            let doc = p.doc.borrow();
            assert!(doc.tree.has_class(cursor.ring_element(), "custom-cursor--hovering"));
            assert_eq!(doc.tree.text_content(cursor.ring_element()), "View");
        }

        p.events.dispatch(&Event::PointerOut { target: card });
        assert!(!cursor.state().hovering);
        assert_eq!(cursor.state().text, None);
    }

    #[test]
    fn test_unmount_cleans_up() {
        let p = page(false);
        let cursor = mount(&p).unwrap();
        let ring = cursor.ring_element();
        p.events.dispatch(&Event::PointerMove {
            position: Point::new(10.0, 10.0),
        });
        assert_eq!(p.events.total_listeners(), 4);

        drop(cursor);
        assert_eq!(p.events.total_listeners(), 0);
        assert_eq!(p.scheduler.task_count(), 0);
        assert!(!root_active(&p));
        assert!(!p.doc.borrow().tree.contains(ring));
    }
}
