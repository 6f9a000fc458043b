//! Intersection observer
//!
//! Shared scroll-position watcher. Primitives register an element with a
//! `TriggerStart`; when the element reaches it the callback runs once and the
//! observation is dropped.
//!
//! Observations are evaluated when something could have changed: on scroll
//! and resize events, and on the frame after an observation is added or a
//! refresh is requested. An element that is already past its start when it
//! is observed therefore fires on the next frame without any scrolling.
//! Observations whose element has been removed from the document are
//! discarded silently.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

use lumen_animation::{FrameControl, FrameScheduler, FrameTask, SchedulerHandle};
use lumen_core::{ElementId, EventDispatcher, EventType, ListenerId, SharedDocument};

use crate::trigger::TriggerStart;

new_key_type! {
    /// Handle to an element being observed
    pub struct ObservationId;
}

type ObservationCallback = Rc<RefCell<dyn FnMut(ObservationId)>>;

struct Observation {
    target: ElementId,
    start: TriggerStart,
    callback: ObservationCallback,
}

struct ObserverInner {
    document: SharedDocument,
    scheduler: SchedulerHandle,
    observations: SlotMap<ObservationId, Observation>,
    pending: Option<FrameTask>,
}

/// Owner of the shared observer; removing it stops all observations
pub struct IntersectionObserver {
    inner: Rc<RefCell<ObserverInner>>,
    events: EventDispatcher,
    listeners: Vec<ListenerId>,
}

impl IntersectionObserver {
    /// Create the observer and subscribe it to scroll and resize events
    pub fn new(document: SharedDocument, scheduler: &FrameScheduler, events: &EventDispatcher) -> Self {
        let inner = Rc::new(RefCell::new(ObserverInner {
            document,
            scheduler: scheduler.handle(),
            observations: SlotMap::with_key(),
            pending: None,
        }));

        let listeners = [EventType::Scroll, EventType::Resize]
            .into_iter()
            .map(|event_type| {
                let weak = Rc::downgrade(&inner);
                events.add_listener(event_type, move |_| {
                    if let Some(inner) = weak.upgrade() {
                        evaluate(&inner);
                    }
                })
            })
            .collect();

        Self {
            inner,
            events: events.clone(),
            listeners,
        }
    }

    /// Weak handle for primitives
    pub fn handle(&self) -> ObserverHandle {
        ObserverHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Evaluate every observation now; returns how many fired
    pub fn update(&self) -> usize {
        evaluate(&self.inner)
    }

    /// Evaluate on the next frame
    pub fn refresh(&self) {
        schedule(&self.inner);
    }

    /// Number of observations still waiting
    pub fn observation_count(&self) -> usize {
        self.inner.borrow().observations.len()
    }
}

impl Drop for IntersectionObserver {
    fn drop(&mut self) {
        for id in self.listeners.drain(..) {
            self.events.remove_listener(id);
        }
        let (observations, pending) = {
            let mut inner = self.inner.borrow_mut();
            (std::mem::take(&mut inner.observations), inner.pending.take())
        };
        drop(observations);
        drop(pending);
    }
}

/// A weak handle to the intersection observer
#[derive(Clone)]
pub struct ObserverHandle {
    inner: Weak<RefCell<ObserverInner>>,
}

impl ObserverHandle {
    /// Watch `target`; `callback` runs once when it reaches `start`
    ///
    /// Returns `None` if the observer is gone.
    pub fn observe<F>(&self, target: ElementId, start: TriggerStart, callback: F) -> Option<ObservationId>
    where
        F: FnMut(ObservationId) + 'static,
    {
        let inner = self.inner.upgrade()?;
        let id = inner.borrow_mut().observations.insert(Observation {
            target,
            start,
            callback: Rc::new(RefCell::new(callback)),
        });
        schedule(&inner);
        Some(id)
    }

    /// Stop watching; returns false if the observation already fired
    pub fn unobserve(&self, id: ObservationId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().observations.remove(id);
        removed.is_some()
    }

    pub fn is_observing(&self, id: ObservationId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().observations.contains_key(id))
            .unwrap_or(false)
    }

    /// Evaluate every observation now; returns how many fired
    pub fn update(&self) -> usize {
        self.inner.upgrade().map(|inner| evaluate(&inner)).unwrap_or(0)
    }

    /// Evaluate on the next frame
    pub fn refresh(&self) {
        if let Some(inner) = self.inner.upgrade() {
            schedule(&inner);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

fn schedule(inner: &Rc<RefCell<ObserverInner>>) {
    let already = inner
        .borrow()
        .pending
        .as_ref()
        .map(FrameTask::is_active)
        .unwrap_or(false);
    if already {
        return;
    }
    let weak = Rc::downgrade(inner);
    let scheduler = inner.borrow().scheduler.clone();
    let task = scheduler.request_frame(move |_| {
        if let Some(inner) = weak.upgrade() {
            inner.borrow_mut().pending = None;
            evaluate(&inner);
        }
        FrameControl::Done
    });
    inner.borrow_mut().pending = task;
}

/// Fire every observation whose element reached its start
fn evaluate(inner: &Rc<RefCell<ObserverInner>>) -> usize {
    let fired: Vec<(ObservationId, ObservationCallback)> = {
        let mut state = inner.borrow_mut();
        let document = Rc::clone(&state.document);
        let Ok(document) = document.try_borrow() else {
            drop(state);
            tracing::trace!("document busy, deferring intersection check");
            schedule(inner);
            return 0;
        };

        let viewport_height = document.viewport.size.height;
        let mut fired = Vec::new();
        let mut stale = Vec::new();
        for (id, observation) in state.observations.iter() {
            if !document.tree.contains(observation.target) {
                stale.push(id);
                continue;
            }
            let Some(rect) = document.viewport_rect(observation.target) else {
                continue;
            };
            if observation.start.is_reached(rect, viewport_height) {
                fired.push((id, Rc::clone(&observation.callback)));
            }
        }

        for id in stale {
            tracing::trace!(?id, "dropping observation of removed element");
            state.observations.remove(id);
        }
        // Play-once: deregister before running so callbacks may observe again
        for (id, _) in &fired {
            state.observations.remove(*id);
        }
        fired
    };

    let count = fired.len();
    for (id, callback) in fired {
        (*callback.borrow_mut())(id);
    }
    count
}
