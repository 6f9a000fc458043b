//! Smooth scrolling
//!
//! Wheel and touch input move a scroll *target*; the applied scroll position
//! eases from wherever it is toward that target over a fixed duration. Every
//! applied position is written to the document and announced as a
//! `Event::Scroll`, which is what the intersection observer listens to.
//!
//! In-page anchor clicks (`href="#id"`) are intercepted and turned into an
//! eased scroll to the anchored element.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use lumen_animation::{Easing, FrameControl, FrameInfo, FrameScheduler, FrameTask, SchedulerHandle};
use lumen_core::{ElementId, Event, EventDispatcher, EventType, ListenerId, SharedDocument};

use crate::intersection::ObserverHandle;

/// Delay before the observer re-evaluates once everything is mounted
pub const REFRESH_DELAY_MS: f64 = 100.0;

/// Smooth scroll settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothScrollOptions {
    /// Seconds to reach the target
    pub duration: f32,
    pub easing: Easing,
    /// Ease wheel input; when false wheel deltas apply at once
    pub smooth_wheel: bool,
    pub wheel_multiplier: f32,
    pub touch_multiplier: f32,
    /// Wrap around instead of clamping at the ends
    pub infinite: bool,
    /// Added to anchor targets so they clear a fixed header
    pub anchor_offset: f32,
}

impl Default for SmoothScrollOptions {
    fn default() -> Self {
        Self {
            duration: 1.2,
            easing: Easing::ScrollExpo,
            smooth_wheel: true,
            wheel_multiplier: 1.0,
            touch_multiplier: 2.0,
            infinite: false,
            anchor_offset: -100.0,
        }
    }
}

/// Where `scroll_to` should go
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollTarget {
    Top,
    Bottom,
    /// Absolute offset in layout units
    Offset(f32),
    /// Top edge of an element
    Element(ElementId),
}

/// Per-call overrides for `scroll_to`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollToOptions {
    /// Added to the resolved position
    pub offset: f32,
    /// Jump without easing
    pub immediate: bool,
    /// Overrides the configured duration
    pub duration: Option<f32>,
    /// Scroll even while stopped
    pub force: bool,
}

impl ScrollToOptions {
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ScrollAnimation {
    from: f32,
    to: f32,
    duration: f32,
    start_ms: Option<f64>,
}

struct ScrollState {
    document: SharedDocument,
    events: EventDispatcher,
    scheduler: SchedulerHandle,
    options: SmoothScrollOptions,
    /// Last position this component applied
    animated: f32,
    target: f32,
    animation: Option<ScrollAnimation>,
    stopped: bool,
    /// Set while our own scroll event is being dispatched
    emitting: bool,
    frame: Option<FrameTask>,
    refresh: Option<FrameTask>,
    listeners: Vec<ListenerId>,
}

impl ScrollState {
    fn limit(&self) -> f32 {
        self.document.borrow().max_scroll()
    }

    fn clamp(&self, value: f32) -> f32 {
        let limit = self.limit();
        if self.options.infinite {
            value
        } else {
            value.clamp(0.0, limit)
        }
    }
}

/// Mounted smooth scroller
pub struct SmoothScroll {
    state: Rc<RefCell<ScrollState>>,
}

impl SmoothScroll {
    pub fn mount(
        document: SharedDocument,
        scheduler: &FrameScheduler,
        events: &EventDispatcher,
        observer: &ObserverHandle,
        options: SmoothScrollOptions,
    ) -> Self {
        let current = document.borrow().scroll_y();
        let state = Rc::new(RefCell::new(ScrollState {
            document,
            events: events.clone(),
            scheduler: scheduler.handle(),
            options,
            animated: current,
            target: current,
            animation: None,
            stopped: false,
            emitting: false,
            frame: None,
            refresh: None,
            listeners: Vec::new(),
        }));

        let listeners = [
            EventType::Wheel,
            EventType::Touch,
            EventType::Click,
            EventType::Scroll,
        ]
        .into_iter()
        .map(|event_type| {
            let weak = Rc::downgrade(&state);
            events.add_listener(event_type, move |event| {
                if let Some(state) = weak.upgrade() {
                    handle_event(&state, event);
                }
            })
        })
        .collect();

        let observer = observer.clone();
        let refresh = scheduler.request_timeout(REFRESH_DELAY_MS, move || observer.refresh());

        {
            let mut s = state.borrow_mut();
            s.listeners = listeners;
            s.refresh = Some(refresh);
        }
        tracing::debug!(duration = options.duration, "smooth scroll mounted");
        Self { state }
    }

    /// Ease (or jump) to `target`; returns false while stopped
    pub fn scroll_to(&self, target: ScrollTarget, options: ScrollToOptions) -> bool {
        scroll_to(&self.state, target, options)
    }

    /// Ignore input and freeze the current position
    pub fn stop(&self) {
        let frame = {
            let mut s = self.state.borrow_mut();
            s.stopped = true;
            s.animation = None;
            s.target = s.animated;
            s.frame.take()
        };
        drop(frame);
    }

    pub fn start(&self) {
        self.state.borrow_mut().stopped = false;
    }

    /// Remove listeners and cancel pending frames
    pub fn destroy(&self) {
        let (listeners, frame, refresh, events) = {
            let mut s = self.state.borrow_mut();
            s.animation = None;
            (
                std::mem::take(&mut s.listeners),
                s.frame.take(),
                s.refresh.take(),
                s.events.clone(),
            )
        };
        if listeners.is_empty() && frame.is_none() && refresh.is_none() {
            return;
        }
        for id in listeners {
            events.remove_listener(id);
        }
        drop(frame);
        drop(refresh);
        tracing::debug!("smooth scroll destroyed");
    }

    /// Position last applied
    pub fn scroll_y(&self) -> f32 {
        self.state.borrow().animated
    }

    pub fn target(&self) -> f32 {
        self.state.borrow().target
    }

    pub fn is_animating(&self) -> bool {
        self.state.borrow().animation.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.borrow().stopped
    }

    pub fn options(&self) -> SmoothScrollOptions {
        self.state.borrow().options
    }
}

impl Drop for SmoothScroll {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn handle_event(state: &Rc<RefCell<ScrollState>>, event: &Event) {
    match *event {
        Event::Wheel { delta_y } => {
            let (stopped, multiplier, smooth) = {
                let s = state.borrow();
                (s.stopped, s.options.wheel_multiplier, s.options.smooth_wheel)
            };
            if stopped {
                return;
            }
            let target = state.borrow().target + delta_y * multiplier;
            let options = ScrollToOptions {
                immediate: !smooth,
                ..ScrollToOptions::default()
            };
            scroll_to(state, ScrollTarget::Offset(target), options);
        }
        Event::Touch { delta_y } => {
            let (stopped, multiplier) = {
                let s = state.borrow();
                (s.stopped, s.options.touch_multiplier)
            };
            if stopped {
                return;
            }
            let target = state.borrow().target + delta_y * multiplier;
            scroll_to(state, ScrollTarget::Offset(target), ScrollToOptions::default());
        }
        Event::Click { target } => {
            let (anchor, offset) = {
                let s = state.borrow();
                (resolve_anchor(&s.document, target), s.options.anchor_offset)
            };
            if let Some(element) = anchor {
                tracing::debug!(?element, "anchor scroll");
                scroll_to(
                    state,
                    ScrollTarget::Element(element),
                    ScrollToOptions::default().with_offset(offset),
                );
            }
        }
        Event::Scroll { scroll_y } => {
            // Host-driven scroll while idle: follow it
            let mut s = state.borrow_mut();
            if !s.emitting && s.animation.is_none() {
                s.animated = scroll_y;
                s.target = scroll_y;
            }
        }
        _ => {}
    }
}

/// Element targeted by an in-page link at or above `clicked`
fn resolve_anchor(document: &SharedDocument, clicked: ElementId) -> Option<ElementId> {
    let document = document.borrow();
    let tree = &document.tree;
    let link = tree.closest(clicked, |el| {
        el.tag() == Some("a") && el.attribute("href").map_or(false, |h| h.starts_with('#'))
    })?;
    let href = tree.attribute(link, "href")?;
    let dom_id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
    tree.find_by_dom_id(dom_id)
}

fn scroll_to(state: &Rc<RefCell<ScrollState>>, target: ScrollTarget, options: ScrollToOptions) -> bool {
    let position = {
        let s = state.borrow();
        if s.stopped && !options.force {
            return false;
        }
        let base = match target {
            ScrollTarget::Top => 0.0,
            ScrollTarget::Bottom => s.limit(),
            ScrollTarget::Offset(y) => y,
            ScrollTarget::Element(id) => match s.document.borrow().tree.bounds(id) {
                Some(bounds) => bounds.top(),
                None => return false,
            },
        };
        s.clamp(base + options.offset)
    };

    if options.immediate {
        let frame = {
            let mut s = state.borrow_mut();
            s.animation = None;
            s.target = position;
            s.animated = position;
            s.frame.take()
        };
        drop(frame);
        apply(state, position);
        return true;
    }

    {
        let mut s = state.borrow_mut();
        s.target = position;
        let duration = options.duration.unwrap_or(s.options.duration);
        s.animation = Some(ScrollAnimation {
            from: s.animated,
            to: position,
            duration,
            start_ms: None,
        });
    }
    ensure_running(state);
    true
}

fn ensure_running(state: &Rc<RefCell<ScrollState>>) {
    let (running, scheduler) = {
        let s = state.borrow();
        (
            s.frame.as_ref().map(FrameTask::is_active).unwrap_or(false),
            s.scheduler.clone(),
        )
    };
    if running {
        return;
    }
    let weak = Rc::downgrade(state);
    let task = scheduler.request_frame(move |info| frame(&weak, info));
    state.borrow_mut().frame = task;
}

fn frame(state: &Weak<RefCell<ScrollState>>, info: &FrameInfo) -> FrameControl {
    let Some(state) = state.upgrade() else {
        return FrameControl::Done;
    };

    let position = {
        let mut s = state.borrow_mut();
        let easing = s.options.easing;
        let Some(animation) = s.animation.as_mut() else {
            s.frame = None;
            return FrameControl::Done;
        };
        let start = *animation.start_ms.get_or_insert(info.timestamp_ms);
        let progress = if animation.duration <= 0.0 {
            1.0
        } else {
            (((info.timestamp_ms - start) / 1000.0) as f32 / animation.duration).clamp(0.0, 1.0)
        };
        let done = progress >= 1.0;
        let position = if done {
            animation.to
        } else {
            animation.from + (animation.to - animation.from) * easing.apply(progress)
        };
        s.animated = position;
        if done {
            s.animation = None;
        }
        position
    };

    apply(&state, position);

    // Scroll listeners may have started another animation during `apply`
    if state.borrow().animation.is_some() {
        return FrameControl::Continue;
    }
    let task = state.borrow_mut().frame.take();
    drop(task);
    FrameControl::Done
}

/// Write `position` to the document and announce it
fn apply(state: &Rc<RefCell<ScrollState>>, position: f32) {
    let (document, events, infinite) = {
        let s = state.borrow();
        (Rc::clone(&s.document), s.events.clone(), s.options.infinite)
    };
    let scroll_y = {
        let mut document = document.borrow_mut();
        let limit = document.max_scroll();
        let position = if infinite && limit > 0.0 {
            position.rem_euclid(limit)
        } else {
            position
        };
        document.set_scroll_y(position)
    };
    tracing::trace!(scroll_y, "smooth scroll frame");

    state.borrow_mut().emitting = true;
    events.dispatch(&Event::Scroll { scroll_y });
    state.borrow_mut().emitting = false;
}
