//! Motion runtime
//!
//! Owns the pieces every primitive is mounted against: the shared document,
//! the frame scheduler, the event dispatcher and the intersection observer.
//! The host pumps frames with `tick` and routes input through the helper
//! methods, which keep the document in sync before the event goes out.

use std::rc::Rc;

use lumen_animation::FrameScheduler;
use lumen_core::{
    Document, ElementId, Event, EventDispatcher, MotionPreferences, Point, SharedDocument, Size,
    Viewport,
};
use lumen_layout::{IntersectionObserver, ObserverHandle};

/// Frame length used by `run_frames`, in milliseconds
pub const FRAME_MS: f64 = 1000.0 / 60.0;

pub struct MotionRuntime {
    document: SharedDocument,
    scheduler: FrameScheduler,
    events: EventDispatcher,
    observer: IntersectionObserver,
    clock_ms: f64,
}

impl MotionRuntime {
    pub fn new(viewport: Viewport, preferences: MotionPreferences) -> Self {
        let mut document = Document::new(viewport);
        document.preferences = preferences;
        Self::with_document(document)
    }

    /// Take over an existing document
    pub fn with_document(document: Document) -> Self {
        let document = document.into_shared();
        let scheduler = FrameScheduler::new();
        let events = EventDispatcher::new();
        let observer = IntersectionObserver::new(Rc::clone(&document), &scheduler, &events);
        tracing::debug!(
            width = document.borrow().viewport.size.width,
            height = document.borrow().viewport.size.height,
            "motion runtime created"
        );
        Self {
            document,
            scheduler,
            events,
            observer,
            clock_ms: 0.0,
        }
    }

    pub fn document(&self) -> SharedDocument {
        Rc::clone(&self.document)
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn observer(&self) -> ObserverHandle {
        self.observer.handle()
    }

    pub fn reduced_motion(&self) -> bool {
        self.document.borrow().prefers_reduced_motion()
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Run one frame at `timestamp_ms`; returns how many callbacks ran
    pub fn tick(&mut self, timestamp_ms: f64) -> usize {
        self.clock_ms = self.clock_ms.max(timestamp_ms);
        self.scheduler.tick(timestamp_ms)
    }

    /// Run `count` frames at 60 fps, continuing from the last timestamp
    pub fn run_frames(&mut self, count: usize) -> usize {
        (0..count)
            .map(|_| {
                let next = self.clock_ms + FRAME_MS;
                self.tick(next)
            })
            .sum()
    }

    /// Latest frame timestamp
    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.scheduler.frame_count()
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn dispatch(&self, event: Event) -> usize {
        self.events.dispatch(&event)
    }

    /// Resize the viewport, then notify listeners
    pub fn resize(&self, size: Size, device_pixel_ratio: f32) -> usize {
        {
            let mut doc = self.document.borrow_mut();
            doc.viewport = Viewport {
                size,
                device_pixel_ratio,
            };
            let scroll_y = doc.scroll_y();
            doc.set_scroll_y(scroll_y);
        }
        self.dispatch(Event::Resize {
            size,
            device_pixel_ratio,
        })
    }

    /// A native scroll by the host, for example a scrollbar drag
    pub fn scroll(&self, scroll_y: f32) -> f32 {
        let scroll_y = self.document.borrow_mut().set_scroll_y(scroll_y);
        self.dispatch(Event::Scroll { scroll_y });
        scroll_y
    }

    pub fn wheel(&self, delta_y: f32) -> usize {
        self.dispatch(Event::Wheel { delta_y })
    }

    pub fn touch(&self, delta_y: f32) -> usize {
        self.dispatch(Event::Touch { delta_y })
    }

    /// Pointer position in viewport coordinates
    pub fn pointer_move(&self, position: Point) -> usize {
        self.dispatch(Event::PointerMove { position })
    }

    pub fn click(&self, target: ElementId) -> usize {
        self.dispatch(Event::Click { target })
    }

    pub fn scroll_y(&self) -> f32 {
        self.document.borrow().scroll_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Rect;
    use lumen_layout::TriggerStart;
    use std::cell::Cell;

    fn runtime_with_content(height: f32) -> (MotionRuntime, ElementId) {
        let runtime = MotionRuntime::new(
            Viewport {
                size: Size::new(800.0, 600.0),
                device_pixel_ratio: 1.0,
            },
            MotionPreferences::default(),
        );
        let target = {
            let document = runtime.document();
            let mut doc = document.borrow_mut();
            let root = doc.tree.root();
            let target = doc.tree.append_element(root, "section").unwrap();
            doc.tree.set_bounds(target, Rect::new(0.0, 0.0, 800.0, height));
            target
        };
        (runtime, target)
    }

    #[test]
    fn test_run_frames_advances_clock() {
        let (mut runtime, _) = runtime_with_content(600.0);
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let _task = runtime.scheduler().request_frame(move |_| {
            seen.set(seen.get() + 1);
            lumen_animation::FrameControl::Continue
        });

        runtime.run_frames(10);
        assert_eq!(count.get(), 10);
        assert_eq!(runtime.frame_count(), 10);
        assert!((runtime.now_ms() - 10.0 * FRAME_MS).abs() < 1e-9);
    }

    #[test]
    fn test_scroll_is_clamped_and_observed() {
        let (mut runtime, _) = runtime_with_content(2000.0);
        let target = {
            let document = runtime.document();
            let mut doc = document.borrow_mut();
            let root = doc.tree.root();
            let target = doc.tree.append_element(root, "div").unwrap();
            doc.tree.set_bounds(target, Rect::new(0.0, 1500.0, 800.0, 100.0));
            target
        };
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        runtime
            .observer()
            .observe(target, TriggerStart::DEFAULT, move |_| flag.set(true))
            .unwrap();
        runtime.run_frames(1);
        assert!(!fired.get());

        assert_eq!(runtime.scroll(5000.0), 1400.0);
        assert!(fired.get());
    }

    #[test]
    fn test_resize_updates_viewport_first() {
        let (runtime, _) = runtime_with_content(1000.0);
        runtime.scroll(400.0);
        let seen = Rc::new(Cell::new(0.0));
        let height = Rc::clone(&seen);
        let document = runtime.document();
        let _listener = runtime
            .events()
            .add_listener(lumen_core::EventType::Resize, move |_| {
                height.set(document.borrow().viewport.size.height);
            });

        runtime.resize(Size::new(800.0, 900.0), 2.0);
        assert_eq!(seen.get(), 900.0);
        // Less room to scroll after the viewport grew
        assert_eq!(runtime.scroll_y(), 100.0);
    }
}
