//! Canvas background component
//!
//! Owns a drawing surface and repaints it every frame with one of three
//! decorative variants. The surface follows the size of its container (or
//! the viewport when there is none) and the device pixel ratio; particles are
//! re-seeded whenever it is resized.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use lumen_animation::FrameScheduler;
//! use lumen_canvas::{CanvasBackground, CanvasOptions};
//! use lumen_core::{Document, EventDispatcher, RecordingContext, SharedSurface, Size, Viewport};
//!
//! let doc = Document::new(Viewport::default()).into_shared();
//! let scheduler = FrameScheduler::new();
//! let events = EventDispatcher::new();
//! let recorder = RecordingContext::shared(Size::ZERO);
//! let surface: SharedSurface = recorder.clone();
//!
//! let background = CanvasBackground::mount(
//!     Rc::clone(&doc),
//!     &scheduler,
//!     &events,
//!     surface,
//!     None,
//!     CanvasOptions::default().with_seed(1),
//! );
//! scheduler.tick(0.0);
//! assert!(recorder.borrow().draw_call_count() > 0);
//! assert_eq!(background.particle_count(), 80);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use lumen_animation::{FrameControl, FrameInfo, FrameScheduler, FrameTask};
use lumen_core::{
    Color, ElementId, Event, EventDispatcher, EventType, ListenerId, Point, SharedDocument,
    SharedSurface, Size, SurfaceConfig,
};

use crate::error::CanvasError;
use crate::gradient::GradientMesh;
use crate::grid::GridPattern;
use crate::particles::{Particle, ParticleField};

/// Which simulation to paint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasVariant {
    #[default]
    Particles,
    Grid,
    Gradient,
}

impl CanvasVariant {
    pub fn name(&self) -> &'static str {
        match self {
            CanvasVariant::Particles => "particles",
            CanvasVariant::Grid => "grid",
            CanvasVariant::Gradient => "gradient",
        }
    }
}

impl FromStr for CanvasVariant {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "particles" => Ok(CanvasVariant::Particles),
            "grid" => Ok(CanvasVariant::Grid),
            "gradient" => Ok(CanvasVariant::Gradient),
            other => Err(CanvasError::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for CanvasVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canvas background configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasOptions {
    pub variant: CanvasVariant,
    pub particle_count: usize,
    pub color: Color,
    /// Particle opacity multiplier
    pub opacity: f32,
    /// Particle speed multiplier
    pub speed: f32,
    /// Fixed RNG seed for reproducible particle fields
    pub seed: Option<u64>,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            variant: CanvasVariant::Particles,
            particle_count: 80,
            color: Color::ACCENT,
            opacity: 0.6,
            speed: 0.5,
            seed: None,
        }
    }
}

impl CanvasOptions {
    pub fn with_variant(mut self, variant: CanvasVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

struct CanvasState {
    document: SharedDocument,
    surface: SharedSurface,
    events: EventDispatcher,
    container: Option<ElementId>,
    options: CanvasOptions,
    field: ParticleField,
    grid: GridPattern,
    mesh: GradientMesh,
    dimensions: Size,
    pointer: Option<Point>,
    start_ms: Option<f64>,
    frame: Option<FrameTask>,
    listeners: Vec<ListenerId>,
}

/// A mounted canvas background
pub struct CanvasBackground {
    state: Rc<RefCell<CanvasState>>,
}

impl CanvasBackground {
    /// Size the surface, then start painting on every frame
    ///
    /// `container` is the element the canvas fills; without one the canvas
    /// covers the viewport.
    pub fn mount(
        document: SharedDocument,
        scheduler: &FrameScheduler,
        events: &EventDispatcher,
        surface: SharedSurface,
        container: Option<ElementId>,
        options: CanvasOptions,
    ) -> Self {
        if let Some(container) = container {
            let mut doc = document.borrow_mut();
            doc.tree.add_class(container, "canvas-background");
            doc.tree
                .add_class(container, &format!("canvas-background--{}", options.variant));
        }

        let state = Rc::new(RefCell::new(CanvasState {
            document,
            surface,
            events: events.clone(),
            container,
            options,
            field: ParticleField::new(options.seed),
            grid: GridPattern::default(),
            mesh: GradientMesh::default(),
            dimensions: Size::ZERO,
            pointer: None,
            start_ms: None,
            frame: None,
            listeners: Vec::new(),
        }));
        resize(&state);

        let listeners = [EventType::Resize, EventType::PointerMove]
            .into_iter()
            .map(|event_type| {
                let weak = Rc::downgrade(&state);
                events.add_listener(event_type, move |event| {
                    let Some(state) = weak.upgrade() else {
                        return;
                    };
                    match event {
                        Event::Resize { .. } => resize(&state),
                        Event::PointerMove { position } => track_pointer(&state, *position),
                        _ => {}
                    }
                })
            })
            .collect();

        let weak = Rc::downgrade(&state);
        let frame = scheduler.request_frame(move |info| paint(&weak, info));
        {
            let mut s = state.borrow_mut();
            s.listeners = listeners;
            s.frame = Some(frame);
        }

        tracing::debug!(
            variant = %options.variant,
            particles = options.particle_count,
            "canvas background mounted"
        );
        Self { state }
    }

    /// Stop painting and remove every listener
    pub fn unmount(&self) {
        let (listeners, frame, events) = {
            let mut s = self.state.borrow_mut();
            (std::mem::take(&mut s.listeners), s.frame.take(), s.events.clone())
        };
        if listeners.is_empty() && frame.is_none() {
            return;
        }
        for id in listeners {
            events.remove_listener(id);
        }
        drop(frame);
        tracing::debug!("canvas background unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.state.borrow().frame.is_some()
    }

    pub fn variant(&self) -> CanvasVariant {
        self.state.borrow().options.variant
    }

    /// Size of the canvas in layout units
    pub fn dimensions(&self) -> Size {
        self.state.borrow().dimensions
    }

    pub fn particle_count(&self) -> usize {
        self.state.borrow().field.len()
    }

    pub fn particles(&self) -> Vec<Particle> {
        self.state.borrow().field.particles().to_vec()
    }

    /// Pointer position relative to the canvas, once the pointer has moved
    pub fn pointer(&self) -> Option<Point> {
        self.state.borrow().pointer
    }
}

impl Drop for CanvasBackground {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Re-read the canvas size, reconfigure the surface and re-seed particles
fn resize(state: &Rc<RefCell<CanvasState>>) {
    let mut guard = state.borrow_mut();
    let s = &mut *guard;

    let (dimensions, dpr) = {
        let doc = s.document.borrow();
        let container_size = s
            .container
            .and_then(|id| doc.tree.bounds(id))
            .map(|b| Size::new(b.width(), b.height()))
            .filter(|size| !size.is_empty());
        (
            container_size.unwrap_or(doc.viewport.size),
            doc.viewport.device_pixel_ratio,
        )
    };
    s.dimensions = dimensions;

    match s.surface.try_borrow_mut() {
        Ok(mut surface) => surface.configure(SurfaceConfig::for_display(dimensions, dpr)),
        Err(_) => tracing::warn!("canvas surface busy during resize"),
    }

    if s.options.variant == CanvasVariant::Particles {
        s.field
            .seed(dimensions, s.options.particle_count, s.options.speed);
    }
    tracing::trace!(width = dimensions.width, height = dimensions.height, dpr, "canvas resized");
}

fn track_pointer(state: &Rc<RefCell<CanvasState>>, position: Point) {
    let mut s = state.borrow_mut();
    let origin = {
        let doc = s.document.borrow();
        s.container
            .and_then(|id| doc.viewport_rect(id))
            .map(|rect| Point::new(rect.x(), rect.y()))
            .unwrap_or(Point::ZERO)
    };
    s.pointer = Some(Point::new(position.x - origin.x, position.y - origin.y));
}

fn paint(state: &Weak<RefCell<CanvasState>>, info: &FrameInfo) -> FrameControl {
    let Some(state) = state.upgrade() else {
        return FrameControl::Done;
    };
    let mut guard = state.borrow_mut();
    let s = &mut *guard;

    let start = *s.start_ms.get_or_insert(info.timestamp_ms);
    let time_ms = info.timestamp_ms - start;

    let Ok(mut surface) = s.surface.try_borrow_mut() else {
        tracing::trace!("canvas surface busy, skipping frame");
        return FrameControl::Continue;
    };
    let ctx = &mut *surface;
    match s.options.variant {
        CanvasVariant::Particles => {
            s.field.step(s.pointer);
            s.field.render(ctx, s.options.color, s.options.opacity);
        }
        CanvasVariant::Grid => s.grid.render(ctx, s.dimensions, time_ms, s.options.color),
        CanvasVariant::Gradient => s.mesh.render(ctx, s.dimensions, time_ms, s.options.color),
    }
    FrameControl::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Document, DrawCommand, RecordingContext, Rect, Viewport};

    struct Fixture {
        doc: SharedDocument,
        scheduler: FrameScheduler,
        events: EventDispatcher,
        recorder: Rc<RefCell<RecordingContext>>,
    }

    fn fixture() -> Fixture {
        let doc = Document::new(Viewport {
            size: Size::new(1280.0, 720.0),
            device_pixel_ratio: 2.0,
        })
        .into_shared();
        Fixture {
            doc,
            scheduler: FrameScheduler::new(),
            events: EventDispatcher::new(),
            recorder: RecordingContext::shared(Size::ZERO),
        }
    }

    fn mount(f: &Fixture, container: Option<ElementId>, options: CanvasOptions) -> CanvasBackground {
        let surface: SharedSurface = f.recorder.clone();
        CanvasBackground::mount(Rc::clone(&f.doc), &f.scheduler, &f.events, surface, container, options)
    }

    #[test]
    fn test_variant_names() {
        assert_eq!("grid".parse::<CanvasVariant>().unwrap(), CanvasVariant::Grid);
        assert_eq!(CanvasVariant::Gradient.to_string(), "gradient");
        assert_eq!(
            "waves".parse::<CanvasVariant>(),
            Err(CanvasError::UnknownVariant("waves".to_string()))
        );
    }

    #[test]
    fn test_unmount_stops_drawing() {
        let f = fixture();
        let background = mount(&f, None, CanvasOptions::default().with_seed(3));
        f.scheduler.tick(0.0);
        f.scheduler.tick(16.0);
        assert!(f.recorder.borrow().draw_call_count() > 0);

        background.unmount();
        f.recorder.borrow_mut().take_commands();
        for frame in 2..20 {
            f.scheduler.tick(frame as f64 * 16.0);
        }
        f.events.dispatch(&Event::Resize {
            size: Size::new(800.0, 600.0),
            device_pixel_ratio: 1.0,
        });
        assert!(f.recorder.borrow().commands().is_empty());
        assert_eq!(f.events.total_listeners(), 0);
        assert!(!background.is_mounted());
    }

    #[test]
    fn test_drop_cancels_frame() {
        let f = fixture();
        let background = mount(&f, None, CanvasOptions::default());
        assert_eq!(f.scheduler.task_count(), 1);
        drop(background);
        assert_eq!(f.scheduler.task_count(), 0);
        assert_eq!(f.events.total_listeners(), 0);
    }

    #[test]
    fn test_resize_does_not_accumulate_scale() {
        let f = fixture();
        let background = mount(&f, None, CanvasOptions::default().with_seed(9));
        for _ in 0..3 {
            f.doc.borrow_mut().viewport.size = Size::new(640.0, 480.0);
            f.events.dispatch(&Event::Resize {
                size: Size::new(640.0, 480.0),
                device_pixel_ratio: 2.0,
            });
        }
        let config = f.recorder.borrow().surface_config().unwrap();
        assert_eq!(config.scale, 2.0);
        assert_eq!(config.backing, Size::new(1280.0, 960.0));
        assert_eq!(background.dimensions(), Size::new(640.0, 480.0));
        assert_eq!(background.particle_count(), 80);
        assert!(background
            .particles()
            .iter()
            .all(|p| p.x < 640.0 && p.y < 480.0));
    }

    #[test]
    fn test_container_sizes_canvas_and_offsets_pointer() {
        let f = fixture();
        let hero = {
            let mut doc = f.doc.borrow_mut();
            let root = doc.tree.root();
            let hero = doc.tree.append_element(root, "section").unwrap();
            doc.tree.set_bounds(hero, Rect::new(0.0, 200.0, 1280.0, 500.0));
            hero
        };
        let background = mount(&f, Some(hero), CanvasOptions::default().with_variant(CanvasVariant::Grid));
        assert_eq!(background.dimensions(), Size::new(1280.0, 500.0));
        assert_eq!(background.particle_count(), 0);
        assert!(f.doc.borrow().tree.has_class(hero, "canvas-background--grid"));

        f.events.dispatch(&Event::PointerMove {
            position: Point::new(100.0, 250.0),
        });
        assert_eq!(background.pointer(), Some(Point::new(100.0, 50.0)));
    }

    #[test]
    fn test_gradient_variant_paints_blobs() {
        let f = fixture();
        let _background = mount(&f, None, CanvasOptions::default().with_variant(CanvasVariant::Gradient));
        f.recorder.borrow_mut().take_commands();
        f.scheduler.tick(0.0);
        let recorder = f.recorder.borrow();
        let fills = recorder
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(fills, 3);
    }
}
