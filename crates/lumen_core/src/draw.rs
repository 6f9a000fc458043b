//! Draw Context - 2D canvas drawing API
//!
//! The `DrawContext` trait is the surface every decorative simulation paints
//! into. A host backs it with whatever it has (an HTML canvas, a GPU layer, a
//! software rasterizer); tests use `RecordingContext`, which records every
//! call so frame output can be inspected after the fact.
//!
//! # Example
//!
//! ```
//! use lumen_core::{Brush, Color, DrawContext, Point, RecordingContext, Size};
//!
//! let mut ctx = RecordingContext::new(Size::new(200.0, 100.0));
//! ctx.clear();
//! ctx.fill_circle(Point::new(10.0, 10.0), 2.0, Brush::Solid(Color::ACCENT));
//! assert_eq!(ctx.draw_call_count(), 2);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Color;
use crate::geometry::{Point, Rect, Size};

// ─────────────────────────────────────────────────────────────────────────────
// Paint Types
// ─────────────────────────────────────────────────────────────────────────────

/// Gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub offset: f32,
    /// Color at this stop
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Radial gradient between two concentric circles
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Color stops (sorted by offset)
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(center: Point, inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            stops: Vec::new(),
        }
    }

    /// Add a color stop (builder pattern)
    pub fn stop(mut self, offset: f32, color: Color) -> Self {
        self.stops.push(GradientStop::new(offset, color));
        self.stops
            .sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self
    }
}

/// Fill or stroke paint
#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    Solid(Color),
    Radial(RadialGradient),
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

/// Stroke style configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    /// Line width
    pub width: f32,
}

impl Stroke {
    pub fn new(width: f32) -> Self {
        Self { width }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

/// Backing-store configuration for a canvas surface
///
/// `backing` is in device pixels, `css` in layout units; `scale` maps the
/// latter onto the former (the device pixel ratio).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    pub backing: Size,
    pub css: Size,
    pub scale: f32,
}

impl SurfaceConfig {
    /// Configuration for a surface of `css` size on a display with `dpr`
    pub fn for_display(css: Size, dpr: f32) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self {
            backing: Size::new((css.width * dpr).floor(), (css.height * dpr).floor()),
            css,
            scale: dpr,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw Context
// ─────────────────────────────────────────────────────────────────────────────

/// 2D drawing surface used by canvas backgrounds
///
/// Coordinates are in CSS units; implementations apply the configured scale.
pub trait DrawContext {
    /// Resize the backing store and reset the transform to `scale`
    ///
    /// Unlike a raw canvas `scale()` call this never accumulates across
    /// repeated resizes.
    fn configure(&mut self, config: SurfaceConfig);

    /// Current size in CSS units
    fn size(&self) -> Size;

    /// Clear the whole surface to transparent
    fn clear(&mut self);

    /// Stroke a straight line segment
    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke, brush: Brush);

    /// Fill a circle
    fn fill_circle(&mut self, center: Point, radius: f32, brush: Brush);

    /// Fill a rectangle
    fn fill_rect(&mut self, rect: Rect, brush: Brush);
}

/// A drawing surface shared between its owner and the frame callback
pub type SharedSurface = Rc<RefCell<dyn DrawContext>>;

// ─────────────────────────────────────────────────────────────────────────────
// Recording Draw Context
// ─────────────────────────────────────────────────────────────────────────────

/// A draw command that can be recorded and replayed
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Configure(SurfaceConfig),
    Clear,
    StrokeLine {
        from: Point,
        to: Point,
        stroke: Stroke,
        brush: Brush,
    },
    FillCircle {
        center: Point,
        radius: f32,
        brush: Brush,
    },
    FillRect {
        rect: Rect,
        brush: Brush,
    },
}

impl DrawCommand {
    /// Whether this command paints pixels (as opposed to configuring state)
    pub fn is_draw_call(&self) -> bool {
        !matches!(self, DrawCommand::Configure(_))
    }
}

/// A draw context that records commands for later inspection
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    config: Option<SurfaceConfig>,
    viewport: Size,
}

impl RecordingContext {
    /// Create a new recording context
    pub fn new(viewport: Size) -> Self {
        Self {
            commands: Vec::new(),
            config: None,
            viewport,
        }
    }

    /// Create a recording context already wrapped for sharing
    pub fn shared(viewport: Size) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(viewport)))
    }

    /// Get the recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of commands that painted pixels
    pub fn draw_call_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw_call()).count()
    }

    /// The last surface configuration applied
    pub fn surface_config(&self) -> Option<SurfaceConfig> {
        self.config
    }
}

impl DrawContext for RecordingContext {
    fn configure(&mut self, config: SurfaceConfig) {
        self.viewport = config.css;
        self.config = Some(config);
        self.commands.push(DrawCommand::Configure(config));
    }

    fn size(&self) -> Size {
        self.viewport
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke, brush: Brush) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            stroke: *stroke,
            brush,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, brush: Brush) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            brush,
        });
    }

    fn fill_rect(&mut self, rect: Rect, brush: Brush) {
        self.commands.push(DrawCommand::FillRect { rect, brush });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_config_applies_dpr() {
        let config = SurfaceConfig::for_display(Size::new(100.0, 50.0), 2.0);
        assert_eq!(config.backing, Size::new(200.0, 100.0));
        assert_eq!(config.css, Size::new(100.0, 50.0));
        assert_eq!(config.scale, 2.0);
    }

    #[test]
    fn test_surface_config_rejects_bad_dpr() {
        let config = SurfaceConfig::for_display(Size::new(100.0, 50.0), f32::NAN);
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn test_recording_counts_only_draw_calls() {
        let mut ctx = RecordingContext::new(Size::ZERO);
        ctx.configure(SurfaceConfig::for_display(Size::new(10.0, 10.0), 1.0));
        ctx.clear();
        ctx.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE.into());
        assert_eq!(ctx.commands().len(), 3);
        assert_eq!(ctx.draw_call_count(), 2);
        assert_eq!(ctx.size(), Size::new(10.0, 10.0));
    }

    #[test]
    fn test_gradient_stops_sorted() {
        let g = RadialGradient::new(Point::ZERO, 0.0, 10.0)
            .stop(1.0, Color::TRANSPARENT)
            .stop(0.0, Color::ACCENT);
        assert_eq!(g.stops[0].offset, 0.0);
        assert_eq!(g.stops[1].offset, 1.0);
    }
}
