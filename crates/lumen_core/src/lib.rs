//! Lumen Core
//!
//! Foundational types shared by every Lumen motion primitive:
//!
//! - **Geometry**: points, sizes, rects and vectors
//! - **Color**: RGBA colors with CSS hex parsing
//! - **Element Tree**: slotmap arena of elements addressed by typed handles
//! - **Document**: the tree plus viewport, scroll offset and user preferences
//! - **Events**: host event types and a re-entrancy safe listener registry
//! - **Draw Context**: 2D drawing surface for canvas simulations
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{Document, Rect, Viewport};
//!
//! let mut doc = Document::new(Viewport::default());
//! let root = doc.tree.root();
//! let title = doc.tree.append_element(root, "h1").unwrap();
//! doc.tree.append_text(title, "Hello").unwrap();
//! doc.tree.set_bounds(title, Rect::new(0.0, 100.0, 600.0, 80.0));
//!
//! assert_eq!(doc.tree.text_content(title), "Hello");
//! assert_eq!(doc.viewport_rect(title).unwrap().top(), 100.0);
//! ```

pub mod color;
pub mod document;
pub mod draw;
pub mod error;
pub mod events;
pub mod geometry;
pub mod tree;

pub use color::Color;
pub use document::{Document, MotionPreferences, SharedDocument, Viewport};
pub use draw::{
    Brush, DrawCommand, DrawContext, GradientStop, RadialGradient, RecordingContext,
    SharedSurface, Stroke, SurfaceConfig,
};
pub use error::{CoreError, Result};
pub use events::{Event, EventDispatcher, EventType, ListenerId};
pub use geometry::{Point, Rect, Size, Vec2};
pub use tree::{Display, Element, ElementId, ElementTree, NodeKind, Overflow, Style};
