//! Lumen Canvas
//!
//! Decorative backgrounds painted into a `DrawContext` every frame:
//!
//! - **Particles**: drifting linked points that avoid the pointer
//! - **Grid**: a slowly drifting grid with pulsing intersections
//! - **Gradient**: soft radial blobs orbiting their anchors
//!
//! `CanvasBackground` owns the surface sizing, listeners and frame task; the
//! simulations themselves are plain structs that can be stepped and rendered
//! directly.

pub mod background;
pub mod error;
pub mod gradient;
pub mod grid;
pub mod particles;

pub use background::{CanvasBackground, CanvasOptions, CanvasVariant};
pub use error::CanvasError;
pub use gradient::{Blob, GradientMesh};
pub use grid::GridPattern;
pub use particles::{Particle, ParticleField};
