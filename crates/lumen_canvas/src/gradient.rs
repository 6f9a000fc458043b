//! Slowly orbiting radial gradient blobs

use lumen_core::{Brush, Color, DrawContext, Point, RadialGradient, Rect, Size};

/// A blob placed at a fraction of the canvas size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

pub const BLOBS: [Blob; 3] = [
    Blob {
        x: 0.3,
        y: 0.3,
        radius: 300.0,
    },
    Blob {
        x: 0.7,
        y: 0.6,
        radius: 250.0,
    },
    Blob {
        x: 0.5,
        y: 0.8,
        radius: 200.0,
    },
];

/// How far a blob wanders from its anchor
const WANDER: f32 = 50.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GradientMesh {
    pub blobs: Vec<Blob>,
}

impl Default for GradientMesh {
    fn default() -> Self {
        Self {
            blobs: BLOBS.to_vec(),
        }
    }
}

impl GradientMesh {
    /// Center of blob `index` at `time_ms`
    pub fn center(&self, index: usize, size: Size, time_ms: f64) -> Option<Point> {
        let blob = self.blobs.get(index)?;
        let i = index as f64;
        let t = time_ms * 0.001;
        let dx = (t + i).sin() as f32 * WANDER;
        let dy = (t + i * 2.0).cos() as f32 * WANDER;
        Some(Point::new(
            size.width * blob.x + dx,
            size.height * blob.y + dy,
        ))
    }

    /// Inner alpha of blob `index`; later blobs are fainter
    pub fn inner_alpha(index: usize) -> f32 {
        (0.15 - index as f32 * 0.03).max(0.0)
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, size: Size, time_ms: f64, color: Color) {
        ctx.clear();
        let area = Rect::new(0.0, 0.0, size.width, size.height);
        for (index, blob) in self.blobs.iter().enumerate() {
            let Some(center) = self.center(index, size, time_ms) else {
                continue;
            };
            let gradient = RadialGradient::new(center, 0.0, blob.radius)
                .stop(0.0, color.with_alpha(Self::inner_alpha(index)))
                .stop(1.0, color.with_alpha(0.0));
            ctx.fill_rect(area, Brush::Radial(gradient));
        }
    }
}
