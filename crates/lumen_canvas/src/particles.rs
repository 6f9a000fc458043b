//! Particle field
//!
//! Drifting points joined by faint lines when they come close, pushed away
//! from the pointer. Linking is pairwise, so cost grows with the square of
//! the particle count; a few hundred particles is the practical ceiling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lumen_core::{Brush, Color, DrawContext, Point, Size, Stroke};

/// Pointer distance below which particles are pushed away
pub const REPULSION_RADIUS: f32 = 100.0;
/// Velocity change per frame from the pointer push
pub const REPULSION_STRENGTH: f32 = 0.02;
/// Particles closer than this are linked
pub const LINK_DISTANCE: f32 = 150.0;
/// Link alpha at zero distance
pub const LINK_ALPHA: f32 = 0.15;
/// Velocity kept per frame
pub const DAMPING: f32 = 0.999;

/// A single particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl Particle {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A batch of particles inside a rectangle
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: Size,
    rng: StdRng,
}

impl ParticleField {
    /// Empty field; `seed` makes runs reproducible
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            particles: Vec::new(),
            bounds: Size::ZERO,
            rng,
        }
    }

    /// Replace every particle with `count` new ones spread over `bounds`
    pub fn seed(&mut self, bounds: Size, count: usize, speed: f32) {
        self.bounds = bounds;
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.gen::<f32>() * bounds.width,
                y: rng.gen::<f32>() * bounds.height,
                vx: (rng.gen::<f32>() - 0.5) * speed,
                vy: (rng.gen::<f32>() - 0.5) * speed,
                radius: rng.gen::<f32>() * 2.0 + 1.0,
                opacity: rng.gen::<f32>() * 0.5 + 0.2,
            })
            .collect();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advance one frame
    ///
    /// Particles that leave the bounds are put back on the edge with their
    /// velocity pointing inward, so positions always stay in bounds.
    pub fn step(&mut self, pointer: Option<Point>) {
        let Size { width, height } = self.bounds;
        for p in &mut self.particles {
            if let Some(pointer) = pointer {
                let dx = pointer.x - p.x;
                let dy = pointer.y - p.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance > 0.0 && distance < REPULSION_RADIUS {
                    p.vx -= dx / distance * REPULSION_STRENGTH;
                    p.vy -= dy / distance * REPULSION_STRENGTH;
                }
            }

            p.x += p.vx;
            p.y += p.vy;

            if p.x < 0.0 {
                p.x = 0.0;
                p.vx = p.vx.abs();
            } else if p.x > width {
                p.x = width;
                p.vx = -p.vx.abs();
            }
            if p.y < 0.0 {
                p.y = 0.0;
                p.vy = p.vy.abs();
            } else if p.y > height {
                p.y = height;
                p.vy = -p.vy.abs();
            }

            p.vx *= DAMPING;
            p.vy *= DAMPING;
        }
    }

    /// Clear, link close pairs, then draw the particles
    pub fn render(&self, ctx: &mut dyn DrawContext, color: Color, opacity: f32) {
        ctx.clear();

        let stroke = Stroke::new(1.0);
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let distance = a.position().distance(b.position());
                if distance < LINK_DISTANCE {
                    let alpha = (1.0 - distance / LINK_DISTANCE) * LINK_ALPHA;
                    ctx.stroke_line(
                        a.position(),
                        b.position(),
                        &stroke,
                        Brush::Solid(color.with_alpha(alpha)),
                    );
                }
            }
        }

        for p in &self.particles {
            ctx.fill_circle(
                p.position(),
                p.radius,
                Brush::Solid(color.with_alpha(p.opacity * opacity)),
            );
        }
    }
}
