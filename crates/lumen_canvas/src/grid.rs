//! Drifting grid with pulsing intersection dots

use lumen_core::{Brush, Color, DrawContext, Point, Size, Stroke};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPattern {
    /// Cell edge length
    pub cell: f32,
    /// Drift in layout units per millisecond
    pub drift: f32,
    pub line_alpha: f32,
    pub dot_radius: f32,
}

impl Default for GridPattern {
    fn default() -> Self {
        Self {
            cell: 50.0,
            drift: 0.02,
            line_alpha: 0.1,
            dot_radius: 2.0,
        }
    }
}

impl GridPattern {
    /// Grid offset at `time_ms`
    pub fn offset(&self, time_ms: f64) -> f32 {
        ((time_ms * self.drift as f64) % self.cell as f64) as f32
    }

    /// Alpha of the dot at (`x`, `y`), never negative
    pub fn glow(x: f32, y: f32, time_ms: f64) -> f32 {
        let phase = (x as f64 + y as f64 + time_ms) * 0.01;
        (phase.sin() as f32 * 0.3 + 0.2).max(0.0)
    }

    /// Line positions along one axis, one cell past either end
    fn positions(&self, offset: f32, extent: f32) -> Vec<f32> {
        let mut out = Vec::new();
        if self.cell <= 0.0 {
            return out;
        }
        let mut v = -self.cell + offset;
        while v < extent + self.cell {
            out.push(v);
            v += self.cell;
        }
        out
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, size: Size, time_ms: f64, color: Color) {
        ctx.clear();

        let offset = self.offset(time_ms);
        let xs = self.positions(offset, size.width);
        let ys = self.positions(offset, size.height);
        let stroke = Stroke::new(1.0);
        let line = Brush::Solid(color.with_alpha(self.line_alpha));

        for &x in &xs {
            ctx.stroke_line(Point::new(x, 0.0), Point::new(x, size.height), &stroke, line.clone());
        }
        for &y in &ys {
            ctx.stroke_line(Point::new(0.0, y), Point::new(size.width, y), &stroke, line.clone());
        }

        for &x in &xs {
            for &y in &ys {
                let alpha = Self::glow(x, y, time_ms);
                ctx.fill_circle(Point::new(x, y), self.dot_radius, Brush::Solid(color.with_alpha(alpha)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{DrawCommand, RecordingContext};

    #[test]
    fn test_offset_wraps_at_cell() {
        let grid = GridPattern::default();
        assert_eq!(grid.offset(0.0), 0.0);
        assert!((grid.offset(1000.0) - 20.0).abs() < 1e-4);
        assert!((grid.offset(3000.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_render_counts() {
        let grid = GridPattern::default();
        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        grid.render(&mut ctx, Size::new(100.0, 100.0), 0.0, Color::ACCENT);

        // Lines at -50, 0, 50, 100 on each axis
        let lines = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .count();
        let dots = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count();
        assert_eq!(lines, 8);
        assert_eq!(dots, 16);
    }

    #[test]
    fn test_glow_is_clamped() {
        for step in 0..200 {
            let alpha = GridPattern::glow(step as f32 * 7.0, 0.0, 0.0);
            assert!((0.0..=0.5).contains(&alpha));
        }
        // sin = -1 gives -0.1 before clamping
        let trough = std::f64::consts::FRAC_PI_2 * 3.0 / 0.01;
        assert_eq!(GridPattern::glow(0.0, 0.0, trough), 0.0);
    }
}
