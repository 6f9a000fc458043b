//! Text measurement for line splitting
//!
//! Line units depend on where text wraps, which depends on glyph widths the
//! motion layer does not know. Hosts provide a `TextMeasure`; without one the
//! fixed-advance estimate below is used.

/// Trait for measuring the advance width of a run of text
pub trait TextMeasure {
    /// Width of `text` at `font_size`, in layout units
    fn measure_width(&self, text: &str, font_size: f32) -> f32;
}

/// Estimates every character as a fixed fraction of the font size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasure {
    /// Advance per character relative to the font size
    pub advance: f32,
}

impl FixedAdvanceMeasure {
    pub const fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.advance
    }
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32) -> f32,
{
    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        self(text, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_advance() {
        let measure = FixedAdvanceMeasure::default();
        assert_eq!(measure.measure_width("abcd", 10.0), 20.0);
        assert_eq!(measure.measure_width("", 10.0), 0.0);
    }

    #[test]
    fn test_closure_measure() {
        let measure = |text: &str, _size: f32| text.len() as f32;
        assert_eq!(measure.measure_width("abc", 16.0), 3.0);
    }
}
