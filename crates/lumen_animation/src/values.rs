//! Animatable values
//!
//! `StyleProps` is a partial set of style properties: a tween only touches the
//! fields that are set, everything else on the element is left alone.

use lumen_core::Style;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl<T: Interpolate> Interpolate for Option<T> {
    /// A side that is unset takes the other side's value unchanged
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            (Some(a), None) => Some(a.clone()),
            (None, b) => b.clone(),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.approx_eq(b, epsilon),
            (None, None) => true,
            _ => false,
        }
    }
}

// ============================================================================
// StyleProps
// ============================================================================

/// Partial set of animatable style properties
///
/// `x`/`y` are translations in layout units, `x_percent`/`y_percent` are
/// relative to the element's own box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StyleProps {
    pub opacity: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub x_percent: Option<f32>,
    pub y_percent: Option<f32>,
    pub scale: Option<f32>,
    pub skew_y: Option<f32>,
}

impl StyleProps {
    /// No properties set
    pub const NONE: StyleProps = StyleProps {
        opacity: None,
        x: None,
        y: None,
        x_percent: None,
        y_percent: None,
        scale: None,
        skew_y: None,
    };

    pub const fn new() -> Self {
        Self::NONE
    }

    pub const fn opacity(mut self, value: f32) -> Self {
        self.opacity = Some(value);
        self
    }

    pub const fn x(mut self, value: f32) -> Self {
        self.x = Some(value);
        self
    }

    pub const fn y(mut self, value: f32) -> Self {
        self.y = Some(value);
        self
    }

    pub const fn x_percent(mut self, value: f32) -> Self {
        self.x_percent = Some(value);
        self
    }

    pub const fn y_percent(mut self, value: f32) -> Self {
        self.y_percent = Some(value);
        self
    }

    pub const fn scale(mut self, value: f32) -> Self {
        self.scale = Some(value);
        self
    }

    pub const fn skew_y(mut self, value: f32) -> Self {
        self.skew_y = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Write every set field into `style`
    pub fn apply_to(&self, style: &mut Style) {
        if let Some(v) = self.opacity {
            style.opacity = v;
        }
        if let Some(v) = self.x {
            style.translate_x = v;
        }
        if let Some(v) = self.y {
            style.translate_y = v;
        }
        if let Some(v) = self.x_percent {
            style.x_percent = v;
        }
        if let Some(v) = self.y_percent {
            style.y_percent = v;
        }
        if let Some(v) = self.scale {
            style.scale = v;
        }
        if let Some(v) = self.skew_y {
            style.skew_y = v;
        }
    }

    /// Read the current values from `style` for the fields set in `self`
    pub fn capture(&self, style: &Style) -> StyleProps {
        StyleProps {
            opacity: self.opacity.map(|_| style.opacity),
            x: self.x.map(|_| style.translate_x),
            y: self.y.map(|_| style.translate_y),
            x_percent: self.x_percent.map(|_| style.x_percent),
            y_percent: self.y_percent.map(|_| style.y_percent),
            scale: self.scale.map(|_| style.scale),
            skew_y: self.skew_y.map(|_| style.skew_y),
        }
    }

    /// Fields of `overrides` win, the rest come from `self`
    pub fn merged(&self, overrides: &StyleProps) -> StyleProps {
        StyleProps {
            opacity: overrides.opacity.or(self.opacity),
            x: overrides.x.or(self.x),
            y: overrides.y.or(self.y),
            x_percent: overrides.x_percent.or(self.x_percent),
            y_percent: overrides.y_percent.or(self.y_percent),
            scale: overrides.scale.or(self.scale),
            skew_y: overrides.skew_y.or(self.skew_y),
        }
    }
}

impl Interpolate for StyleProps {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        StyleProps {
            opacity: self.opacity.lerp(&other.opacity, t),
            x: self.x.lerp(&other.x, t),
            y: self.y.lerp(&other.y, t),
            x_percent: self.x_percent.lerp(&other.x_percent, t),
            y_percent: self.y_percent.lerp(&other.y_percent, t),
            scale: self.scale.lerp(&other.scale, t),
            skew_y: self.skew_y.lerp(&other.skew_y, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.opacity.approx_eq(&other.opacity, epsilon)
            && self.x.approx_eq(&other.x, epsilon)
            && self.y.approx_eq(&other.y, epsilon)
            && self.x_percent.approx_eq(&other.x_percent, epsilon)
            && self.y_percent.approx_eq(&other.y_percent, epsilon)
            && self.scale.approx_eq(&other.scale, epsilon)
            && self.skew_y.approx_eq(&other.skew_y, epsilon)
    }
}
