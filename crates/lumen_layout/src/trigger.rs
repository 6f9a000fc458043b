//! Trigger start positions
//!
//! A start such as `"top 85%"` reads "when the element's top reaches 85% of
//! the viewport height". The first token anchors the element, the second the
//! viewport. Each token is `top`, `center`, `bottom`, a percentage or a pixel
//! offset.

use std::fmt;
use std::str::FromStr;

use lumen_core::Rect;

use crate::error::RevealError;

/// A point along a box, measured from its top edge
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Fraction of the box height (`top` = 0, `center` = 0.5, `bottom` = 1)
    Fraction(f32),
    /// Fixed distance in layout units
    Pixels(f32),
}

impl Anchor {
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            Anchor::Fraction(f) => extent * f,
            Anchor::Pixels(px) => px,
        }
    }
}

impl FromStr for Anchor {
    type Err = ();

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "top" => Ok(Anchor::Fraction(0.0)),
            "center" => Ok(Anchor::Fraction(0.5)),
            "bottom" => Ok(Anchor::Fraction(1.0)),
            _ => {
                if let Some(pct) = token.strip_suffix('%') {
                    pct.parse::<f32>()
                        .map(|p| Anchor::Fraction(p / 100.0))
                        .map_err(|_| ())
                } else {
                    token
                        .strip_suffix("px")
                        .unwrap_or(token)
                        .parse::<f32>()
                        .map(Anchor::Pixels)
                        .map_err(|_| ())
                }
            }
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Anchor::Fraction(v) if v == 0.0 => write!(f, "top"),
            Anchor::Fraction(v) if v == 0.5 => write!(f, "center"),
            Anchor::Fraction(v) if v == 1.0 => write!(f, "bottom"),
            Anchor::Fraction(v) => write!(f, "{}%", v * 100.0),
            Anchor::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// When a scroll-driven reveal starts
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerStart {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl TriggerStart {
    /// `"top 85%"`
    pub const DEFAULT: TriggerStart = TriggerStart {
        element: Anchor::Fraction(0.0),
        viewport: Anchor::Fraction(0.85),
    };

    /// Whether an element whose box is `rect` (viewport coordinates) has
    /// reached the start in a viewport of `viewport_height`
    ///
    /// Elements already scrolled past the start count as reached.
    pub fn is_reached(&self, rect: Rect, viewport_height: f32) -> bool {
        let element_point = rect.top() + self.element.resolve(rect.height());
        let viewport_point = self.viewport.resolve(viewport_height);
        element_point <= viewport_point
    }
}

impl Default for TriggerStart {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for TriggerStart {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RevealError::InvalidTrigger(s.to_string());
        let mut tokens = s.split_whitespace();
        let element = tokens.next().ok_or_else(invalid)?;
        let viewport = tokens.next().ok_or_else(invalid)?;
        if tokens.next().is_some() {
            return Err(invalid());
        }
        Ok(TriggerStart {
            element: element.parse().map_err(|_| invalid())?,
            viewport: viewport.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for TriggerStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("top 85%".parse::<TriggerStart>().unwrap(), TriggerStart::DEFAULT);
        let start: TriggerStart = "center bottom".parse().unwrap();
        assert_eq!(start.element, Anchor::Fraction(0.5));
        assert_eq!(start.viewport, Anchor::Fraction(1.0));
        let start: TriggerStart = "top 120px".parse().unwrap();
        assert_eq!(start.viewport, Anchor::Pixels(120.0));

        assert!("top".parse::<TriggerStart>().is_err());
        assert!("top 85% extra".parse::<TriggerStart>().is_err());
        assert!("middle 85%".parse::<TriggerStart>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TriggerStart::DEFAULT.to_string(), "top 85%");
    }

    #[test]
    fn test_element_inside_region_is_reached() {
        let start = TriggerStart::DEFAULT;
        // Top edge at 50% of a 1000-unit viewport
        assert!(start.is_reached(Rect::new(0.0, 500.0, 100.0, 100.0), 1000.0));
        // Below the 85% line
        assert!(!start.is_reached(Rect::new(0.0, 900.0, 100.0, 100.0), 1000.0));
        // Already scrolled past
        assert!(start.is_reached(Rect::new(0.0, -400.0, 100.0, 100.0), 1000.0));
    }
}
