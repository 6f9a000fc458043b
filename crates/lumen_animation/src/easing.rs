//! Easing curves
//!
//! The curve family mirrors the names used in page code (`power3.out`,
//! `back.out(1.7)`, ...) so presets and config files can refer to them by
//! string. `power1` is quadratic, `power2` cubic, `power3` quartic and
//! `power4` quintic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// An easing function mapping linear progress `0..=1` to eased progress
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    /// `t^(power + 1)`
    PowerIn(u8),
    /// `1 - (1 - t)^(power + 1)`
    PowerOut(u8),
    /// Symmetric in/out of the same degree
    PowerInOut(u8),
    /// Overshoots the target by `overshoot` before settling
    BackOut(f32),
    /// Exponential settle used for smooth scrolling: `min(1, 1.001 - 2^(-10t))`
    ScrollExpo,
}

impl Easing {
    /// Default curve for reveals (`power3.out`)
    pub const DEFAULT: Easing = Easing::PowerOut(3);

    /// Apply the curve to linear progress `t` (clamped to `0..=1`)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::PowerIn(p) => t.powi(p as i32 + 1),
            Easing::PowerOut(p) => 1.0 - (1.0 - t).powi(p as i32 + 1),
            Easing::PowerInOut(p) => {
                let exp = p as i32 + 1;
                if t < 0.5 {
                    (2.0 * t).powi(exp) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0
                }
            }
            Easing::BackOut(s) => {
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
            Easing::ScrollExpo => (1.001 - 2f32.powf(-10.0 * t)).min(1.0),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || AnimationError::UnknownEasing(name.to_string());

        match name {
            "linear" | "none" => return Ok(Easing::Linear),
            "scroll.expo" => return Ok(Easing::ScrollExpo),
            _ => {}
        }

        let (family, variant) = name.split_once('.').ok_or_else(unknown)?;

        if family == "back" {
            let overshoot = match variant {
                "out" => 1.70158,
                v => v
                    .strip_prefix("out(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .and_then(|n| n.trim().parse::<f32>().ok())
                    .ok_or_else(unknown)?,
            };
            return Ok(Easing::BackOut(overshoot));
        }

        let power = match family {
            "power1" | "quad" => 1,
            "power2" | "cubic" => 2,
            "power3" | "quart" => 3,
            "power4" | "quint" => 4,
            _ => return Err(unknown()),
        };

        match variant {
            "in" => Ok(Easing::PowerIn(power)),
            "out" => Ok(Easing::PowerOut(power)),
            "inOut" => Ok(Easing::PowerInOut(power)),
            _ => Err(unknown()),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "linear"),
            Easing::PowerIn(p) => write!(f, "power{p}.in"),
            Easing::PowerOut(p) => write!(f, "power{p}.out"),
            Easing::PowerInOut(p) => write!(f, "power{p}.inOut"),
            Easing::BackOut(s) => write!(f, "back.out({s})"),
            Easing::ScrollExpo => write!(f, "scroll.expo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::PowerIn(2),
        Easing::PowerOut(3),
        Easing::PowerInOut(2),
        Easing::PowerOut(4),
        Easing::BackOut(1.7),
        Easing::Linear,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing} at 1");
        }
        // The scroll curve starts just below zero and is capped at one
        assert!(Easing::ScrollExpo.apply(0.0).abs() < 0.01);
        assert_eq!(Easing::ScrollExpo.apply(1.0), 1.0);
    }

    #[test]
    fn test_power_out_front_loads_progress() {
        let eased = Easing::PowerOut(3).apply(0.5);
        assert!((eased - (1.0 - 0.5f32.powi(4))).abs() < 1e-6);
        assert!(eased > 0.9);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::BackOut(1.7).apply(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("power3.out".parse::<Easing>().unwrap(), Easing::PowerOut(3));
        assert_eq!("power2.inOut".parse::<Easing>().unwrap(), Easing::PowerInOut(2));
        assert_eq!("back.out(1.7)".parse::<Easing>().unwrap(), Easing::BackOut(1.7));
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
        assert!("elastic.out".parse::<Easing>().is_err());
        assert!("power9.out".parse::<Easing>().is_err());
        assert!("back.out(x)".parse::<Easing>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for easing in [Easing::PowerOut(4), Easing::PowerIn(1), Easing::BackOut(1.7)] {
            assert_eq!(easing.to_string().parse::<Easing>().unwrap(), easing);
        }
    }
}
