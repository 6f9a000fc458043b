//! Built-in animation presets
//!
//! Named from/to bundles shared by every page. Presets are immutable statics;
//! callers that need a variation copy one and adjust the copy.

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::tween::TweenOptions;
use crate::values::StyleProps;

/// Default tween duration in seconds
pub const DEFAULT_DURATION: f32 = 0.8;

/// Default reveal curve
pub const DEFAULT_EASE: Easing = Easing::PowerOut(3);

/// A named from/to animation description
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationPreset {
    pub name: &'static str,
    /// Initial state, applied before the trigger fires; empty for presets
    /// that animate from whatever the element currently shows
    pub from: StyleProps,
    pub to: StyleProps,
    /// Seconds
    pub duration: f32,
    pub ease: Easing,
    pub stagger: Option<f32>,
    pub delay: Option<f32>,
}

impl AnimationPreset {
    const fn new(name: &'static str, from: StyleProps, to: StyleProps) -> Self {
        Self {
            name,
            from,
            to,
            duration: DEFAULT_DURATION,
            ease: DEFAULT_EASE,
            stagger: None,
            delay: None,
        }
    }

    const fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    const fn ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    const fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = Some(seconds);
        self
    }

    const fn delay(mut self, seconds: f32) -> Self {
        self.delay = Some(seconds);
        self
    }

    /// Look up a built-in preset by its name
    pub fn by_name(name: &str) -> Option<&'static AnimationPreset> {
        PRESETS.iter().find(|preset| preset.name == name)
    }

    /// Like `by_name` but with an error for the miss
    pub fn lookup(name: &str) -> Result<&'static AnimationPreset> {
        Self::by_name(name).ok_or_else(|| AnimationError::UnknownPreset(name.to_string()))
    }

    /// All built-in presets
    pub fn all() -> &'static [AnimationPreset] {
        PRESETS
    }

    /// Copy of this preset with a different stagger
    pub fn with_stagger(&self, seconds: f32) -> AnimationPreset {
        AnimationPreset {
            stagger: Some(seconds),
            ..*self
        }
    }

    /// Tween timing for this preset
    pub fn tween_options(&self) -> TweenOptions {
        TweenOptions {
            duration: self.duration,
            delay: self.delay.unwrap_or(0.0),
            stagger: self.stagger.unwrap_or(0.0),
            ease: self.ease,
        }
    }
}

// ============================================================================
// Built-ins
// ============================================================================

const HIDDEN: StyleProps = StyleProps::new().opacity(0.0);
const SHOWN: StyleProps = StyleProps::new().opacity(1.0);
const SETTLED: StyleProps = StyleProps::new().opacity(1.0).x(0.0).y(0.0);

pub const FADE_IN: AnimationPreset = AnimationPreset::new("fadeIn", HIDDEN, SHOWN);

pub const FADE_IN_UP: AnimationPreset =
    AnimationPreset::new("fadeInUp", HIDDEN.y(60.0), SHOWN.y(0.0));

pub const FADE_IN_DOWN: AnimationPreset =
    AnimationPreset::new("fadeInDown", HIDDEN.y(-60.0), SHOWN.y(0.0));

pub const FADE_IN_LEFT: AnimationPreset =
    AnimationPreset::new("fadeInLeft", HIDDEN.x(-60.0), SHOWN.x(0.0));

pub const FADE_IN_RIGHT: AnimationPreset =
    AnimationPreset::new("fadeInRight", HIDDEN.x(60.0), SHOWN.x(0.0));

pub const SCALE_IN: AnimationPreset =
    AnimationPreset::new("scaleIn", HIDDEN.scale(0.8), SHOWN.scale(1.0))
        .ease(Easing::BackOut(1.7));

pub const REVEAL_UP: AnimationPreset = AnimationPreset::new(
    "revealUp",
    StyleProps::new().y_percent(100.0),
    StyleProps::new().y_percent(0.0),
)
.duration(1.0)
.ease(Easing::PowerOut(4));

pub const STAGGER_FADE_IN_UP: AnimationPreset =
    AnimationPreset::new("staggerFadeInUp", HIDDEN.y(40.0), SHOWN.y(0.0))
        .duration(0.6)
        .stagger(0.1);

pub const PAGE_ENTER: AnimationPreset =
    AnimationPreset::new("pageEnter", HIDDEN.y(30.0), SHOWN.y(0.0))
        .duration(0.6)
        .ease(Easing::PowerOut(2));

pub const PAGE_EXIT: AnimationPreset =
    AnimationPreset::new("pageExit", StyleProps::NONE, HIDDEN.y(-30.0))
        .duration(0.4)
        .ease(Easing::PowerIn(2));

pub const HERO_TITLE: AnimationPreset = AnimationPreset::new(
    "heroTitle",
    HIDDEN.y(80.0).skew_y(3.0),
    SHOWN.y(0.0).skew_y(0.0),
)
.duration(1.0)
.ease(Easing::PowerOut(4));

pub const HERO_SUBTITLE: AnimationPreset =
    AnimationPreset::new("heroSubtitle", HIDDEN.y(40.0), SHOWN.y(0.0)).delay(0.3);

pub const HERO_CTA: AnimationPreset =
    AnimationPreset::new("heroCta", HIDDEN.y(30.0), SHOWN.y(0.0))
        .duration(0.6)
        .delay(0.5);

pub const CARD_HOVER: AnimationPreset = AnimationPreset::new(
    "cardHover",
    StyleProps::NONE,
    StyleProps::new().scale(1.02).y(-8.0),
)
.duration(0.3)
.ease(Easing::PowerOut(2));

pub const CARD_HOVER_RESET: AnimationPreset = AnimationPreset::new(
    "cardHoverReset",
    StyleProps::NONE,
    StyleProps::new().scale(1.0).y(0.0),
)
.duration(0.3)
.ease(Easing::PowerOut(2));

/// Items marked for scroll animation inside a page section
pub const SECTION_ITEM: AnimationPreset =
    AnimationPreset::new("sectionItem", HIDDEN.y(50.0), SETTLED);

static PRESETS: &[AnimationPreset] = &[
    FADE_IN,
    FADE_IN_UP,
    FADE_IN_DOWN,
    FADE_IN_LEFT,
    FADE_IN_RIGHT,
    SCALE_IN,
    REVEAL_UP,
    STAGGER_FADE_IN_UP,
    PAGE_ENTER,
    PAGE_EXIT,
    HERO_TITLE,
    HERO_SUBTITLE,
    HERO_CTA,
    CARD_HOVER,
    CARD_HOVER_RESET,
    SECTION_ITEM,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let preset = AnimationPreset::by_name("fadeInUp").unwrap();
        assert_eq!(preset.from, StyleProps::new().opacity(0.0).y(60.0));
        assert_eq!(preset.duration, DEFAULT_DURATION);
        assert_eq!(preset.ease, Easing::PowerOut(3));
        assert!(AnimationPreset::lookup("wobble").is_err());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = AnimationPreset::all().iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AnimationPreset::all().len());
    }

    #[test]
    fn test_stagger_preset_timing() {
        let options = STAGGER_FADE_IN_UP.tween_options();
        assert_eq!(options.stagger, 0.1);
        assert_eq!(options.duration, 0.6);
        assert_eq!(STAGGER_FADE_IN_UP.with_stagger(0.2).stagger, Some(0.2));
        assert_eq!(HERO_CTA.tween_options().delay, 0.5);
    }
}
