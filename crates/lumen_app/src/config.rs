//! Site configuration file handling
//!
//! Motion settings live in `lumen.toml`. Every section and every field is
//! optional; a missing file section falls back to the built-in defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use lumen_canvas::{CanvasOptions, CanvasVariant};
use lumen_core::Color;
use lumen_layout::{CursorOptions, SmoothScrollOptions, TriggerStart};

use crate::error::ConfigError;

/// Default config file name
pub const CONFIG_FILE: &str = "lumen.toml";

/// Particle ceiling; linking is pairwise so cost grows quadratically
pub const MAX_PARTICLES: usize = 2000;

// =============================================================================
// lumen.toml
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub smooth_scroll: SmoothScrollConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub cursor: CursorConfig,
}

/// How the reduced-motion preference is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducedMotion {
    /// Follow the host setting
    #[default]
    System,
    Always,
    Never,
}

impl ReducedMotion {
    pub fn resolve(self, system: bool) -> bool {
        match self {
            ReducedMotion::System => system,
            ReducedMotion::Always => true,
            ReducedMotion::Never => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MotionConfig {
    #[serde(default)]
    pub reduced_motion: ReducedMotion,
    #[serde(default = "default_trigger_start")]
    pub trigger_start: String,
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            reduced_motion: ReducedMotion::default(),
            trigger_start: default_trigger_start(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_trigger_start() -> String {
    "top 85%".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SmoothScrollConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_scroll_duration")]
    pub duration: f32,
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f32,
    #[serde(default = "default_touch_multiplier")]
    pub touch_multiplier: f32,
    #[serde(default = "default_true")]
    pub smooth_wheel: bool,
    #[serde(default = "default_anchor_offset")]
    pub anchor_offset: f32,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: default_scroll_duration(),
            wheel_multiplier: default_wheel_multiplier(),
            touch_multiplier: default_touch_multiplier(),
            smooth_wheel: true,
            anchor_offset: default_anchor_offset(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_scroll_duration() -> f32 {
    1.2
}

fn default_wheel_multiplier() -> f32 {
    1.0
}

fn default_touch_multiplier() -> f32 {
    2.0
}

fn default_anchor_offset() -> f32 {
    -100.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CanvasConfig {
    #[serde(default)]
    pub variant: CanvasVariant,
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    /// Hex color, `#RRGGBB` or `#RRGGBBAA`
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            variant: CanvasVariant::default(),
            particle_count: default_particle_count(),
            color: default_color(),
            opacity: default_opacity(),
            speed: default_speed(),
            seed: None,
        }
    }
}

fn default_particle_count() -> usize {
    80
}

fn default_color() -> String {
    "#FF6B35".to_string()
}

fn default_opacity() -> f32 {
    0.6
}

fn default_speed() -> f32 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CursorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ring_follow")]
    pub ring_follow: f32,
    #[serde(default = "default_dot_follow")]
    pub dot_follow: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ring_follow: default_ring_follow(),
            dot_follow: default_dot_follow(),
        }
    }
}

fn default_ring_follow() -> f32 {
    0.15
}

fn default_dot_follow() -> f32 {
    0.35
}

impl SiteConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `lumen.toml` from `dir`, or the defaults when there is none
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value that the plain TOML types cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trigger_start()?;
        self.canvas_color()?;

        let scroll = &self.smooth_scroll;
        non_negative("smooth_scroll.duration", scroll.duration)?;
        non_negative("smooth_scroll.wheel_multiplier", scroll.wheel_multiplier)?;
        non_negative("smooth_scroll.touch_multiplier", scroll.touch_multiplier)?;
        finite("smooth_scroll.anchor_offset", scroll.anchor_offset)?;

        let canvas = &self.canvas;
        unit_range("canvas.opacity", canvas.opacity, true)?;
        non_negative("canvas.speed", canvas.speed)?;
        if canvas.particle_count > MAX_PARTICLES {
            return Err(ConfigError::InvalidValue {
                field: "canvas.particle_count",
                reason: format!("{} exceeds the limit of {MAX_PARTICLES}", canvas.particle_count),
            });
        }

        unit_range("cursor.ring_follow", self.cursor.ring_follow, false)?;
        unit_range("cursor.dot_follow", self.cursor.dot_follow, false)?;
        Ok(())
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    pub fn trigger_start(&self) -> Result<TriggerStart, ConfigError> {
        Ok(self.motion.trigger_start.parse::<TriggerStart>()?)
    }

    pub fn canvas_color(&self) -> Result<Color, ConfigError> {
        Color::parse_hex(&self.canvas.color)
            .map_err(|_| ConfigError::InvalidColor(self.canvas.color.clone()))
    }

    /// Reduced-motion flag given what the host reports
    pub fn reduced_motion(&self, system: bool) -> bool {
        self.motion.reduced_motion.resolve(system)
    }

    pub fn smooth_scroll_options(&self) -> SmoothScrollOptions {
        let scroll = &self.smooth_scroll;
        SmoothScrollOptions {
            duration: scroll.duration,
            smooth_wheel: scroll.smooth_wheel,
            wheel_multiplier: scroll.wheel_multiplier,
            touch_multiplier: scroll.touch_multiplier,
            anchor_offset: scroll.anchor_offset,
            ..SmoothScrollOptions::default()
        }
    }

    pub fn canvas_options(&self) -> Result<CanvasOptions, ConfigError> {
        let canvas = &self.canvas;
        Ok(CanvasOptions {
            variant: canvas.variant,
            particle_count: canvas.particle_count,
            color: self.canvas_color()?,
            opacity: canvas.opacity,
            speed: canvas.speed,
            seed: canvas.seed,
        })
    }

    pub fn cursor_options(&self) -> CursorOptions {
        CursorOptions {
            ring_follow: self.cursor.ring_follow,
            dot_follow: self.cursor.dot_follow,
            ..CursorOptions::default()
        }
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("{value} is not a finite number"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("{value} is negative"),
        });
    }
    Ok(())
}

/// `0..=1`, or `(0, 1]` when zero is not allowed
fn unit_range(field: &'static str, value: f32, allow_zero: bool) -> Result<(), ConfigError> {
    finite(field, value)?;
    let low_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !low_ok || value > 1.0 {
        let range = if allow_zero { "0 to 1" } else { "above 0, up to 1" };
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("{value} is outside {range}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_layout::{Anchor, RevealError};

    #[test]
    fn test_empty_file_is_default() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.motion.trigger_start, "top 85%");
        assert_eq!(config.canvas.particle_count, 80);
        assert_eq!(config.canvas.variant, CanvasVariant::Particles);
        assert!(config.cursor.enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config = SiteConfig::from_toml_str(
            r##"
            [motion]
            reduced_motion = "always"
            trigger_start = "center 50%"

            [canvas]
            variant = "grid"
            color = "#00ff00"
            seed = 9
            "##,
        )
        .unwrap();

        assert!(config.reduced_motion(false));
        let start = config.trigger_start().unwrap();
        assert_eq!(start.element, Anchor::Fraction(0.5));
        assert_eq!(start.viewport, Anchor::Fraction(0.5));

        let canvas = config.canvas_options().unwrap();
        assert_eq!(canvas.variant, CanvasVariant::Grid);
        assert_eq!(canvas.color, Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(canvas.seed, Some(9));
        assert_eq!(canvas.particle_count, 80);

        // Untouched sections keep their defaults
        assert_eq!(config.smooth_scroll, SmoothScrollConfig::default());
    }

    #[test]
    fn test_reduced_motion_modes() {
        assert!(ReducedMotion::System.resolve(true));
        assert!(!ReducedMotion::System.resolve(false));
        assert!(ReducedMotion::Always.resolve(false));
        assert!(!ReducedMotion::Never.resolve(true));
    }

    #[test]
    fn test_invalid_color() {
        let err = SiteConfig::from_toml_str("[canvas]\ncolor = \"orange\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor(ref c) if c == "orange"));
    }

    #[test]
    fn test_invalid_trigger() {
        let err = SiteConfig::from_toml_str("[motion]\ntrigger_start = \"somewhere\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTrigger(RevealError::InvalidTrigger(_))
        ));
    }

    #[test]
    fn test_unknown_variant_is_parse_error() {
        let err = SiteConfig::from_toml_str("[canvas]\nvariant = \"stars\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_values() {
        let err = SiteConfig::from_toml_str("[canvas]\nopacity = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "canvas.opacity", .. }));

        let err = SiteConfig::from_toml_str("[cursor]\nring_follow = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "cursor.ring_follow", .. }));

        let err = SiteConfig::from_toml_str("[canvas]\nparticle_count = 5000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "canvas.particle_count", .. }));
    }

    #[test]
    fn test_written_config_reads_back() {
        let mut config = SiteConfig::default();
        config.canvas.variant = CanvasVariant::Gradient;
        config.smooth_scroll.duration = 0.8;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[smooth_scroll]"));
        assert_eq!(SiteConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_option_conversions() {
        let config = SiteConfig::default();
        let scroll = config.smooth_scroll_options();
        assert_eq!(scroll, SmoothScrollOptions::default());
        let cursor = config.cursor_options();
        assert_eq!(cursor, CursorOptions::default());
    }

    #[test]
    fn test_missing_file() {
        let err = SiteConfig::load("/definitely/not/here/lumen.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("lumen.toml"));
    }
}
