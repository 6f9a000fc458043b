//! Error types for lumen_animation

use thiserror::Error;

/// Errors raised while resolving animation descriptions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Easing name is not one of the supported curves
    #[error("unknown easing: {0:?}")]
    UnknownEasing(String),

    /// No built-in preset with this name
    #[error("unknown animation preset: {0:?}")]
    UnknownPreset(String),
}

/// Result type for lumen_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
