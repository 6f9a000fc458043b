//! Error types for lumen_app

use std::path::PathBuf;

use thiserror::Error;

use lumen_core::CoreError;
use lumen_layout::{RevealError, SplitError};

/// Errors raised while loading or validating `lumen.toml`
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for `SiteConfig`
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be written back out
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `[canvas] color` is not a hex color
    #[error("invalid canvas color {0:?}")]
    InvalidColor(String),

    /// `[motion] trigger_start` could not be parsed
    #[error(transparent)]
    InvalidTrigger(#[from] RevealError),

    /// A numeric field is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors that can occur while composing a page
#[derive(Error, Debug)]
pub enum LumenError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("document error: {0}")]
    Tree(#[from] CoreError),

    #[error("reveal error: {0}")]
    Reveal(#[from] RevealError),

    #[error("text split error: {0}")]
    Split(#[from] SplitError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for LumenError {
    fn from(err: anyhow::Error) -> Self {
        LumenError::Other(err.to_string())
    }
}

/// Result type for lumen_app operations
pub type Result<T> = std::result::Result<T, LumenError>;
