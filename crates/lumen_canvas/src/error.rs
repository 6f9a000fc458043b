//! Error types for lumen_canvas

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// Variant name is not one of `particles`, `grid` or `gradient`
    #[error("unknown canvas variant: {0:?}")]
    UnknownVariant(String),
}
