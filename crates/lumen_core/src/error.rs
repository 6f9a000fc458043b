//! Error types for lumen_core

use thiserror::Error;

use crate::tree::ElementId;

/// Errors raised by the document model and value parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Color string could not be parsed
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// An element handle no longer refers to a live element
    #[error("element {0:?} is not in the document")]
    MissingElement(ElementId),

    /// A structural edit would have produced an invalid tree
    #[error("invalid tree operation: {0}")]
    InvalidTree(String),
}

/// Result type for lumen_core operations
pub type Result<T> = std::result::Result<T, CoreError>;
