//! Error types for lumen_layout

use thiserror::Error;

use lumen_core::{CoreError, ElementId};

/// Errors raised when binding scroll reveals
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevealError {
    /// No built-in preset with this name
    #[error("unknown animation preset: {0:?}")]
    UnknownPreset(String),

    /// Trigger start string could not be parsed
    #[error("invalid trigger start {0:?}, expected e.g. \"top 85%\"")]
    InvalidTrigger(String),

    /// The target list was empty
    #[error("a reveal needs at least one target")]
    NoTargets,
}

/// Errors raised when splitting an element's text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    /// The element is not in the document
    #[error("element {0:?} is not in the document")]
    MissingElement(ElementId),

    /// The element contains markup that cannot be split (block children)
    #[error("cannot split text containing <{0}> children")]
    UnsupportedMarkup(String),

    /// A tree edit failed while building the split
    #[error(transparent)]
    Tree(#[from] CoreError),
}
