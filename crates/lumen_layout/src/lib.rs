//! Lumen Layout Motion
//!
//! Motion primitives that depend on where elements sit in the page:
//!
//! - **Triggers**: `"top 85%"` style start positions
//! - **Intersection Observer**: one shared scroll watcher for every primitive
//! - **Scroll Reveal**: bind elements to presets, play once on scroll
//! - **Text Split**: lines, words and characters as separate elements
//! - **Text Reveal**: staggered reveal of split text
//! - **Smooth Scroll**: eased wheel, touch and anchor scrolling
//! - **Custom Cursor**: pointer-following ring and dot
//!
//! Every primitive is mounted against a shared document, frame scheduler and
//! event dispatcher, and stops touching all three once it is dropped.

pub mod cursor;
pub mod error;
pub mod intersection;
pub mod scroll_reveal;
pub mod smooth_scroll;
pub mod text_measure;
pub mod text_reveal;
pub mod text_split;
pub mod trigger;

pub use cursor::{CursorOptions, CursorState, CustomCursor};
pub use error::{RevealError, SplitError};
pub use intersection::{IntersectionObserver, ObservationId, ObserverHandle};
pub use scroll_reveal::{
    BindingId, FiringPolicy, RevealOptions, ScrollRevealEngine, TriggerMode, SECTION_ITEM_DELAY,
};
pub use smooth_scroll::{
    ScrollTarget, ScrollToOptions, SmoothScroll, SmoothScrollOptions, REFRESH_DELAY_MS,
};
pub use text_measure::{FixedAdvanceMeasure, TextMeasure};
pub use text_reveal::{
    animate_split_text, RevealVariant, SplitAnimationOptions, TextRevealOptions, TextSplitReveal,
};
pub use text_split::{split_text, SplitType, SplitTypes, TextSplit};
pub use trigger::{Anchor, TriggerStart};
