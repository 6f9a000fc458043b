//! Lumen Application Layer
//!
//! Site configuration, logging setup and the host glue that pumps frames and
//! routes input into the motion primitives.
//!
//! # Example (Headless Preview)
//!
//! ```ignore
//! use lumen_app::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = SiteConfig::load("lumen.toml")?;
//!     let mut runtime = MotionRuntime::new(Viewport::default(), MotionPreferences::default());
//!     let surface = RecordingContext::shared(Size::new(1280.0, 720.0));
//!
//!     let (page, motion) = mount_demo_page(
//!         &runtime,
//!         PageKind::Services,
//!         surface.clone(),
//!         PageOptions::from_config(&config)?,
//!     )?;
//!
//!     runtime.run_frames(60);
//!     runtime.wheel(400.0);
//!     runtime.run_frames(120);
//!     println!("{} of {} reveals played", motion.fired_count(), page.item_count());
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod logging;
pub mod page;
mod runtime;

#[cfg(test)]
mod tests;

pub use config::SiteConfig;
pub use error::{ConfigError, LumenError, Result};
pub use page::{
    build_page, mount_demo_page, PageElements, PageKind, PageMotion, PageOptions, PageOutline,
};
pub use runtime::{MotionRuntime, FRAME_MS};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::SiteConfig;
    pub use crate::error::{ConfigError, LumenError, Result};
    pub use crate::page::{mount_demo_page, PageKind, PageMotion, PageOptions};
    pub use crate::runtime::MotionRuntime;

    pub use lumen_canvas::{CanvasOptions, CanvasVariant};
    pub use lumen_core::{
        Color, Document, ElementId, Event, MotionPreferences, Point, RecordingContext, Size,
        Viewport,
    };
    pub use lumen_layout::TriggerStart;
}
