//! Headless page preview
//!
//! Builds a demo page, then plays it frame by frame: the hero settles first,
//! after which the simulated user scrolls down in wheel steps while the
//! pointer circles over the hero.

use anyhow::{Context, Result};
use tracing::{debug, info};

use lumen_app::config::CONFIG_FILE;
use lumen_app::{mount_demo_page, MotionRuntime, PageOptions, SiteConfig, FRAME_MS};
use lumen_core::{MotionPreferences, Point, RecordingContext, SharedSurface, Size, Viewport};

use crate::PreviewArgs;

/// Scroll distance of one simulated wheel notch
const WHEEL_STEP: f32 = 240.0;
/// Frames between wheel notches
const WHEEL_INTERVAL: usize = 12;

pub fn run(args: &PreviewArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => SiteConfig::load_from_dir(".")
            .with_context(|| format!("Failed to load {CONFIG_FILE}"))?,
    };

    let mut options = PageOptions::from_config(&config)?;
    options.canvas.variant = args.variant.unwrap_or_else(|| args.page.canvas_variant());
    if args.seed.is_some() {
        options.canvas.seed = args.seed;
    }

    let preferences = MotionPreferences {
        reduced_motion: args.reduced_motion || config.reduced_motion(false),
        touch_device: args.touch,
    };
    let size = Size::new(args.width, args.height);
    let mut runtime = MotionRuntime::new(
        Viewport {
            size,
            device_pixel_ratio: args.dpr,
        },
        preferences,
    );

    let recording = RecordingContext::shared(size);
    let surface: SharedSurface = recording.clone();
    let variant = options.canvas.variant;
    let (page, motion) = mount_demo_page(&runtime, args.page, surface, options)
        .with_context(|| format!("Failed to build the {} page", args.page))?;

    info!(
        "Previewing {} page ({} canvas, {} frames, {}x{} @{}x)",
        args.page, variant, args.frames, args.width, args.height, args.dpr
    );

    let max_scroll = runtime.document().borrow().max_scroll();
    let scroll_from = args.frames / 4;
    for frame in 0..args.frames {
        let angle = frame as f32 * 0.05;
        runtime.pointer_move(Point::new(
            size.width * 0.5 + angle.cos() * 200.0,
            size.height * 0.5 + angle.sin() * 120.0,
        ));

        if frame >= scroll_from
            && (frame - scroll_from) % WHEEL_INTERVAL == 0
            && runtime.scroll_y() < max_scroll
        {
            if motion.smooth_scroll().is_some() {
                runtime.wheel(WHEEL_STEP);
            } else {
                runtime.scroll(runtime.scroll_y() + WHEEL_STEP);
            }
        }

        let callbacks = runtime.run_frames(1);
        if frame % 30 == 0 {
            debug!(
                frame,
                callbacks,
                scroll_y = runtime.scroll_y(),
                fired = motion.fired_count(),
                "preview frame"
            );
        }
    }

    let draw_calls = recording.borrow().draw_call_count();
    info!(
        frames = runtime.frame_count(),
        draw_calls,
        fired = motion.fired_count(),
        bindings = motion.binding_count(),
        "preview finished"
    );

    println!("Lumen preview");
    println!("=============");
    println!();
    println!("Page:        {}", args.page);
    println!("Canvas:      {} ({} particles)", variant, motion.canvas().particle_count());
    println!(
        "Frames:      {} ({:.0} ms simulated)",
        runtime.frame_count(),
        args.frames as f64 * FRAME_MS
    );
    println!("Draw calls:  {}", draw_calls);
    println!(
        "Scroll:      {:.0} of {:.0}",
        runtime.scroll_y(),
        max_scroll
    );
    println!(
        "Reveals:     {} of {} fired",
        motion.fired_count(),
        motion.binding_count()
    );
    println!(
        "Title words: {}",
        if motion.title().is_split() {
            motion.title().units().len().to_string()
        } else {
            "not split".to_string()
        }
    );
    println!("Hero:        {}", if motion.hero_settled() { "settled" } else { "animating" });
    println!(
        "Cursor:      {}",
        if motion.cursor().is_some() { "custom" } else { "system" }
    );
    println!("Sections:    {}", page.sections.len());

    Ok(())
}
