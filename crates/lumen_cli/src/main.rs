//! Lumen CLI
//!
//! Preview page motion headlessly and check site configuration files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use lumen_app::config::CONFIG_FILE;
use lumen_app::{PageKind, SiteConfig};
use lumen_canvas::CanvasVariant;

mod preview;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lumen motion toolkit CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a demo page's motion headlessly and print a summary
    Preview(PreviewArgs),

    /// Validate a lumen.toml file
    CheckConfig {
        /// Config file
        path: PathBuf,
    },

    /// Write a lumen.toml with every default spelled out
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Config file (defaults to ./lumen.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page to build (home, about, services, projects, careers, contact)
    #[arg(short, long, default_value = "home")]
    pub page: PageKind,

    /// Canvas variant, overriding the page's own (particles, grid, gradient)
    #[arg(long)]
    pub variant: Option<CanvasVariant>,

    /// Number of frames to simulate at 60 fps
    #[arg(short, long, default_value = "120")]
    pub frames: usize,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    pub width: f32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    pub height: f32,

    /// Device pixel ratio
    #[arg(long, default_value = "2")]
    pub dpr: f32,

    /// Particle RNG seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulate a user who prefers reduced motion
    #[arg(long)]
    pub reduced_motion: bool,

    /// Simulate a touch device
    #[arg(long)]
    pub touch: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config_log_filter(&cli.command)
    };
    lumen_app::logging::init(&filter);

    match cli.command {
        Commands::Preview(args) => preview::run(&args),
        Commands::CheckConfig { path } => cmd_check_config(&path),
        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

/// Log filter from the config the command is about to use, if it parses
fn config_log_filter(command: &Commands) -> String {
    let path = match command {
        Commands::Preview(PreviewArgs {
            config: Some(path), ..
        }) => path.clone(),
        Commands::Preview(_) => PathBuf::from(CONFIG_FILE),
        _ => return "info".to_string(),
    };
    SiteConfig::load(path)
        .map(|config| config.motion.log_filter)
        .unwrap_or_else(|_| "info".to_string())
}

fn cmd_check_config(path: &Path) -> Result<()> {
    let config =
        SiteConfig::load(path).with_context(|| format!("Invalid config {}", path.display()))?;

    info!("{} is valid", path.display());
    println!("motion");
    println!("  reduced_motion: {:?}", config.motion.reduced_motion);
    println!("  trigger_start:  {}", config.trigger_start()?);
    println!("smooth_scroll");
    println!(
        "  {} ({}s, wheel x{}, touch x{})",
        if config.smooth_scroll.enabled { "enabled" } else { "disabled" },
        config.smooth_scroll.duration,
        config.smooth_scroll.wheel_multiplier,
        config.smooth_scroll.touch_multiplier
    );
    println!("canvas");
    println!(
        "  {} with {} particles, color {}",
        config.canvas.variant,
        config.canvas.particle_count,
        config.canvas_color()?
    );
    println!("cursor");
    println!(
        "  {}",
        if config.cursor.enabled { "enabled" } else { "disabled" }
    );

    Ok(())
}

fn cmd_init(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    let content = SiteConfig::default()
        .to_toml_string()
        .context("Failed to serialize default config")?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {}", path.display());
    Ok(())
}
