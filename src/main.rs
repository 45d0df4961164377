use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gridwave::{run_preview, PreviewOptions};
use gridwave_core::GridConfig;
use gridwave_render::Scene;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(author, version, about = "Lay out a scene with a GridWave configuration", long_about = None)]
struct Args {
    /// Grid configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Scene describing the viewport, container and items (JSON)
    #[arg(short, long, value_name = "FILE")]
    scene: PathBuf,

    /// Override the scene's viewport width in pixels
    #[arg(long)]
    viewport: Option<f32>,

    /// Only show items matching this selector
    #[arg(long)]
    filter: Option<String>,

    /// Sort visible items by this attribute
    #[arg(long, value_name = "ATTRIBUTE")]
    sort_by: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so JSON output stays parseable.
    let level = if args.debug { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = GridConfig::from_json(&read(&args.config)?)
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;
    let scene: Scene = serde_json::from_str(&read(&args.scene)?)
        .with_context(|| format!("Invalid scene in {}", args.scene.display()))?;
    debug!(items = scene.items.len(), "Loaded scene");

    let options = PreviewOptions {
        viewport: args.viewport,
        filter: args.filter,
        sort_by: args.sort_by,
    };
    info!("Laying out {}", args.scene.display());
    let report = run_preview(config, scene, &options)?;

    match args.format {
        Format::Text => println!("{}", report),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
