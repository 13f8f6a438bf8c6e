use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use map_crop_origin::logger;
use map_crop_origin::map_pipeline::{CropOriginConfig, CropOriginPipeline};
use tracing::{info, warn};

/// Rewrite a cropped occupancy map's YAML so it stays aligned with the map it was cut from
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Metadata YAML of the original map
    original_yaml: PathBuf,

    /// Original map image (PGM or PNG)
    original_image: PathBuf,

    /// Cropped map image
    cropped_image: PathBuf,

    /// Where to write the metadata YAML for the cropped map
    output_yaml: PathBuf,

    /// Warn when the best normalized SSD score is above this value
    #[arg(long, default_value_t = 0.05)]
    score_warning: f64,

    /// Run the correlation search on a single thread
    #[arg(long)]
    single_thread: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    // Usage errors exit with 1 like every other failure; --help and --version exit 0
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    });

    logger::init(&cli.log_level);

    let config = CropOriginConfig::builder()
        .score_warning(Some(cli.score_warning))
        .parallel(!cli.single_thread)
        .build();
    let pipeline = CropOriginPipeline::new(config);

    let report = pipeline
        .process_files(
            &cli.original_yaml,
            &cli.original_image,
            &cli.cropped_image,
            &cli.output_yaml,
        )
        .with_context(|| format!("failed to update {}", cli.output_yaml.display()))?;

    let margins = report.margins;
    info!(
        "Crop margins: left={}, right={}, top={}, bottom={}",
        margins.left, margins.right, margins.top, margins.bottom
    );
    info!(
        "Origin: {:?} -> {:?}",
        report.source_origin.to_array(),
        report.new_origin.to_array()
    );
    if !report.is_clean() {
        warn!(
            "{} advisory warning(s) raised, check {} manually",
            report.advisories.len(),
            cli.output_yaml.display()
        );
    }
    info!("Wrote {} (image: {})", cli.output_yaml.display(), report.metadata.image);

    Ok(())
}
