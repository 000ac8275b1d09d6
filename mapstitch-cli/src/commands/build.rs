//! Build command - stitch one image for an anchor point.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use mapstitch::{BuildRequest, StitchOrchestrator};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{create_fetcher, BuildOverrides, MapTypeArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the build command.
pub struct BuildArgs {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub map_type: MapTypeArg,
    pub output: Option<PathBuf>,
    pub api_key: Option<String>,
    pub parallel: Option<usize>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub keep_tiles: bool,
    pub no_save: bool,
}

/// Run the build command.
pub fn run(runner: &CliRunner, args: BuildArgs) -> Result<(), CliError> {
    runner.log_startup("build");
    let config = runner.config();

    let stitch_config = BuildOverrides {
        parallel: args.parallel,
        timeout: args.timeout,
        retries: args.retries,
        keep_tiles: args.keep_tiles,
    }
    .apply(config.to_stitch_config());

    let cancel = CancellationToken::new();
    let fetcher = create_fetcher(config, &stitch_config, args.api_key, &cancel)?;

    let mut request = BuildRequest::with_precision(args.lat, args.lon, stitch_config.precision)
        .with_zoom(args.zoom)
        .with_size(args.width, args.height)
        .with_map_type(args.map_type.into())
        .with_save(!args.no_save);
    if let Some(output) = args.output {
        request = request.with_output(output);
    }

    println!("mapstitch v{}", mapstitch::VERSION);
    println!("==============");
    println!();
    println!("Anchor:   {}", request.point);
    println!("Zoom:     {}", request.zoom);
    println!("Size:     {}x{}", request.width, request.height);
    println!("Map type: {}", request.map_type);
    println!("Provider: {}", fetcher.provider().name());
    println!();

    let cancel_on_signal = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, cancelling build...");
        cancel_on_signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} tiles")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let progress_bar = bar.clone();
    let orchestrator = StitchOrchestrator::new(fetcher, stitch_config).with_progress(move |p| {
        progress_bar.set_length(p.total as u64);
        progress_bar.set_position(p.completed as u64);
    });

    let result = orchestrator.build_with_cancellation(&request, &cancel);
    bar.finish_and_clear();
    let image = result?;

    if request.save {
        info!(path = %image.path().display(), "Image saved");
        println!("Saved {}", image.path().display());
    } else {
        println!(
            "Built {}x{} image (not saved)",
            image.width(),
            image.height()
        );
    }

    Ok(())
}
