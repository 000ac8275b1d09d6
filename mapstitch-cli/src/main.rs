//! mapstitch CLI - Command-line interface
//!
//! This binary provides a command-line interface to the mapstitch library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mapstitch::coord::{DEFAULT_PRECISION, MAX_PRECISION};
use mapstitch::request::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_ZOOM};

use commands::build::BuildArgs;
use commands::cache::CacheAction;
use commands::common::MapTypeArg;
use commands::config::ConfigCommands;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "mapstitch")]
#[command(version, about = "Stitch static map tiles into one large image", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and save one stitched image
    Build {
        /// Latitude of the top-left pixel in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude of the top-left pixel in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Zoom level (0-19)
        #[arg(long, default_value_t = DEFAULT_ZOOM)]
        zoom: u8,

        /// Output width in pixels
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,

        /// Output height in pixels
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,

        /// Map style
        #[arg(long, value_enum, default_value = "satellite")]
        map_type: MapTypeArg,

        /// Output file path (format follows the extension)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Static maps API key (overrides config and $GMAP_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Number of tiles fetched concurrently
        #[arg(long)]
        parallel: Option<usize>,

        /// Per-fetch timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Retries for transient fetch failures
        #[arg(long)]
        retries: Option<u32>,

        /// Keep fetched tiles in the cache directory
        #[arg(long)]
        keep_tiles: bool,

        /// Build without saving the image
        #[arg(long)]
        no_save: bool,
    },

    /// Show the tile, bounds and pixel scale for a point
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, default_value_t = DEFAULT_ZOOM)]
        zoom: u8,

        /// Decimal places coordinates are rounded to (0-15)
        #[arg(
            long,
            default_value_t = DEFAULT_PRECISION,
            value_parser = clap::value_parser!(u32).range(0..=MAX_PRECISION as i64)
        )]
        precision: u32,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Manage the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Build {
            lat,
            lon,
            zoom,
            width,
            height,
            map_type,
            output,
            api_key,
            parallel,
            timeout,
            retries,
            keep_tiles,
            no_save,
        } => {
            let runner = CliRunner::new(cli.verbose)?;
            commands::build::run(
                &runner,
                BuildArgs {
                    lat,
                    lon,
                    zoom,
                    width,
                    height,
                    map_type,
                    output,
                    api_key,
                    parallel,
                    timeout,
                    retries,
                    keep_tiles,
                    no_save,
                },
            )
        }
        Commands::Locate {
            lat,
            lon,
            zoom,
            precision,
        } => commands::locate::run(lat, lon, zoom, precision),
        Commands::Config { command } => commands::config::run(command),
        Commands::Cache { action } => commands::cache::run(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["mapstitch", "build", "--lat", "51.5", "--lon", "-0.16"])
            .unwrap();
        match cli.command {
            Commands::Build {
                lon,
                zoom,
                width,
                height,
                map_type,
                no_save,
                ..
            } => {
                assert_eq!(lon, -0.16);
                assert_eq!(zoom, 19);
                assert_eq!((width, height), (500, 500));
                assert_eq!(map_type, MapTypeArg::Satellite);
                assert!(!no_save);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_locate_precision_is_bounded() {
        let args = ["mapstitch", "locate", "--lat", "51.5", "--lon", "-0.16"];

        let cli = Cli::try_parse_from(args.iter().chain(&["--precision", "15"])).unwrap();
        assert!(matches!(cli.command, Commands::Locate { precision: 15, .. }));

        assert!(Cli::try_parse_from(args.iter().chain(&["--precision", "16"])).is_err());
        assert!(Cli::try_parse_from(args.iter().chain(&["--precision", "400"])).is_err());
    }
}
