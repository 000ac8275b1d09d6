//! Cache management CLI commands.

use clap::Subcommand;
use mapstitch::cache::TileCache;
use mapstitch::config::ConfigFile;

use super::common::format_size;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the tile cache, removing all kept tiles
    Clear,
    /// Show tile cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let cache = TileCache::new(config.to_stitch_config().temp_dir);

    match action {
        CacheAction::Clear => {
            println!("Clearing tile cache at: {}", cache.dir().display());

            let result = cache.clear()?;
            println!(
                "Deleted {} files, freed {}",
                result.files_deleted,
                format_size(result.bytes_freed)
            );
        }
        CacheAction::Stats => {
            println!("Tile cache: {}", cache.dir().display());

            let (files, bytes) = cache.stats()?;
            println!("  Files: {}", files);
            println!("  Size:  {}", format_size(bytes));
        }
    }

    Ok(())
}
