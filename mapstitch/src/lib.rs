//! mapstitch - Static map tile stitching
//!
//! This library builds one large raster image for an anchor point and a
//! requested pixel size by fetching a grid of fixed-size static map images
//! and pasting them edge to edge.
//!
//! A build runs through these stages:
//!
//! 1. [`coord`] resolves the anchor to its Web Mercator tile and derives the
//!    degrees-per-pixel scale at that location.
//! 2. [`grid`] lays out the fetch grid and the geographic center of every cell.
//! 3. [`fetch`] retrieves each cell through a [`provider::TileProvider`],
//!    optionally staged through the [`cache`].
//! 4. [`composite`] crops and pastes each raster onto the canvas.
//! 5. [`output`] saves the finished image.
//!
//! [`StitchOrchestrator`] runs the whole pipeline.

pub mod cache;
pub mod composite;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod grid;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod provider;
pub mod request;

pub use coord::GeoPoint;
pub use fetch::TileFetcher;
pub use orchestrator::{BuildError, BuildProgress, StitchOrchestrator};
pub use output::StitchedImage;
pub use request::{BuildRequest, MapType};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
