//! Anchor tile resolution.
//!
//! Resolves the tile under a build's anchor point together with the degrees
//! covered by one of its pixels. The grid planner walks the output canvas in
//! those per-pixel steps.

use tracing::debug;

use super::{
    tile_bounds, tile_index_for, CoordError, GeoPoint, PixelScale, TileBounds, TileIndex, TILE_SIZE,
};

/// The tile containing a build's anchor point and its pixel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// The rounded anchor point (top-left pixel of the output)
    pub point: GeoPoint,
    /// Tile containing the anchor point
    pub tile: TileIndex,
    /// Geographic box of that tile
    pub bounds: TileBounds,
    /// Degrees per pixel derived from the tile box
    pub scale: PixelScale,
}

/// Resolves the anchor tile, its bounds and the per-pixel degree deltas.
///
/// # Errors
///
/// Propagates projection errors for an invalid point or zoom and returns
/// [`CoordError::DegenerateTile`] if the bounds do not yield a strictly
/// positive, finite scale.
pub fn resolve(point: GeoPoint, zoom: u8, precision: u32) -> Result<Anchor, CoordError> {
    let tile = tile_index_for(point.latitude(), point.longitude(), zoom, precision)?;
    let bounds = tile_bounds(&tile, precision)?;

    let tile_size = TILE_SIZE as f64;
    let scale = PixelScale {
        degrees_lat_per_pixel: (bounds.top_left.latitude() - bounds.bottom_right.latitude())
            / tile_size,
        degrees_lon_per_pixel: (bounds.bottom_right.longitude() - bounds.top_left.longitude())
            / tile_size,
    };

    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(scale.degrees_lat_per_pixel) || !positive(scale.degrees_lon_per_pixel) {
        return Err(CoordError::DegenerateTile(tile));
    }

    debug!(
        anchor = %point,
        tile = %tile,
        top_left = %bounds.top_left,
        bottom_right = %bounds.bottom_right,
        lat_per_pixel = scale.degrees_lat_per_pixel,
        lon_per_pixel = scale.degrees_lon_per_pixel,
        "Resolved anchor tile"
    );

    Ok(Anchor {
        point,
        tile,
        bounds,
        scale,
    })
}
