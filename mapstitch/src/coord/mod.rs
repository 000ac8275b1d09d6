//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and the Web Mercator slippy tile scheme, plus the fixed-precision rounding
//! applied to every coordinate that flows through a build.

pub mod addressing;
mod types;

pub use addressing::{resolve, Anchor};
pub use types::{
    CoordError, GeoPoint, PixelScale, TileBounds, TileIndex, DEFAULT_PRECISION, MAX_LAT,
    MAX_LON, MAX_PRECISION, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM, TILE_SIZE,
};

use std::f64::consts::PI;

/// Rounds a coordinate component to `precision` decimal places.
///
/// Halfway cases round away from zero.
#[inline]
pub fn round_coord(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Offset applied before tile indexing, one unit in the last rounded decimal place.
#[inline]
pub fn boundary_epsilon(precision: u32) -> f64 {
    10f64.powi(-(precision as i32))
}

/// Converts geographic coordinates to the index of the tile containing them.
///
/// The latitude is nudged south and the longitude east by
/// [`boundary_epsilon`] before projecting, so a point sitting exactly on a
/// tile's north or west edge resolves to that tile rather than its neighbour.
/// Indices are clamped into the grid, which maps latitudes beyond the
/// Mercator limit (±85.0511°) and longitude 180 onto the edge tiles.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees, strictly between -90 and 90
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 19)
/// * `precision` - Decimal places the inputs were rounded to
#[inline]
pub fn tile_index_for(
    lat: f64,
    lon: f64,
    zoom: u8,
    precision: u32,
) -> Result<TileIndex, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    if !(lat > MIN_LAT && lat < MAX_LAT) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }

    let epsilon = boundary_epsilon(precision);
    let lat = lat - epsilon;
    let lon = lon + epsilon;

    let tile_size = TILE_SIZE as f64;
    let n = (1u32 << zoom) as f64;

    // Longitude maps linearly onto the x axis
    let point_x = ((tile_size / 2.0 + lon * tile_size / 360.0) * n / tile_size).floor();

    // Latitude goes through the inverse Gudermannian
    let sin_y = lat.to_radians().sin();
    let point_y = ((tile_size / 2.0
        - 0.5 * ((1.0 + sin_y) / (1.0 - sin_y)).ln() * (tile_size / (2.0 * PI)))
        * n
        / tile_size)
        .floor();

    let max_index = n - 1.0;
    Ok(TileIndex {
        x: point_x.clamp(0.0, max_index) as u32,
        y: point_y.clamp(0.0, max_index) as u32,
        zoom,
    })
}

/// Returns the geographic box covered by a tile.
///
/// Each corner is rounded independently to `precision` decimal places.
pub fn tile_bounds(tile: &TileIndex, precision: u32) -> Result<TileBounds, CoordError> {
    if tile.zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(tile.zoom));
    }
    let n = tile.tiles_per_side();
    if tile.x >= n || tile.y >= n {
        return Err(CoordError::TileOutOfRange(*tile));
    }

    let (lat_tl, lon_tl) = tile_to_lat_lon(tile);
    let (lat_br, lon_br) = tile_to_lat_lon(&TileIndex::new(tile.x + 1, tile.y + 1, tile.zoom));

    Ok(TileBounds {
        top_left: GeoPoint::rounded(lat_tl, lon_tl, precision),
        bottom_right: GeoPoint::rounded(lat_br, lon_br, precision),
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner, unrounded.
/// `x`/`y` equal to `2^zoom` are accepted and give the far east/south edge.
#[inline]
pub fn tile_to_lat_lon(tile: &TileIndex) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u32 = DEFAULT_PRECISION;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_round_coord() {
        assert_eq!(round_coord(51.563839178, 8), 51.56383918);
        assert_eq!(round_coord(-0.164794922, 8), -0.16479492);
        assert_eq!(round_coord(1.25, 1), 1.3);
        assert_eq!(round_coord(-1.25, 1), -1.3);
        assert_eq!(round_coord(12.0, 0), 12.0);
    }

    #[test]
    fn test_boundary_epsilon_tracks_precision() {
        assert_eq!(boundary_epsilon(8), 1e-8);
        assert_eq!(boundary_epsilon(4), 1e-4);
    }

    #[test]
    fn test_london_at_zoom_19() {
        let point = GeoPoint::rounded(51.563839178, -0.164794922, P);
        let tile = tile_index_for(point.latitude(), point.longitude(), 19, P).unwrap();
        assert_eq!(tile, TileIndex::new(261904, 174207, 19));
    }

    #[test]
    fn test_new_york_city_at_zoom_16() {
        let tile = tile_index_for(40.7128, -74.0060, 16, P).unwrap();
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        let tile = tile_index_for(45.0, 120.0, 0, P).unwrap();
        assert_eq!(tile, TileIndex::new(0, 0, 0));
    }

    #[test]
    fn test_invalid_latitude() {
        for lat in [90.0, -90.0, 91.0, f64::NAN] {
            let result = tile_index_for(lat, 0.0, 10, P);
            assert!(
                matches!(result, Err(CoordError::InvalidLatitude(_))),
                "lat {} should be rejected",
                lat
            );
        }
    }

    #[test]
    fn test_invalid_longitude() {
        let result = tile_index_for(10.0, 180.5, 10, P);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = tile_index_for(10.0, 10.0, 20, P);
        assert_eq!(result.unwrap_err(), CoordError::InvalidZoom(20));
    }

    #[test]
    fn test_latitude_beyond_mercator_limit_clamps_to_edge_tile() {
        let north = tile_index_for(89.5, 0.0, 5, P).unwrap();
        let south = tile_index_for(-89.5, 0.0, 5, P).unwrap();
        assert_eq!(north.y, 0);
        assert_eq!(south.y, 31);
    }

    #[test]
    fn test_east_edge_longitude_clamps_to_last_column() {
        let tile = tile_index_for(0.5, 180.0, 4, P).unwrap();
        assert_eq!(tile.x, 15);
    }

    #[test]
    fn test_tile_bounds_london() {
        let bounds = tile_bounds(&TileIndex::new(261904, 174207, 19), P).unwrap();
        assert_close(bounds.top_left.latitude(), 51.56383918);
        assert_close(bounds.top_left.longitude(), -0.16479492);
        assert_close(bounds.bottom_right.latitude(), 51.56341233);
        assert_close(bounds.bottom_right.longitude(), -0.16410828);
    }

    #[test]
    fn test_tile_bounds_whole_world() {
        let bounds = tile_bounds(&TileIndex::new(0, 0, 0), P).unwrap();
        assert_close(bounds.top_left.latitude(), 85.05112878);
        assert_close(bounds.top_left.longitude(), -180.0);
        assert_close(bounds.bottom_right.latitude(), -85.05112878);
        assert_close(bounds.bottom_right.longitude(), 180.0);
    }

    #[test]
    fn test_tile_bounds_rejects_out_of_range_index() {
        let tile = TileIndex::new(16, 0, 4);
        assert_eq!(
            tile_bounds(&tile, P).unwrap_err(),
            CoordError::TileOutOfRange(tile)
        );
        assert_eq!(
            tile_bounds(&TileIndex::new(0, 0, 22), P).unwrap_err(),
            CoordError::InvalidZoom(22)
        );
    }

    #[test]
    fn test_tile_to_lat_lon_at_equator() {
        let (lat, lon) = tile_to_lat_lon(&TileIndex::new(512, 512, 10));
        assert!(lat.abs() < 1e-9, "Should be on the equator");
        assert!(lon.abs() < 1e-9, "Should be on the prime meridian");
    }

    // A corner point resolves to the tile whose north-west corner it is.
    #[test]
    fn test_exact_north_west_corner_resolves_to_own_tile() {
        for tile in [
            TileIndex::new(261904, 174207, 19),
            TileIndex::new(19295, 24640, 16),
            TileIndex::new(3, 5, 4),
        ] {
            let bounds = tile_bounds(&tile, P).unwrap();
            let corner = bounds.top_left;
            let resolved = tile_index_for(corner.latitude(), corner.longitude(), tile.zoom, P)
                .unwrap();
            assert_eq!(resolved, tile, "corner {} of tile {}", corner, tile);
        }
    }

    // The south-east corner is the north-west corner of the diagonal neighbour.
    #[test]
    fn test_exact_south_east_corner_resolves_to_diagonal_neighbour() {
        let tile = TileIndex::new(19295, 24640, 16);
        let bounds = tile_bounds(&tile, P).unwrap();
        let corner = bounds.bottom_right;
        let resolved =
            tile_index_for(corner.latitude(), corner.longitude(), tile.zoom, P).unwrap();
        assert_eq!(resolved, TileIndex::new(tile.x + 1, tile.y + 1, tile.zoom));
    }

    // Without the bias, a point on the equator/prime meridian sits on four tiles.
    #[test]
    fn test_origin_resolves_south_east_of_the_edges() {
        let tile = tile_index_for(0.0, 0.0, 1, P).unwrap();
        assert_eq!(tile, TileIndex::new(1, 1, 1));
    }

    #[test]
    fn test_point_inside_bias_band_moves_to_neighbour() {
        // Half an epsilon west of a west edge still lands east of it.
        let tile = TileIndex::new(3, 5, 4);
        let (lat, lon) = tile_to_lat_lon(&tile);
        let resolved = tile_index_for(lat - 0.01, lon - 0.5e-8, 4, P).unwrap();
        assert_eq!(resolved.x, tile.x);

        // Two epsilons west is unambiguously in the western neighbour.
        let resolved = tile_index_for(lat - 0.01, lon - 2e-8, 4, P).unwrap();
        assert_eq!(resolved.x, tile.x - 1);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_interior_point_is_contained_by_its_tile(
                lat in -85.0..85.0_f64,
                lon in -179.9..179.9_f64,
                zoom in 0u8..=19
            ) {
                let point = GeoPoint::rounded(lat, lon, P);
                let tile = tile_index_for(point.latitude(), point.longitude(), zoom, P)?;
                let bounds = tile_bounds(&tile, P)?;

                // Points inside the epsilon band of an edge legitimately resolve across it.
                let eps = 2.0 * boundary_epsilon(P);
                let shifted_lat = point.latitude() - eps;
                let shifted_lon = point.longitude() + eps;
                let near_edge = (point.latitude() - bounds.top_left.latitude()).abs() < eps
                    || (point.latitude() - bounds.bottom_right.latitude()).abs() < eps
                    || (point.longitude() - bounds.top_left.longitude()).abs() < eps
                    || (point.longitude() - bounds.bottom_right.longitude()).abs() < eps;
                prop_assume!(!near_edge);

                prop_assert!(
                    bounds.contains(&point),
                    "{} not inside {:?} (tile {}, shifted {} {})",
                    point, bounds, tile, shifted_lat, shifted_lon
                );
            }

            #[test]
            fn test_tile_index_is_idempotent(
                lat in -89.9..89.9_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=19
            ) {
                let first = tile_index_for(lat, lon, zoom, P)?;
                let second = tile_index_for(lat, lon, zoom, P)?;
                prop_assert_eq!(first, second);
            }

            #[test]
            fn test_tile_index_in_bounds(
                lat in -89.99..89.99_f64,
                lon in -180.0..=180.0_f64,
                zoom in 0u8..=19
            ) {
                let tile = tile_index_for(lat, lon, zoom, P)?;
                let max_tile = 1u32 << zoom;
                prop_assert!(tile.x < max_tile, "x {} >= {} at zoom {}", tile.x, max_tile, zoom);
                prop_assert!(tile.y < max_tile, "y {} >= {} at zoom {}", tile.y, max_tile, zoom);
                prop_assert_eq!(tile.zoom, zoom);
            }

            #[test]
            fn test_bounds_are_ordered(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=19
            ) {
                let tile = tile_index_for(lat, lon, zoom, P)?;
                let bounds = tile_bounds(&tile, P)?;
                prop_assert!(bounds.top_left.latitude() > bounds.bottom_right.latitude());
                prop_assert!(bounds.top_left.longitude() < bounds.bottom_right.longitude());
            }

            #[test]
            fn test_longitude_monotonic(
                lat in 0.0..1.0_f64,
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                zoom in 10u8..=15
            ) {
                let tile1 = tile_index_for(lat, lon1, zoom, P)?;
                let tile2 = tile_index_for(lat, lon2, zoom, P)?;
                prop_assert!(tile1.x < tile2.x);
            }

            #[test]
            fn test_reject_polar_latitude(
                lat in 90.0..180.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=19
            ) {
                let north = tile_index_for(lat, lon, zoom, P);
                let south = tile_index_for(-lat, lon, zoom, P);
                prop_assert!(matches!(north, Err(CoordError::InvalidLatitude(_))));
                prop_assert!(matches!(south, Err(CoordError::InvalidLatitude(_))));
            }
        }
    }
}
