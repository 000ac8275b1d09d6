//! Coordinate type definitions

use std::fmt;

/// Valid latitude range. Both ends are excluded: the projection is undefined at the poles.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Supported zoom levels
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 19;

/// Edge length of one Mercator tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Default number of decimal places coordinates are rounded to.
pub const DEFAULT_PRECISION: u32 = 8;

/// Largest supported precision; beyond this `f64` rounding loses meaning.
pub const MAX_PRECISION: u32 = 15;

/// A geographic point in decimal degrees.
///
/// Built through [`GeoPoint::rounded`] so that both components carry a fixed
/// number of decimal places. Identical inputs therefore always produce the
/// same tile addressing and the same cache keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rounding both components to `precision` decimal places.
    pub fn rounded(latitude: f64, longitude: f64, precision: u32) -> Self {
        Self {
            latitude: super::round_coord(latitude, precision),
            longitude: super::round_coord(longitude, precision),
        }
    }

    /// Latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Checks that the point lies inside the projectable range.
    pub fn validate(&self) -> Result<(), CoordError> {
        if !(self.latitude > MIN_LAT && self.latitude < MAX_LAT) {
            return Err(CoordError::InvalidLatitude(self.latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(CoordError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Index of one 256×256 tile in the Web Mercator slippy scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    /// X coordinate (east-west), 0 at the antimeridian west edge
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
    /// Zoom level (0-19)
    pub zoom: u8,
}

impl TileIndex {
    /// Creates a tile index.
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Number of tiles along one axis at this zoom level.
    #[inline]
    pub fn tiles_per_side(&self) -> u32 {
        1u32 << self.zoom
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Geographic box covered by a [`TileIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    /// North-west corner
    pub top_left: GeoPoint,
    /// South-east corner
    pub bottom_right: GeoPoint,
}

impl TileBounds {
    /// Returns true if the point lies within the box, edges included.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude() <= self.top_left.latitude()
            && point.latitude() >= self.bottom_right.latitude()
            && point.longitude() >= self.top_left.longitude()
            && point.longitude() <= self.bottom_right.longitude()
    }
}

/// Degrees covered by one pixel of a 256-pixel tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    pub degrees_lat_per_pixel: f64,
    pub degrees_lon_per_pixel: f64,
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside the open interval (-90, 90)
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    InvalidLongitude(f64),
    /// Zoom level is outside valid range (0 to 19)
    InvalidZoom(u8),
    /// Tile index does not exist at its zoom level
    TileOutOfRange(TileIndex),
    /// Tile bounds produced a non-positive pixel scale
    DegenerateTile(TileIndex),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be strictly between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::TileOutOfRange(tile) => {
                write!(
                    f,
                    "Tile {} does not exist (max index at zoom {} is {})",
                    tile,
                    tile.zoom,
                    tile.tiles_per_side().saturating_sub(1)
                )
            }
            CoordError::DegenerateTile(tile) => {
                write!(f, "Tile {} has a non-positive pixel scale", tile)
            }
        }
    }
}

impl std::error::Error for CoordError {}
