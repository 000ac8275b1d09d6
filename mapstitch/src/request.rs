//! Build request types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::coord::{GeoPoint, DEFAULT_PRECISION};

/// Default zoom level for a build.
pub const DEFAULT_ZOOM: u8 = 19;

/// Default output width in pixels.
pub const DEFAULT_WIDTH: u32 = 500;

/// Default output height in pixels.
pub const DEFAULT_HEIGHT: u32 = 500;

/// Map style requested from the tile provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapType {
    Roadmap,
    #[default]
    Satellite,
    Terrain,
    Hybrid,
}

impl MapType {
    /// All map types, in display order.
    pub const ALL: [MapType; 4] = [
        MapType::Roadmap,
        MapType::Satellite,
        MapType::Terrain,
        MapType::Hybrid,
    ];

    /// Name used in provider URLs and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::Roadmap => "roadmap",
            MapType::Satellite => "satellite",
            MapType::Terrain => "terrain",
            MapType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown map type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMapTypeError(pub String);

impl fmt::Display for ParseMapTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown map type '{}' (expected roadmap, satellite, terrain or hybrid)",
            self.0
        )
    }
}

impl std::error::Error for ParseMapTypeError {}

impl FromStr for MapType {
    type Err = ParseMapTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "roadmap" => Ok(MapType::Roadmap),
            "satellite" => Ok(MapType::Satellite),
            "terrain" => Ok(MapType::Terrain),
            "hybrid" => Ok(MapType::Hybrid),
            _ => Err(ParseMapTypeError(s.to_string())),
        }
    }
}

/// A request for one stitched image.
///
/// The anchor point is rounded on construction, so two requests built from
/// the same inputs address the same tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    /// Geographic position of the output's top-left pixel
    pub point: GeoPoint,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub map_type: MapType,
    /// Persist the result once built
    pub save: bool,
    /// Explicit output path, overriding the default file name
    pub output: Option<PathBuf>,
}

impl BuildRequest {
    /// Creates a request with default size, zoom and map type, rounding the
    /// anchor at the default precision.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_precision(latitude, longitude, DEFAULT_PRECISION)
    }

    /// Creates a request, rounding the anchor to `precision` decimal places.
    pub fn with_precision(latitude: f64, longitude: f64, precision: u32) -> Self {
        Self {
            point: GeoPoint::rounded(latitude, longitude, precision),
            zoom: DEFAULT_ZOOM,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            map_type: MapType::default(),
            save: false,
            output: None,
        }
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_map_type(mut self, map_type: MapType) -> Self {
        self.map_type = map_type;
        self
    }

    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Default file name: `{lat}_{lon}_{zoom}_{width}_{height}.jpg`.
    pub fn default_file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}.jpg",
            self.point.latitude(),
            self.point.longitude(),
            self.zoom,
            self.width,
            self.height
        )
    }
}
