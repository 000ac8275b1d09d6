//! Orchestrator types and errors

use std::fmt;

use crate::composite::CompositeError;
use crate::coord::{CoordError, TileIndex};
use crate::fetch::FetchError;
use crate::grid::GridError;
use crate::output::OutputError;

/// Why a request was rejected before any fetch was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Anchor point or zoom level is invalid
    Coordinates(CoordError),
    /// Requested dimensions or grid are invalid
    Grid(GridError),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Coordinates(e) => write!(f, "{}", e),
            InputError::Grid(e) => write!(f, "{}", e),
        }
    }
}

/// Errors that can occur while building a stitched image.
#[derive(Debug)]
pub enum BuildError {
    /// The request was invalid
    InvalidInput(InputError),
    /// Width or height exceeds the configured maximum
    DimensionTooLarge {
        axis: &'static str,
        value: u32,
        max: u32,
    },
    /// A tile fetch failed
    Fetch {
        row: u32,
        col: u32,
        source: FetchError,
    },
    /// The anchor tile produced a non-positive pixel scale
    DegenerateTile(TileIndex),
    /// A raster could not be pasted onto the canvas
    Composite(CompositeError),
    /// The build was cancelled before it finished
    Cancelled,
    /// The finished image could not be saved
    Save(OutputError),
}

impl BuildError {
    /// Returns true if the caller's request was at fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BuildError::InvalidInput(_) | BuildError::DimensionTooLarge { .. }
        )
    }

    /// Returns true if running the same build again might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BuildError::Fetch { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidInput(e) => write!(f, "Invalid request: {}", e),
            BuildError::DimensionTooLarge { axis, value, max } => write!(
                f,
                "Requested {} of {}px exceeds the maximum of {}px",
                axis, value, max
            ),
            BuildError::Fetch { row, col, source } => {
                write!(f, "Failed to fetch tile at row {}, col {}: {}", row, col, source)
            }
            BuildError::DegenerateTile(tile) => {
                write!(f, "Tile {} has a non-positive pixel scale", tile)
            }
            BuildError::Composite(e) => write!(f, "Compositing failed: {}", e),
            BuildError::Cancelled => write!(f, "Build cancelled"),
            BuildError::Save(e) => write!(f, "Failed to save image: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Fetch { source, .. } => Some(source),
            BuildError::Composite(e) => Some(e),
            BuildError::Save(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CoordError> for BuildError {
    fn from(e: CoordError) -> Self {
        match e {
            CoordError::DegenerateTile(tile) => BuildError::DegenerateTile(tile),
            other => BuildError::InvalidInput(InputError::Coordinates(other)),
        }
    }
}

impl From<GridError> for BuildError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::DimensionTooLarge { axis, value, max } => {
                BuildError::DimensionTooLarge { axis, value, max }
            }
            other => BuildError::InvalidInput(InputError::Grid(other)),
        }
    }
}

impl From<CompositeError> for BuildError {
    fn from(e: CompositeError) -> Self {
        BuildError::Composite(e)
    }
}

impl From<OutputError> for BuildError {
    fn from(e: OutputError) -> Self {
        BuildError::Save(e)
    }
}

/// Progress of a running build, reported after each paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    /// Cells pasted so far
    pub completed: usize,
    /// Cells in the grid
    pub total: usize,
}

impl BuildProgress {
    /// Fraction complete in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;

    #[test]
    fn test_coord_errors_map_to_input_errors() {
        let err: BuildError = CoordError::InvalidLatitude(91.0).into();
        assert!(err.is_input_error());
        assert!(!err.is_retryable());

        let err: BuildError = CoordError::DegenerateTile(TileIndex::new(1, 1, 19)).into();
        assert!(matches!(err, BuildError::DegenerateTile(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_dimension_error_is_input_error() {
        let err: BuildError = GridError::DimensionTooLarge {
            axis: "width",
            value: 3500,
            max: 3000,
        }
        .into();
        assert!(matches!(
            err,
            BuildError::DimensionTooLarge { value: 3500, .. }
        ));
        assert!(err.is_input_error());
        assert_eq!(
            err.to_string(),
            "Requested width of 3500px exceeds the maximum of 3000px"
        );
    }

    #[test]
    fn test_fetch_error_retryability() {
        let transient = BuildError::Fetch {
            row: 0,
            col: 1,
            source: FetchError::Provider(ProviderError::Timeout("30s".into())),
        };
        assert!(transient.is_retryable());
        assert!(!transient.is_input_error());
        assert!(transient.to_string().contains("row 0, col 1"));

        let permanent = BuildError::Fetch {
            row: 0,
            col: 0,
            source: FetchError::Provider(ProviderError::UnsupportedZoom(22)),
        };
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn test_progress_fraction() {
        let progress = BuildProgress {
            completed: 1,
            total: 4,
        };
        assert_eq!(progress.fraction(), 0.25);
        assert!(!progress.is_complete());
        assert!(BuildProgress {
            completed: 4,
            total: 4
        }
        .is_complete());
    }
}
