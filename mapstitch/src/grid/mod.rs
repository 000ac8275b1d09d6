//! Grid planning.
//!
//! Splits an output canvas into provider fetches. Every fetch requests a
//! 640×640 raster centred on a computed point but only contributes a 640×618
//! block to the canvas: the bottom strip of a static map carries the
//! provider's attribution and is always cropped away.

use thiserror::Error;

use crate::composite::crop_dims;
use crate::coord::{Anchor, GeoPoint};

/// Edge length of one provider raster in pixels.
pub const PROVIDER_TILE_SIZE: u32 = 640;

/// Horizontal distance between neighbouring cells on the canvas.
pub const CELL_STRIDE_X: u32 = 640;

/// Vertical distance between neighbouring cells on the canvas.
pub const CELL_STRIDE_Y: u32 = 618;

/// Offset from a cell's top-left pixel to its center.
pub const CENTER_OFFSET: u32 = 320;

/// Errors from dimension checks and grid planning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("{axis} must be at least 1 pixel")]
    InvalidDimension { axis: &'static str },

    #[error("{axis} of {value}px exceeds the maximum of {max}px")]
    DimensionTooLarge {
        axis: &'static str,
        value: u32,
        max: u32,
    },

    #[error("cell ({row}, {col}) is centred at {center}, outside the projectable range")]
    CenterOutOfRange { row: u32, col: u32, center: GeoPoint },
}

/// Validates requested output dimensions.
///
/// Zero sizes are reported first, then height, then width.
pub fn check_dimensions(width: u32, height: u32, max_dimension: u32) -> Result<(), GridError> {
    if height == 0 {
        return Err(GridError::InvalidDimension { axis: "height" });
    }
    if width == 0 {
        return Err(GridError::InvalidDimension { axis: "width" });
    }
    if height > max_dimension {
        return Err(GridError::DimensionTooLarge {
            axis: "height",
            value: height,
            max: max_dimension,
        });
    }
    if width > max_dimension {
        return Err(GridError::DimensionTooLarge {
            axis: "width",
            value: width,
            max: max_dimension,
        });
    }
    Ok(())
}

/// One provider fetch in the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    /// Rounded geographic center of the fetch
    pub center: GeoPoint,
    pub fetch_width: u32,
    pub fetch_height: u32,
}

impl GridCell {
    /// Pixel position of the cell's top-left corner on the canvas.
    pub fn origin(&self) -> (u32, u32) {
        (self.col * CELL_STRIDE_X, self.row * CELL_STRIDE_Y)
    }
}

/// Every fetch needed to cover a `width × height` canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub rows: u32,
    pub cols: u32,
    pub width: u32,
    pub height: u32,
    pub zoom: u8,
    cells: Vec<GridCell>,
}

impl GridPlan {
    /// Cells in row-major order.
    pub fn cells(&self) -> std::slice::Iter<'_, GridCell> {
        self.cells.iter()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the cell at `(row, col)`, if it is part of the plan.
    pub fn cell(&self, row: u32, col: u32) -> Option<&GridCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get((row * self.cols + col) as usize)
    }

    /// Size of the region `(row, col)` contributes to the canvas.
    pub fn crop_for(&self, row: u32, col: u32) -> (u32, u32) {
        crop_dims(row, col, self.width, self.height)
    }
}

/// Plans the fetch grid for a canvas anchored at `anchor`.
///
/// Cell centers step away from the anchor in whole strides of the anchor
/// tile's pixel scale and are rounded to `precision`.
pub fn plan(
    anchor: &Anchor,
    width: u32,
    height: u32,
    precision: u32,
) -> Result<GridPlan, GridError> {
    if height == 0 {
        return Err(GridError::InvalidDimension { axis: "height" });
    }
    if width == 0 {
        return Err(GridError::InvalidDimension { axis: "width" });
    }

    let rows = height.div_ceil(CELL_STRIDE_Y);
    let cols = width.div_ceil(CELL_STRIDE_X);

    let lat_pp = anchor.scale.degrees_lat_per_pixel;
    let lon_pp = anchor.scale.degrees_lon_per_pixel;
    let offset = CENTER_OFFSET as f64;

    let mut cells = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let lat = anchor.point.latitude()
                - offset * lat_pp
                - (row * CELL_STRIDE_Y) as f64 * lat_pp;
            let lon = anchor.point.longitude()
                + offset * lon_pp
                + (col * CELL_STRIDE_X) as f64 * lon_pp;

            let center = GeoPoint::rounded(lat, lon, precision);
            if center.validate().is_err() {
                return Err(GridError::CenterOutOfRange { row, col, center });
            }

            cells.push(GridCell {
                row,
                col,
                center,
                fetch_width: PROVIDER_TILE_SIZE,
                fetch_height: PROVIDER_TILE_SIZE,
            });
        }
    }

    Ok(GridPlan {
        rows,
        cols,
        width,
        height,
        zoom: anchor.tile.zoom,
        cells,
    })
}
