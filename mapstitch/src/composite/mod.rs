//! Canvas compositing.
//!
//! [`Canvas`] owns the output raster of one build. Each fetched raster is
//! moved into [`Canvas::place`], cropped to the region its grid cell covers
//! and copied onto the canvas. Cell regions never overlap, so there is no
//! blending.

use image::{GenericImage, GenericImageView, RgbImage};
use thiserror::Error;

use crate::grid::{CELL_STRIDE_X, CELL_STRIDE_Y};

/// Errors raised while pasting a raster onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    #[error(
        "tile for cell ({row}, {col}) is {actual_width}x{actual_height}, \
         smaller than its {crop_width}x{crop_height} crop"
    )]
    TileTooSmall {
        row: u32,
        col: u32,
        actual_width: u32,
        actual_height: u32,
        crop_width: u32,
        crop_height: u32,
    },

    #[error("cell ({row}, {col}) starts outside the {width}x{height} canvas")]
    OutOfCanvas {
        row: u32,
        col: u32,
        width: u32,
        height: u32,
    },
}

/// Size of the region cell `(row, col)` contributes to a `width × height` canvas.
///
/// Interior cells contribute a full 640×618 block. Cells on the right or
/// bottom edge are trimmed to the canvas.
pub fn crop_dims(row: u32, col: u32, width: u32, height: u32) -> (u32, u32) {
    let origin_x = col.saturating_mul(CELL_STRIDE_X);
    let origin_y = row.saturating_mul(CELL_STRIDE_Y);

    let crop_x = if origin_x.saturating_add(CELL_STRIDE_X) > width {
        width.saturating_sub(origin_x)
    } else {
        CELL_STRIDE_X
    };
    let crop_y = if origin_y.saturating_add(CELL_STRIDE_Y) > height {
        height.saturating_sub(origin_y)
    } else {
        CELL_STRIDE_Y
    };

    (crop_x, crop_y)
}

/// The output raster of a single build.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Creates a blank (black) canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Crops `tile` to the region of cell `(row, col)` and pastes it.
    ///
    /// The raster is consumed and released when the paste returns.
    pub fn place(&mut self, tile: RgbImage, row: u32, col: u32) -> Result<(), CompositeError> {
        let (width, height) = (self.width(), self.height());
        let out_of_canvas = CompositeError::OutOfCanvas {
            row,
            col,
            width,
            height,
        };

        let (Some(origin_x), Some(origin_y)) = (
            col.checked_mul(CELL_STRIDE_X),
            row.checked_mul(CELL_STRIDE_Y),
        ) else {
            return Err(out_of_canvas);
        };
        if origin_x >= width || origin_y >= height {
            return Err(out_of_canvas);
        }

        let (crop_x, crop_y) = crop_dims(row, col, width, height);
        if tile.width() < crop_x || tile.height() < crop_y {
            return Err(CompositeError::TileTooSmall {
                row,
                col,
                actual_width: tile.width(),
                actual_height: tile.height(),
                crop_width: crop_x,
                crop_height: crop_y,
            });
        }

        let region = tile.view(0, 0, crop_x, crop_y).to_image();
        drop(tile);
        self.image
            .copy_from(&region, origin_x, origin_y)
            .map_err(|_| out_of_canvas)
    }

    /// Borrows the raster.
    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    /// Consumes the canvas, returning the raster.
    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn test_crop_dims_full_cell() {
        assert_eq!(crop_dims(0, 0, 640, 618), (640, 618));
        assert_eq!(crop_dims(0, 0, 1280, 1236), (640, 618));
    }

    #[test]
    fn test_crop_dims_right_edge() {
        assert_eq!(crop_dims(0, 1, 700, 700), (60, 618));
        assert_eq!(crop_dims(1, 1, 700, 700), (60, 82));
    }

    #[test]
    fn test_crop_dims_small_canvas() {
        assert_eq!(crop_dims(0, 0, 500, 500), (500, 500));
        assert_eq!(crop_dims(0, 0, 1, 1), (1, 1));
    }

    #[test]
    fn test_place_crops_attribution_strip() {
        let mut canvas = Canvas::new(640, 700);
        canvas.place(solid(640, 640, 10), 0, 0).unwrap();
        canvas.place(solid(640, 640, 200), 1, 0).unwrap();

        let image = canvas.into_image();
        assert_eq!(image.get_pixel(0, 617), &Rgb([10, 10, 10]));
        // Row 618 comes from the second cell, not the first tile's bottom strip.
        assert_eq!(image.get_pixel(0, 618), &Rgb([200, 200, 200]));
        assert_eq!(image.get_pixel(639, 699), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_place_uses_top_left_of_tile() {
        let tile = RgbImage::from_fn(640, 640, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        let mut canvas = Canvas::new(700, 300);
        canvas.place(tile.clone(), 0, 0).unwrap();
        canvas.place(tile, 0, 1).unwrap();

        let image = canvas.as_image();
        assert_eq!(image.get_pixel(5, 7), &Rgb([5, 7, 0]));
        // First pixel of the second column is the tile's (0, 0)
        assert_eq!(image.get_pixel(640, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(699, 299), &Rgb([59, 43, 0]));
    }

    #[test]
    fn test_place_rejects_small_tile() {
        let mut canvas = Canvas::new(640, 618);
        let err = canvas.place(solid(320, 320, 0), 0, 0).unwrap_err();
        assert_eq!(
            err,
            CompositeError::TileTooSmall {
                row: 0,
                col: 0,
                actual_width: 320,
                actual_height: 320,
                crop_width: 640,
                crop_height: 618,
            }
        );
    }

    #[test]
    fn test_place_rejects_cell_outside_canvas() {
        let mut canvas = Canvas::new(640, 618);
        let err = canvas.place(solid(640, 640, 0), 0, 1).unwrap_err();
        assert!(matches!(err, CompositeError::OutOfCanvas { col: 1, .. }));
    }

    #[test]
    fn test_place_rejects_overflowing_cell_index() {
        let mut canvas = Canvas::new(640, 618);

        let err = canvas.place(solid(640, 640, 0), u32::MAX, 0).unwrap_err();
        assert!(matches!(err, CompositeError::OutOfCanvas { row: u32::MAX, .. }));

        let err = canvas.place(solid(640, 640, 0), 0, u32::MAX).unwrap_err();
        assert!(matches!(err, CompositeError::OutOfCanvas { col: u32::MAX, .. }));
        assert_eq!(crop_dims(u32::MAX, u32::MAX, 640, 618), (0, 0));
    }

    #[test]
    fn test_edge_tile_may_be_smaller_than_a_full_cell() {
        let mut canvas = Canvas::new(660, 100);
        canvas.place(solid(640, 640, 1), 0, 0).unwrap();
        // Only 20x100 is needed from the second column.
        canvas.place(solid(20, 100, 2), 0, 1).unwrap();
        assert_eq!(canvas.as_image().get_pixel(659, 99), &Rgb([2, 2, 2]));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Crop rectangles tile the canvas exactly.
            #[test]
            fn test_crops_cover_canvas_without_overlap(
                width in 1u32..=3000,
                height in 1u32..=3000
            ) {
                let rows = height.div_ceil(CELL_STRIDE_Y);
                let cols = width.div_ceil(CELL_STRIDE_X);

                let mut area = 0u64;
                for row in 0..rows {
                    for col in 0..cols {
                        let (cx, cy) = crop_dims(row, col, width, height);
                        prop_assert!(cx > 0 && cy > 0);
                        prop_assert!(col * CELL_STRIDE_X + cx <= width);
                        prop_assert!(row * CELL_STRIDE_Y + cy <= height);
                        area += cx as u64 * cy as u64;
                    }
                }
                prop_assert_eq!(area, width as u64 * height as u64);
            }
        }
    }
}
