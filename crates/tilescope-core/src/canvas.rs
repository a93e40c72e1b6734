//! Incremental assembly of the stitched preview canvas.
//!
//! The assembler owns the single canvas buffer and the label list.
//! Tile dimensions are unknown until the first tile loads, so the
//! canvas is allocated lazily; once allocated it is mutated in place,
//! cell by cell, and never reallocated. Each placement touches only
//! the disjoint sub-rectangle owned by its grid position.

use crate::types::{GridDimensions, GridPosition, LabelEntry, Luma, TileId, TilePixels};

/// Errors from placing a tile into the canvas.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// The tile's dimensions differ from the shape established by the
    /// first loaded tile. The tile is rejected, never resized.
    #[error(
        "tile {tile_id} is {actual_height}x{actual_width} but the canvas was \
         established with {expected_height}x{expected_width} tiles"
    )]
    ShapeMismatch {
        /// Tile that failed to place.
        tile_id: TileId,
        /// Established tile height.
        expected_height: u32,
        /// Established tile width.
        expected_width: u32,
        /// Height of the rejected tile.
        actual_height: u32,
        /// Width of the rejected tile.
        actual_width: u32,
    },
}

/// Owns the stitched canvas buffer and the per-tile index labels.
#[derive(Debug, Clone)]
pub struct CanvasAssembler {
    dims: GridDimensions,
    flip_vertical: bool,
    /// Established `(tile_height, tile_width)`, fixed by the first tile.
    tile_shape: Option<(u32, u32)>,
    canvas: Option<TilePixels>,
    labels: Vec<LabelEntry>,
}

impl CanvasAssembler {
    /// Create an assembler for the given grid.
    ///
    /// `flip_vertical` mirrors each tile top-to-bottom at placement
    /// time, correcting for the stage-vs-image coordinate inversion of
    /// the acquisition hardware.
    #[must_use]
    pub const fn new(dims: GridDimensions, flip_vertical: bool) -> Self {
        Self {
            dims,
            flip_vertical,
            tile_shape: None,
            canvas: None,
            labels: Vec::new(),
        }
    }

    /// Whether the first tile has established the canvas shape yet.
    #[must_use]
    pub const fn is_established(&self) -> bool {
        self.tile_shape.is_some()
    }

    /// The established `(tile_height, tile_width)`, if any.
    #[must_use]
    pub const fn tile_shape(&self) -> Option<(u32, u32)> {
        self.tile_shape
    }

    /// Fix the tile shape and allocate the zero-filled canvas at
    /// `(rows * tile_height, cols * tile_width)`.
    ///
    /// Called once, with the dimensions of the first successfully
    /// loaded tile. Subsequent calls are ignored; the shape never
    /// changes for the lifetime of the run.
    pub fn establish(&mut self, tile_height: u32, tile_width: u32) {
        if self.tile_shape.is_some() {
            return;
        }
        self.tile_shape = Some((tile_height, tile_width));
        self.canvas = Some(TilePixels::from_pixel(
            self.dims.cols * tile_width,
            self.dims.rows * tile_height,
            Luma([0]),
        ));
    }

    /// Write one tile's pixels into the sub-rectangle owned by
    /// `position` and append its index label.
    ///
    /// Establishes the canvas shape from this tile if no tile has been
    /// placed yet. The write is atomic per tile: on a shape mismatch
    /// neither the canvas nor the label list is touched.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ShapeMismatch`] if the tile's dimensions
    /// differ from the established shape.
    pub fn place(
        &mut self,
        position: GridPosition,
        tile: &TilePixels,
        tile_id: TileId,
    ) -> Result<(), CanvasError> {
        if self.tile_shape.is_none() {
            self.establish(tile.height(), tile.width());
        }

        // tile_shape and canvas are both set from here on.
        let Some((tile_height, tile_width)) = self.tile_shape else {
            return Ok(());
        };
        if tile.height() != tile_height || tile.width() != tile_width {
            return Err(CanvasError::ShapeMismatch {
                tile_id,
                expected_height: tile_height,
                expected_width: tile_width,
                actual_height: tile.height(),
                actual_width: tile.width(),
            });
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(());
        };

        let y0 = position.row * tile_height;
        let x0 = position.col * tile_width;
        for y in 0..tile_height {
            let src_y = if self.flip_vertical {
                tile_height - 1 - y
            } else {
                y
            };
            for x in 0..tile_width {
                canvas.put_pixel(x0 + x, y0 + y, *tile.get_pixel(x, src_y));
            }
        }

        self.labels.push(LabelEntry::for_tile(tile_id, y0, x0));
        Ok(())
    }

    /// The stitched canvas, or `None` before the first tile.
    #[must_use]
    pub const fn canvas(&self) -> Option<&TilePixels> {
        self.canvas.as_ref()
    }

    /// Index labels in placement order.
    #[must_use]
    pub fn labels(&self) -> &[LabelEntry] {
        &self.labels
    }

    /// Display contrast bounds over the current canvas content.
    ///
    /// Recomputed on demand, not cached, since the canvas mutates
    /// incrementally. Returns `(0.0, 1.0)` before the first tile.
    #[must_use]
    pub fn contrast_bounds(&self) -> (f64, f64) {
        self.canvas
            .as_ref()
            .map_or((0.0, 1.0), crate::contrast::contrast_bounds)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::LABEL_INSET;

    fn uniform_tile(height: u32, width: u32, value: u16) -> TilePixels {
        TilePixels::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn first_tile_establishes_canvas_shape() {
        let mut assembler = CanvasAssembler::new(GridDimensions::new(3, 2), false);
        assert!(!assembler.is_established());
        assert!(assembler.canvas().is_none());

        let tile = uniform_tile(10, 8, 500);
        assembler
            .place(GridPosition { row: 0, col: 0 }, &tile, 0)
            .unwrap();

        assert_eq!(assembler.tile_shape(), Some((10, 8)));
        let canvas = assembler.canvas().unwrap();
        assert_eq!(canvas.height(), 30);
        assert_eq!(canvas.width(), 16);
    }

    #[test]
    fn mismatched_tile_is_rejected_without_mutation() {
        let mut assembler = CanvasAssembler::new(GridDimensions::new(2, 2), false);
        assembler
            .place(GridPosition { row: 0, col: 0 }, &uniform_tile(10, 10, 100), 0)
            .unwrap();

        let before = assembler.canvas().unwrap().clone();
        let result = assembler.place(
            GridPosition { row: 1, col: 0 },
            &uniform_tile(11, 10, 200),
            1,
        );
        assert!(matches!(
            result,
            Err(CanvasError::ShapeMismatch {
                tile_id: 1,
                expected_height: 10,
                expected_width: 10,
                actual_height: 11,
                actual_width: 10,
            })
        ));

        // No pixels written, no label appended.
        assert_eq!(assembler.canvas().unwrap().as_raw(), before.as_raw());
        assert_eq!(assembler.labels().len(), 1);
    }

    #[test]
    fn placement_writes_only_the_owned_cell() {
        let mut assembler = CanvasAssembler::new(GridDimensions::new(2, 2), false);
        assembler
            .place(GridPosition { row: 0, col: 0 }, &uniform_tile(4, 4, 0), 0)
            .unwrap();
        assembler
            .place(GridPosition { row: 1, col: 1 }, &uniform_tile(4, 4, 900), 2)
            .unwrap();

        let canvas = assembler.canvas().unwrap();
        for y in 0..8 {
            for x in 0..8 {
                let expected = if y >= 4 && x >= 4 { 900 } else { 0 };
                assert_eq!(canvas.get_pixel(x, y).0[0], expected, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn vertical_flip_mirrors_tile_rows() {
        let mut tile = uniform_tile(3, 2, 0);
        // Top row bright, rest dark.
        tile.put_pixel(0, 0, Luma([1000]));
        tile.put_pixel(1, 0, Luma([1000]));

        let mut assembler = CanvasAssembler::new(GridDimensions::new(1, 1), true);
        assembler
            .place(GridPosition { row: 0, col: 0 }, &tile, 0)
            .unwrap();

        let canvas = assembler.canvas().unwrap();
        // Flipped: the bright row lands at the bottom.
        assert_eq!(canvas.get_pixel(0, 0).0[0], 0);
        assert_eq!(canvas.get_pixel(0, 2).0[0], 1000);
        assert_eq!(canvas.get_pixel(1, 2).0[0], 1000);
    }

    #[test]
    fn labels_anchor_inset_from_cell_origin() {
        let mut assembler = CanvasAssembler::new(GridDimensions::new(2, 2), false);
        assembler
            .place(GridPosition { row: 0, col: 0 }, &uniform_tile(30, 40, 1), 0)
            .unwrap();
        assembler
            .place(GridPosition { row: 1, col: 1 }, &uniform_tile(30, 40, 1), 2)
            .unwrap();

        let labels = assembler.labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].anchor, (LABEL_INSET, LABEL_INSET));
        assert_eq!(labels[0].text, "000");
        assert_eq!(labels[1].anchor, (30 + LABEL_INSET, 40 + LABEL_INSET));
        assert_eq!(labels[1].text, "002");
    }

    #[test]
    fn contrast_bounds_default_before_first_tile() {
        let assembler = CanvasAssembler::new(GridDimensions::new(2, 2), false);
        assert_eq!(assembler.contrast_bounds(), (0.0, 1.0));
    }
}
