//! Shared types for the tilescope stitching core.

use serde::{Deserialize, Serialize};

/// Re-export `Luma` so downstream crates can construct tile pixels
/// without depending on `image` directly.
pub use image::Luma;

/// A single-channel 16-bit image, the fixed element type for all tile
/// data and for the stitched canvas. Microscope acquisitions store
/// intensity data as unsigned 16-bit counts.
pub type TilePixels = image::ImageBuffer<Luma<u16>, Vec<u16>>;

/// Identifier of one physical tile file, assigned externally by the
/// acquisition naming scheme. Not required to be contiguous or fully
/// populated.
pub type TileId = u32;

/// Grid extent of the acquisition montage, fixed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub cols: u32,
}

impl GridDimensions {
    /// Create new grid dimensions. Validation happens when a
    /// [`crate::SnakeLayout`] is built from them.
    #[must_use]
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }
}

/// A cell position within the acquisition grid.
///
/// Invariant: `row < rows` and `col < cols` for the grid the position
/// was resolved against. Positions are only produced by
/// [`crate::SnakeLayout`], which upholds this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    /// Row index, counted from the top.
    pub row: u32,
    /// Column index, counted from the left.
    pub col: u32,
}

/// One index annotation on the stitched canvas.
///
/// Labels are appended in placement order and never removed within a
/// run. The anchor is in canvas pixel coordinates as `(y, x)`, matching
/// the row-major convention of the stitched buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    /// Anchor point `(y, x)` in canvas coordinates.
    pub anchor: (u32, u32),
    /// Zero-padded tile id, e.g. `"042"`.
    pub text: String,
}

impl LabelEntry {
    /// Build the label for a tile whose cell starts at `(y0, x0)`.
    ///
    /// The anchor sits [`LABEL_INSET`] pixels in from the cell's
    /// top-left corner so it does not overlap the cell border.
    #[must_use]
    pub fn for_tile(tile_id: TileId, y0: u32, x0: u32) -> Self {
        Self {
            anchor: (y0 + LABEL_INSET, x0 + LABEL_INSET),
            text: format!("{tile_id:03}"),
        }
    }
}

/// Inset, in canvas pixels, of a label anchor from its cell's
/// top-left corner.
pub const LABEL_INSET: u32 = 20;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn label_for_tile_pads_to_three_digits() {
        let label = LabelEntry::for_tile(7, 0, 0);
        assert_eq!(label.text, "007");

        let label = LabelEntry::for_tile(123, 0, 0);
        assert_eq!(label.text, "123");

        // Ids beyond three digits are not truncated.
        let label = LabelEntry::for_tile(1015, 0, 0);
        assert_eq!(label.text, "1015");
    }

    #[test]
    fn label_anchor_is_inset_from_cell_origin() {
        let label = LabelEntry::for_tile(0, 100, 40);
        assert_eq!(label.anchor, (100 + LABEL_INSET, 40 + LABEL_INSET));
    }

    #[test]
    fn grid_dimensions_equality() {
        assert_eq!(GridDimensions::new(3, 5), GridDimensions::new(3, 5));
        assert_ne!(GridDimensions::new(3, 5), GridDimensions::new(5, 3));
    }

    #[test]
    fn label_serde_round_trip() {
        let label = LabelEntry::for_tile(42, 10, 20);
        let json = serde_json::to_string(&label).unwrap();
        let back: LabelEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(label, back);
    }
}
