//! Snake-order (boustrophedon) mapping between tile ids and grid cells.
//!
//! The stage acquires tiles column by column, reversing row direction
//! on every other column to minimize travel. Tile ids count along that
//! physical path, so mapping an id to its `(row, col)` cell requires
//! replaying the traversal. Both directions are precomputed here: the
//! grid is small and bounded, and the scheduler resolves ids on every
//! poll cycle.

use crate::types::{GridDimensions, GridPosition, TileId};

/// Errors from building a [`SnakeLayout`].
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// One or both grid dimensions were zero.
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    EmptyGrid {
        /// Configured row count.
        rows: u32,
        /// Configured column count.
        cols: u32,
    },

    /// `rows * cols` overflowed the id space.
    #[error("grid {rows}x{cols} has more cells than the tile id space")]
    TooManyCells {
        /// Configured row count.
        rows: u32,
        /// Configured column count.
        cols: u32,
    },
}

/// Total bijection between linear tile ids and grid positions under
/// the boustrophedon scan path.
///
/// Ids `0 .. rows*cols` cover every cell exactly once, independent of
/// which ids actually exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeLayout {
    dims: GridDimensions,
    /// Row-major cell grid: `ids[row * cols + col]` is the tile id
    /// acquired at that cell.
    ids: Vec<TileId>,
    /// Inverse map, indexed by tile id.
    positions: Vec<GridPosition>,
}

impl SnakeLayout {
    /// Build the layout for the given grid dimensions.
    ///
    /// Even-indexed columns are assigned top-to-bottom, odd-indexed
    /// columns bottom-to-top, with a running id counter incremented
    /// after each cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyGrid`] if either dimension is zero and
    /// [`GridError::TooManyCells`] if `rows * cols` overflows `u32`.
    pub fn new(dims: GridDimensions) -> Result<Self, GridError> {
        let GridDimensions { rows, cols } = dims;
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid { rows, cols });
        }
        let cell_count = rows
            .checked_mul(cols)
            .ok_or(GridError::TooManyCells { rows, cols })?;

        let mut ids: Vec<TileId> = vec![0; cell_count as usize];
        let mut positions = vec![GridPosition { row: 0, col: 0 }; cell_count as usize];

        let mut next_id: TileId = 0;
        for col in 0..cols {
            for step in 0..rows {
                // Even columns run top-to-bottom, odd columns reverse.
                let row = if col % 2 == 0 { step } else { rows - 1 - step };
                ids[(row * cols + col) as usize] = next_id;
                positions[next_id as usize] = GridPosition { row, col };
                next_id += 1;
            }
        }

        Ok(Self {
            dims,
            ids,
            positions,
        })
    }

    /// The grid dimensions this layout was built for.
    #[must_use]
    pub const fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Total number of cells (`rows * cols`), which is also one past
    /// the largest valid tile id.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn cell_count(&self) -> u32 {
        // Bounded by the checked multiply in `new`.
        self.ids.len() as u32
    }

    /// Tile id acquired at `(row, col)`, or `None` if the cell is
    /// outside the grid.
    #[must_use]
    pub fn tile_at(&self, row: u32, col: u32) -> Option<TileId> {
        if row < self.dims.rows && col < self.dims.cols {
            Some(self.ids[(row * self.dims.cols + col) as usize])
        } else {
            None
        }
    }

    /// Grid position of a tile id, or `None` if the id falls outside
    /// `[0, rows*cols)`.
    #[must_use]
    pub fn position_of(&self, tile_id: TileId) -> Option<GridPosition> {
        self.positions.get(tile_id as usize).copied()
    }
}
