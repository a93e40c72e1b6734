//! tilescope-core: Pure tile-grid mapping and canvas assembly (sans-IO).
//!
//! Maps snake-order (boustrophedon) tile ids to grid positions and
//! composites tile pixel data into one incrementally growing preview
//! canvas with per-tile index labels.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! pixel buffers and returns structured data. Filesystem discovery,
//! tile loading, and the polling scheduler live in `tilescope-io`.

pub mod canvas;
pub mod contrast;
pub mod processed;
pub mod snake;
pub mod types;

pub use canvas::{CanvasAssembler, CanvasError};
pub use contrast::{CONTRAST_PERCENTILES, contrast_bounds};
pub use processed::ProcessedSet;
pub use snake::{GridError, SnakeLayout};
pub use types::{GridDimensions, GridPosition, LABEL_INSET, LabelEntry, Luma, TileId, TilePixels};
