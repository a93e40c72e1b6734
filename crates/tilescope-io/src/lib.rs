//! tilescope-io: Tile discovery, loading, and the live update loop.
//!
//! Everything stateful and I/O-bound lives here: the configuration
//! surface, filesystem discovery of tile files, the [`TileSource`]
//! seam to storage backends, the polling [`Scheduler`] that merges
//! newly arrived tiles into the canvas, and the render-sink plumbing
//! that hands consistent snapshots to a display. The pure grid and
//! canvas math lives in `tilescope-core`.

pub mod config;
pub mod discover;
pub mod render;
pub mod scheduler;
pub mod source;

pub use config::{ConfigError, PreviewConfig};
pub use discover::TileDirectory;
pub use render::{NullSink, PreviewFrame, RenderSink, SharedFrame, SharedFrameSink};
pub use scheduler::{CycleReport, Scheduler};
pub use source::{ImageFileSource, LoadedTile, SourceError, TileSource};
