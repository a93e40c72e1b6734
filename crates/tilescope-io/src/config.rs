//! Configuration for the live preview.
//!
//! The owning process supplies a [`PreviewConfig`] as a static object
//! at startup; the core exposes no CLI surface of its own.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tilescope_core::{GridDimensions, GridError};

/// Errors from validating a [`PreviewConfig`]. Fatal at startup; the
/// polling loop is never started with an invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Grid dimensions were unusable.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// The tile file extension was empty, so no filename pattern can
    /// be built.
    #[error("tile file extension must not be empty")]
    EmptyExtension,

    /// The tile filename pattern failed to compile.
    #[error("invalid tile filename pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Recognized configuration options for one acquisition preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Montage rows, per the acquisition settings.
    pub grid_rows: u32,

    /// Montage columns, per the acquisition settings.
    pub grid_cols: u32,

    /// Directory the acquisition writes tile files into.
    pub source_directory: PathBuf,

    /// Which pre-computed downsample of each tile to load. Higher is
    /// smaller; level 4 keeps the preview cheap during acquisition.
    #[serde(default = "default_resolution_level")]
    pub resolution_level: u8,

    /// Zero-indexed channel to prefer; the source falls back to the
    /// first available channel when this one is missing.
    #[serde(default = "default_preferred_channel")]
    pub preferred_channel: u32,

    /// Seconds between poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Extension of tile files, without the leading dot.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Mirror each tile top-to-bottom at placement time to correct for
    /// the stage-vs-image coordinate inversion.
    #[serde(default = "default_flip_vertical")]
    pub flip_vertical: bool,
}

const fn default_resolution_level() -> u8 {
    4
}

const fn default_preferred_channel() -> u32 {
    1
}

const fn default_poll_interval() -> u64 {
    60
}

fn default_file_extension() -> String {
    "ims".to_owned()
}

const fn default_flip_vertical() -> bool {
    true
}

impl PreviewConfig {
    /// The configured grid extent.
    #[must_use]
    pub const fn grid(&self) -> GridDimensions {
        GridDimensions::new(self.grid_rows, self.grid_cols)
    }

    /// Check the invariants that must hold before the loop starts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Grid`] for non-positive grid dimensions
    /// and [`ConfigError::EmptyExtension`] for an empty file extension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(GridError::EmptyGrid {
                rows: self.grid_rows,
                cols: self.grid_cols,
            }
            .into());
        }
        if self.file_extension.is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        Ok(())
    }
}
