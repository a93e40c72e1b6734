//! The tile source seam: id in, 2-D pixel slice out.
//!
//! The core never inspects storage internals. Any backend -- the
//! production HDF5 `.ims` reader, a network fetcher, a test double --
//! plugs in behind [`TileSource`] as long as it returns one 2-D `u16`
//! slice (the middle plane, for volumetric storage) or a typed
//! failure. [`ImageFileSource`] is the bundled implementation over
//! plain image files, used by the demo binary and the integration
//! tests.

use image::DynamicImage;
use tilescope_core::{Luma, TileId, TilePixels};

use crate::config::ConfigError;
use crate::discover::TileDirectory;

/// Typed per-tile failures. All of these are recoverable: the
/// scheduler logs them, leaves the tile unmarked, and retries on the
/// next cycle.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No file currently encodes this tile id.
    #[error("no file found for tile {0}")]
    NotFound(TileId),

    /// The tile's container holds no readable channels.
    #[error("tile {tile_id} has no readable channels")]
    ChannelMissing {
        /// Tile whose channels were missing.
        tile_id: TileId,
    },

    /// The stored data cannot yield a usable 2-D slice.
    #[error("tile {tile_id} has an unusable shape: {reason}")]
    Shape {
        /// Tile whose shape was unusable.
        tile_id: TileId,
        /// Human-readable cause.
        reason: String,
    },

    /// Reading the tile's container failed.
    #[error("I/O error reading tile {tile_id}")]
    Io {
        /// Tile whose file failed to read.
        tile_id: TileId,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The tile's container was unreadable as image data, typically a
    /// file still being written by the acquisition.
    #[error("failed to decode tile {tile_id}")]
    Decode {
        /// Tile whose file failed to decode.
        tile_id: TileId,
        /// Underlying error.
        #[source]
        source: image::ImageError,
    },
}

/// A tile's pixel slice plus the channel it actually came from.
#[derive(Debug, Clone)]
pub struct LoadedTile {
    /// One 2-D slice of the tile at the requested resolution level.
    pub pixels: TilePixels,
    /// Zero-indexed channel the slice was read from. Equals the
    /// preferred channel when present, else the first available one.
    pub channel: u32,
}

/// The sole data-access boundary between storage and the core.
pub trait TileSource {
    /// Load one 2-D slice for `tile_id`.
    ///
    /// `resolution_level` selects a pre-computed downsample;
    /// `preferred_channel` is used if present, else the first
    /// available channel, and [`LoadedTile::channel`] reports which
    /// channel was used.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] describing the per-tile failure.
    fn load(
        &self,
        tile_id: TileId,
        resolution_level: u8,
        preferred_channel: u32,
    ) -> Result<LoadedTile, SourceError>;
}

/// Tile source over ordinary 2-D image files (PNG, TIFF).
///
/// Grayscale files expose a single channel; color files expose one
/// channel per color component. `resolution_level` selects a
/// `2^level` nearest-neighbor downsample of the stored data, so level
/// 0 is native resolution. Files have no depth axis, so the full 2-D
/// plane is returned.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    dir: TileDirectory,
}

impl ImageFileSource {
    /// Build a source over `dir` with tile files ending in
    /// `.extension`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyExtension`] for an empty extension.
    pub fn new(dir: impl Into<std::path::PathBuf>, extension: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            dir: TileDirectory::new(dir, extension)?,
        })
    }
}

impl TileSource for ImageFileSource {
    fn load(
        &self,
        tile_id: TileId,
        resolution_level: u8,
        preferred_channel: u32,
    ) -> Result<LoadedTile, SourceError> {
        let tiles = self
            .dir
            .scan()
            .map_err(|source| SourceError::Io { tile_id, source })?;
        let path = tiles.get(&tile_id).ok_or(SourceError::NotFound(tile_id))?;

        let decoded =
            image::open(path).map_err(|source| SourceError::Decode { tile_id, source })?;
        let (full, channel) = extract_channel(&decoded, preferred_channel, tile_id)?;
        let pixels = downsample(&full, resolution_level, tile_id)?;
        Ok(LoadedTile { pixels, channel })
    }
}

/// Pull one channel out of a decoded image as 16-bit grayscale.
///
/// Falls back to channel 0 when the preferred channel does not exist.
fn extract_channel(
    decoded: &DynamicImage,
    preferred_channel: u32,
    tile_id: TileId,
) -> Result<(TilePixels, u32), SourceError> {
    let available = u32::from(decoded.color().channel_count());
    if available == 0 {
        return Err(SourceError::ChannelMissing { tile_id });
    }
    let channel = if preferred_channel < available {
        preferred_channel
    } else {
        0
    };

    // to_rgba16 widens 8-bit sources to the full 16-bit range and
    // replicates grayscale into the color channels, so indexing is
    // uniform across source color types.
    let rgba = decoded.to_rgba16();
    let pixels = TilePixels::from_fn(rgba.width(), rgba.height(), |x, y| {
        Luma([rgba.get_pixel(x, y).0[channel as usize]])
    });
    Ok((pixels, channel))
}

/// Nearest-neighbor `2^level` downsample.
fn downsample(full: &TilePixels, level: u8, tile_id: TileId) -> Result<TilePixels, SourceError> {
    if level == 0 {
        return Ok(full.clone());
    }
    let factor = 1u32
        .checked_shl(u32::from(level))
        .ok_or_else(|| SourceError::Shape {
            tile_id,
            reason: format!("resolution level {level} out of range"),
        })?;
    let width = full.width() / factor;
    let height = full.height() / factor;
    if width == 0 || height == 0 {
        return Err(SourceError::Shape {
            tile_id,
            reason: format!(
                "{}x{} tile vanishes at resolution level {level}",
                full.height(),
                full.width()
            ),
        });
    }
    Ok(TilePixels::from_fn(width, height, |x, y| {
        *full.get_pixel(x * factor, y * factor)
    }))
}
