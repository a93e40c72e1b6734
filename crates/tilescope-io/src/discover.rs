//! Filesystem discovery of acquisition tile files.
//!
//! The acquisition names each tile `<prefix>_F<digits>.<ext>`, with the
//! digits encoding the tile id along the snake scan path. Discovery
//! enumerates a directory against that pattern and ignores everything
//! else; it makes no attempt to detect writes the instant they
//! complete (bounded only by the poll interval).

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use regex::Regex;
use tilescope_core::TileId;

use crate::config::ConfigError;

/// A directory of tile files plus the compiled filename pattern.
#[derive(Debug, Clone)]
pub struct TileDirectory {
    dir: PathBuf,
    pattern: Regex,
}

impl TileDirectory {
    /// Build a discovery handle for `dir` with tile files ending in
    /// `.extension`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyExtension`] for an empty extension.
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Result<Self, ConfigError> {
        if extension.is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        let pattern = Regex::new(&format!(r"_F(\d+)\.{}$", regex::escape(extension)))?;
        Ok(Self {
            dir: dir.into(),
            pattern,
        })
    }

    /// The directory being watched.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Enumerate the tile files currently present.
    ///
    /// Returns tile ids in ascending order with the path of the file
    /// encoding each id. Non-matching filenames are skipped silently;
    /// a duplicate id (two files claiming the same tile) keeps the
    /// first match and warns.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be
    /// read at all.
    pub fn scan(&self) -> io::Result<BTreeMap<TileId, PathBuf>> {
        let mut tiles = BTreeMap::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(captures) = self.pattern.captures(name) else {
                continue;
            };
            let Some(digits) = captures.get(1) else {
                continue;
            };
            let Ok(tile_id) = digits.as_str().parse::<TileId>() else {
                warn!("{name}: tile index {} does not fit the id space", digits.as_str());
                continue;
            };
            if let Some(existing) = tiles.insert(tile_id, entry.path()) {
                warn!(
                    "{name}: duplicate file for tile {tile_id}, keeping {}",
                    existing.display()
                );
                tiles.insert(tile_id, existing);
            }
        }
        Ok(tiles)
    }
}
