//! The live update scheduler: one background loop that keeps the
//! canvas consistent while new tiles appear on disk.
//!
//! The scheduler is an explicit context object owning all mutable
//! state (layout, canvas, processed set) -- there are no module-level
//! globals and no externally acquired lock. It is the single writer:
//! every mutation happens inside [`Scheduler::poll_cycle`] on the
//! thread running the loop, and the render side only ever receives a
//! complete [`PreviewFrame`] snapshot after a cycle finishes.
//!
//! Per-tile failures never abort a cycle and never propagate past it;
//! a failed tile is simply left unmarked and retried on the next
//! cycle, indefinitely. The acquisition may still be running, so a
//! tile that is missing or unreadable now may be fine in a minute.

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use tilescope_core::{CanvasAssembler, CanvasError, ProcessedSet, SnakeLayout, TileId};

use crate::config::{ConfigError, PreviewConfig};
use crate::discover::TileDirectory;
use crate::render::{PreviewFrame, RenderSink};
use crate::source::TileSource;

/// Consecutive all-mismatch cycles before escalating to a loud
/// warning about a likely `resolution_level` misconfiguration.
const MISMATCH_ESCALATION_CYCLES: u32 = 3;

/// What one poll cycle did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Candidate tile files present on disk.
    pub discovered: usize,
    /// Tiles placed and marked done this cycle.
    pub placed: Vec<TileId>,
    /// Tiles that failed to load or place; retried next cycle.
    pub failed: Vec<TileId>,
    /// Candidates skipped because they were already done.
    pub skipped_done: usize,
    /// Candidates ignored because their id falls outside the grid.
    pub out_of_range: usize,
}

/// Owns the preview state and drives it from filesystem polls.
pub struct Scheduler<S, R> {
    config: PreviewConfig,
    directory: TileDirectory,
    layout: SnakeLayout,
    canvas: CanvasAssembler,
    processed: ProcessedSet,
    /// Ids warned about once and permanently ignored; kept separate
    /// from [`ProcessedSet`], which only ever holds placed tiles.
    out_of_range: BTreeSet<TileId>,
    mismatch_streak: u32,
    source: S,
    sink: R,
}

impl<S: TileSource, R: RenderSink> Scheduler<S, R> {
    /// Build a scheduler from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for non-positive grid dimensions or
    /// an unusable file extension. Configuration failures are the only
    /// errors that propagate to the caller; everything after startup
    /// is handled inside the poll cycle.
    pub fn new(config: PreviewConfig, source: S, sink: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = SnakeLayout::new(config.grid())?;
        let directory = TileDirectory::new(&config.source_directory, &config.file_extension)?;
        let canvas = CanvasAssembler::new(config.grid(), config.flip_vertical);
        Ok(Self {
            config,
            directory,
            layout,
            canvas,
            processed: ProcessedSet::new(),
            out_of_range: BTreeSet::new(),
            mismatch_streak: 0,
            source,
            sink,
        })
    }

    /// Run one poll cycle: discover candidate tiles, resolve each new
    /// id to its grid cell, load it, and merge successes into the
    /// canvas and processed set.
    ///
    /// Ids are processed in ascending order. One tile's failure never
    /// aborts the cycle.
    pub fn poll_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let candidates = match self.directory.scan() {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(
                    "failed to list {}: {error}; retrying next cycle",
                    self.directory.dir().display()
                );
                return report;
            }
        };
        report.discovered = candidates.len();

        let mut attempted = 0u32;
        let mut mismatched = 0u32;
        for &tile_id in candidates.keys() {
            if self.processed.is_done(tile_id) {
                report.skipped_done += 1;
                continue;
            }
            if self.out_of_range.contains(&tile_id) {
                report.out_of_range += 1;
                continue;
            }
            let Some(position) = self.layout.position_of(tile_id) else {
                warn!(
                    "tile {tile_id} falls outside the {}x{} grid; ignoring it permanently",
                    self.config.grid_rows, self.config.grid_cols
                );
                self.out_of_range.insert(tile_id);
                report.out_of_range += 1;
                continue;
            };

            attempted += 1;
            let loaded = match self.source.load(
                tile_id,
                self.config.resolution_level,
                self.config.preferred_channel,
            ) {
                Ok(loaded) => loaded,
                Err(error) => {
                    warn!("{error}");
                    debug!("tile {tile_id} left unprocessed; retrying next cycle");
                    report.failed.push(tile_id);
                    continue;
                }
            };

            if !self.canvas.is_established() {
                self.canvas
                    .establish(loaded.pixels.height(), loaded.pixels.width());
                info!(
                    "tile {tile_id} established {}x{} tiles; canvas is {}x{}",
                    loaded.pixels.height(),
                    loaded.pixels.width(),
                    self.config.grid_rows * loaded.pixels.height(),
                    self.config.grid_cols * loaded.pixels.width(),
                );
            }

            match self.canvas.place(position, &loaded.pixels, tile_id) {
                Ok(()) => {
                    self.processed.mark_done(tile_id);
                    info!(
                        "placed tile {tile_id} at ({}, {}) from channel {}",
                        position.row, position.col, loaded.channel
                    );
                    report.placed.push(tile_id);
                }
                Err(error @ CanvasError::ShapeMismatch { .. }) => {
                    warn!("{error}");
                    mismatched += 1;
                    report.failed.push(tile_id);
                }
            }
        }

        // Every attempted tile mismatching, cycle after cycle, points
        // at a resolution_level that differs from the one the canvas
        // was established at. Keep retrying, but say so loudly.
        if attempted > 0 && mismatched == attempted {
            self.mismatch_streak += 1;
            if self.mismatch_streak >= MISMATCH_ESCALATION_CYCLES {
                warn!(
                    "every tile attempted in the last {MISMATCH_ESCALATION_CYCLES} cycles \
                     mismatched the established tile shape; is resolution_level ({}) \
                     still the level the canvas was built from?",
                    self.config.resolution_level
                );
                self.mismatch_streak = 0;
            }
        } else {
            self.mismatch_streak = 0;
        }

        if !report.placed.is_empty() {
            info!(
                "cycle complete: {} placed, {} pending, {} of {} cells filled",
                report.placed.len(),
                report.failed.len(),
                self.processed.len(),
                self.layout.cell_count(),
            );
        }
        report
    }

    /// Publish the current canvas to the render sink.
    ///
    /// Does nothing before the first tile has established the canvas;
    /// the sink is never given partial or empty state.
    fn publish(&mut self) {
        let Some(canvas) = self.canvas.canvas() else {
            debug!("no tiles placed yet; nothing to publish");
            return;
        };
        let frame = PreviewFrame {
            canvas: canvas.clone(),
            contrast: self.canvas.contrast_bounds(),
            labels: self.canvas.labels().to_vec(),
        };
        self.sink.update(&frame);
    }

    /// One complete tick: a poll cycle followed by a publish.
    pub fn run_once(&mut self) -> CycleReport {
        let report = self.poll_cycle();
        self.publish();
        report
    }

    /// Run the polling loop until the process exits.
    ///
    /// The only blocking points are the fixed sleep between cycles and
    /// the tile I/O inside each cycle; both block this thread only.
    pub fn run(mut self) {
        let interval = Duration::from_secs(self.config.poll_interval_seconds);
        loop {
            self.run_once();
            thread::sleep(interval);
        }
    }

    /// Run the polling loop on a background thread.
    ///
    /// The loop has no explicit termination; it is daemon-scoped to
    /// the process and stops when the process does.
    #[must_use]
    pub fn spawn(self) -> thread::JoinHandle<()>
    where
        S: Send + 'static,
        R: Send + 'static,
    {
        thread::spawn(move || self.run())
    }

    /// Tiles placed so far.
    #[must_use]
    pub const fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// The canvas assembler, for read-only inspection.
    #[must_use]
    pub const fn assembler(&self) -> &CanvasAssembler {
        &self.canvas
    }
}
