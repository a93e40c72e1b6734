//! Render-side plumbing: consistent snapshots of the preview.
//!
//! All mutation happens on the scheduler's thread; the render side
//! only ever sees a complete [`PreviewFrame`] published after a poll
//! cycle finishes. A frame is never handed out mid-cycle, so the
//! foreground cannot observe a half-merged canvas.

use std::sync::Arc;

use parking_lot::Mutex;
use tilescope_core::{LabelEntry, TilePixels};

/// One consistent snapshot of the preview after a completed cycle.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    /// The stitched canvas.
    pub canvas: TilePixels,
    /// Display contrast bounds `(low, high)` for the canvas.
    pub contrast: (f64, f64),
    /// Index labels in placement order.
    pub labels: Vec<LabelEntry>,
}

/// Consumer of preview snapshots.
///
/// Called by the scheduler after each poll cycle once the canvas
/// exists. Implementations must not block for long; the poll loop is
/// single-threaded and a slow sink delays the next cycle.
pub trait RenderSink {
    /// Consume the latest frame.
    fn update(&mut self, frame: &PreviewFrame);
}

/// A sink that discards every frame. Useful in tests and for headless
/// runs that only care about the scheduler's side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn update(&mut self, _frame: &PreviewFrame) {}
}

/// Mailbox holding the latest published frame.
///
/// The scheduler's [`SharedFrameSink`] replaces the content after each
/// cycle; any number of foreground readers take clones via
/// [`SharedFrame::latest`]. Readers never mutate, and the lock is held
/// only for the swap or the clone, never across a cycle.
#[derive(Debug, Clone, Default)]
pub struct SharedFrame(Arc<Mutex<Option<PreviewFrame>>>);

impl SharedFrame {
    /// Create an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published frame, or `None` before the first
    /// tile has been placed.
    #[must_use]
    pub fn latest(&self) -> Option<PreviewFrame> {
        self.0.lock().clone()
    }

    /// A sink that publishes into this mailbox.
    #[must_use]
    pub fn sink(&self) -> SharedFrameSink {
        SharedFrameSink(Arc::clone(&self.0))
    }
}

/// Writing end of a [`SharedFrame`] mailbox.
#[derive(Debug, Clone)]
pub struct SharedFrameSink(Arc<Mutex<Option<PreviewFrame>>>);

impl RenderSink for SharedFrameSink {
    fn update(&mut self, frame: &PreviewFrame) {
        *self.0.lock() = Some(frame.clone());
    }
}
