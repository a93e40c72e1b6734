//! Tracking of tiles already merged into the canvas.

use std::collections::BTreeSet;

use crate::types::TileId;

/// The set of tile ids whose pixels have been verified and merged.
///
/// Monotonically growing: an id enters the set only after a successful
/// placement, never before, and is never removed. This is what makes
/// repeated polling idempotent — a done tile is skipped without
/// re-reading its file or re-appending a duplicate label.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet(BTreeSet<TileId>);

impl ProcessedSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether `tile_id` has already been placed.
    #[must_use]
    pub fn is_done(&self, tile_id: TileId) -> bool {
        self.0.contains(&tile_id)
    }

    /// Record a successful placement. Call strictly after the canvas
    /// write succeeds.
    pub fn mark_done(&mut self, tile_id: TileId) {
        self.0.insert(tile_id);
    }

    /// Number of placed tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tile has been placed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Placed ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marked_ids_are_done() {
        let mut set = ProcessedSet::new();
        assert!(!set.is_done(3));

        set.mark_done(3);
        assert!(set.is_done(3));
        assert!(!set.is_done(4));
    }

    #[test]
    fn marking_twice_is_harmless() {
        let mut set = ProcessedSet::new();
        set.mark_done(7);
        set.mark_done(7);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn iteration_is_ascending() {
        let mut set = ProcessedSet::new();
        for id in [9, 2, 5] {
            set.mark_done(id);
        }
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 5, 9]);
    }
}
