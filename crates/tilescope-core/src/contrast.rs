//! Display contrast bounds for the stitched canvas.
//!
//! Unplaced cells are zero-filled, so the percentile window is taken
//! over the non-zero pixel population only; otherwise the empty cells
//! would drag the low bound to zero and wash out the display.

use crate::types::TilePixels;

/// Percentile pair `(low, high)` used for the display window.
pub const CONTRAST_PERCENTILES: (f64, f64) = (0.35, 99.5);

/// Compute `(low, high)` display bounds from the non-zero pixels of
/// `canvas` at the [`CONTRAST_PERCENTILES`] ranks.
///
/// Returns the default `(0.0, 1.0)` when the canvas has no non-zero
/// pixels yet.
#[must_use]
pub fn contrast_bounds(canvas: &TilePixels) -> (f64, f64) {
    let mut nonzero: Vec<u16> = canvas
        .pixels()
        .map(|p| p.0[0])
        .filter(|&v| v != 0)
        .collect();
    if nonzero.is_empty() {
        return (0.0, 1.0);
    }
    nonzero.sort_unstable();
    (
        percentile(&nonzero, CONTRAST_PERCENTILES.0),
        percentile(&nonzero, CONTRAST_PERCENTILES.1),
    )
}

/// Percentile of a sorted, non-empty slice with linear interpolation
/// between the closest ranks.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[u16], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    f64::from(sorted[lo]).mul_add(1.0 - frac, f64::from(sorted[hi]) * frac)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Luma, TilePixels};

    #[test]
    fn all_zero_canvas_returns_default() {
        let canvas = TilePixels::from_pixel(8, 8, Luma([0]));
        assert_eq!(contrast_bounds(&canvas), (0.0, 1.0));
    }

    #[test]
    fn uniform_nonzero_canvas_collapses_bounds() {
        let canvas = TilePixels::from_pixel(8, 8, Luma([300]));
        let (low, high) = contrast_bounds(&canvas);
        assert!((low - 300.0).abs() < f64::EPSILON);
        assert!((high - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bounds_track_percentiles_of_known_distribution() {
        // 1001 non-zero values 1..=1001 plus a zero-filled border that
        // must be ignored.
        let mut values: Vec<u16> = (1..=1001).collect();
        values.extend(std::iter::repeat_n(0, 23));
        let canvas = TilePixels::from_vec(32, 32, values).unwrap();

        let (low, high) = contrast_bounds(&canvas);
        // rank(0.35%) = 0.0035 * 1000 = 3.5 -> midway between 4 and 5.
        assert!((low - 4.5).abs() < 1e-9, "low = {low}");
        // rank(99.5%) = 0.995 * 1000 = 995 -> exactly 996.
        assert!((high - 996.0).abs() < 1e-9, "high = {high}");
    }

    #[test]
    fn bounds_are_ordered_and_within_range() {
        let values: Vec<u16> = (0..1024).map(|i| (i % 577) as u16).collect();
        let canvas = TilePixels::from_vec(32, 32, values).unwrap();
        let (low, high) = contrast_bounds(&canvas);
        assert!(low < high);
        assert!(low >= 1.0);
        assert!(high <= 576.0);
    }
}
