//! Uniform time discretization of a motion of duration `T`.

use crate::numeric::GRID_EPS;

/// Number of whole `dt` intervals that fit into `total`.
pub fn sample_count(total: f64, dt: f64) -> usize {
    assert!(dt > 0.0, "sample interval must be positive");
    ((total / dt) + GRID_EPS).floor().max(0.0) as usize
}

/// Number of `dt` segments needed to cover `total`, the last one possibly
/// shorter.
pub fn segment_count(total: f64, dt: f64) -> usize {
    assert!(dt > 0.0, "sample interval must be positive");
    ((total / dt) - GRID_EPS).ceil().max(1.0) as usize
}

/// Index of the segment containing `t`, clamped to `[0, n_segments)`.
pub fn segment_index(t: f64, dt: f64, n_segments: usize) -> usize {
    let k = ((t / dt) + GRID_EPS).floor().max(0.0) as usize;
    k.min(n_segments.saturating_sub(1))
}

/// Sample times `0, dt, 2dt, ...` strictly below `total`, optionally
/// followed by `total` itself.
pub fn sample_times(total: f64, dt: f64, include_terminal: bool) -> Vec<f64> {
    let n = sample_count(total, dt);
    let mut dts: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
    if include_terminal {
        dts.push(total);
    }
    dts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerant_sample_count() {
        // 0.3 / 0.1 is 2.9999999999999996 in floating point
        assert_eq!(sample_count(0.3, 0.1), 3);
        assert_eq!(sample_count(0.35, 0.1), 3);
        assert_eq!(segment_count(0.3, 0.1), 3);
        assert_eq!(segment_count(0.35, 0.1), 4);
    }

    #[test]
    fn grid_starts_at_zero_and_is_sorted() {
        let dts = sample_times(1.0, 0.25, true);
        assert_eq!(dts.len(), 5);
        assert_eq!(dts[0], 0.0);
        assert!(dts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*dts.last().unwrap(), 1.0);
    }

    #[test]
    fn segment_index_is_clamped() {
        assert_eq!(segment_index(0.0, 0.1, 3), 0);
        assert_eq!(segment_index(0.1, 0.1, 3), 1);
        assert_eq!(segment_index(0.3, 0.1, 3), 2);
        assert_eq!(segment_index(5.0, 0.1, 3), 2);
    }
}
