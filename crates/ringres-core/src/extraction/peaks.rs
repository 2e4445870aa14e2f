//! Resonance peak detection
//!
//! Peaks are local maxima of the magnitude trace that clear an adaptive
//! threshold placed a fixed number of dB above the trace median.

use serde::Serialize;

use crate::trace::Trace;

/// Outcome of a peak search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakDetection {
    /// Threshold the peaks had to reach (dB)
    pub threshold_db: f64,
    /// Peak indices into the trace, ascending
    pub indices: Vec<usize>,
}

impl PeakDetection {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Find resonance peaks at least `min_peak_db` above the median magnitude
///
/// An empty result is valid here; the pipeline decides whether that is
/// fatal.
pub fn find_peaks(trace: &Trace, min_peak_db: f64) -> PeakDetection {
    let threshold_db = trace.median_db() + min_peak_db;
    tracing::info!("Peak detection threshold: {:.2} dB", threshold_db);

    let mag = trace.magnitude_db();
    let indices = local_maxima(mag)
        .into_iter()
        .filter(|&i| mag[i] >= threshold_db)
        .collect();

    PeakDetection {
        threshold_db,
        indices,
    }
}

/// Indices of local maxima
///
/// A maximum rises strictly from its left neighbour and falls strictly after
/// an optional run of equal samples. Flat tops report the middle sample of
/// the run (the lower middle for even runs). End samples never qualify.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(mag: &[f64]) -> Trace {
        let freq = (1..=mag.len()).map(|i| i as f64 * 1e8).collect();
        Trace::new(freq, mag.to_vec()).unwrap()
    }

    #[test]
    fn test_local_maxima_simple() {
        assert_eq!(local_maxima(&[0.0, 2.0, 0.0, 1.0, 3.0, 1.0]), vec![1, 4]);
    }

    #[test]
    fn test_local_maxima_plateau_reports_middle() {
        assert_eq!(local_maxima(&[0.0, 5.0, 5.0, 5.0, 0.0]), vec![2]);
        assert_eq!(local_maxima(&[0.0, 5.0, 5.0, 0.0]), vec![1]);
    }

    #[test]
    fn test_local_maxima_rejects_shoulders_and_edges() {
        // Rising into a plateau that keeps rising is not a peak.
        assert_eq!(local_maxima(&[0.0, 2.0, 2.0, 3.0, 1.0]), vec![3]);
        // Monotonic ends are never peaks.
        assert!(local_maxima(&[5.0, 4.0, 3.0]).is_empty());
        assert!(local_maxima(&[1.0, 2.0, 3.0]).is_empty());
        // Plateau running into the end of the trace.
        assert!(local_maxima(&[0.0, 2.0, 2.0]).is_empty());
    }

    #[test]
    fn test_threshold_is_median_plus_margin() {
        let t = trace(&[-50.0, -30.0, -50.0, -50.0, -10.0, -50.0, -50.0]);
        let peaks = find_peaks(&t, 16.0);

        assert_eq!(peaks.threshold_db, -34.0);
        assert_eq!(peaks.indices, vec![1, 4]);
    }

    #[test]
    fn test_peaks_below_threshold_are_dropped() {
        let t = trace(&[-50.0, -40.0, -50.0, -50.0, -10.0, -50.0, -50.0]);
        let peaks = find_peaks(&t, 16.0);
        assert_eq!(peaks.indices, vec![4]);
    }

    #[test]
    fn test_all_below_threshold_gives_no_peaks() {
        let t = trace(&[-50.0, -45.0, -50.0, -48.0, -50.0, -44.0, -50.0]);
        let peaks = find_peaks(&t, 16.0);
        assert!(peaks.is_empty());
        assert_eq!(peaks.len(), 0);
    }

    #[test]
    fn test_peak_exactly_at_threshold_is_kept() {
        let t = trace(&[-50.0, -34.0, -50.0, -50.0, -50.0]);
        assert_eq!(find_peaks(&t, 16.0).indices, vec![1]);
    }
}
