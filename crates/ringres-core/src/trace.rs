//! Magnitude-vs-frequency trace
//!
//! A `Trace` is the single |S_ij| curve the extraction runs on. All
//! invariants are checked at construction so the detection and loss stages
//! can index it freely.

use crate::error::{ExtractionError, Result};
use crate::math::stats::median;

/// Ordered (frequency Hz, magnitude dB) samples
///
/// Invariants: at least two samples, frequencies finite, positive and
/// strictly increasing, magnitudes finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    frequency: Vec<f64>,
    magnitude_db: Vec<f64>,
}

impl Trace {
    /// Create a trace from frequency (Hz) and magnitude (dB) columns
    pub fn new(frequency: Vec<f64>, magnitude_db: Vec<f64>) -> Result<Self> {
        if frequency.len() != magnitude_db.len() {
            return Err(ExtractionError::InvalidTrace(format!(
                "frequency has {} points but magnitude has {}",
                frequency.len(),
                magnitude_db.len()
            )));
        }
        if frequency.len() < 2 {
            return Err(ExtractionError::InvalidTrace(format!(
                "need at least 2 samples, got {}",
                frequency.len()
            )));
        }
        if let Some((i, f)) = frequency
            .iter()
            .enumerate()
            .find(|(_, f)| !f.is_finite() || **f <= 0.0)
        {
            return Err(ExtractionError::InvalidTrace(format!(
                "frequency[{}] = {} is not a positive finite value",
                i, f
            )));
        }
        if let Some(i) = frequency.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ExtractionError::InvalidTrace(format!(
                "frequency not strictly increasing at index {}",
                i + 1
            )));
        }
        if let Some(i) = magnitude_db.iter().position(|m| !m.is_finite()) {
            return Err(ExtractionError::InvalidTrace(format!(
                "magnitude[{}] = {} dB is not finite",
                i, magnitude_db[i]
            )));
        }

        Ok(Self {
            frequency,
            magnitude_db,
        })
    }

    /// Build a trace by sampling `magnitude_db(f)` on the given frequencies
    pub fn from_fn<F>(frequency: Vec<f64>, magnitude_db: F) -> Result<Self>
    where
        F: Fn(f64) -> f64,
    {
        let mag = frequency.iter().map(|&f| magnitude_db(f)).collect();
        Self::new(frequency, mag)
    }

    /// Frequencies in Hz
    #[inline]
    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    /// Magnitudes in dB
    #[inline]
    pub fn magnitude_db(&self) -> &[f64] {
        &self.magnitude_db
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    /// Always false for a constructed trace; present for API symmetry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Index of the last sample
    #[inline]
    pub fn last_index(&self) -> usize {
        self.frequency.len() - 1
    }

    /// Median magnitude in dB
    pub fn median_db(&self) -> f64 {
        // Construction guarantees a non-empty, NaN-free column.
        median(&self.magnitude_db).unwrap_or(f64::NEG_INFINITY)
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(ExtractionError::InvalidTrace(format!(
                "index {} out of range for trace of {} samples",
                index,
                self.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_valid_trace() {
        let trace = Trace::new(vec![1e9, 2e9, 3e9], vec![-40.0, -10.0, -40.0]).unwrap();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.last_index(), 2);
        assert_relative_eq!(trace.median_db(), -40.0);
    }

    #[test]
    fn test_rejects_short_trace() {
        let err = Trace::new(vec![1e9], vec![-3.0]).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidTrace(_)));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(Trace::new(vec![1e9, 2e9], vec![-3.0]).is_err());
    }

    #[test]
    fn test_rejects_non_increasing_frequency() {
        let err = Trace::new(vec![1e9, 1e9, 2e9], vec![0.0; 3]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_rejects_non_positive_frequency() {
        assert!(Trace::new(vec![0.0, 1e9], vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_rejects_infinite_magnitude() {
        // |S21| = 0 shows up as -inf dB
        assert!(Trace::new(vec![1e9, 2e9], vec![f64::NEG_INFINITY, 0.0]).is_err());
    }

    #[test]
    fn test_from_fn() {
        let trace = Trace::from_fn(vec![1e9, 2e9, 3e9], |f| f / 1e9).unwrap();
        assert_eq!(trace.magnitude_db(), &[1.0, 2.0, 3.0]);
    }
}
