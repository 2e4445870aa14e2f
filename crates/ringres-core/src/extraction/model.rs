//! Extraction inputs and result rows

use serde::{Deserialize, Serialize};

use super::calibration::CalibrationPoint;
use super::loss::LossQuality;
use super::permittivity::require_positive;
use crate::constants::{DEFAULT_MIN_PEAK_DB, MM_PER_M};
use crate::error::Result;

/// Resonator geometry, all lengths in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    /// Effective ring circumference
    pub ring_length: f64,
    /// Substrate thickness h
    pub substrate_height: f64,
    /// Microstrip trace width w
    pub trace_width: f64,
}

impl PhysicalParameters {
    pub fn new(ring_length: f64, substrate_height: f64, trace_width: f64) -> Self {
        Self {
            ring_length,
            substrate_height,
            trace_width,
        }
    }

    /// Geometry given in millimetres
    ///
    /// # Example
    /// ```
    /// use ringres_core::PhysicalParameters;
    /// let params = PhysicalParameters::from_mm(100.0, 1.6, 3.0);
    /// assert_eq!(params.ring_length, 0.1);
    /// ```
    pub fn from_mm(ring_length_mm: f64, substrate_height_mm: f64, trace_width_mm: f64) -> Self {
        Self::new(
            ring_length_mm / MM_PER_M,
            substrate_height_mm / MM_PER_M,
            trace_width_mm / MM_PER_M,
        )
    }

    /// Check every dimension is positive and finite
    pub fn validate(&self) -> Result<()> {
        require_positive("ring_length", self.ring_length)?;
        require_positive("substrate_height", self.substrate_height)?;
        require_positive("trace_width", self.trace_width)
    }
}

/// Run options besides geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Peak threshold above the trace median (dB)
    pub min_peak_db: f64,
    /// Replace the ring length with one derived from a known resonance
    pub calibration: Option<CalibrationPoint>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            min_peak_db: DEFAULT_MIN_PEAK_DB,
            calibration: None,
        }
    }
}

/// One row of the result table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    #[serde(rename = "mode_n")]
    pub mode: u32,
    #[serde(rename = "freq_hz")]
    pub frequency_hz: f64,
    pub eps_eff: f64,
    pub eps_r: f64,
    #[serde(rename = "loss_tan")]
    pub loss_tangent: Option<f64>,
    pub q: Option<f64>,
    pub bandwidth_hz: f64,
    pub loss_quality: LossQuality,
}

/// Aggregate row of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub mean_eps_eff: f64,
    pub mean_eps_r: f64,
    /// Mean over modes with a defined loss tangent
    pub mean_loss_tangent: Option<f64>,
    /// Ring length used for every mode (m)
    pub ring_length: f64,
    /// True when `ring_length` came from a calibration point
    pub length_calibrated: bool,
    pub threshold_db: f64,
    /// Modes whose loss tangent is truncated or undefined
    pub low_confidence_modes: usize,
}
