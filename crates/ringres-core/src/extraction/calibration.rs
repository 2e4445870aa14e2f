//! Ring length calibration
//!
//! Back-solves the effective ring length from one resonance of known
//! permittivity. The result replaces the nominal length for a whole run.

use serde::{Deserialize, Serialize};

use crate::constants::C0;
use crate::error::{ExtractionError, Result};

/// A resonance whose permittivity is known
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Known permittivity (effective or substrate, as measured)
    pub permittivity: f64,
    /// Resonance frequency in Hz
    pub frequency: f64,
    /// Mode number of the resonance
    pub mode: u32,
}

impl CalibrationPoint {
    /// Effective ring length in meters implied by this point
    pub fn length(&self) -> Result<f64> {
        estimate_length(self.permittivity, self.frequency, self.mode)
    }
}

/// Ring length L = c0 * n / (f0 * sqrt(eps))
pub fn estimate_length(
    known_permittivity: f64,
    known_frequency: f64,
    known_mode: u32,
) -> Result<f64> {
    if !(known_permittivity.is_finite() && known_permittivity > 0.0) {
        return Err(ExtractionError::InvalidCalibrationInput(format!(
            "permittivity must be positive, got {}",
            known_permittivity
        )));
    }
    if !(known_frequency.is_finite() && known_frequency > 0.0) {
        return Err(ExtractionError::InvalidCalibrationInput(format!(
            "frequency must be positive, got {} Hz",
            known_frequency
        )));
    }
    if known_mode == 0 {
        return Err(ExtractionError::InvalidCalibrationInput(
            "mode number must be at least 1".to_string(),
        ));
    }

    Ok(C0 * known_mode as f64 / (known_frequency * known_permittivity.sqrt()))
}
