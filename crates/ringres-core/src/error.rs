//! Error types for extraction operations.

use thiserror::Error;

use crate::extraction::PipelineState;
use crate::touchstone::parser::TouchstoneError;

/// Errors that can occur while extracting substrate properties.
///
/// A per-peak loss tangent that cannot be resolved is not an error; it is
/// carried as [`LossQuality::Undefined`](crate::extraction::LossQuality)
/// inside an otherwise complete result row.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No resonance rose above the detection threshold.
    #[error("No peaks detected above {threshold_db:.2} dB; adjust min_peak_db or check data")]
    NoPeaksDetected { threshold_db: f64 },

    /// Non-physical ring length, substrate height or trace width.
    #[error("Invalid geometry: {parameter} must be positive and finite, got {value}")]
    InvalidGeometry { parameter: &'static str, value: f64 },

    /// Peak threshold margin is NaN or infinite.
    #[error("Invalid peak threshold margin: {0} dB")]
    InvalidThreshold(f64),

    /// Calibration point cannot produce a meaningful ring length.
    #[error("Invalid calibration input: {0}")]
    InvalidCalibrationInput(String),

    /// Trace data violates the frequency/magnitude invariants.
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    /// Requested port does not exist in the network.
    #[error("Port {port} out of range for {nports}-port network")]
    PortOutOfRange { port: usize, nports: usize },

    /// Pipeline stage called out of order or after a failure.
    #[error("Cannot {action} while pipeline is {state}")]
    InvalidTransition {
        state: PipelineState,
        action: &'static str,
    },

    #[error(transparent)]
    Touchstone(#[from] TouchstoneError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
