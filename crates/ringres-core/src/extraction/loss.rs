//! Half-power bandwidth loss estimation
//!
//! For each resonance the -3 dB window around the peak gives the loaded
//! quality factor Q = f0 / bw, and the loss tangent is approximated as 1/Q.
//!
//! The window search walks outwards sample by sample until the magnitude
//! drops to the half-power level. When it reaches the edge of the trace
//! first, the window is truncated and Q is overstated; such estimates are
//! kept but flagged [`LossQuality::BoundaryTruncated`].

use serde::Serialize;

use crate::constants::HALF_POWER_DROP_DB;
use crate::error::Result;
use crate::trace::Trace;

/// Confidence in a loss tangent estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LossQuality {
    /// Both half-power crossings lie inside the trace
    Resolved,
    /// The window hit a trace edge before crossing the half-power level
    BoundaryTruncated,
    /// Non-positive bandwidth; no loss tangent. A validated trace always
    /// yields a positive window, so this only guards the arithmetic.
    Undefined,
}

impl LossQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossQuality::Resolved => "resolved",
            LossQuality::BoundaryTruncated => "boundary_truncated",
            LossQuality::Undefined => "undefined",
        }
    }

    /// True for estimates that should not be trusted at face value
    pub fn is_low_confidence(&self) -> bool {
        !matches!(self, LossQuality::Resolved)
    }
}

/// Half-power window and derived quantities for one peak
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossEstimate {
    /// Index where the left search stopped
    pub left: usize,
    /// Index where the right search stopped
    pub right: usize,
    /// Half-power bandwidth (Hz)
    pub bandwidth_hz: f64,
    /// Quality factor f0 / bw
    pub q: Option<f64>,
    /// Loss tangent 1 / Q
    pub loss_tangent: Option<f64>,
    pub quality: LossQuality,
}

/// Estimate the -3 dB window, Q and loss tangent around `peak_index`
pub fn estimate_loss(trace: &Trace, peak_index: usize) -> Result<LossEstimate> {
    trace.check_index(peak_index)?;

    let freq = trace.frequency();
    let mag = trace.magnitude_db();
    let last = trace.last_index();
    let half_mag = mag[peak_index] - HALF_POWER_DROP_DB;

    let mut left = peak_index;
    while left > 0 && mag[left] > half_mag {
        left -= 1;
    }
    let mut right = peak_index;
    while right < last && mag[right] > half_mag {
        right += 1;
    }

    let bandwidth_hz = freq[right] - freq[left];
    let q = (bandwidth_hz > 0.0).then(|| freq[peak_index] / bandwidth_hz);
    let loss_tangent = q.filter(|&q| q > 0.0).map(|q| 1.0 / q);

    let truncated = (left == 0 && mag[0] > half_mag) || (right == last && mag[last] > half_mag);
    let quality = match loss_tangent {
        None => LossQuality::Undefined,
        Some(_) if truncated => LossQuality::BoundaryTruncated,
        Some(_) => LossQuality::Resolved,
    };

    Ok(LossEstimate {
        left,
        right,
        bandwidth_hz,
        q,
        loss_tangent,
        quality,
    })
}

/// Loss tangent of the peak at `peak_index`, `None` when undefined
pub fn loss_tangent(trace: &Trace, peak_index: usize) -> Result<Option<f64>> {
    Ok(estimate_loss(trace, peak_index)?.loss_tangent)
}
