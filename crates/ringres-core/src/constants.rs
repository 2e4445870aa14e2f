//! Physical and numerical constants
//!
//! Speed of light and the defaults shared by the extraction stages.

/// Speed of light in vacuum (m/s).
pub const C0: f64 = 299_792_458.0;

/// Drop from the resonance peak that bounds the half-power window (dB).
pub const HALF_POWER_DROP_DB: f64 = 3.0;

/// Default peak detection threshold above the trace median (dB).
pub const DEFAULT_MIN_PEAK_DB: f64 = 16.0;

/// Millimetres per metre, for geometry given in mm.
pub const MM_PER_M: f64 = 1e3;
