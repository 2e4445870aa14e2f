//! Frequency module - frequency vector with a display unit
//!
//! Frequencies are always stored in Hz; the unit records how the Touchstone
//! file expressed its first column and is used for display.

/// Frequency unit enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    #[default]
    GHz,
    THz,
}

impl FrequencyUnit {
    /// Get the multiplier to convert to Hz
    pub fn multiplier(&self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
            FrequencyUnit::GHz => 1e9,
            FrequencyUnit::THz => 1e12,
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hz" => Some(FrequencyUnit::Hz),
            "khz" => Some(FrequencyUnit::KHz),
            "mhz" => Some(FrequencyUnit::MHz),
            "ghz" => Some(FrequencyUnit::GHz),
            "thz" => Some(FrequencyUnit::THz),
            _ => None,
        }
    }

    /// Unit label for display
    pub fn label(&self) -> &'static str {
        match self {
            FrequencyUnit::Hz => "Hz",
            FrequencyUnit::KHz => "kHz",
            FrequencyUnit::MHz => "MHz",
            FrequencyUnit::GHz => "GHz",
            FrequencyUnit::THz => "THz",
        }
    }
}

/// A frequency band representation
#[derive(Debug, Clone, PartialEq)]
pub struct Frequency {
    /// Frequency vector in Hz
    f: Vec<f64>,
    /// Display unit
    unit: FrequencyUnit,
}

impl Frequency {
    /// Create from values already in Hz
    pub fn from_hz(f: Vec<f64>, unit: FrequencyUnit) -> Self {
        Self { f, unit }
    }

    /// Get frequency vector in Hz
    #[inline]
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    #[inline]
    pub fn npoints(&self) -> usize {
        self.f.len()
    }

    /// Start frequency in Hz
    #[inline]
    pub fn start(&self) -> f64 {
        self.f.first().copied().unwrap_or(0.0)
    }

    /// Stop frequency in Hz
    #[inline]
    pub fn stop(&self) -> f64 {
        self.f.last().copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    /// True when every point is strictly above its predecessor
    pub fn is_strictly_increasing(&self) -> bool {
        self.f.windows(2).all(|w| w[1] > w[0])
    }
}
