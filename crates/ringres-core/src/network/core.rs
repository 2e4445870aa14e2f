//! Core Network struct and constructors

use ndarray::Array3;
use num_complex::Complex64;
use std::path::Path;

use crate::frequency::Frequency;
use crate::touchstone::{ParameterType, Touchstone, TouchstoneError};

/// An N-port electrical network described by S-parameters
#[derive(Debug, Clone)]
pub struct Network {
    /// Frequency data
    pub frequency: Frequency,
    /// S-parameter data [nfreq, nports, nports]
    pub s: Array3<Complex64>,
    /// Reference impedance (per port)
    pub z0: Vec<f64>,
    /// Network name, taken from the file stem when loaded from disk
    pub name: Option<String>,
    /// Comments
    pub comments: Vec<String>,
}

impl Network {
    /// Create a new Network from S-parameters
    pub fn new(frequency: Frequency, s: Array3<Complex64>, z0: Vec<f64>) -> Self {
        Self {
            frequency,
            s,
            z0,
            name: None,
            comments: Vec::new(),
        }
    }

    /// Load from a Touchstone file
    pub fn from_touchstone<P: AsRef<Path>>(path: P) -> Result<Self, TouchstoneError> {
        let path = path.as_ref();
        let ts = Touchstone::from_file(path)?;
        let mut ntwk = Self::from_touchstone_data(ts)?;
        ntwk.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);
        Ok(ntwk)
    }

    /// Only S-parameter data is accepted; other parameter types would need
    /// a conversion the extraction does not perform.
    fn from_touchstone_data(ts: Touchstone) -> Result<Self, TouchstoneError> {
        if ts.param_type != ParameterType::S {
            return Err(TouchstoneError::UnsupportedParameter(ts.param_type));
        }

        Ok(Self {
            frequency: ts.frequency,
            s: ts.s,
            z0: ts.z0,
            name: None,
            comments: ts.comments,
        })
    }

    /// Get the number of ports
    #[inline]
    pub fn nports(&self) -> usize {
        self.s.shape()[1]
    }

    /// Get the number of frequency points
    #[inline]
    pub fn nfreq(&self) -> usize {
        self.s.shape()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyUnit;

    #[test]
    fn test_network_creation() {
        let f: Vec<f64> = (1..=10).map(|i| i as f64 * 1e9).collect();
        let freq = Frequency::from_hz(f, FrequencyUnit::GHz);
        let s = Array3::<Complex64>::zeros((10, 2, 2));
        let ntwk = Network::new(freq, s, vec![50.0; 2]);

        assert_eq!(ntwk.nports(), 2);
        assert_eq!(ntwk.nfreq(), 10);
        assert_eq!(ntwk.z0[0], 50.0);
    }

    #[test]
    fn test_rejects_non_s_parameters() {
        let content = "# GHz Z RI R 50\n1.0 50 0\n";
        let ts = Touchstone::from_str(content, 1).unwrap();
        let err = Network::from_touchstone_data(ts).unwrap_err();
        assert!(matches!(
            err,
            TouchstoneError::UnsupportedParameter(ParameterType::Z)
        ));
    }
}
