//! Derived network properties
//!
//! Magnitude views of the S-parameters and selection of a single
//! transmission or reflection trace for extraction.

use ndarray::{s, Array3};
use std::path::Path;

use super::core::Network;
use crate::error::{ExtractionError, Result};
use crate::trace::Trace;

impl Network {
    /// Get S-parameter magnitude in dB
    #[inline]
    pub fn s_db(&self) -> Array3<f64> {
        self.s.mapv(|c| 20.0 * c.norm().log10())
    }

    /// Magnitude trace of S(output_port, input_port) in dB
    ///
    /// Ports are 1-based as in Touchstone naming: `trace(2, 1)` is S21.
    pub fn trace(&self, output_port: usize, input_port: usize) -> Result<Trace> {
        let nports = self.nports();
        for port in [output_port, input_port] {
            if port == 0 || port > nports {
                return Err(ExtractionError::PortOutOfRange { port, nports });
            }
        }

        let mag_db = self
            .s
            .slice(s![.., output_port - 1, input_port - 1])
            .mapv(|c| 20.0 * c.norm().log10());

        Trace::new(self.frequency.f().to_vec(), mag_db.to_vec())
    }

    /// Read a Touchstone file and take the S(output_port, input_port) trace
    pub fn load_trace<P: AsRef<Path>>(
        path: P,
        output_port: usize,
        input_port: usize,
    ) -> Result<Trace> {
        let ntwk = Network::from_touchstone(path)?;
        ntwk.trace(output_port, input_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{Frequency, FrequencyUnit};
    use crate::touchstone::TouchstoneError;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn two_port() -> Network {
        let freq = Frequency::from_hz(vec![1e9, 2e9, 3e9], FrequencyUnit::GHz);
        let mut s = Array3::<Complex64>::zeros((3, 2, 2));
        for f in 0..3 {
            s[[f, 0, 0]] = Complex64::new(0.5, 0.0);
            s[[f, 1, 0]] = Complex64::new(0.0, 0.1 * (f + 1) as f64);
            s[[f, 0, 1]] = Complex64::new(0.01, 0.0);
            s[[f, 1, 1]] = Complex64::new(0.5, 0.0);
        }
        Network::new(freq, s, vec![50.0; 2])
    }

    #[test]
    fn test_s_db() {
        let ntwk = two_port();
        let db = ntwk.s_db();
        assert_relative_eq!(db[[0, 0, 1]], -40.0, epsilon = 1e-10);
        assert_relative_eq!(db[[0, 0, 0]], 20.0 * 0.5f64.log10(), epsilon = 1e-12);
    }

    #[test]
    fn test_trace_selects_s21() {
        let trace = two_port().trace(2, 1).unwrap();
        assert_eq!(trace.len(), 3);
        assert_relative_eq!(trace.magnitude_db()[0], -20.0, epsilon = 1e-10);
        assert_relative_eq!(trace.frequency()[2], 3e9, epsilon = 1e-3);
    }

    #[test]
    fn test_load_trace_reports_reader_errors() {
        let err = Network::load_trace("does_not_exist.s2p", 2, 1).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Touchstone(TouchstoneError::Io(_))
        ));

        let err = Network::load_trace("ring.txt", 2, 1).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Touchstone(TouchstoneError::InvalidExtension)
        ));
    }

    #[test]
    fn test_trace_port_out_of_range() {
        let err = two_port().trace(3, 1).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::PortOutOfRange { port: 3, nports: 2 }
        ));
        assert!(two_port().trace(0, 1).is_err());
    }
}
