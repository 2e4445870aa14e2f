//! Permittivity from ring resonances
//!
//! A ring of effective length L resonates when its circumference holds an
//! integer number n of guided wavelengths:
//!
//! ```text
//! f0 = n * c0 / (L * sqrt(eps_eff))   =>   eps_eff = (c0 * n / (f0 * L))^2
//! ```
//!
//! The substrate permittivity follows from inverting the Hammerstad-type
//! microstrip relation `eps_eff = (eps_r + 1)/2 + (eps_r - 1)/2 * a` with
//! `a = 1 / sqrt(1 + 12 h / w)`.

use crate::constants::C0;
use crate::error::{ExtractionError, Result};

/// Reject anything that is not a positive finite length
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ExtractionError::InvalidGeometry { parameter, value })
    }
}

/// Effective permittivity of mode `mode` resonating at `resonant_frequency`
///
/// # Arguments
/// * `mode` - Mode number n (1-based)
/// * `resonant_frequency` - Resonance frequency in Hz
/// * `ring_length` - Effective ring circumference in meters
pub fn effective_permittivity(mode: u32, resonant_frequency: f64, ring_length: f64) -> Result<f64> {
    if mode == 0 {
        return Err(ExtractionError::InvalidTrace(
            "mode numbers start at 1".to_string(),
        ));
    }
    if !(resonant_frequency.is_finite() && resonant_frequency > 0.0) {
        return Err(ExtractionError::InvalidTrace(format!(
            "resonant frequency {} Hz is not positive",
            resonant_frequency
        )));
    }
    require_positive("ring_length", ring_length)?;

    let ratio = C0 * mode as f64 / (resonant_frequency * ring_length);
    Ok(ratio * ratio)
}

/// Substrate permittivity from effective permittivity and microstrip geometry
///
/// Height and width must be in the same unit; only their ratio matters.
pub fn substrate_permittivity(eff_eps: f64, height: f64, width: f64) -> Result<f64> {
    require_positive("substrate_height", height)?;
    require_positive("trace_width", width)?;

    let a = 1.0 / (1.0 + 12.0 * height / width).sqrt();
    Ok((2.0 * eff_eps + a - 1.0) / (1.0 + a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_effective_permittivity_first_mode() {
        // (299792458 / (1e9 * 0.1))^2
        let eps = effective_permittivity(1, 1.00e9, 0.1).unwrap();
        assert_relative_eq!(eps, 8.987_551_787_368_176, max_relative = 1e-12);
    }

    #[test]
    fn test_effective_permittivity_scales_with_mode() {
        let e1 = effective_permittivity(1, 1.0e9, 0.1).unwrap();
        let e2 = effective_permittivity(2, 2.0e9, 0.1).unwrap();
        assert_relative_eq!(e1, e2, max_relative = 1e-12);
    }

    #[test]
    fn test_substrate_permittivity_reference_geometry() {
        let a = 1.0 / 7.4_f64.sqrt();
        assert_relative_eq!(a, 0.367_607, epsilon = 1e-6);

        let eps_r = substrate_permittivity(8.988, 1.6e-3, 3.0e-3).unwrap();
        assert_relative_eq!(eps_r, (2.0 * 8.988 + a - 1.0) / (1.0 + a), max_relative = 1e-12);
        assert_relative_eq!(eps_r, 12.68, epsilon = 5e-3);
    }

    #[test]
    fn test_substrate_permittivity_unit_independent() {
        let in_m = substrate_permittivity(3.2, 1.6e-3, 3.0e-3).unwrap();
        let in_mm = substrate_permittivity(3.2, 1.6, 3.0).unwrap();
        assert_relative_eq!(in_m, in_mm, max_relative = 1e-12);
    }

    #[test]
    fn test_substrate_permittivity_monotonic_in_eff_eps() {
        let mut previous = f64::NEG_INFINITY;
        for i in 0..200 {
            let eff = 1.0 + i as f64 * 0.05;
            let eps_r = substrate_permittivity(eff, 1.6e-3, 3.0e-3).unwrap();
            assert!(eps_r > previous);
            previous = eps_r;
        }
    }

    #[test]
    fn test_unity_effective_gives_unity_substrate() {
        // Air above and below: eps_eff = eps_r = 1
        let eps_r = substrate_permittivity(1.0, 0.8e-3, 1.5e-3).unwrap();
        assert_relative_eq!(eps_r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_width_is_invalid_geometry() {
        let err = substrate_permittivity(8.988, 1.6e-3, 0.0).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidGeometry {
                parameter: "trace_width",
                ..
            }
        ));
    }

    #[test]
    fn test_non_physical_height_is_invalid_geometry() {
        assert!(substrate_permittivity(8.988, -1.0e-3, 3.0e-3).is_err());
        assert!(substrate_permittivity(8.988, f64::NAN, 3.0e-3).is_err());
    }

    #[test]
    fn test_invalid_ring_length_and_mode() {
        assert!(matches!(
            effective_permittivity(1, 1e9, 0.0),
            Err(ExtractionError::InvalidGeometry { .. })
        ));
        assert!(effective_permittivity(0, 1e9, 0.1).is_err());
        assert!(effective_permittivity(1, 0.0, 0.1).is_err());
    }
}
