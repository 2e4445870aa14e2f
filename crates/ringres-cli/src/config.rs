//! Extraction configuration loading and validation.

use anyhow::{Context, Result};
use ringres_core::extraction::CalibrationPoint;
use ringres_core::{ExtractionOptions, PhysicalParameters};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level extraction configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Path to the measured Touchstone file.
    pub touchstone: PathBuf,

    /// Which S-parameter to analyse.
    #[serde(default)]
    pub trace: TraceConfig,

    /// Resonator geometry.
    pub geometry: GeometryConfig,

    /// Peak detection parameters.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Optional ring length calibration from a known resonance.
    pub calibration: Option<CalibrationConfig>,

    /// Result files.
    #[serde(default)]
    pub output: OutputConfig,
}

/// S-parameter selection, 1-based ports.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default = "default_output_port")]
    pub output_port: usize,
    #[serde(default = "default_input_port")]
    pub input_port: usize,
}

fn default_output_port() -> usize {
    2
}

fn default_input_port() -> usize {
    1
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            output_port: default_output_port(),
            input_port: default_input_port(),
        }
    }
}

/// Geometry in millimetres.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub ring_length_mm: f64,
    pub substrate_height_mm: f64,
    pub trace_width_mm: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Threshold above the median trace level (dB).
    #[serde(default = "default_min_peak_db")]
    pub min_peak_db: f64,
}

fn default_min_peak_db() -> f64 {
    ExtractionOptions::default().min_peak_db
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_peak_db: default_min_peak_db(),
        }
    }
}

/// Known resonance used to derive the ring length.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub frequency_hz: f64,
    pub permittivity: f64,
    #[serde(default = "default_mode")]
    pub mode: u32,
}

fn default_mode() -> u32 {
    1
}

impl From<CalibrationConfig> for CalibrationPoint {
    fn from(cal: CalibrationConfig) -> Self {
        CalibrationPoint {
            permittivity: cal.permittivity,
            frequency: cal.frequency_hz,
            mode: cal.mode,
        }
    }
}

/// Output files; console output is always produced.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Measured trace with detected peaks flagged.
    pub trace_csv: Option<PathBuf>,
}

impl ExtractConfig {
    pub fn params(&self) -> PhysicalParameters {
        PhysicalParameters::from_mm(
            self.geometry.ring_length_mm,
            self.geometry.substrate_height_mm,
            self.geometry.trace_width_mm,
        )
    }

    pub fn options(&self) -> ExtractionOptions {
        ExtractionOptions {
            min_peak_db: self.detection.min_peak_db,
            calibration: self.calibration.map(CalibrationPoint::from),
        }
    }

    /// Make relative paths relative to the config file's directory.
    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.touchstone);
        if let Some(csv) = self.output.csv.as_mut() {
            resolve(csv);
        }
        if let Some(json) = self.output.json.as_mut() {
            resolve(json);
        }
        if let Some(trace_csv) = self.output.trace_csv.as_mut() {
            resolve(trace_csv);
        }
    }
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<ExtractConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content, path.extension().map_or(false, |e| e == "json"))?;

    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }

    validate_config(&config)?;

    Ok(config)
}

fn parse_config(content: &str, is_json: bool) -> Result<ExtractConfig> {
    let config = if is_json {
        serde_json::from_str(content).with_context(|| "Failed to parse config as JSON")?
    } else {
        toml::from_str(content).with_context(|| "Failed to parse config as TOML")?
    };
    Ok(config)
}

/// Validate configuration values; file existence is checked at run time.
pub fn validate_config(config: &ExtractConfig) -> Result<()> {
    let TraceConfig {
        output_port,
        input_port,
    } = config.trace;
    if output_port == 0 || input_port == 0 {
        anyhow::bail!(
            "Port numbers must be 1-based (got output={}, input={})",
            output_port,
            input_port
        );
    }

    config
        .params()
        .validate()
        .with_context(|| "Invalid [geometry] section")?;

    if !config.detection.min_peak_db.is_finite() {
        anyhow::bail!("Invalid min_peak_db: {}", config.detection.min_peak_db);
    }

    if let Some(cal) = config.calibration {
        CalibrationPoint::from(cal)
            .length()
            .with_context(|| "Invalid [calibration] section")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
touchstone = "ring.s2p"

[geometry]
ring_length_mm = 100.0
substrate_height_mm = 1.6
trace_width_mm = 3.0
"#;

    #[test]
    fn test_defaults() {
        let config = parse_config(MINIMAL, false).unwrap();
        assert_eq!(config.trace.output_port, 2);
        assert_eq!(config.trace.input_port, 1);
        assert_eq!(config.detection.min_peak_db, 16.0);
        assert!(config.calibration.is_none());
        assert!(config.output.csv.is_none());
        assert!(validate_config(&config).is_ok());

        let params = config.params();
        assert!((params.ring_length - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_full_toml() {
        let extra = r#"
[trace]
output_port = 1
input_port = 2

[detection]
min_peak_db = 12.5

[calibration]
frequency_hz = 1.0e9
permittivity = 8.98

[output]
csv = "out.csv"
"#;
        let content = format!("{}{}", MINIMAL, extra);
        let config = parse_config(&content, false).unwrap();

        assert_eq!(config.trace.output_port, 1);
        let options = config.options();
        assert_eq!(options.min_peak_db, 12.5);
        let cal = options.calibration.unwrap();
        assert_eq!(cal.mode, 1);
        assert_eq!(cal.frequency, 1.0e9);
        assert_eq!(config.output.csv, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_json_config() {
        let content = r#"{
            "touchstone": "ring.s2p",
            "geometry": {
                "ring_length_mm": 100.0,
                "substrate_height_mm": 1.6,
                "trace_width_mm": 3.0
            },
            "output": {"json": "report.json"}
        }"#;
        let config = parse_config(content, true).unwrap();
        assert_eq!(config.output.json, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn test_rejects_zero_port() {
        let mut config = parse_config(MINIMAL, false).unwrap();
        config.trace.input_port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_geometry_and_calibration() {
        let mut config = parse_config(MINIMAL, false).unwrap();
        config.geometry.trace_width_mm = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = parse_config(MINIMAL, false).unwrap();
        config.calibration = Some(CalibrationConfig {
            frequency_hz: 1.0e9,
            permittivity: -1.0,
            mode: 1,
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_relative_paths_follow_config_dir() {
        let mut config = parse_config(MINIMAL, false).unwrap();
        config.output.csv = Some(PathBuf::from("/abs/out.csv"));
        config.output.trace_csv = Some(PathBuf::from("trace.csv"));
        config.resolve_paths(Path::new("/data/run1"));

        assert_eq!(config.touchstone, PathBuf::from("/data/run1/ring.s2p"));
        assert_eq!(config.output.csv, Some(PathBuf::from("/abs/out.csv")));
        assert_eq!(config.output.trace_csv, Some(PathBuf::from("/data/run1/trace.csv")));
    }
}
