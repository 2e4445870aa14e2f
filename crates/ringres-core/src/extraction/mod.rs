//! Substrate property extraction
//!
//! Turns one resonator trace into a per-mode table of effective and
//! substrate permittivity and loss tangent.
//!
//! ## Modules
//!
//! - `peaks` - Resonance detection above a median-relative threshold
//! - `loss` - Half-power bandwidth, Q and loss tangent per resonance
//! - `permittivity` - Ring resonance condition and microstrip inversion
//! - `calibration` - Ring length from a known resonance
//! - `model` - Geometry, options and result rows
//! - `report` - Report type, CSV/JSON export, marked trace export and sinks
//! - `pipeline` - Stage-by-stage driver

pub mod calibration;
pub mod loss;
pub mod model;
pub mod peaks;
pub mod permittivity;
pub mod pipeline;
pub mod report;

pub use calibration::{estimate_length, CalibrationPoint};
pub use loss::{estimate_loss, loss_tangent, LossEstimate, LossQuality};
pub use model::{ExtractionOptions, ExtractionResult, ExtractionSummary, PhysicalParameters};
pub use peaks::{find_peaks, PeakDetection};
pub use permittivity::{effective_permittivity, substrate_permittivity};
pub use pipeline::{Pipeline, PipelineState};
pub use report::{write_trace_csv, CsvSink, ExtractionReport, ReportSink};
