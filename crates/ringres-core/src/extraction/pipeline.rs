//! Extraction pipeline driver
//!
//! Runs one measurement through the stages
//! `Idle -> Loaded -> PeaksFound -> Computed -> Reported`. Each stage is a
//! separate method so it can be exercised on its own. Stages only move
//! forward; any fatal error parks the pipeline in `Failed`.

use serde::Serialize;
use std::fmt;

use super::loss::estimate_loss;
use super::model::{ExtractionOptions, ExtractionResult, ExtractionSummary, PhysicalParameters};
use super::peaks::{find_peaks, PeakDetection};
use super::permittivity::{effective_permittivity, substrate_permittivity};
use super::report::{ExtractionReport, ReportSink};
use crate::error::{ExtractionError, Result};
use crate::math::stats::{mean, mean_defined};
use crate::trace::Trace;

/// Observable pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Loaded,
    PeaksFound,
    Computed,
    Reported,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Loaded => "loaded",
            PipelineState::PeaksFound => "peaks-found",
            PipelineState::Computed => "computed",
            PipelineState::Reported => "reported",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Data owned by each state
#[derive(Debug)]
enum Stage {
    Idle,
    Loaded { trace: Trace },
    PeaksFound { trace: Trace, peaks: PeakDetection },
    Computed { report: ExtractionReport },
    Reported { report: ExtractionReport },
    Failed { reason: String },
}

impl Stage {
    fn state(&self) -> PipelineState {
        match self {
            Stage::Idle => PipelineState::Idle,
            Stage::Loaded { .. } => PipelineState::Loaded,
            Stage::PeaksFound { .. } => PipelineState::PeaksFound,
            Stage::Computed { .. } => PipelineState::Computed,
            Stage::Reported { .. } => PipelineState::Reported,
            Stage::Failed { .. } => PipelineState::Failed,
        }
    }
}

/// Drives one extraction run
///
/// # Example
/// ```
/// use ringres_core::{ExtractionOptions, ExtractionReport, PhysicalParameters, Pipeline, Trace};
///
/// let freq: Vec<f64> = (1..=400).map(|i| i as f64 * 5e6).collect();
/// let trace = Trace::from_fn(freq, |f| {
///     let x = (f - 1.0e9) / 4e6;
///     -50.0 + 40.0 / (1.0 + x * x)
/// })
/// .unwrap();
///
/// let params = PhysicalParameters::from_mm(100.0, 1.6, 3.0);
/// let mut sink: Vec<ExtractionReport> = Vec::new();
/// let report = Pipeline::new(params, ExtractionOptions::default())
///     .run(trace, &mut sink)
///     .unwrap();
/// assert_eq!(report.results.len(), 1);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    params: PhysicalParameters,
    options: ExtractionOptions,
    length_calibrated: bool,
    stage: Stage,
}

impl Pipeline {
    pub fn new(params: PhysicalParameters, options: ExtractionOptions) -> Self {
        Self {
            params,
            options,
            length_calibrated: false,
            stage: Stage::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.stage.state()
    }

    /// Geometry in effect; the ring length reflects calibration once loaded
    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Message of the error that failed the pipeline
    pub fn failure(&self) -> Option<&str> {
        match &self.stage {
            Stage::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn trace(&self) -> Option<&Trace> {
        match &self.stage {
            Stage::Loaded { trace } | Stage::PeaksFound { trace, .. } => Some(trace),
            _ => None,
        }
    }

    pub fn peaks(&self) -> Option<&PeakDetection> {
        match &self.stage {
            Stage::PeaksFound { peaks, .. } => Some(peaks),
            _ => None,
        }
    }

    /// Finished report, available once computed
    pub fn report_data(&self) -> Option<&ExtractionReport> {
        match &self.stage {
            Stage::Computed { report } | Stage::Reported { report } => Some(report),
            _ => None,
        }
    }

    /// Accept the trace, validate geometry and threshold, apply calibration
    pub fn load(&mut self, trace: Trace) -> Result<()> {
        if !matches!(self.stage, Stage::Idle) {
            return Err(self.invalid("load a trace"));
        }

        match self.resolve_inputs() {
            Ok(()) => {
                tracing::debug!(samples = trace.len(), "trace loaded");
                self.stage = Stage::Loaded { trace };
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Locate resonances; none at all is fatal
    pub fn detect_peaks(&mut self) -> Result<()> {
        let trace = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Loaded { trace } => trace,
            other => {
                self.stage = other;
                return Err(self.invalid("detect peaks"));
            }
        };

        let peaks = find_peaks(&trace, self.options.min_peak_db);
        if peaks.is_empty() {
            return Err(self.fail(ExtractionError::NoPeaksDetected {
                threshold_db: peaks.threshold_db,
            }));
        }

        tracing::debug!(count = peaks.len(), "resonances detected");
        self.stage = Stage::PeaksFound { trace, peaks };
        Ok(())
    }

    /// Build the per-mode table and aggregates
    pub fn compute(&mut self) -> Result<()> {
        let (trace, peaks) = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::PeaksFound { trace, peaks } => (trace, peaks),
            other => {
                self.stage = other;
                return Err(self.invalid("compute results"));
            }
        };

        match self.extract(&trace, &peaks) {
            Ok(report) => {
                self.stage = Stage::Computed { report };
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Hand the finished report to a sink
    pub fn report(&mut self, sink: &mut dyn ReportSink) -> Result<()> {
        let report = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Computed { report } => report,
            other => {
                self.stage = other;
                return Err(self.invalid("report results"));
            }
        };

        match sink.publish(&report) {
            Ok(()) => {
                self.stage = Stage::Reported { report };
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Run every stage and return the report
    pub fn run(mut self, trace: Trace, sink: &mut dyn ReportSink) -> Result<ExtractionReport> {
        self.load(trace)?;
        self.detect_peaks()?;
        self.compute()?;
        self.report(sink)?;

        let state = self.state();
        match self.stage {
            Stage::Reported { report } => Ok(report),
            _ => Err(ExtractionError::InvalidTransition {
                state,
                action: "take the report",
            }),
        }
    }

    fn resolve_inputs(&mut self) -> Result<()> {
        self.params.validate()?;
        if !self.options.min_peak_db.is_finite() {
            return Err(ExtractionError::InvalidThreshold(self.options.min_peak_db));
        }

        if let Some(point) = self.options.calibration {
            let length = point.length()?;
            tracing::info!(
                "[Calibration] Using estimated L = {:.2} mm (from eps = {}, f = {:.3} GHz, n = {})",
                length * 1e3,
                point.permittivity,
                point.frequency / 1e9,
                point.mode
            );
            self.params.ring_length = length;
            self.length_calibrated = true;
        }
        Ok(())
    }

    fn extract(&self, trace: &Trace, peaks: &PeakDetection) -> Result<ExtractionReport> {
        let freq = trace.frequency();
        let params = &self.params;
        let mut results = Vec::with_capacity(peaks.len());

        for (i, &idx) in peaks.indices.iter().enumerate() {
            let mode = i as u32 + 1;
            let f0 = freq[idx];

            let eps_eff = effective_permittivity(mode, f0, params.ring_length)?;
            let eps_r =
                substrate_permittivity(eps_eff, params.substrate_height, params.trace_width)?;
            let loss = estimate_loss(trace, idx)?;

            if loss.quality.is_low_confidence() {
                tracing::warn!(
                    mode,
                    frequency_ghz = f0 / 1e9,
                    "loss tangent {}: half-power window spans samples {}..={}",
                    loss.quality.as_str(),
                    loss.left,
                    loss.right
                );
            }

            results.push(ExtractionResult {
                mode,
                frequency_hz: f0,
                eps_eff,
                eps_r,
                loss_tangent: loss.loss_tangent,
                q: loss.q,
                bandwidth_hz: loss.bandwidth_hz,
                loss_quality: loss.quality,
            });
        }

        let eps_eff: Vec<f64> = results.iter().map(|r| r.eps_eff).collect();
        let eps_r: Vec<f64> = results.iter().map(|r| r.eps_r).collect();

        // Peaks are non-empty here, so the means are defined.
        let summary = ExtractionSummary {
            mean_eps_eff: mean(&eps_eff).unwrap_or(f64::NAN),
            mean_eps_r: mean(&eps_r).unwrap_or(f64::NAN),
            mean_loss_tangent: mean_defined(results.iter().map(|r| r.loss_tangent)),
            ring_length: params.ring_length,
            length_calibrated: self.length_calibrated,
            threshold_db: peaks.threshold_db,
            low_confidence_modes: results
                .iter()
                .filter(|r| r.loss_quality.is_low_confidence())
                .count(),
        };

        tracing::info!(
            modes = results.len(),
            "Average eps_eff = {:.4}, eps_r = {:.4}",
            summary.mean_eps_eff,
            summary.mean_eps_r
        );

        Ok(ExtractionReport { results, summary })
    }

    fn invalid(&self, action: &'static str) -> ExtractionError {
        ExtractionError::InvalidTransition {
            state: self.state(),
            action,
        }
    }

    fn fail(&mut self, err: ExtractionError) -> ExtractionError {
        tracing::error!("extraction aborted: {}", err);
        self.stage = Stage::Failed {
            reason: err.to_string(),
        };
        err
    }
}
