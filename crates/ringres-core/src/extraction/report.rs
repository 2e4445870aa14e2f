//! Result table export
//!
//! The pipeline hands its finished report to a [`ReportSink`]. CSV and JSON
//! writers live here; console formatting belongs to the caller. The marked
//! trace export carries what is needed to redraw the |S21| plot with its
//! detected peaks.

use serde::Serialize;
use std::io::Write;

use super::model::{ExtractionResult, ExtractionSummary};
use super::peaks::PeakDetection;
use crate::error::Result;
use crate::trace::Trace;

/// Terminal artifact of one extraction run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// One row per detected mode, ordered by mode number
    pub results: Vec<ExtractionResult>,
    pub summary: ExtractionSummary,
}

impl ExtractionReport {
    /// Write the result table as CSV; missing loss values become empty cells
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.results {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write results and summary as pretty JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct TraceRow {
    freq_hz: f64,
    mag_db: f64,
    is_peak: bool,
}

/// Write the trace as `freq_hz,mag_db,is_peak` CSV
pub fn write_trace_csv<W: Write>(trace: &Trace, peaks: &PeakDetection, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut marks = peaks.indices.iter().peekable();

    for (i, (&freq_hz, &mag_db)) in trace
        .frequency()
        .iter()
        .zip(trace.magnitude_db())
        .enumerate()
    {
        let is_peak = marks.next_if_eq(&&i).is_some();
        wtr.serialize(TraceRow {
            freq_hz,
            mag_db,
            is_peak,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Receiver of a finished report (console, files, plots)
pub trait ReportSink {
    fn publish(&mut self, report: &ExtractionReport) -> Result<()>;
}

/// Collects reports in memory
impl ReportSink for Vec<ExtractionReport> {
    fn publish(&mut self, report: &ExtractionReport) -> Result<()> {
        self.push(report.clone());
        Ok(())
    }
}

/// Streams the result table as CSV into a writer
pub struct CsvSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn publish(&mut self, report: &ExtractionReport) -> Result<()> {
        report.write_csv(&mut self.writer)
    }
}
