//! Result output formatting and writing.

use crate::config::OutputConfig;
use crate::OutputFormat;
use ringres_core::extraction::ReportSink;
use ringres_core::{ExtractionReport, Network};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Prints the report to stdout and writes any configured result files.
pub struct ReportWriter<'a> {
    format: OutputFormat,
    files: &'a OutputConfig,
}

impl<'a> ReportWriter<'a> {
    pub fn new(format: OutputFormat, files: &'a OutputConfig) -> Self {
        Self { format, files }
    }
}

impl ReportSink for ReportWriter<'_> {
    fn publish(&mut self, report: &ExtractionReport) -> ringres_core::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self.format {
            OutputFormat::Text => write_table(report, &mut out)?,
            OutputFormat::Json => {
                report.write_json(&mut out)?;
                writeln!(out)?;
            }
            OutputFormat::Csv => report.write_csv(&mut out)?,
        }

        if let Some(path) = &self.files.csv {
            report.write_csv(BufWriter::new(File::create(path)?))?;
            tracing::info!("CSV saved to {:?}", path);
        }
        if let Some(path) = &self.files.json {
            report.write_json(BufWriter::new(File::create(path)?))?;
            tracing::info!("JSON saved to {:?}", path);
        }
        Ok(())
    }
}

/// Human-readable result table with averages.
pub fn write_table<W: Write>(report: &ExtractionReport, out: &mut W) -> io::Result<()> {
    let summary = &report.summary;

    writeln!(out, "n_modes: {}", report.results.len())?;
    writeln!(
        out,
        "{:>6} {:>10} {:>9} {:>9} {:>10} {:>9} {:>10}  {}",
        "mode_n", "freq_GHz", "eps_eff", "eps_r", "loss_tan", "Q", "bw_MHz", "quality"
    )?;
    for row in &report.results {
        writeln!(
            out,
            "{:>6} {:>10.4} {:>9.4} {:>9.4} {:>10} {:>9} {:>10.3}  {}",
            row.mode,
            row.frequency_hz / 1e9,
            row.eps_eff,
            row.eps_r,
            fmt_optional(row.loss_tangent, 4),
            fmt_optional(row.q, 1),
            row.bandwidth_hz / 1e6,
            row.loss_quality.as_str()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Average eps_eff      = {:.4}", summary.mean_eps_eff)?;
    writeln!(out, "Average eps_r        = {:.4}", summary.mean_eps_r)?;
    writeln!(out, "Average loss tangent = {}", fmt_optional(summary.mean_loss_tangent, 4))?;
    writeln!(
        out,
        "Ring length          = {:.3} mm{}",
        summary.ring_length * 1e3,
        if summary.length_calibrated { " (calibrated)" } else { "" }
    )?;
    if summary.low_confidence_modes > 0 {
        writeln!(
            out,
            "Warning: {} mode(s) have a low-confidence loss tangent",
            summary.low_confidence_modes
        )?;
    }
    Ok(())
}

fn fmt_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

/// Summary of a Touchstone file for the `inspect` command.
pub fn write_network_summary<W: Write>(ntwk: &Network, out: &mut W) -> io::Result<()> {
    let freq = &ntwk.frequency;
    let unit = freq.unit();

    writeln!(out, "Touchstone File: {}", ntwk.name.as_deref().unwrap_or("<unnamed>"))?;
    writeln!(out, "Ports: {}", ntwk.nports())?;
    writeln!(out, "Frequency points: {}", ntwk.nfreq())?;
    writeln!(
        out,
        "Frequency range: {:.6} - {:.6} {}",
        freq.start() / unit.multiplier(),
        freq.stop() / unit.multiplier(),
        unit.label()
    )?;
    if !freq.is_strictly_increasing() {
        writeln!(out, "Warning: frequency points are not strictly increasing")?;
    }
    writeln!(out, "Reference impedance: {:?} ohm", ntwk.z0)?;

    let s_db = ntwk.s_db();
    for i in 0..ntwk.nports() {
        for j in 0..ntwk.nports() {
            let column = s_db.slice(ndarray::s![.., i, j]);
            let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
            writeln!(out, "  S{}{}: {:>8.2} dB to {:>8.2} dB", i + 1, j + 1, min, max)?;
        }
    }

    for comment in ntwk.comments.iter().filter(|c| !c.is_empty()) {
        writeln!(out, "! {}", comment)?;
    }
    Ok(())
}
