//! The standard QC chain: range, flat, spike, then finalization.

use crate::config::{QcConfig, SpikeConfig};
use crate::error::Result;
use crate::frame::WaterFrame;
use crate::qc::FlagCounts;
use crate::qc::spike::auto_window;
use serde::Serialize;
use tracing::info;

/// Rows flagged by each stage of [`WaterFrame::qc`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QcReport {
    pub range: FlagCounts,
    pub flat: FlagCounts,
    pub spike: FlagCounts,

    /// Rows translated by the finalization step
    pub finalized: FlagCounts,

    /// Rows per depth left untouched by finalization
    pub warm_up: usize,
}

impl QcReport {
    /// Rows flagged by the range, flat and spike tests together
    ///
    /// A row rejected by more than one test is counted once per test.
    pub fn total_flagged(&self) -> usize {
        [&self.range, &self.flat, &self.spike]
            .iter()
            .flat_map(|counts| counts.values())
            .sum()
    }
}

impl WaterFrame {
    /// Run the configured tests in sequence and finalize the flags
    ///
    /// Rows no test touched are translated from `finalize.to_replace` to
    /// `finalize.value`, except the first spike window of each depth, which
    /// the spike test never evaluated. The spike window used for that
    /// offset is the configured one, or the automatic window for the
    /// average number of non-missing samples per depth of the densest
    /// selected parameter.
    pub fn qc(&mut self, parameters: &[&str], config: &QcConfig) -> Result<QcReport> {
        config.validate()?;
        self.require_qc_syntax()?;
        let selected = self.resolve_parameters(parameters)?;
        let names: Vec<&str> = selected.iter().map(String::as_str).collect();

        let mut report = QcReport::default();
        if names.is_empty() || self.is_empty() {
            return Ok(report);
        }

        let groups = self.depth_groups()?.len().max(1);
        let mut present = 0;
        for name in &names {
            present = present.max(self.values(name)?.iter().flatten().count());
        }
        let window = match config.spike.window {
            0 => auto_window(present / groups),
            window => window,
        };

        if config.run_range {
            report.range = self.range_test(&names, None, &config.range_limits, config.range_flag)?;
        }
        if config.run_flat {
            report.flat = self.flat_test(&names, config.flat.window, config.flat.flag)?;
        }
        if config.run_spike {
            let spike = SpikeConfig {
                window,
                ..config.spike.clone()
            };
            report.spike = self.spike_test(&names, &spike)?;
        }
        if config.finalize.enabled {
            let start = if config.run_spike { window } else { 0 };
            report.warm_up = start;
            report.finalized = self.qc_replace(
                Some(names.as_slice()),
                config.finalize.to_replace,
                config.finalize.value,
                start,
            )?;
        }

        info!(
            "QC flagged {} values across {} parameters",
            report.total_flagged(),
            names.len()
        );
        Ok(report)
    }

    /// QC chain on a copy
    pub fn with_qc(&self, parameters: &[&str], config: &QcConfig) -> Result<(WaterFrame, QcReport)> {
        let mut frame = self.clone();
        let report = frame.qc(parameters, config)?;
        Ok((frame, report))
    }
}
