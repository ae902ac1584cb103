//! Parameter summaries and the human-readable table description.

use crate::error::Result;
use crate::frame::WaterFrame;
use crate::frame::timestamps::format_timestamp;
use crate::models::ParameterSummary;

impl WaterFrame {
    /// Number of rows carrying each flag code 0..=9
    pub fn flag_counts(&self, parameter: &str) -> Result<[usize; 10]> {
        self.require_parameter(parameter)?;
        let mut counts = [0usize; 10];
        for flag in self.flags(parameter)? {
            // codes outside 0..=9 from foreign data are not counted
            if let Some(slot) = usize::try_from(flag).ok().and_then(|i| counts.get_mut(i)) {
                *slot += 1;
            }
        }
        Ok(counts)
    }

    /// Descriptive statistics for one parameter
    pub fn summary(&self, parameter: &str) -> Result<ParameterSummary> {
        let values = self.values(parameter)?;
        let flag_counts = self.flag_counts(parameter)?;

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let count = present.len();
        let min = present.iter().copied().reduce(f64::min);
        let max = present.iter().copied().reduce(f64::max);
        let mean = (count > 0).then(|| present.iter().sum::<f64>() / count as f64);

        Ok(ParameterSummary {
            parameter: parameter.to_string(),
            count,
            missing: values.len() - count,
            min,
            max,
            mean,
            flag_counts,
        })
    }

    /// Summaries of every parameter that has a flag column
    pub fn summaries(&self) -> Result<Vec<ParameterSummary>> {
        self.resolve_parameters(&[])?
            .iter()
            .map(|parameter| self.summary(parameter))
            .collect()
    }

    /// Multi-line description of the table
    pub fn info(&self) -> Result<String> {
        let mut lines = Vec::new();

        match self.index_kind() {
            Some(kind) => lines.push(format!("Index: {} with {} rows", kind, self.len())),
            None => lines.push("Index: none".to_string()),
        }

        if self.index_kind().is_some() {
            if let Some((first, last)) = self.time_coverage()? {
                lines.push(format!(
                    "Time coverage: {} to {}",
                    format_timestamp(first),
                    format_timestamp(last)
                ));
            }
        }

        if !self.metadata.is_empty() {
            lines.push("Metadata:".to_string());
            for (key, value) in &self.metadata {
                lines.push(format!("  {}: {}", key, value));
            }
        }

        lines.push("Parameters:".to_string());
        for parameter in self.parameters() {
            let units = self
                .vocabulary
                .get(&parameter)
                .and_then(|info| info.units.clone())
                .unwrap_or_else(|| "-".to_string());
            match self.summary(&parameter) {
                Ok(summary) => lines.push(format!(
                    "  {} [{}]: {} values, {} missing, {:.1}% good",
                    parameter,
                    units,
                    summary.count,
                    summary.missing,
                    summary.good_fraction() * 100.0
                )),
                Err(_) => lines.push(format!("  {} [{}]: no flag column", parameter, units)),
            }
        }

        Ok(lines.join("\n"))
    }
}
