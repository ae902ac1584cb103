//! Range test: physically implausible values.

use crate::config::{RangeLimits, check_limits};
use crate::error::Result;
use crate::frame::WaterFrame;
use crate::qc::{FlagCounts, flag_by_group};
use tracing::debug;

/// Mark values strictly outside `[min, max]`; bounds themselves pass
pub fn out_of_range(values: &[Option<f64>], min: f64, max: f64) -> Vec<bool> {
    values
        .iter()
        .map(|value| value.is_some_and(|v| v < min || v > max))
        .collect()
}

impl WaterFrame {
    /// Flag values outside physical bounds
    ///
    /// With `limits` set, those bounds apply to every selected parameter.
    /// Otherwise each parameter's acronym is looked up in `range_limits`;
    /// a parameter with no entry is skipped without error.
    pub fn range_test(
        &mut self,
        parameters: &[&str],
        limits: Option<(f64, f64)>,
        range_limits: &RangeLimits,
        flag: i32,
    ) -> Result<FlagCounts> {
        let selected = self.resolve_parameters(parameters)?;
        if let Some((min, max)) = limits {
            check_limits("explicit range", min, max)?;
        }

        let mut bounded = Vec::new();
        for parameter in selected {
            match limits.or_else(|| range_limits.get(&parameter)) {
                Some(bounds) => bounded.push((parameter, bounds)),
                None => debug!("Range test skipped for {}: no limits known", parameter),
            }
        }

        let names: Vec<String> = bounded.iter().map(|(name, _)| name.clone()).collect();
        flag_by_group(self, "Range", &names, flag, |parameter, values| {
            let (min, max) = bounded
                .iter()
                .find(|(name, _)| name == parameter)
                .map(|(_, bounds)| *bounds)
                .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
            out_of_range(values, min, max)
        })
    }

    /// Range test on a copy
    pub fn with_range_test(
        &self,
        parameters: &[&str],
        limits: Option<(f64, f64)>,
        range_limits: &RangeLimits,
        flag: i32,
    ) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.range_test(parameters, limits, range_limits, flag)?;
        Ok(frame)
    }
}
