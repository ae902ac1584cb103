//! Flag translation and reset.

use crate::error::Result;
use crate::frame::WaterFrame;
use crate::models::QcFlag;
use crate::qc::FlagCounts;
use tracing::debug;

impl WaterFrame {
    /// Replace every `original` flag of a parameter with `translated`
    ///
    /// Returns the number of rows changed. Applying the same translation
    /// twice changes nothing the second time.
    pub fn flag2flag(&mut self, parameter: &str, original: i32, translated: i32) -> Result<usize> {
        QcFlag::check(original)?;
        QcFlag::check(translated)?;
        self.require_parameter(parameter)?;

        let mut flags = self.flags(parameter)?;
        let mut changed = 0;
        for flag in flags.iter_mut().filter(|flag| **flag == original) {
            *flag = translated;
            changed += 1;
        }
        if original != translated {
            self.set_flags(parameter, flags)?;
        }

        debug!("{}: {} flags {} -> {}", parameter, changed, original, translated);
        Ok(changed)
    }

    pub fn with_flag2flag(&self, parameter: &str, original: i32, translated: i32) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.flag2flag(parameter, original, translated)?;
        Ok(frame)
    }

    /// Overwrite the whole flag column of a parameter with one code
    pub fn reset_flag(&mut self, parameter: &str, flag: i32) -> Result<()> {
        QcFlag::check(flag)?;
        self.require_parameter(parameter)?;
        self.set_flags(parameter, vec![flag; self.len()])
    }

    pub fn with_reset_flag(&self, parameter: &str, flag: i32) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.reset_flag(parameter, flag)?;
        Ok(frame)
    }

    /// Translate `to_replace` into `value`, skipping the first `start` rows of each depth
    ///
    /// `None` selects every parameter. Rows are skipped by position within
    /// the depth's time-ordered run, whatever their values.
    pub fn qc_replace(
        &mut self,
        parameters: Option<&[&str]>,
        to_replace: i32,
        value: i32,
        start: usize,
    ) -> Result<FlagCounts> {
        QcFlag::check(to_replace)?;
        QcFlag::check(value)?;
        let selected = self.resolve_parameters(parameters.unwrap_or(&[]))?;
        let groups = self.depth_groups()?;

        let mut counts = FlagCounts::new();
        for parameter in selected {
            let mut flags = self.flags(&parameter)?;
            let mut changed = 0;
            for group in &groups {
                let first = (group.rows.start + start).min(group.rows.end);
                for flag in flags[first..group.rows.end]
                    .iter_mut()
                    .filter(|flag| **flag == to_replace)
                {
                    *flag = value;
                    changed += 1;
                }
            }
            self.set_flags(&parameter, flags)?;
            debug!(
                "{}: {} flags {} -> {} after {} rows per depth",
                parameter, changed, to_replace, value, start
            );
            counts.insert(parameter, changed);
        }
        Ok(counts)
    }

    pub fn with_qc_replace(
        &self,
        parameters: Option<&[&str]>,
        to_replace: i32,
        value: i32,
        start: usize,
    ) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.qc_replace(parameters, to_replace, value, start)?;
        Ok(frame)
    }
}
