//! Column and row filtering by parameter and flag code.

use crate::error::{Result, WaterFrameError};
use crate::frame::WaterFrame;
use crate::models::QcFlag;
use std::collections::BTreeSet;
use tracing::debug;

fn check_flag_set(flags: &[i32]) -> Result<BTreeSet<i32>> {
    flags.iter().map(|flag| QcFlag::check(*flag)).collect()
}

impl WaterFrame {
    /// Drop parameters, or rows of parameters, by flag
    ///
    /// With `flags` unset, each key's value column, flag column and
    /// vocabulary entry are removed. With `flags` set, rows where any key's
    /// flag is in the set are removed and the columns stay; an empty `keys`
    /// then checks every parameter. Returns the number of rows removed.
    pub fn drop_keys(&mut self, keys: &[&str], flags: Option<&[i32]>) -> Result<usize> {
        let Some(flags) = flags else {
            for key in keys {
                if !self.parameters().iter().any(|name| name == key) {
                    return Err(WaterFrameError::unknown_parameter(*key));
                }
            }
            for key in keys {
                self.remove_parameter(key)?;
            }
            debug!("Dropped parameters {:?}", keys);
            return Ok(0);
        };

        let rejected = check_flag_set(flags)?;
        let selected = self.resolve_parameters(keys)?;
        let mut keep = vec![true; self.len()];
        for parameter in &selected {
            for (row, flag) in self.flags(parameter)?.into_iter().enumerate() {
                if rejected.contains(&flag) {
                    keep[row] = false;
                }
            }
        }

        let removed = self.retain_rows(&keep)?;
        debug!("Dropped {} rows flagged {:?}", removed, rejected);
        Ok(removed)
    }

    pub fn with_dropped(&self, keys: &[&str], flags: Option<&[i32]>) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.drop_keys(keys, flags)?;
        Ok(frame)
    }

    /// Keep only the given parameters, optionally only well-flagged rows
    ///
    /// Every other parameter is removed. With `flags` set, a row is removed
    /// when any kept parameter carries a flag outside the accepted set. With
    /// `dropnan`, a row is removed when every kept parameter is missing.
    /// Returns the number of rows removed.
    pub fn use_only(&mut self, parameters: &[&str], flags: Option<&[i32]>, dropnan: bool) -> Result<usize> {
        let selected = self.resolve_parameters(parameters)?;
        let accepted = flags.map(check_flag_set).transpose()?;
        for parameter in self.parameters() {
            if !selected.contains(&parameter) {
                self.remove_parameter(&parameter)?;
            }
        }

        let mut keep = vec![true; self.len()];
        if let Some(accepted) = accepted {
            for parameter in &selected {
                for (row, flag) in self.flags(parameter)?.into_iter().enumerate() {
                    if !accepted.contains(&flag) {
                        keep[row] = false;
                    }
                }
            }
        }

        if dropnan && !selected.is_empty() {
            let mut any_present = vec![false; self.len()];
            for parameter in &selected {
                for (row, value) in self.values(parameter)?.into_iter().enumerate() {
                    any_present[row] |= value.is_some();
                }
            }
            for (row, present) in any_present.into_iter().enumerate() {
                keep[row] &= present;
            }
        }

        let removed = self.retain_rows(&keep)?;
        debug!("Kept {:?}, removed {} rows", selected, removed);
        Ok(removed)
    }

    pub fn with_use_only(&self, parameters: &[&str], flags: Option<&[i32]>, dropnan: bool) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.use_only(parameters, flags, dropnan)?;
        Ok(frame)
    }
}
