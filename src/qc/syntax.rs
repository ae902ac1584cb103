//! Syntax test: every parameter carries its flag column.

use crate::constants::flag_column;
use crate::error::{Result, WaterFrameError};
use crate::frame::WaterFrame;

impl WaterFrame {
    /// True when every value parameter has a paired `_QC` column
    ///
    /// The TIME and DEPTH index columns are exempt.
    pub fn qc_syntax_test(&self) -> bool {
        self.qc_syntax_report().is_empty()
    }

    /// Parameters that lack a flag column
    pub fn qc_syntax_report(&self) -> Vec<String> {
        self.parameters()
            .into_iter()
            .filter(|parameter| !self.has_column(&flag_column(parameter)))
            .collect()
    }

    /// Fail with the first parameter that lacks a flag column
    pub fn require_qc_syntax(&self) -> Result<()> {
        match self.qc_syntax_report().into_iter().next() {
            Some(parameter) => Err(WaterFrameError::missing_flag_column(parameter)),
            None => Ok(()),
        }
    }
}
