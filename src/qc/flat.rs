//! Flat test: stuck sensors.
//!
//! A sample is flagged when the rolling standard deviation of the
//! `window` samples ending at it is exactly zero, i.e. when every value in
//! the window is identical. A window of 0 means [`DEFAULT_FLAT_WINDOW`];
//! no length-based heuristic is applied.

use crate::constants::DEFAULT_FLAT_WINDOW;
use crate::error::{Result, WaterFrameError};
use crate::frame::WaterFrame;
use crate::qc::{FlagCounts, flag_by_group};

pub fn effective_window(window: usize) -> usize {
    if window == 0 {
        DEFAULT_FLAT_WINDOW
    } else {
        window
    }
}

/// Mark samples that close a window of identical values
///
/// The first `window - 1` samples never have a full window and are never
/// marked. A missing value anywhere in the window leaves it unmarked.
pub fn flat_mask(values: &[Option<f64>], window: usize) -> Vec<bool> {
    let mut mask = vec![false; values.len()];
    if window < 2 || values.len() < window {
        return mask;
    }

    for end in window - 1..values.len() {
        let slice = &values[end + 1 - window..=end];
        // exact equality is the zero-variance condition without rounding noise
        if let Some(first) = slice[0] {
            mask[end] = slice.iter().all(|value| *value == Some(first));
        }
    }
    mask
}

impl WaterFrame {
    /// Flag runs of identical values, per depth in time order
    pub fn flat_test(&mut self, parameters: &[&str], window: usize, flag: i32) -> Result<FlagCounts> {
        let window = effective_window(window);
        if window < 2 {
            return Err(WaterFrameError::configuration(
                "Flat test window must cover at least 2 samples",
            ));
        }

        let selected = self.resolve_parameters(parameters)?;
        flag_by_group(self, "Flat", &selected, flag, |_, values| {
            flat_mask(values, window)
        })
    }

    /// Flat test on a copy
    pub fn with_flat_test(&self, parameters: &[&str], window: usize, flag: i32) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.flat_test(parameters, window, flag)?;
        Ok(frame)
    }
}
