//! Spike test: smoothed z-score peak detection.
//!
//! The detector keeps a filtered copy of the series. For each sample after
//! the first `window`, it compares the raw value against the mean and
//! population standard deviation of the previous `window` filtered values.
//! A value further than `threshold` deviations from that mean is a spike;
//! it enters the filtered series damped by `influence` so that a single
//! spike barely moves the baseline. Samples inside the warm-up window are
//! never flagged.
//!
//! The test runs independently for each depth, over the non-missing
//! samples of that depth in time order.

use crate::config::SpikeConfig;
use crate::constants::{SPIKE_AUTO_WINDOW_FRACTION, SPIKE_MAX_WINDOW, SPIKE_MIN_WINDOW};
use crate::error::Result;
use crate::frame::WaterFrame;
use crate::qc::{FlagCounts, flag_by_group};
use tracing::debug;

/// Window used when none is configured, from the number of samples
pub fn auto_window(samples: usize) -> usize {
    let window = (samples as f64 * SPIKE_AUTO_WINDOW_FRACTION).round() as usize;
    window.clamp(SPIKE_MIN_WINDOW, SPIKE_MAX_WINDOW)
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Smoothed z-score over a dense series
///
/// Returns one entry per value. Series no longer than `window` yield no
/// spikes.
pub fn spike_mask(values: &[f64], window: usize, threshold: f64, influence: f64) -> Vec<bool> {
    let n = values.len();
    let mut mask = vec![false; n];
    if window == 0 || n <= window {
        return mask;
    }

    let mut filtered = values.to_vec();
    let (mut mean, mut std) = mean_std(&values[..window]);

    for i in window..n {
        if (values[i] - mean).abs() > threshold * std {
            mask[i] = true;
            filtered[i] = influence * values[i] + (1.0 - influence) * filtered[i - 1];
        }
        (mean, std) = mean_std(&filtered[i + 1 - window..=i]);
    }
    mask
}

/// Run [`spike_mask`] over the present values only, mapping hits back
pub fn spike_mask_sparse(
    values: &[Option<f64>],
    window: usize,
    threshold: f64,
    influence: f64,
) -> Vec<bool> {
    let (positions, present): (Vec<usize>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| value.map(|v| (i, v)))
        .unzip();

    let mut mask = vec![false; values.len()];
    for (position, hit) in positions
        .into_iter()
        .zip(spike_mask(&present, window, threshold, influence))
    {
        mask[position] = hit;
    }
    mask
}

impl WaterFrame {
    /// Flag spikes, per depth in time order
    ///
    /// A configured window of 0 is resolved separately for each depth
    /// from its number of non-missing samples.
    pub fn spike_test(&mut self, parameters: &[&str], config: &SpikeConfig) -> Result<FlagCounts> {
        config.validate()?;
        let selected = self.resolve_parameters(parameters)?;

        flag_by_group(self, "Spike", &selected, config.flag, |parameter, values| {
            let window = match config.window {
                0 => auto_window(values.iter().flatten().count()),
                window => window,
            };
            debug!("Spike window for {}: {} samples", parameter, window);
            spike_mask_sparse(values, window, config.threshold, config.influence)
        })
    }

    /// Spike test on a copy
    pub fn with_spike_test(&self, parameters: &[&str], config: &SpikeConfig) -> Result<WaterFrame> {
        let mut frame = self.clone();
        frame.spike_test(parameters, config)?;
        Ok(frame)
    }
}
