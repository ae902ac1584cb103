//! Tests for the QC test engine
//!
//! Fixtures build short synthetic series whose statistics are easy to
//! reason about by hand: an alternating two-level signal has a constant
//! rolling mean and standard deviation, so any deviation from it is
//! unambiguous.

pub mod flat_tests;
pub mod spike_tests;

/// `low, high, low, high, ...`
pub fn create_alternating_series(count: usize, low: f64, high: f64) -> Vec<f64> {
    (0..count)
        .map(|i| if i % 2 == 0 { low } else { high })
        .collect()
}

/// Replace one sample of a series
pub fn with_value_at(mut series: Vec<f64>, index: usize, value: f64) -> Vec<f64> {
    series[index] = value;
    series
}

/// Row indices whose flag equals `flag`
pub fn rows_flagged(flags: &[i32], flag: i32) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, f)| **f == flag)
        .map(|(i, _)| i)
        .collect()
}

/// 200 hourly rows where only the even rows below 120 carry a sample
///
/// The 60 samples alternate between 10.0 and 10.2, except the fifth
/// sample (row 8), which is 30.0.
pub fn create_sparse_spike_series() -> Vec<Option<f64>> {
    (0..200)
        .map(|row| {
            if row % 2 != 0 || row >= 120 {
                return None;
            }
            let sample = row / 2;
            Some(match sample {
                4 => 30.0,
                _ if sample % 2 == 0 => 10.0,
                _ => 10.2,
            })
        })
        .collect()
}
