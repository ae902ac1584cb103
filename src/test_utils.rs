//! Shared fixtures for unit tests

use crate::frame::WaterFrame;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

pub fn hourly_times(count: usize) -> Vec<DateTime<Utc>> {
    (0..count as i64)
        .map(|i| start_time() + Duration::hours(i))
        .collect()
}

/// TIME-indexed table with one parameter sampled hourly
pub fn create_hourly_frame(parameter: &str, values: Vec<f64>) -> WaterFrame {
    WaterFrame::builder()
        .time(hourly_times(values.len()))
        .parameter(parameter, values)
        .build()
        .unwrap()
}

/// (DEPTH, TIME)-indexed table; `series[i]` is sampled hourly at `depths[i]`
pub fn create_depth_frame(parameter: &str, depths: &[f64], series: &[Vec<f64>]) -> WaterFrame {
    let mut times = Vec::new();
    let mut depth_column = Vec::new();
    let mut values = Vec::new();
    for (depth, samples) in depths.iter().zip(series) {
        times.extend(hourly_times(samples.len()));
        depth_column.extend(std::iter::repeat_n(*depth, samples.len()));
        values.extend(samples.iter().copied());
    }

    WaterFrame::builder()
        .time(times)
        .depth(depth_column)
        .parameter(parameter, values)
        .build()
        .unwrap()
}

