//! Tests for the spike test

use super::*;
use crate::config::SpikeConfig;
use crate::error::WaterFrameError;
use crate::qc::spike::{auto_window, spike_mask, spike_mask_sparse};
use crate::frame::WaterFrame;
use crate::test_utils::{create_depth_frame, create_hourly_frame, hourly_times};

fn spike_config(window: usize) -> SpikeConfig {
    SpikeConfig {
        window,
        ..SpikeConfig::default()
    }
}

#[test]
fn test_auto_window_is_clamped() {
    assert_eq!(auto_window(0), 3);
    assert_eq!(auto_window(40), 3);
    assert_eq!(auto_window(100), 5);
    assert_eq!(auto_window(1_000), 50);
    assert_eq!(auto_window(100_000), 100);
}

#[test]
fn test_spike_mask_detects_isolated_spike() {
    let series = with_value_at(create_alternating_series(20, 10.0, 10.2), 10, 15.0);

    let mask = spike_mask(&series, 4, 3.5, 0.5);

    let hits: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter(|(_, hit)| **hit)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(hits, vec![10]);
}

#[test]
fn test_spike_mask_detects_negative_spike() {
    let series = with_value_at(create_alternating_series(20, 10.0, 10.2), 12, 4.0);

    let mask = spike_mask(&series, 4, 3.5, 0.5);

    assert!(mask[12]);
    assert_eq!(mask.iter().filter(|hit| **hit).count(), 1);
}

#[test]
fn test_spike_mask_warm_up_never_flags() {
    // a huge jump inside the first window is never evaluated
    let series = vec![10.0, 10.2, 500.0, 10.1];

    assert_eq!(spike_mask(&series, 4, 3.5, 0.5), vec![false; 4]);
    assert_eq!(spike_mask(&series[..3], 3, 3.5, 0.5), vec![false; 3]);
}

#[test]
fn test_spike_mask_skips_missing_values() {
    let mut values: Vec<Option<f64>> = create_alternating_series(20, 10.0, 10.2)
        .into_iter()
        .map(Some)
        .collect();
    // drop one sample before the spike; the filter runs over the rest
    values.insert(6, None);
    values[11] = Some(15.0);

    let mask = spike_mask_sparse(&values, 4, 3.5, 0.5);

    assert_eq!(mask.len(), 21);
    assert!(!mask[6]);
    assert!(mask[11]);
    assert_eq!(mask.iter().filter(|hit| **hit).count(), 1);
}

#[test]
fn test_spike_test_flags_frame() {
    let series = with_value_at(create_alternating_series(20, 10.0, 10.2), 10, 15.0);
    let mut frame = create_hourly_frame("TEMP", series);

    let counts = frame.spike_test(&["TEMP"], &spike_config(4)).unwrap();

    assert_eq!(counts["TEMP"], 1);
    assert_eq!(rows_flagged(&frame.flags("TEMP").unwrap(), 4), vec![10]);
}

#[test]
fn test_spike_test_short_series_unflagged() {
    // auto window for 3 samples is 3, so nothing is evaluated
    let mut frame = create_hourly_frame("TEMP", vec![10.0, 90.0, 10.0]);

    let counts = frame.spike_test(&["TEMP"], &SpikeConfig::default()).unwrap();

    assert_eq!(counts["TEMP"], 0);
}

#[test]
fn test_spike_test_validates_config() {
    let mut frame = create_hourly_frame("TEMP", vec![10.0; 5]);

    let bad_influence = SpikeConfig {
        influence: 1.5,
        ..SpikeConfig::default()
    };
    let bad_threshold = SpikeConfig {
        threshold: 0.0,
        ..SpikeConfig::default()
    };

    assert!(matches!(
        frame.spike_test(&["TEMP"], &bad_influence),
        Err(WaterFrameError::Configuration { .. })
    ));
    assert!(matches!(
        frame.spike_test(&["TEMP"], &bad_threshold),
        Err(WaterFrameError::Configuration { .. })
    ));
}

#[test]
fn test_spike_test_matches_per_depth_runs() {
    let shallow = with_value_at(create_alternating_series(16, 15.0, 15.2), 9, 20.0);
    let deep = with_value_at(create_alternating_series(16, 11.0, 11.2), 6, 5.0);
    let mut combined = create_depth_frame("TEMP", &[5.0, 20.0], &[shallow.clone(), deep.clone()]);
    let mut shallow_frame = create_hourly_frame("TEMP", shallow);
    let mut deep_frame = create_hourly_frame("TEMP", deep);
    let config = spike_config(4);

    combined.spike_test(&["TEMP"], &config).unwrap();
    shallow_frame.spike_test(&["TEMP"], &config).unwrap();
    deep_frame.spike_test(&["TEMP"], &config).unwrap();

    let mut expected = shallow_frame.flags("TEMP").unwrap();
    expected.extend(deep_frame.flags("TEMP").unwrap());
    assert_eq!(combined.flags("TEMP").unwrap(), expected);
    assert_eq!(rows_flagged(&expected, 4), vec![9, 22]);
}

#[test]
fn test_spike_test_ignores_level_change_between_depths() {
    // without depth grouping the jump from 10 to 20 degrees would be a spike
    let mut frame = create_depth_frame(
        "TEMP",
        &[5.0, 20.0],
        &[
            create_alternating_series(10, 20.0, 20.2),
            create_alternating_series(10, 10.0, 10.2),
        ],
    );

    let counts = frame.spike_test(&[], &spike_config(4)).unwrap();

    assert_eq!(counts["TEMP"], 0);
}

#[test]
fn test_auto_window_counts_only_present_samples() {
    // 60 samples spread over 200 rows give a window of 3, not 10
    let mut frame = WaterFrame::builder()
        .time(hourly_times(200))
        .parameter("TEMP", create_sparse_spike_series())
        .build()
        .unwrap();

    let counts = frame.spike_test(&["TEMP"], &spike_config(0)).unwrap();

    assert_eq!(counts["TEMP"], 1);
    assert_eq!(rows_flagged(&frame.flags("TEMP").unwrap(), 4), vec![8]);
}
