//! Tests for the flat (stuck sensor) test

use super::*;
use crate::error::WaterFrameError;
use crate::qc::flat::{effective_window, flat_mask};
use crate::test_utils::{create_depth_frame, create_hourly_frame};

#[test]
fn test_flat_mask_flags_window_end() {
    let values: Vec<Option<f64>> = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]
        .into_iter()
        .map(Some)
        .collect();

    let mask = flat_mask(&values, 3);

    assert_eq!(mask, vec![false, false, true, false, false, true, true]);
}

#[test]
fn test_flat_mask_missing_value_breaks_window() {
    let values = vec![Some(1.0), Some(1.0), None, Some(1.0), Some(1.0), Some(1.0)];

    let mask = flat_mask(&values, 3);

    assert_eq!(mask, vec![false, false, false, false, false, true]);
}

#[test]
fn test_flat_mask_short_series() {
    let values = vec![Some(4.0), Some(4.0)];

    assert_eq!(flat_mask(&values, 3), vec![false, false]);
}

#[test]
fn test_zero_window_uses_default() {
    assert_eq!(effective_window(0), 3);
    assert_eq!(effective_window(5), 5);
}

#[test]
fn test_flat_test_flags_stuck_run() {
    let mut frame = create_hourly_frame("TEMP", vec![12.0, 12.1, 12.4, 12.4, 12.4, 12.4, 12.2]);

    let counts = frame.flat_test(&["TEMP"], 0, 4).unwrap();

    assert_eq!(counts["TEMP"], 2);
    assert_eq!(rows_flagged(&frame.flags("TEMP").unwrap(), 4), vec![4, 5]);
}

#[test]
fn test_flat_test_rejects_single_sample_window() {
    let mut frame = create_hourly_frame("TEMP", vec![1.0, 1.0]);

    let result = frame.flat_test(&["TEMP"], 1, 4);

    assert!(matches!(result, Err(WaterFrameError::Configuration { .. })));
}

#[test]
fn test_flat_test_does_not_cross_depths() {
    // the last samples at 5 m and the first at 20 m read 7.0; only a
    // window spanning both depths would be flat
    let mut frame = create_depth_frame(
        "TEMP",
        &[5.0, 20.0],
        &[vec![1.0, 7.0, 7.0], vec![7.0, 2.0, 3.0]],
    );

    let counts = frame.flat_test(&[], 3, 4).unwrap();

    assert_eq!(counts["TEMP"], 0);
}

#[test]
fn test_flat_test_matches_per_depth_runs() {
    let shallow = vec![3.0, 3.0, 3.0, 3.5, 3.6];
    let deep = vec![1.0, 1.2, 1.2, 1.2, 1.2];
    let mut combined = create_depth_frame("TEMP", &[5.0, 20.0], &[shallow.clone(), deep.clone()]);
    let mut shallow_frame = create_hourly_frame("TEMP", shallow);
    let mut deep_frame = create_hourly_frame("TEMP", deep);

    combined.flat_test(&["TEMP"], 3, 4).unwrap();
    shallow_frame.flat_test(&["TEMP"], 3, 4).unwrap();
    deep_frame.flat_test(&["TEMP"], 3, 4).unwrap();

    let mut expected = shallow_frame.flags("TEMP").unwrap();
    expected.extend(deep_frame.flags("TEMP").unwrap());
    assert_eq!(combined.flags("TEMP").unwrap(), expected);
    assert_eq!(rows_flagged(&expected, 4), vec![2, 8, 9]);
}

#[test]
fn test_with_flat_test_returns_copy() {
    let frame = create_hourly_frame("TEMP", vec![5.0, 5.0, 5.0]);

    let flagged = frame.with_flat_test(&["TEMP"], 3, 4).unwrap();

    assert_eq!(flagged.flags("TEMP").unwrap(), vec![0, 0, 4]);
    assert_eq!(frame.flags("TEMP").unwrap(), vec![0, 0, 0]);
}
