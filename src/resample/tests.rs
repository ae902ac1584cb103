//! Tests for resample rules and aggregation

use super::*;
use crate::constants::metadata_keys::{HISTORY, TIME_COVERAGE_END, TIME_COVERAGE_START};
use crate::error::WaterFrameError;
use crate::frame::timestamps::{from_millis, to_millis};
use crate::test_utils::{create_depth_frame, create_hourly_frame, hourly_times, start_time};
use chrono::{Datelike, TimeZone, Utc};
use polars::df;

fn millis(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
    to_millis(Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap())
}

#[test]
fn test_parse_rules() {
    assert_eq!("30min".parse::<ResampleRule>().unwrap(), ResampleRule::Minutes(30));
    assert_eq!("T".parse::<ResampleRule>().unwrap(), ResampleRule::Minutes(1));
    assert_eq!("H".parse::<ResampleRule>().unwrap(), ResampleRule::Hours(1));
    assert_eq!("D".parse::<ResampleRule>().unwrap(), ResampleRule::Days(1));
    assert_eq!("2D".parse::<ResampleRule>().unwrap(), ResampleRule::Days(2));
    assert_eq!("W".parse::<ResampleRule>().unwrap(), ResampleRule::Weeks(1));
    assert_eq!("M".parse::<ResampleRule>().unwrap(), ResampleRule::Months(1));
    assert_eq!("3MS".parse::<ResampleRule>().unwrap(), ResampleRule::Months(3));
    assert_eq!("10S".parse::<ResampleRule>().unwrap(), ResampleRule::Seconds(10));
    assert_eq!(" 6 hours ".parse::<ResampleRule>().unwrap(), ResampleRule::Hours(6));
}

#[test]
fn test_parse_rejects_bad_rules() {
    for rule in ["", "30", "0D", "5X", "-1H"] {
        assert!(
            matches!(rule.parse::<ResampleRule>(), Err(WaterFrameError::InvalidRule { .. })),
            "rule '{}' should be rejected",
            rule
        );
    }
}

#[test]
fn test_display_round_trips_through_parse() {
    for rule in [
        ResampleRule::Seconds(10),
        ResampleRule::Minutes(30),
        ResampleRule::Hours(2),
        ResampleRule::Days(1),
        ResampleRule::Weeks(1),
        ResampleRule::Months(6),
    ] {
        assert_eq!(rule.to_string().parse::<ResampleRule>().unwrap(), rule);
    }
}

#[test]
fn test_fixed_buckets_align_to_epoch() {
    let time = millis(2024, 3, 1, 13, 47);

    assert_eq!(
        ResampleRule::Minutes(30).bucket_start(time).unwrap(),
        millis(2024, 3, 1, 13, 30)
    );
    assert_eq!(
        ResampleRule::Hours(6).bucket_start(time).unwrap(),
        millis(2024, 3, 1, 12, 0)
    );
    assert_eq!(
        ResampleRule::Days(1).bucket_start(time).unwrap(),
        millis(2024, 3, 1, 0, 0)
    );
}

#[test]
fn test_week_buckets_start_on_monday() {
    // 2024-03-01 is a Friday; the week began on Monday 2024-02-26
    let start = ResampleRule::Weeks(1)
        .bucket_start(millis(2024, 3, 1, 13, 47))
        .unwrap();

    assert_eq!(start, millis(2024, 2, 26, 0, 0));
    assert_eq!(from_millis(start).unwrap().weekday(), chrono::Weekday::Mon);
}

#[test]
fn test_month_buckets_start_on_first_day() {
    let time = millis(2024, 5, 17, 8, 0);

    assert_eq!(
        ResampleRule::Months(1).bucket_start(time).unwrap(),
        millis(2024, 5, 1, 0, 0)
    );
    // quarters counted from January 1970 start in Jan, Apr, Jul and Oct
    assert_eq!(
        ResampleRule::Months(3).bucket_start(time).unwrap(),
        millis(2024, 4, 1, 0, 0)
    );
}

#[test]
fn test_zero_width_rule_is_rejected() {
    assert!(ResampleRule::Hours(0).bucket_start(0).is_err());
    assert!(ResampleRule::Months(0).bucket_start(0).is_err());
}

#[test]
fn test_resample_time_series_mean() {
    // 48 hourly samples over two days
    let values: Vec<f64> = (0..48).map(|i| if i < 24 { 10.0 } else { 20.0 }).collect();
    let mut frame = create_hourly_frame("TEMP", values);

    let changed = frame
        .resample(&ResampleRule::Days(1), AggregationMethod::Mean)
        .unwrap();

    assert!(changed);
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.values("TEMP").unwrap(), vec![Some(10.0), Some(20.0)]);
    assert_eq!(
        frame.timestamps().unwrap(),
        vec![start_time(), start_time() + chrono::Duration::days(1)]
    );
}

#[test]
fn test_resample_max_and_min() {
    let frame = create_hourly_frame("TEMP", vec![1.0, 5.0, 3.0, 2.0]);
    let rule = ResampleRule::Hours(2);

    let max = frame.resampled(&rule, AggregationMethod::Max).unwrap().unwrap();
    let min = frame.resampled(&rule, AggregationMethod::Min).unwrap().unwrap();

    assert_eq!(max.values("TEMP").unwrap(), vec![Some(5.0), Some(3.0)]);
    assert_eq!(min.values("TEMP").unwrap(), vec![Some(1.0), Some(2.0)]);
}

#[test]
fn test_resample_resets_flags() {
    let frame = WaterFrame::builder()
        .time(hourly_times(4))
        .parameter_with_flags("TEMP", vec![1.0, 2.0, 3.0, 4.0], vec![1, 4, 9, 2])
        .parameter_with_flags("PSAL", vec![38.0, 38.1, 38.2, 38.3], vec![4, 4, 4, 4])
        .build()
        .unwrap();

    let resampled = frame
        .resampled(&ResampleRule::Hours(2), AggregationMethod::Mean)
        .unwrap()
        .unwrap();

    assert_eq!(resampled.flags("TEMP").unwrap(), vec![0, 0]);
    assert_eq!(resampled.flags("PSAL").unwrap(), vec![0, 0]);
    assert!(resampled.qc_syntax_test());
}

#[test]
fn test_resample_never_mixes_depths() {
    let frame = create_depth_frame(
        "TEMP",
        &[5.0, 20.0],
        &[vec![15.0, 17.0, 15.0, 17.0], vec![11.0, 13.0, 11.0, 13.0]],
    );

    let resampled = frame
        .resampled(&ResampleRule::Hours(2), AggregationMethod::Mean)
        .unwrap()
        .unwrap();

    assert_eq!(resampled.len(), 4);
    assert_eq!(resampled.depths().unwrap(), Some(vec![5.0, 5.0, 20.0, 20.0]));
    assert_eq!(
        resampled.values("TEMP").unwrap(),
        vec![Some(16.0), Some(16.0), Some(12.0), Some(12.0)]
    );
}

#[test]
fn test_resample_records_history_and_coverage() {
    let mut frame = create_hourly_frame("TEMP", vec![1.0; 30]);
    frame
        .metadata
        .insert(HISTORY.to_string(), "created".into());

    frame
        .resample(&ResampleRule::Hours(6), AggregationMethod::Mean)
        .unwrap();

    let history = frame.metadata[HISTORY].entries();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], "created");
    assert!(history[1].contains("resampled to 6H using mean"));
    assert_eq!(
        frame.metadata[TIME_COVERAGE_START].as_text(),
        Some("2024-03-01T00:00:00Z")
    );
    assert_eq!(
        frame.metadata[TIME_COVERAGE_END].as_text(),
        Some("2024-03-02T00:00:00Z")
    );
}

#[test]
fn test_resample_without_time_index_signals_failure() {
    let mut frame = WaterFrame::new();

    let changed = frame
        .resample(&ResampleRule::Days(1), AggregationMethod::Mean)
        .unwrap();

    assert!(!changed);
    assert!(frame
        .resampled(&ResampleRule::Days(1), AggregationMethod::Mean)
        .unwrap()
        .is_none());
}

#[test]
fn test_resample_keeps_missing_buckets_missing() {
    let data = df!(
        "TIME" => &["2024-03-01T00:00:00Z", "2024-03-01T01:00:00Z", "2024-03-01T02:00:00Z"],
        "TEMP" => &[Some(1.0), Some(3.0), None],
        "TEMP_QC" => &[1i32, 1, 9]
    )
    .unwrap();
    let frame = WaterFrame::from_dataframe(data).unwrap();

    let resampled = frame
        .resampled(&ResampleRule::Hours(2), AggregationMethod::Mean)
        .unwrap()
        .unwrap();

    assert_eq!(resampled.values("TEMP").unwrap(), vec![Some(2.0), None]);
}

#[test]
fn test_resample_skips_nan_samples() {
    let frame = create_hourly_frame("TEMP", vec![10.0, f64::NAN, 12.0]);
    let rule = ResampleRule::Days(1);

    let mean = frame.resampled(&rule, AggregationMethod::Mean).unwrap().unwrap();
    let max = frame.resampled(&rule, AggregationMethod::Max).unwrap().unwrap();
    let min = frame.resampled(&rule, AggregationMethod::Min).unwrap().unwrap();

    assert_eq!(mean.values("TEMP").unwrap(), vec![Some(11.0)]);
    assert_eq!(max.values("TEMP").unwrap(), vec![Some(12.0)]);
    assert_eq!(min.values("TEMP").unwrap(), vec![Some(10.0)]);
}

#[test]
fn test_resample_all_nan_bucket_is_missing() {
    let frame = create_hourly_frame("TEMP", vec![f64::NAN, f64::NAN, 7.0, 9.0]);

    let resampled = frame
        .resampled(&ResampleRule::Hours(2), AggregationMethod::Mean)
        .unwrap()
        .unwrap();

    assert_eq!(resampled.values("TEMP").unwrap(), vec![None, Some(8.0)]);
}
