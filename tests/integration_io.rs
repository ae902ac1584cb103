//! Integration tests for table persistence
//!
//! Tables are written to a temporary directory and read back, checking that
//! values, flags, vocabulary and metadata survive in both file formats.

use chrono::{Duration, TimeZone, Utc};
use std::path::Path;
use tempfile::TempDir;
use waterframe::constants::flags;
use waterframe::io::sidecar_path;
use waterframe::{
    IndexKind, MetadataValue, ParameterInfo, WaterFrame, WaterFrameError, read_table,
    write_table,
};

/// Two-depth mooring with temperature and a partly missing salinity record
fn create_mooring_frame() -> WaterFrame {
    let start = Utc.with_ymd_and_hms(2023, 7, 14, 12, 0, 0).unwrap();
    let times: Vec<_> = (0..3)
        .chain(0..3)
        .map(|i| start + Duration::minutes(30 * i))
        .collect();

    WaterFrame::builder()
        .time(times)
        .depth(vec![2.0, 2.0, 2.0, 18.0, 18.0, 18.0])
        .parameter_with_flags(
            "TEMP",
            vec![21.4, 21.5, 21.3, 16.2, 16.1, 16.3],
            vec![1, 1, 4, 1, 2, 1],
        )
        .parameter_with_flags(
            "PSAL",
            vec![Some(38.1), None, Some(38.0), Some(38.2), Some(38.2), None],
            vec![1, 9, 1, 1, 1, 9],
        )
        .info("TEMP", ParameterInfo::new("Sea temperature", "degrees_C"))
        .metadata("platform_code", "OBSEA")
        .metadata("site_code", "Vilanova i la Geltru")
        .build()
        .unwrap()
}

fn assert_same_content(original: &WaterFrame, restored: &WaterFrame) {
    assert_eq!(restored.index_kind(), Some(IndexKind::DepthTime));
    assert_eq!(restored.len(), original.len());
    assert_eq!(restored.timestamps().unwrap(), original.timestamps().unwrap());
    assert_eq!(restored.depths().unwrap(), original.depths().unwrap());
    for parameter in ["TEMP", "PSAL"] {
        assert_eq!(restored.values(parameter).unwrap(), original.values(parameter).unwrap());
        assert_eq!(restored.flags(parameter).unwrap(), original.flags(parameter).unwrap());
    }
    assert_eq!(
        restored.vocabulary["TEMP"].units.as_deref(),
        Some("degrees_C")
    );
    assert_eq!(
        restored.metadata["platform_code"],
        MetadataValue::Text("OBSEA".to_string())
    );
    assert!(restored.qc_syntax_test());
}

#[test]
fn test_csv_round_trip_with_sidecar() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("obsea.csv");
    let frame = create_mooring_frame();

    write_table(&frame, &path).unwrap();
    assert!(path.exists());
    assert!(sidecar_path(&path).exists());

    let restored = read_table(&path).unwrap();
    assert_same_content(&frame, &restored);
}

#[test]
fn test_parquet_round_trip_with_sidecar() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("obsea.parquet");
    let frame = create_mooring_frame();

    write_table(&frame, &path).unwrap();
    let restored = read_table(&path).unwrap();

    assert_same_content(&frame, &restored);
}

#[test]
fn test_missing_sidecar_reads_empty_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bare.csv");
    std::fs::write(
        &path,
        "TIME,TEMP,TEMP_QC\n2024-01-01T00:00:00Z,13.5,0\n2024-01-01T01:00:00Z,13.6,0\n",
    )
    .unwrap();

    let frame = read_table(&path).unwrap();

    assert_eq!(frame.index_kind(), Some(IndexKind::Time));
    assert!(frame.metadata.is_empty());
    assert!(frame.vocabulary.is_empty());
    assert_eq!(frame.flags("TEMP").unwrap(), vec![flags::NO_QC, flags::NO_QC]);
}

#[test]
fn test_qc_result_survives_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("checked.parquet");
    let mut frame = create_mooring_frame();
    frame.reset_flag("TEMP", flags::NO_QC).unwrap();
    frame
        .range_test(&["TEMP"], Some((16.15, 21.45)), &Default::default(), flags::BAD)
        .unwrap();

    write_table(&frame, &path).unwrap();
    let restored = read_table(&path).unwrap();

    // rows are (2.0, 12:00) (2.0, 12:30) (2.0, 13:00) (18.0, 12:00) ...
    assert_eq!(restored.flags("TEMP").unwrap(), vec![0, 4, 0, 0, 4, 0]);
}

#[test]
fn test_unknown_extension_is_rejected() {
    let frame = create_mooring_frame();
    let result = write_table(&frame, Path::new("/tmp/obsea.nc"));

    assert!(matches!(result, Err(WaterFrameError::UnsupportedFormat { .. })));
}
