//! Application constants for WaterFrame
//!
//! This module contains the OceanSITES flag codes, index column names,
//! QC defaults and the metadata keys that merges treat specially.

// =============================================================================
// Index and Column Names
// =============================================================================

/// Time index column (always present)
pub const TIME: &str = "TIME";

/// Depth index column (profiling / multi-depth instruments)
pub const DEPTH: &str = "DEPTH";

/// Suffix that marks a flag column, e.g. `TEMP_QC`
pub const QC_SUFFIX: &str = "_QC";

/// Index columns in canonical sort order
pub const INDEX_COLUMNS: &[&str] = &[DEPTH, TIME];

// =============================================================================
// Quality Control Constants
// =============================================================================

/// OceanSITES quality flag codes
pub mod flags {
    /// No QC was performed
    pub const NO_QC: i32 = 0;

    /// Good data
    pub const GOOD: i32 = 1;

    /// Probably good data
    pub const PROBABLY_GOOD: i32 = 2;

    /// Bad data that are potentially correctable
    pub const POTENTIALLY_CORRECTABLE: i32 = 3;

    /// Bad data
    pub const BAD: i32 = 4;

    /// Value changed
    pub const MODIFIED: i32 = 5;

    /// Value flagged as over land
    pub const FLAGGED_LAND: i32 = 6;

    /// Nominal value
    pub const NOMINAL: i32 = 7;

    /// Interpolated value
    pub const INTERPOLATED: i32 = 8;

    /// Missing value
    pub const MISSING: i32 = 9;

    /// Every valid flag code in ascending order
    pub const ALL: &[i32] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
}

/// Default flag written by the range, flat and spike tests
pub const DEFAULT_TEST_FLAG: i32 = flags::BAD;

/// Window used by the flat test when the caller passes 0
pub const DEFAULT_FLAT_WINDOW: usize = 3;

/// Spike test auto-window: fraction of the series length
pub const SPIKE_AUTO_WINDOW_FRACTION: f64 = 0.05;

/// Spike test auto-window bounds
pub const SPIKE_MIN_WINDOW: usize = 3;
pub const SPIKE_MAX_WINDOW: usize = 100;

/// Spike test defaults
pub const DEFAULT_SPIKE_THRESHOLD: f64 = 3.5;
pub const DEFAULT_SPIKE_INFLUENCE: f64 = 0.5;

/// Physically plausible (min, max) bounds per parameter acronym
pub const DEFAULT_RANGE_LIMITS: &[(&str, f64, f64)] = &[
    ("TEMP", 0.0, 50.0),
    ("PSAL", 0.0, 40.0),
    ("CNDC", 0.0, 7.0),
    ("PRES", 0.0, 12000.0),
    ("DOX1", 0.0, 15.0),
    ("DOX2", 0.0, 650.0),
    ("DOXY", 0.0, 650.0),
    ("CPHL", 0.0, 100.0),
    ("TUR4", 0.0, 1000.0),
    ("SVEL", 1400.0, 1600.0),
    ("ATMS", 850.0, 1060.0),
    ("DRYT", -50.0, 50.0),
    ("RELH", 0.0, 100.0),
    ("WSPD", 0.0, 80.0),
    ("WDIR", 0.0, 360.0),
    ("HCSP", 0.0, 10.0),
    ("HCDT", 0.0, 360.0),
];

// =============================================================================
// Metadata Keys
// =============================================================================

/// Dataset metadata keys with merge semantics of their own
pub mod metadata_keys {
    pub const TIME_COVERAGE_START: &str = "time_coverage_start";
    pub const TIME_COVERAGE_END: &str = "time_coverage_end";
    pub const HISTORY: &str = "history";

    /// Keys whose disagreement makes two tables unmergeable
    pub const PLATFORM_CODE: &str = "platform_code";
}

/// Timestamp format written into metadata
pub const METADATA_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Text timestamp formats accepted by the table reader, tried in order
pub const ACCEPTED_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only format accepted by the table reader
pub const ACCEPTED_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// File Formats
// =============================================================================

/// Extensions read and written as CSV
pub const CSV_EXTENSIONS: &[&str] = &["csv", "txt"];

/// Extensions read and written as Parquet
pub const PARQUET_EXTENSIONS: &[&str] = &["parquet", "pq"];

/// Suffix of the JSON file holding vocabulary and metadata next to a table
pub const SIDECAR_SUFFIX: &str = ".metadata.json";

// =============================================================================
// Helper Functions
// =============================================================================

/// Get flag description for human-readable output
pub fn flag_description(flag: i32) -> &'static str {
    match flag {
        flags::NO_QC => "No QC performed",
        flags::GOOD => "Good data",
        flags::PROBABLY_GOOD => "Probably good data",
        flags::POTENTIALLY_CORRECTABLE => "Bad data, potentially correctable",
        flags::BAD => "Bad data",
        flags::MODIFIED => "Value modified",
        flags::FLAGGED_LAND => "Flagged as land",
        flags::NOMINAL => "Nominal value",
        flags::INTERPOLATED => "Interpolated value",
        flags::MISSING => "Missing value",
        _ => "Invalid flag",
    }
}

/// Check if a column name represents a flag column
pub fn is_flag_column(column_name: &str) -> bool {
    column_name.ends_with(QC_SUFFIX)
}

/// Check if a column name is one of the index columns
pub fn is_index_column(column_name: &str) -> bool {
    INDEX_COLUMNS.contains(&column_name)
}

/// Name of the flag column paired with a parameter
pub fn flag_column(parameter: &str) -> String {
    format!("{}{}", parameter, QC_SUFFIX)
}

/// Extract the parameter name from a flag column name
pub fn parameter_from_flag_column(flag_column: &str) -> Option<&str> {
    flag_column.strip_suffix(QC_SUFFIX)
}

/// Sidecar filename for a table file, e.g. `obsea.csv.metadata.json`
pub fn get_sidecar_filename(table_filename: &str) -> String {
    format!("{}{}", table_filename, SIDECAR_SUFFIX)
}
