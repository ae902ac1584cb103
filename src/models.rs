//! Core data structures and types for WaterFrame.
//!
//! Defines the OceanSITES flag vocabulary, per-parameter descriptive
//! attributes, index shapes, aggregation methods and summary structures
//! used throughout the library.

use crate::constants::{self, flags};
use crate::error::{Result, WaterFrameError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Quality Flags
// =============================================================================

/// OceanSITES quality flag
///
/// The closed 0..=9 domain every QC operation writes into. Any other
/// integer is rejected at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum QcFlag {
    NoQc = flags::NO_QC,
    Good = flags::GOOD,
    ProbablyGood = flags::PROBABLY_GOOD,
    PotentiallyCorrectable = flags::POTENTIALLY_CORRECTABLE,
    Bad = flags::BAD,
    Modified = flags::MODIFIED,
    FlaggedLand = flags::FLAGGED_LAND,
    Nominal = flags::NOMINAL,
    Interpolated = flags::INTERPOLATED,
    Missing = flags::MISSING,
}

impl QcFlag {
    /// Integer code of this flag
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description of this flag
    pub fn description(self) -> &'static str {
        constants::flag_description(self.code())
    }

    /// Validate a raw flag code without converting it
    pub fn check(value: i32) -> Result<i32> {
        QcFlag::try_from(value).map(QcFlag::code)
    }
}

impl TryFrom<i32> for QcFlag {
    type Error = WaterFrameError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            flags::NO_QC => Ok(QcFlag::NoQc),
            flags::GOOD => Ok(QcFlag::Good),
            flags::PROBABLY_GOOD => Ok(QcFlag::ProbablyGood),
            flags::POTENTIALLY_CORRECTABLE => Ok(QcFlag::PotentiallyCorrectable),
            flags::BAD => Ok(QcFlag::Bad),
            flags::MODIFIED => Ok(QcFlag::Modified),
            flags::FLAGGED_LAND => Ok(QcFlag::FlaggedLand),
            flags::NOMINAL => Ok(QcFlag::Nominal),
            flags::INTERPOLATED => Ok(QcFlag::Interpolated),
            flags::MISSING => Ok(QcFlag::Missing),
            _ => Err(WaterFrameError::InvalidFlag { value }),
        }
    }
}

impl fmt::Display for QcFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Parameter Vocabulary
// =============================================================================

/// Descriptive attributes of a parameter
///
/// Informational only: QC ranges come from [`crate::config::RangeLimits`],
/// never from `valid_min` / `valid_max`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_max: Option<f64>,

    /// Name of the linked flag variable, usually `<P>_QC`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ancillary_variables: Option<String>,
}

impl ParameterInfo {
    pub fn new(long_name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            long_name: Some(long_name.into()),
            units: Some(units.into()),
            ..Default::default()
        }
    }

    pub fn with_valid_range(mut self, min: f64, max: f64) -> Self {
        self.valid_min = Some(min);
        self.valid_max = Some(max);
        self
    }
}

// =============================================================================
// Index Shape
// =============================================================================

/// Row addressing scheme of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// Single fixed-depth time series
    Time,
    /// Profiling / multi-depth instrument
    DepthTime,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Time => write!(f, "(TIME)"),
            IndexKind::DepthTime => write!(f, "(DEPTH, TIME)"),
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Aggregation applied to each resample bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    #[default]
    Mean,
    Max,
    Min,
}

impl FromStr for AggregationMethod {
    type Err = WaterFrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(AggregationMethod::Mean),
            "max" => Ok(AggregationMethod::Max),
            "min" => Ok(AggregationMethod::Min),
            other => Err(WaterFrameError::configuration(format!(
                "Unknown aggregation method '{}': expected mean, max or min",
                other
            ))),
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMethod::Mean => write!(f, "mean"),
            AggregationMethod::Max => write!(f, "max"),
            AggregationMethod::Min => write!(f, "min"),
        }
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Descriptive statistics of one parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub parameter: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Number of rows carrying each flag code 0..=9
    pub flag_counts: [usize; 10],
}

impl ParameterSummary {
    /// Share of non-missing samples flagged good (1) or probably good (2)
    pub fn good_fraction(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let good = self.flag_counts[flags::GOOD as usize]
            + self.flag_counts[flags::PROBABLY_GOOD as usize];
        good as f64 / self.count as f64
    }
}
