//! The WaterFrame time-series container.
//!
//! A [`WaterFrame`] owns a polars `DataFrame` of measurements, the
//! per-parameter vocabulary and the dataset metadata. Rows are indexed by
//! `TIME` and optionally `DEPTH`, and are always kept sorted by
//! (`DEPTH`, `TIME`) so that each depth forms one contiguous, time-ordered
//! run of rows. Every value column `P` is expected to have a paired flag
//! column `P_QC` holding OceanSITES codes.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use waterframe::WaterFrame;
//!
//! # fn example() -> waterframe::Result<()> {
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let times: Vec<_> = (0..4).map(|i| start + Duration::hours(i)).collect();
//!
//! let frame = WaterFrame::builder()
//!     .time(times)
//!     .parameter("TEMP", vec![13.1, 13.2, 13.2, 13.4])
//!     .metadata("platform_code", "OBSEA")
//!     .build()?;
//!
//! assert!(frame.qc_syntax_test());
//! assert_eq!(frame.parameters(), vec!["TEMP".to_string()]);
//! # Ok(())
//! # }
//! ```

pub mod metadata;
pub mod summary;
pub mod timestamps;


use crate::constants::{
    DEPTH, INDEX_COLUMNS, TIME, flag_column, flags, is_flag_column, is_index_column,
    metadata_keys::{TIME_COVERAGE_END, TIME_COVERAGE_START},
};
use crate::error::{Result, WaterFrameError};
use crate::models::{IndexKind, ParameterInfo, QcFlag};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

use self::metadata::{Metadata, MetadataValue};
use self::timestamps::{format_timestamp, from_millis, parse_timestamp, to_millis};

const DATETIME_MS: DataType = DataType::Datetime(TimeUnit::Milliseconds, None);

/// Time-series table of measurements, flags, vocabulary and metadata
#[derive(Debug, Clone, Default)]
pub struct WaterFrame {
    data: DataFrame,

    /// Parameter name -> descriptive attributes
    pub vocabulary: BTreeMap<String, ParameterInfo>,

    /// Dataset-level provenance
    pub metadata: Metadata,
}

/// One contiguous run of rows sharing a depth
#[derive(Debug, Clone, PartialEq)]
pub struct DepthGroup {
    /// `None` for TIME-only tables
    pub depth: Option<f64>,
    pub rows: Range<usize>,
}

impl WaterFrame {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a table column by column
    pub fn builder() -> WaterFrameBuilder {
        WaterFrameBuilder::default()
    }

    /// Wrap an existing DataFrame
    ///
    /// `TIME` may be a datetime, a date, integer epoch milliseconds or
    /// ISO-8601 text; it is normalised to `Datetime(ms)`. Rows are sorted by
    /// the index.
    pub fn from_dataframe(data: DataFrame) -> Result<Self> {
        Self::from_parts(data, BTreeMap::new(), Metadata::new())
    }

    pub fn from_parts(
        mut data: DataFrame,
        vocabulary: BTreeMap<String, ParameterInfo>,
        metadata: Metadata,
    ) -> Result<Self> {
        normalize_index(&mut data)?;
        normalize_flag_columns(&mut data)?;

        let mut frame = Self {
            data,
            vocabulary,
            metadata,
        };
        frame.sort_by_index()?;
        Ok(frame)
    }

    /// Underlying measurement table
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// True when the table has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0 || self.data.width() == 0
    }

    /// Index shape, or `None` when there is no TIME index
    pub fn index_kind(&self) -> Option<IndexKind> {
        if !self.has_column(TIME) {
            return None;
        }
        if self.has_column(DEPTH) {
            Some(IndexKind::DepthTime)
        } else {
            Some(IndexKind::Time)
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Value parameters: every column that is neither an index nor a flag
    pub fn parameters(&self) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| !is_index_column(name) && !is_flag_column(name))
            .collect()
    }

    /// Check that a parameter exists and carries its flag column
    pub fn require_parameter(&self, parameter: &str) -> Result<()> {
        if is_index_column(parameter) || is_flag_column(parameter) || !self.has_column(parameter)
        {
            return Err(WaterFrameError::unknown_parameter(parameter));
        }
        if !self.has_column(&flag_column(parameter)) {
            return Err(WaterFrameError::missing_flag_column(parameter));
        }
        Ok(())
    }

    /// Resolve a parameter selection; an empty selection means every parameter
    pub fn resolve_parameters(&self, parameters: &[&str]) -> Result<Vec<String>> {
        let selected: Vec<String> = if parameters.is_empty() {
            self.parameters()
        } else {
            parameters.iter().map(|name| name.to_string()).collect()
        };

        for parameter in &selected {
            self.require_parameter(parameter)?;
        }
        Ok(selected)
    }

    /// Values of a parameter; NaN is reported as missing
    pub fn values(&self, parameter: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .data
            .column(parameter)
            .map_err(|_| WaterFrameError::unknown_parameter(parameter))?
            .cast(&DataType::Float64)?;

        Ok(column
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|value| value.filter(|v| !v.is_nan()))
            .collect())
    }

    /// Flag codes of a parameter; null flags read as 0
    pub fn flags(&self, parameter: &str) -> Result<Vec<i32>> {
        let name = flag_column(parameter);
        let column = self
            .data
            .column(&name)
            .map_err(|_| WaterFrameError::missing_flag_column(parameter))?
            .cast(&DataType::Int32)?;

        Ok(column
            .as_materialized_series()
            .i32()?
            .into_iter()
            .map(|flag| flag.unwrap_or(flags::NO_QC))
            .collect())
    }

    /// Overwrite the flag column of a parameter
    pub fn set_flags(&mut self, parameter: &str, values: Vec<i32>) -> Result<()> {
        if values.len() != self.len() {
            return Err(WaterFrameError::InvalidIndex {
                reason: format!(
                    "{} flags supplied for {} rows of {}",
                    values.len(),
                    self.len(),
                    parameter
                ),
            });
        }
        for value in &values {
            QcFlag::check(*value)?;
        }

        let name = flag_column(parameter);
        self.data
            .with_column(Column::new(name.as_str().into(), values))?;
        Ok(())
    }

    /// TIME index as epoch milliseconds
    pub fn times(&self) -> Result<Vec<i64>> {
        let column = self
            .data
            .column(TIME)
            .map_err(|_| WaterFrameError::MissingIndex {
                column: TIME.to_string(),
            })?
            .cast(&DataType::Int64)?;

        column
            .as_materialized_series()
            .i64()?
            .into_iter()
            .map(|value| {
                value.ok_or_else(|| WaterFrameError::InvalidIndex {
                    reason: "TIME contains null values".to_string(),
                })
            })
            .collect()
    }

    pub fn timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        self.times()?.into_iter().map(from_millis).collect()
    }

    /// DEPTH index, if the table has one
    pub fn depths(&self) -> Result<Option<Vec<f64>>> {
        if !self.has_column(DEPTH) {
            return Ok(None);
        }
        let column = self.data.column(DEPTH)?.cast(&DataType::Float64)?;
        let depths = column
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|value| {
                value.ok_or_else(|| WaterFrameError::InvalidIndex {
                    reason: "DEPTH contains null values".to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Some(depths))
    }

    /// Contiguous row runs, one per depth
    ///
    /// Rows inside each group are in ascending TIME order. A TIME-only
    /// table yields a single group spanning every row.
    pub fn depth_groups(&self) -> Result<Vec<DepthGroup>> {
        if self.index_kind().is_none() {
            return Err(WaterFrameError::MissingIndex {
                column: TIME.to_string(),
            });
        }

        let Some(depths) = self.depths()? else {
            return Ok(vec![DepthGroup {
                depth: None,
                rows: 0..self.len(),
            }]);
        };

        let mut groups: Vec<DepthGroup> = Vec::new();
        for (row, depth) in depths.iter().enumerate() {
            match groups.last_mut() {
                Some(group) if group.depth == Some(*depth) => group.rows.end = row + 1,
                _ => groups.push(DepthGroup {
                    depth: Some(*depth),
                    rows: row..row + 1,
                }),
            }
        }
        Ok(groups)
    }

    /// Keep only the rows whose mask entry is true
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<usize> {
        if keep.len() != self.len() {
            return Err(WaterFrameError::InvalidIndex {
                reason: format!("row mask of {} for {} rows", keep.len(), self.len()),
            });
        }
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        let before = self.len();
        self.data = self.data.filter(&mask)?;
        Ok(before - self.len())
    }

    /// Remove a parameter, its flag column and its vocabulary entry
    pub fn remove_parameter(&mut self, parameter: &str) -> Result<()> {
        if !self.has_column(parameter) || is_index_column(parameter) {
            return Err(WaterFrameError::unknown_parameter(parameter));
        }
        self.data = self.data.drop(parameter)?;
        let flag_name = flag_column(parameter);
        if self.has_column(&flag_name) {
            self.data = self.data.drop(&flag_name)?;
        }
        self.vocabulary.remove(parameter);
        Ok(())
    }

    /// Rename a parameter together with its flag column and vocabulary
    pub fn rename(&mut self, parameter: &str, new_name: &str) -> Result<()> {
        if !self.has_column(parameter) || is_index_column(parameter) || is_flag_column(parameter)
        {
            return Err(WaterFrameError::unknown_parameter(parameter));
        }
        if is_flag_column(new_name) || is_index_column(new_name) || self.has_column(new_name) {
            return Err(WaterFrameError::configuration(format!(
                "Cannot rename {} to {}: name is reserved or already in use",
                parameter, new_name
            )));
        }

        self.data.rename(parameter, new_name.into())?;
        let old_flag = flag_column(parameter);
        if self.has_column(&old_flag) {
            self.data
                .rename(&old_flag, flag_column(new_name).as_str().into())?;
        }
        if let Some(mut info) = self.vocabulary.remove(parameter) {
            if info.ancillary_variables.is_some() {
                info.ancillary_variables = Some(flag_column(new_name));
            }
            self.vocabulary.insert(new_name.to_string(), info);
        }
        Ok(())
    }

    /// Add `P_QC = 0` for every parameter that lacks a flag column
    pub fn ensure_flag_columns(&mut self) -> Result<Vec<String>> {
        let mut added = Vec::new();
        for parameter in self.parameters() {
            let name = flag_column(&parameter);
            if !self.has_column(&name) {
                self.data.with_column(Column::new(
                    name.as_str().into(),
                    vec![flags::NO_QC; self.len()],
                ))?;
                added.push(name);
            }
        }
        if !added.is_empty() {
            debug!("Added missing flag columns: {:?}", added);
        }
        Ok(added)
    }

    /// Keep rows with `start <= TIME <= end`
    pub fn slice_time(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<usize> {
        let (start, end) = (to_millis(start), to_millis(end));
        let keep: Vec<bool> = self
            .times()?
            .into_iter()
            .map(|time| start <= time && time <= end)
            .collect();
        self.retain_rows(&keep)
    }

    /// First and last TIME of the table
    pub fn time_coverage(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let times = self.times()?;
        match (times.iter().min(), times.iter().max()) {
            (Some(first), Some(last)) => Ok(Some((from_millis(*first)?, from_millis(*last)?))),
            _ => Ok(None),
        }
    }

    /// Rewrite `time_coverage_start` / `time_coverage_end` from the data
    pub fn update_time_coverage(&mut self) -> Result<()> {
        if let Some((first, last)) = self.time_coverage()? {
            self.metadata.insert(
                TIME_COVERAGE_START.to_string(),
                MetadataValue::Text(format_timestamp(first)),
            );
            self.metadata.insert(
                TIME_COVERAGE_END.to_string(),
                MetadataValue::Text(format_timestamp(last)),
            );
        }
        Ok(())
    }

    pub(crate) fn sort_by_index(&mut self) -> Result<()> {
        let by: Vec<Expr> = INDEX_COLUMNS
            .iter()
            .filter(|name| self.has_column(name))
            .map(|name| col(*name))
            .collect();
        if by.is_empty() || self.len() < 2 {
            return Ok(());
        }

        self.data = self
            .data
            .clone()
            .lazy()
            .sort_by_exprs(by, SortMultipleOptions::default().with_maintain_order(true))
            .collect()?;
        Ok(())
    }
}

/// Cast TIME to `Datetime(ms)` and DEPTH to `Float64`
fn normalize_index(data: &mut DataFrame) -> Result<()> {
    if data.width() == 0 {
        return Ok(());
    }

    let time = data.column(TIME).map_err(|_| WaterFrameError::MissingIndex {
        column: TIME.to_string(),
    })?;
    let millis = time_to_millis(time)?;
    data.with_column(Column::new(TIME.into(), millis).cast(&DATETIME_MS)?)?;

    if let Ok(depth) = data.column(DEPTH) {
        let depth = depth.cast(&DataType::Float64)?;
        if depth.null_count() > 0 {
            return Err(WaterFrameError::InvalidIndex {
                reason: "DEPTH contains null values".to_string(),
            });
        }
        data.with_column(depth)?;
    }
    Ok(())
}

fn time_to_millis(time: &Column) -> Result<Vec<i64>> {
    match time.dtype() {
        DataType::String => time
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|value| {
                let value = value.ok_or_else(null_time)?;
                parse_timestamp(value).map(to_millis)
            })
            .collect(),
        DataType::Datetime(unit, _) => match unit {
            TimeUnit::Nanoseconds => physical_millis(time, |v| v.div_euclid(1_000_000)),
            TimeUnit::Microseconds => physical_millis(time, |v| v.div_euclid(1_000)),
            TimeUnit::Milliseconds => physical_millis(time, |v| v),
        },
        DataType::Date => {
            let days = time.cast(&DataType::Int32)?;
            days.as_materialized_series()
                .i32()?
                .into_iter()
                .map(|value| {
                    value
                        .map(|day| i64::from(day) * 86_400_000)
                        .ok_or_else(null_time)
                })
                .collect()
        }
        dtype if dtype.is_integer() => physical_millis(time, |v| v),
        other => Err(WaterFrameError::InvalidIndex {
            reason: format!("TIME has unsupported type {}", other),
        }),
    }
}

fn physical_millis(column: &Column, scale: impl Fn(i64) -> i64) -> Result<Vec<i64>> {
    let physical = column.cast(&DataType::Int64)?;
    physical
        .as_materialized_series()
        .i64()?
        .into_iter()
        .map(|value| value.map(&scale).ok_or_else(null_time))
        .collect()
}

fn null_time() -> WaterFrameError {
    WaterFrameError::InvalidIndex {
        reason: "TIME contains null values".to_string(),
    }
}

/// Flag columns are stored as Int32
fn normalize_flag_columns(data: &mut DataFrame) -> Result<()> {
    let flag_names: Vec<String> = data
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| is_flag_column(name))
        .collect();

    for name in flag_names {
        let column = data.column(&name)?;
        if column.dtype() != &DataType::Int32 {
            let cast = column.cast(&DataType::Int32)?;
            data.with_column(cast)?;
        }
    }
    Ok(())
}

/// Column-by-column construction of a [`WaterFrame`]
#[derive(Debug, Default)]
pub struct WaterFrameBuilder {
    times: Vec<i64>,
    depths: Option<Vec<f64>>,
    parameters: Vec<(String, Vec<Option<f64>>, Option<Vec<i32>>)>,
    vocabulary: BTreeMap<String, ParameterInfo>,
    metadata: Metadata,
}

impl WaterFrameBuilder {
    pub fn time(mut self, times: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        self.times = times.into_iter().map(to_millis).collect();
        self
    }

    pub fn depth(mut self, depths: impl IntoIterator<Item = f64>) -> Self {
        self.depths = Some(depths.into_iter().collect());
        self
    }

    /// Add a parameter whose flags start at 0 (no QC)
    pub fn parameter<V: Into<Option<f64>>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.parameters.push((name.to_string(), values, None));
        self
    }

    pub fn parameter_with_flags<V: Into<Option<f64>>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
        flags: Vec<i32>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.parameters.push((name.to_string(), values, Some(flags)));
        self
    }

    pub fn info(mut self, parameter: &str, info: ParameterInfo) -> Self {
        self.vocabulary.insert(parameter.to_string(), info);
        self
    }

    pub fn metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Result<WaterFrame> {
        let rows = self.times.len();
        let mut columns = vec![Column::new(TIME.into(), self.times)];

        if let Some(depths) = self.depths {
            check_length(DEPTH, depths.len(), rows)?;
            columns.push(Column::new(DEPTH.into(), depths));
        }

        for (name, values, flag_values) in self.parameters {
            if is_index_column(&name) || is_flag_column(&name) {
                return Err(WaterFrameError::configuration(format!(
                    "'{}' cannot be used as a parameter name",
                    name
                )));
            }
            check_length(&name, values.len(), rows)?;
            let flag_values = flag_values.unwrap_or_else(|| vec![flags::NO_QC; rows]);
            check_length(&flag_column(&name), flag_values.len(), rows)?;
            for flag in &flag_values {
                QcFlag::check(*flag)?;
            }

            columns.push(Column::new(name.as_str().into(), values));
            columns.push(Column::new(flag_column(&name).as_str().into(), flag_values));
        }

        let data = DataFrame::new(columns)?;
        WaterFrame::from_parts(data, self.vocabulary, self.metadata)
    }
}

fn check_length(name: &str, length: usize, rows: usize) -> Result<()> {
    if length != rows {
        return Err(WaterFrameError::InvalidIndex {
            reason: format!("column {} has {} values for {} timestamps", name, length, rows),
        });
    }
    Ok(())
}
