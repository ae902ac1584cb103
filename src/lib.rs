//! WaterFrame Library
//!
//! A Rust library for quality control of ocean-observatory time series held
//! in a uniform TIME / DEPTH indexed table with OceanSITES flag columns.
//!
//! This library provides tools for:
//! - Range, flat-line and spike tests that write flags per depth
//! - Reconciling flags: translation, reset, finalization and flag filters
//! - Resampling to coarser time buckets without mixing depths
//! - Concatenating tables with collision-safe parameter renaming
//! - Reading and writing CSV or Parquet tables with a JSON metadata sidecar

pub mod config;
pub mod constants;
pub mod error;
pub mod flags;
pub mod frame;
pub mod io;
pub mod merge;
pub mod models;
pub mod qc;
pub mod resample;

// CLI modules
pub mod cli;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::{QcConfig, RangeLimits, SpikeConfig};
pub use error::{Result, WaterFrameError};
pub use frame::metadata::MetadataValue;
pub use frame::{DepthGroup, WaterFrame, WaterFrameBuilder};
pub use io::{read_table, write_table};
pub use models::{AggregationMethod, IndexKind, ParameterInfo, QcFlag};
pub use qc::{FlagCounts, QcReport};
pub use resample::ResampleRule;
