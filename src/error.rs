//! Error handling for WaterFrame operations.
//!
//! Provides error types with context for table construction, QC tests,
//! flag reconciliation, resampling and merging.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaterFrameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parameter '{parameter}' has no paired flag column '{parameter}_QC'")]
    MissingFlagColumn { parameter: String },

    #[error("Unknown parameter: {parameter}")]
    UnknownParameter { parameter: String },

    #[error("Missing index column: {column}")]
    MissingIndex { column: String },

    #[error("Invalid index: {reason}")]
    InvalidIndex { reason: String },

    #[error("Invalid QC flag {value}: flags must lie in 0..=9")]
    InvalidFlag { value: i32 },

    #[error("Index mismatch: left table is indexed by {left}, right table by {right}")]
    IndexMismatch { left: String, right: String },

    #[error("Operation not supported: {reason}")]
    NotSupported { reason: String },

    #[error("Cannot parse timestamp '{value}'")]
    TimeParse { value: String },

    #[error("Invalid resample rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Unsupported table format for file: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl WaterFrameError {
    pub fn missing_flag_column(parameter: impl Into<String>) -> Self {
        Self::MissingFlagColumn {
            parameter: parameter.into(),
        }
    }

    pub fn unknown_parameter(parameter: impl Into<String>) -> Self {
        Self::UnknownParameter {
            parameter: parameter.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WaterFrameError>;
