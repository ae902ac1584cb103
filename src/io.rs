//! Reading and writing tables as CSV or Parquet files.
//!
//! The measurement table goes into the file itself. The vocabulary and
//! the dataset metadata travel in a JSON sidecar next to it, named
//! `<file>.metadata.json`. A missing sidecar reads as empty.

use crate::constants::{CSV_EXTENSIONS, PARQUET_EXTENSIONS, get_sidecar_filename};
use crate::error::{Result, WaterFrameError};
use crate::frame::WaterFrame;
use crate::frame::metadata::Metadata;
use crate::models::ParameterInfo;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk table encoding, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if CSV_EXTENSIONS.contains(&extension.as_str()) {
            Ok(TableFormat::Csv)
        } else if PARQUET_EXTENSIONS.contains(&extension.as_str()) {
            Ok(TableFormat::Parquet)
        } else {
            Err(WaterFrameError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Sidecar {
    #[serde(default)]
    vocabulary: BTreeMap<String, ParameterInfo>,
    #[serde(default)]
    metadata: Metadata,
}

/// Path of the JSON sidecar that accompanies a table file
pub fn sidecar_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(get_sidecar_filename(&name))
}

/// Load a table and its sidecar
///
/// Rows are sorted by the index on load. A text TIME column is parsed as
/// ISO-8601.
pub fn read_table(path: &Path) -> Result<WaterFrame> {
    let data = match TableFormat::from_path(path)? {
        TableFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        TableFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
    };

    let sidecar_file = sidecar_path(path);
    let sidecar: Sidecar = if sidecar_file.exists() {
        debug!("Reading sidecar {}", sidecar_file.display());
        serde_json::from_str(&std::fs::read_to_string(&sidecar_file)?)?
    } else {
        Sidecar::default()
    };

    let frame = WaterFrame::from_parts(data, sidecar.vocabulary, sidecar.metadata)?;
    info!(
        "Read {} rows and {} parameters from {}",
        frame.len(),
        frame.parameters().len(),
        path.display()
    );
    Ok(frame)
}

/// Write a table and its sidecar, replacing existing files
pub fn write_table(frame: &WaterFrame, path: &Path) -> Result<()> {
    let format = TableFormat::from_path(path)?;
    let mut data = frame.data().clone();

    match format {
        TableFormat::Csv => {
            let mut file = File::create(path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut data)?;
        }
        TableFormat::Parquet => {
            let file = File::create(path)?;
            ParquetWriter::new(file).finish(&mut data)?;
        }
    }

    let sidecar = Sidecar {
        vocabulary: frame.vocabulary.clone(),
        metadata: frame.metadata.clone(),
    };
    std::fs::write(sidecar_path(path), serde_json::to_string_pretty(&sidecar)?)?;

    info!("Wrote {} rows to {}", frame.len(), path.display());
    Ok(())
}
