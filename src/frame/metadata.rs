//! Dataset-level metadata and its merge rules.
//!
//! Metadata is free-form key/value provenance (platform code, institution,
//! time coverage, history). Three keys merge specially: the coverage bounds
//! widen to the union of both ranges and `history` is appended.

use crate::constants::metadata_keys::{
    HISTORY, PLATFORM_CODE, TIME_COVERAGE_END, TIME_COVERAGE_START,
};
use crate::error::{Result, WaterFrameError};
use crate::frame::timestamps::parse_timestamp;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A metadata value: text, or a list of text entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
}

pub type Metadata = BTreeMap<String, MetadataValue>;

impl MetadataValue {
    /// Entries as a list, a text value being a single entry
    pub fn entries(&self) -> Vec<String> {
        match self {
            MetadataValue::Text(text) => vec![text.clone()],
            MetadataValue::List(list) => list.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            MetadataValue::List(_) => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        MetadataValue::List(value)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(text) => write!(f, "{}", text),
            MetadataValue::List(list) => write!(f, "{}", list.join(", ")),
        }
    }
}

/// Append one entry to the `history` key
pub fn append_history(metadata: &mut Metadata, entry: impl Into<String>) {
    let mut entries = metadata
        .get(HISTORY)
        .map(MetadataValue::entries)
        .unwrap_or_default();
    entries.push(entry.into());
    metadata.insert(HISTORY.to_string(), MetadataValue::List(entries));
}

/// Merge the metadata of two tables
///
/// Disagreeing platform identity is refused outright.
pub fn merge_metadata(left: &Metadata, right: &Metadata) -> Result<Metadata> {
    if let (Some(a), Some(b)) = (left.get(PLATFORM_CODE), right.get(PLATFORM_CODE)) {
        if a != b {
            return Err(WaterFrameError::NotSupported {
                reason: format!(
                    "concatenating tables from different platforms ({} and {})",
                    a, b
                ),
            });
        }
    }

    let mut merged = left.clone();

    for (key, value) in right {
        let Some(existing) = left.get(key) else {
            merged.insert(key.clone(), value.clone());
            continue;
        };

        if existing == value && key != HISTORY {
            continue;
        }

        let combined = match key.as_str() {
            TIME_COVERAGE_START => pick_time(existing, value, Ordering::Less),
            TIME_COVERAGE_END => pick_time(existing, value, Ordering::Greater),
            HISTORY => {
                let mut entries = existing.entries();
                entries.extend(value.entries());
                MetadataValue::List(entries)
            }
            _ => join_values(existing, value),
        };
        merged.insert(key.clone(), combined);
    }

    Ok(merged)
}

/// Keep whichever bound compares as `keep` (earlier or later)
fn pick_time(existing: &MetadataValue, incoming: &MetadataValue, keep: Ordering) -> MetadataValue {
    let (Some(a), Some(b)) = (existing.as_text(), incoming.as_text()) else {
        return existing.clone();
    };

    let ordering = match (parse_timestamp(a), parse_timestamp(b)) {
        (Ok(a_time), Ok(b_time)) => b_time.cmp(&a_time),
        // ISO strings still order correctly as text
        _ => b.cmp(a),
    };

    if ordering == keep {
        incoming.clone()
    } else {
        existing.clone()
    }
}

fn join_values(existing: &MetadataValue, incoming: &MetadataValue) -> MetadataValue {
    match (existing, incoming) {
        (MetadataValue::Text(a), MetadataValue::Text(b)) => {
            MetadataValue::Text(format!("{}, {}", a, b))
        }
        _ => {
            let mut entries = existing.entries();
            for entry in incoming.entries() {
                if !entries.contains(&entry) {
                    entries.push(entry);
                }
            }
            MetadataValue::List(entries)
        }
    }
}
