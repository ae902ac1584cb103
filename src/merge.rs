//! Merging two tables side by side.
//!
//! `concat` lines two tables up on their shared index with a full outer
//! join and keeps every parameter of both. It does not stack rows: two
//! tables with the same parameters produce `P` and `P(NEW1)` columns.

use crate::config::acronym;
use crate::constants::{INDEX_COLUMNS, flags, is_flag_column};
use crate::error::{Result, WaterFrameError};
use crate::frame::WaterFrame;
use crate::frame::metadata::merge_metadata;
use polars::prelude::*;
use tracing::{debug, info};

/// First `P(NEWn)` name, n >= 1, not present in `taken`
pub fn next_suffix(parameter: &str, taken: &[String]) -> String {
    let base = acronym(parameter);
    (1..)
        .map(|n| format!("{}(NEW{})", base, n))
        .find(|candidate| !taken.iter().any(|name| name == candidate))
        .unwrap_or_else(|| format!("{}(NEW)", base))
}

fn describe_index(frame: &WaterFrame) -> String {
    frame
        .index_kind()
        .map(|kind| kind.to_string())
        .unwrap_or_else(|| "nothing".to_string())
}

impl WaterFrame {
    /// Merge `other` into this table
    pub fn concat(&mut self, other: &WaterFrame) -> Result<()> {
        *self = self.concatenated(other)?;
        Ok(())
    }

    /// Merged copy of this table and `other`
    ///
    /// Parameters of `other` whose names are taken here are renamed to
    /// `P(NEWn)` along with their flag columns. Rows present on one side
    /// only get flag 9 for the other side's parameters. Fails when both
    /// tables name different platforms or have different index shapes.
    pub fn concatenated(&self, other: &WaterFrame) -> Result<WaterFrame> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }

        let metadata = merge_metadata(&self.metadata, &other.metadata)?;

        let kind = match (self.index_kind(), other.index_kind()) {
            (Some(left), Some(right)) if left == right => left,
            _ => {
                return Err(WaterFrameError::IndexMismatch {
                    left: describe_index(self),
                    right: describe_index(other),
                });
            }
        };

        let mut right = other.clone();
        let mut taken: Vec<String> = self
            .column_names()
            .into_iter()
            .chain(other.column_names())
            .collect();
        for parameter in other.parameters() {
            if self.has_column(&parameter) {
                let renamed = next_suffix(&parameter, &taken);
                right.rename(&parameter, &renamed)?;
                info!("Renamed colliding parameter {} to {}", parameter, renamed);
                taken.push(renamed);
            }
        }

        let on: Vec<Expr> = INDEX_COLUMNS
            .iter()
            .filter(|name| self.has_column(name))
            .map(|name| col(*name))
            .collect();
        debug!("Joining {} and {} rows on {}", self.len(), right.len(), kind);

        let mut data = self
            .data()
            .clone()
            .lazy()
            .join(
                right.data().clone().lazy(),
                on.clone(),
                on,
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .collect()?;

        let flag_names: Vec<String> = data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| is_flag_column(name))
            .collect();
        for name in flag_names {
            let filled: Vec<i32> = data
                .column(&name)?
                .cast(&DataType::Int32)?
                .as_materialized_series()
                .i32()?
                .into_iter()
                .map(|flag| flag.unwrap_or(flags::MISSING))
                .collect();
            data.with_column(Column::new(name.as_str().into(), filled))?;
        }

        let mut vocabulary = self.vocabulary.clone();
        for (parameter, info) in right.vocabulary {
            vocabulary.entry(parameter).or_insert(info);
        }

        WaterFrame::from_parts(data, vocabulary, metadata)
    }
}
