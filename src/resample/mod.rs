//! Time-bucketed aggregation
//!
//! Resampling replaces the rows of a table with one row per time bucket
//! (per depth, for depth-indexed tables). Each parameter is aggregated with
//! the chosen [`AggregationMethod`]. The QC verdicts of the original rows do
//! not carry over to an aggregate, so every flag column comes back as 0.

pub mod bucket;

#[cfg(test)]
pub mod tests;

pub use bucket::ResampleRule;

use crate::constants::{DEPTH, TIME, flag_column, flags};
use crate::error::Result;
use crate::frame::WaterFrame;
use crate::frame::metadata::append_history;
use crate::frame::timestamps::format_timestamp;
use crate::models::{AggregationMethod, IndexKind};
use chrono::Utc;
use polars::prelude::*;
use tracing::{debug, info};

const BUCKET: &str = "__bucket";

impl WaterFrame {
    /// Resample in place
    ///
    /// Returns `false`, leaving the table untouched, when there is no TIME
    /// index to resample on.
    pub fn resample(&mut self, rule: &ResampleRule, method: AggregationMethod) -> Result<bool> {
        match self.resampled(rule, method)? {
            Some(frame) => {
                *self = frame;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resampled copy, or `None` when there is no TIME index
    pub fn resampled(&self, rule: &ResampleRule, method: AggregationMethod) -> Result<Option<WaterFrame>> {
        let Some(kind) = self.index_kind() else {
            debug!("Resample skipped: table has no {} index", TIME);
            return Ok(None);
        };

        let buckets = self
            .times()?
            .into_iter()
            .map(|time| rule.bucket_start(time))
            .collect::<Result<Vec<i64>>>()?;

        let mut data = self.data().clone();
        data.with_column(Column::new(BUCKET.into(), buckets))?;

        let by = match kind {
            IndexKind::DepthTime => vec![col(DEPTH), col(BUCKET)],
            IndexKind::Time => vec![col(BUCKET)],
        };
        let parameters = self.parameters();
        let aggregations: Vec<Expr> = parameters
            .iter()
            .map(|parameter| {
                // NaN counts as missing, like everywhere else in the table
                let values = col(parameter.as_str())
                    .cast(DataType::Float64)
                    .fill_nan(lit(NULL));
                let aggregated = match method {
                    AggregationMethod::Mean => values.mean(),
                    AggregationMethod::Max => values.max(),
                    AggregationMethod::Min => values.min(),
                };
                aggregated.alias(parameter.as_str())
            })
            .collect();

        let grouped = data
            .lazy()
            .group_by_stable(by)
            .agg(aggregations)
            .collect()?;

        let rows = grouped.height();
        let mut columns = vec![grouped.column(BUCKET)?.clone().with_name(TIME.into())];
        if kind == IndexKind::DepthTime {
            columns.push(grouped.column(DEPTH)?.clone());
        }
        for parameter in &parameters {
            columns.push(grouped.column(parameter)?.clone());
            columns.push(Column::new(
                flag_column(parameter).as_str().into(),
                vec![flags::NO_QC; rows],
            ));
        }

        let mut frame = WaterFrame::from_parts(
            DataFrame::new(columns)?,
            self.vocabulary.clone(),
            self.metadata.clone(),
        )?;
        append_history(
            &mut frame.metadata,
            format!(
                "{} resampled to {} using {}",
                format_timestamp(Utc::now()),
                rule,
                method
            ),
        );
        frame.update_time_coverage()?;

        info!("Resampled {} rows into {} buckets ({})", self.len(), rows, rule);
        Ok(Some(frame))
    }
}
