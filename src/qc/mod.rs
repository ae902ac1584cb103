//! Quality-control tests for WaterFrame parameters
//!
//! Each test inspects the values of one or more parameters and writes a
//! flag code into the paired `_QC` column of the rows it rejects. Tests
//! overwrite whatever flag a row carried before, so when several tests are
//! chained the last one to touch a row wins.
//!
//! # Tests
//!
//! - [`range`] - values strictly outside physical (min, max) bounds
//! - [`flat`] - stuck sensors, detected as zero rolling variance
//! - [`spike`] - smoothed z-score filter, run per depth in time order
//! - [`syntax`] - every parameter has its flag column
//!
//! Every test comes in two forms: a method taking `&mut self` that flags
//! in place, and a `with_*` method taking `&self` that returns a flagged
//! copy.
//!
//! # Example Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use waterframe::{QcConfig, WaterFrame};
//!
//! # fn example() -> waterframe::Result<()> {
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let mut frame = WaterFrame::builder()
//!     .time((0..6).map(|i| start + Duration::hours(i)))
//!     .parameter("TEMP", vec![13.1, 13.2, 99.0, 13.3, 13.2, 13.4])
//!     .build()?;
//!
//! let report = frame.qc(&["TEMP"], &QcConfig::default())?;
//! assert_eq!(report.range["TEMP"], 1);
//! assert_eq!(frame.flags("TEMP")?[2], 4);
//! # Ok(())
//! # }
//! ```

pub mod flat;
pub mod pipeline;
pub mod range;
pub mod spike;
pub mod syntax;

#[cfg(test)]
pub mod tests;

pub use pipeline::QcReport;

use crate::error::Result;
use crate::frame::WaterFrame;
use crate::models::QcFlag;
use std::collections::BTreeMap;
use tracing::debug;

/// Rows flagged by a test, per parameter
pub type FlagCounts = BTreeMap<String, usize>;

/// Run a detector over every depth group of each parameter and flag hits
///
/// The detector receives the parameter name and the group's values in
/// time order and returns one entry per value.
pub(crate) fn flag_by_group<F>(
    frame: &mut WaterFrame,
    test_name: &str,
    parameters: &[String],
    flag: i32,
    mut detect: F,
) -> Result<FlagCounts>
where
    F: FnMut(&str, &[Option<f64>]) -> Vec<bool>,
{
    QcFlag::check(flag)?;
    let groups = frame.depth_groups()?;
    let mut counts = FlagCounts::new();

    for parameter in parameters {
        let values = frame.values(parameter)?;
        let mut flags = frame.flags(parameter)?;
        let mut flagged = 0;

        for group in &groups {
            let mask = detect(parameter, &values[group.rows.clone()]);
            for (offset, hit) in mask.into_iter().enumerate() {
                if hit {
                    flags[group.rows.start + offset] = flag;
                    flagged += 1;
                }
            }
        }

        frame.set_flags(parameter, flags)?;
        debug!("{} test flagged {} rows of {}", test_name, flagged, parameter);
        counts.insert(parameter.clone(), flagged);
    }

    Ok(counts)
}
