//! Configuration management and validation.
//!
//! Provides the QC configuration: the range-limits table used by the
//! range test, the spike and flat test parameters, and the finalization
//! step that promotes untouched flags to good.

use crate::constants::{
    DEFAULT_FLAT_WINDOW, DEFAULT_RANGE_LIMITS, DEFAULT_SPIKE_INFLUENCE, DEFAULT_SPIKE_THRESHOLD,
    DEFAULT_TEST_FLAG, flags,
};
use crate::error::{Result, WaterFrameError};
use crate::models::QcFlag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Physical (min, max) bounds per parameter acronym
///
/// Injected into the range test rather than read from a global so that
/// callers and tests can supply their own table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeLimits {
    limits: BTreeMap<String, (f64, f64)>,
}

impl Default for RangeLimits {
    fn default() -> Self {
        Self {
            limits: DEFAULT_RANGE_LIMITS
                .iter()
                .map(|(acronym, min, max)| (acronym.to_string(), (*min, *max)))
                .collect(),
        }
    }
}

impl RangeLimits {
    /// A table with no entries; every lookup misses
    pub fn empty() -> Self {
        Self {
            limits: BTreeMap::new(),
        }
    }

    /// Add or replace the bounds of an acronym
    pub fn with_limit(mut self, acronym: impl Into<String>, min: f64, max: f64) -> Self {
        self.limits.insert(acronym.into(), (min, max));
        self
    }

    /// Bounds for a parameter name
    ///
    /// A merge suffix such as `TEMP(NEW1)` resolves to the `TEMP` entry.
    pub fn get(&self, parameter: &str) -> Option<(f64, f64)> {
        self.limits
            .get(parameter)
            .or_else(|| self.limits.get(acronym(parameter)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, (min, max)) in &self.limits {
            check_limits(name, *min, *max)?;
        }
        Ok(())
    }
}

/// Strip a `(NEWn)` merge suffix from a parameter name
pub fn acronym(parameter: &str) -> &str {
    match parameter.find('(') {
        Some(position) if parameter.ends_with(')') => &parameter[..position],
        _ => parameter,
    }
}

pub(crate) fn check_limits(name: &str, min: f64, max: f64) -> Result<()> {
    if min.is_nan() || max.is_nan() || min > max {
        return Err(WaterFrameError::configuration(format!(
            "Invalid range limits for {}: [{}, {}]",
            name, min, max
        )));
    }
    Ok(())
}

/// Spike test parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    /// Trailing window size; 0 selects 5% of the series length clamped to [3, 100]
    pub window: usize,

    /// Deviation, in rolling standard deviations, that marks a spike
    pub threshold: f64,

    /// Weight of a flagged sample in the filtered signal (0 excludes it, 1 keeps it)
    pub influence: f64,

    pub flag: i32,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            window: 0,
            threshold: DEFAULT_SPIKE_THRESHOLD,
            influence: DEFAULT_SPIKE_INFLUENCE,
            flag: DEFAULT_TEST_FLAG,
        }
    }
}

impl SpikeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0) {
            return Err(WaterFrameError::configuration(format!(
                "Spike threshold must be positive, got {}",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.influence) {
            return Err(WaterFrameError::configuration(format!(
                "Spike influence must lie in [0, 1], got {}",
                self.influence
            )));
        }
        QcFlag::check(self.flag)?;
        Ok(())
    }
}

/// Flat (stuck sensor) test parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatConfig {
    /// Rolling window size; 0 selects the fixed default of 3
    pub window: usize,

    pub flag: i32,
}

impl Default for FlatConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_FLAT_WINDOW,
            flag: DEFAULT_TEST_FLAG,
        }
    }
}

/// Final flag translation applied after the tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalizeConfig {
    pub enabled: bool,
    pub to_replace: i32,
    pub value: i32,
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            to_replace: flags::NO_QC,
            value: flags::GOOD,
        }
    }
}

/// Configuration for a full QC pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub range_limits: RangeLimits,

    /// Flag written by the range test
    pub range_flag: i32,

    pub run_range: bool,
    pub run_flat: bool,
    pub run_spike: bool,

    pub flat: FlatConfig,
    pub spike: SpikeConfig,
    pub finalize: FinalizeConfig,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            range_limits: RangeLimits::default(),
            range_flag: DEFAULT_TEST_FLAG,
            run_range: true,
            run_flat: true,
            run_spike: true,
            flat: FlatConfig::default(),
            spike: SpikeConfig::default(),
            finalize: FinalizeConfig::default(),
        }
    }
}

impl QcConfig {
    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: QcConfig = serde_json::from_str(&text)?;
        debug!("Loaded QC configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Replace the range-limits table
    pub fn with_range_limits(mut self, range_limits: RangeLimits) -> Self {
        self.range_limits = range_limits;
        self
    }

    /// Set the spike test window
    pub fn with_spike_window(mut self, window: usize) -> Self {
        self.spike.window = window;
        self
    }

    /// Set the spike test threshold
    pub fn with_spike_threshold(mut self, threshold: f64) -> Self {
        self.spike.threshold = threshold;
        self
    }

    /// Set the spike test influence
    pub fn with_spike_influence(mut self, influence: f64) -> Self {
        self.spike.influence = influence;
        self
    }

    /// Set the flat test window
    pub fn with_flat_window(mut self, window: usize) -> Self {
        self.flat.window = window;
        self
    }

    /// Skip the spike test
    pub fn without_spike(mut self) -> Self {
        self.run_spike = false;
        self
    }

    /// Skip the flat test
    pub fn without_flat(mut self) -> Self {
        self.run_flat = false;
        self
    }

    /// Leave untouched flags at 0 after the tests
    pub fn without_finalize(mut self) -> Self {
        self.finalize.enabled = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.range_limits.validate()?;
        QcFlag::check(self.range_flag)?;
        QcFlag::check(self.flat.flag)?;
        self.spike.validate()?;
        QcFlag::check(self.finalize.to_replace)?;
        QcFlag::check(self.finalize.value)?;
        Ok(())
    }
}
