//! Engine parameters
//!
//! A single immutable value threaded through every prediction call. There is
//! no global parameter state: callers build an `EngineParams` (defaults,
//! TOML overlay, then stored-settings overlay) and pass it by reference.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result};

/// Environmental conditions for coefficient derivation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentParams {
    /// Seawater temperature at aging depth
    ///
    /// Default: 4.0 °C
    pub ocean_temp_c: f64,

    /// Terrestrial cellar temperature
    ///
    /// Default: 12.0 °C
    pub cellar_temp_c: f64,

    /// Activation energy of the dominant oxidative reactions
    ///
    /// Default: 47.0 kJ/mol
    pub activation_energy_kj: f64,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            ocean_temp_c: 4.0,
            cellar_temp_c: 12.0,
            activation_energy_kj: 47.0,
        }
    }
}

/// Thresholds read from stored configuration; `None` keeps the default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    pub optimal_quality_threshold: Option<f64>,
    pub aroma_threshold: Option<f64>,
    pub off_flavor_threshold: Option<f64>,
}

/// All tunable engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Minimum texture maturity for a month to qualify for harvest
    ///
    /// Valid range: [0, 100]
    /// Default: 70
    pub optimal_quality_threshold: f64,

    /// Minimum aroma freshness for a month to qualify for harvest
    ///
    /// Valid range: [0, 100]
    /// Default: 70
    pub aroma_threshold: f64,

    /// Off-flavor risk at or above which a month is disqualified and a
    /// warning is attached to the prediction
    ///
    /// Valid range: [0, 100]
    /// Default: 40
    pub off_flavor_threshold: f64,

    /// First month scanned by the harvest optimizer and timeline
    ///
    /// Default: 6
    pub scan_start_month: u32,

    /// Last month scanned (inclusive)
    ///
    /// Default: 36
    pub scan_end_month: u32,

    /// Window returned when no month qualifies
    ///
    /// Default: (12, 18)
    pub default_window: (u32, u32),

    /// Number of clusters kept by the matcher
    ///
    /// Valid range: [1, 100]
    /// Default: 5
    pub top_k: usize,

    /// Smallest (type, stage) group that produces a model
    ///
    /// Default: 5
    pub min_group_size: usize,

    pub environment: EnvironmentParams,

    /// Per-attempt timeout for each inference service variant
    ///
    /// Valid range: [1, 300] s
    /// Default: 30 s
    pub inference_timeout_secs: u64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            optimal_quality_threshold: 70.0,
            aroma_threshold: 70.0,
            off_flavor_threshold: 40.0,
            scan_start_month: 6,
            scan_end_month: 36,
            default_window: (12, 18),
            top_k: 5,
            min_group_size: 5,
            environment: EnvironmentParams::default(),
            inference_timeout_secs: 30,
        }
    }
}

impl EngineParams {
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    /// Return a copy with stored threshold overrides applied
    pub fn with_thresholds(&self, overrides: &ThresholdOverrides) -> Self {
        let mut params = self.clone();
        if let Some(v) = overrides.optimal_quality_threshold {
            params.optimal_quality_threshold = v;
        }
        if let Some(v) = overrides.aroma_threshold {
            params.aroma_threshold = v;
        }
        if let Some(v) = overrides.off_flavor_threshold {
            params.off_flavor_threshold = v;
        }
        params
    }

    /// Check ranges and internal consistency
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("optimal_quality_threshold", self.optimal_quality_threshold),
            ("aroma_threshold", self.aroma_threshold),
            ("off_flavor_threshold", self.off_flavor_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 100], got {}",
                    name, value
                )));
            }
        }
        if self.scan_start_month > self.scan_end_month {
            return Err(Error::Config(format!(
                "scan range is empty: {}..={}",
                self.scan_start_month, self.scan_end_month
            )));
        }
        if self.default_window.0 > self.default_window.1 {
            return Err(Error::Config(format!(
                "default window start {} exceeds end {}",
                self.default_window.0, self.default_window.1
            )));
        }
        if self.top_k == 0 || self.top_k > 100 {
            return Err(Error::Config(format!(
                "top_k must be within [1, 100], got {}",
                self.top_k
            )));
        }
        if self.inference_timeout_secs == 0 || self.inference_timeout_secs > 300 {
            return Err(Error::Config(format!(
                "inference_timeout_secs must be within [1, 300], got {}",
                self.inference_timeout_secs
            )));
        }
        Ok(())
    }
}
