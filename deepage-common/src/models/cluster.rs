//! Trained cluster models (per product type and aging stage)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::flavor::{FlavorAxis, FlavorProfile};
use super::record::{AgingStage, ReductionPotential};
use crate::math::{mean, percentile_sorted, population_stddev};

/// Descriptive statistics over one numeric attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStatistics {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub stddev: f64,
    pub p25: f64,
    pub p75: f64,
    pub count: usize,
}

impl AxisStatistics {
    /// Compute statistics over a set of values
    ///
    /// Returns `None` for an empty set so callers can distinguish "no data"
    /// from a genuine zero.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let m = mean(&sorted);
        Some(Self {
            mean: m,
            median: percentile_sorted(&sorted, 0.5),
            stddev: population_stddev(&sorted, m),
            p25: percentile_sorted(&sorted, 0.25),
            p75: percentile_sorted(&sorted, 0.75),
            count: sorted.len(),
        })
    }
}

/// Physicochemical statistics; each attribute is absent when no record carried it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicochemicalStats {
    pub ph: Option<AxisStatistics>,
    pub dosage: Option<AxisStatistics>,
    pub alcohol: Option<AxisStatistics>,
    pub acidity: Option<AxisStatistics>,
}

/// Average axis value at one (rounded) aging year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub year: i64,
    pub value: f64,
    pub samples: usize,
}

/// Representative physicochemical point of a bucket of similar records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCentroid {
    pub ph: f64,
    pub dosage: f64,
    pub reduction_potential: Option<ReductionPotential>,
    pub count: usize,
}

/// Drinking-window statistics in aging years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkingWindow {
    pub earliest_years: f64,
    pub peak_years: f64,
    pub latest_years: f64,
    pub mean_years: f64,
}

/// Aggregate statistics for one (product type, aging stage) historical group
///
/// Produced wholesale by the trainer and never mutated; a retrain replaces
/// the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainedClusterModel {
    pub product_type: String,
    pub stage: AgingStage,
    pub sample_count: usize,
    pub flavor_stats: BTreeMap<FlavorAxis, AxisStatistics>,
    pub physicochemical: PhysicochemicalStats,
    /// Year-keyed axis averages over every record of this product type
    pub transition_curves: BTreeMap<FlavorAxis, Vec<CurvePoint>>,
    /// Sorted by descending count
    pub centroids: Vec<ClusterCentroid>,
    pub drinking_window: DrinkingWindow,
    /// min(sample_count / 100, 1)
    pub confidence: f64,
}

impl TrainedClusterModel {
    /// Mean of each flavor axis; axes without statistics read as 0
    pub fn mean_profile(&self) -> FlavorProfile {
        FlavorProfile::from_fn(|axis| {
            self.flavor_stats
                .get(&axis)
                .map(|stats| stats.mean)
                .unwrap_or(0.0)
        })
    }

    /// Distance from `ph` to the closest centroid pH
    pub fn nearest_ph_distance(&self, ph: f64) -> Option<f64> {
        self.centroids
            .iter()
            .map(|c| (c.ph - ph).abs())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Distance from `dosage` to the closest centroid dosage
    pub fn nearest_dosage_distance(&self, dosage: f64) -> Option<f64> {
        self.centroids
            .iter()
            .map(|c| (c.dosage - dosage).abs())
            .min_by(|a, b| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_statistics_empty_is_none() {
        assert!(AxisStatistics::from_values(&[]).is_none());
    }

    #[test]
    fn test_axis_statistics_unsorted_input() {
        let stats = AxisStatistics::from_values(&[40.0, 10.0, 30.0, 20.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 25.0);
        assert_eq!(stats.median, 25.0);
        assert!((stats.p25 - 17.5).abs() < 1e-9);
        assert!((stats.p75 - 32.5).abs() < 1e-9);
        assert!((stats.stddev - 125f64.sqrt()).abs() < 1e-9);
    }
}
