//! Per-group aggregate computations used by the trainer
//!
//! Each function takes a slice of borrowed records and returns one component
//! of a `TrainedClusterModel`. All outputs are deterministically ordered.

use std::collections::BTreeMap;

use deepage_common::math::{mean, percentile_sorted};
use deepage_common::models::{
    AxisStatistics, ClusterCentroid, CurvePoint, DrinkingWindow, FlavorAxis,
    PhysicochemicalStats, ReductionPotential, TerrestrialRecord,
};

/// pH bucket width
const PH_BUCKET: f64 = 0.1;

/// Dosage bucket width (g/L)
const DOSAGE_BUCKET: f64 = 3.0;

/// Mean/median/stddev/quartiles for every flavor axis
pub fn flavor_statistics(records: &[&TerrestrialRecord]) -> BTreeMap<FlavorAxis, AxisStatistics> {
    FlavorAxis::ALL
        .into_iter()
        .filter_map(|axis| {
            let values: Vec<f64> = records.iter().map(|r| r.flavor.get(axis)).collect();
            AxisStatistics::from_values(&values).map(|stats| (axis, stats))
        })
        .collect()
}

/// Statistics over each physicochemical attribute present in the group
pub fn physicochemical_statistics(records: &[&TerrestrialRecord]) -> PhysicochemicalStats {
    let collect = |f: fn(&TerrestrialRecord) -> Option<f64>| -> Option<AxisStatistics> {
        let values: Vec<f64> = records.iter().filter_map(|r| f(r)).collect();
        AxisStatistics::from_values(&values)
    };

    PhysicochemicalStats {
        ph: collect(|r| r.ph),
        dosage: collect(|r| r.dosage),
        alcohol: collect(|r| r.alcohol),
        acidity: collect(|r| r.acidity),
    }
}

/// Average of each axis keyed by rounded aging year
///
/// `records` must be every record of the product type, across all stages, so
/// the curve spans the full aging history rather than one stage's slice.
pub fn transition_curves(records: &[&TerrestrialRecord]) -> BTreeMap<FlavorAxis, Vec<CurvePoint>> {
    let mut by_year: BTreeMap<i64, Vec<&TerrestrialRecord>> = BTreeMap::new();
    for record in records {
        by_year
            .entry(record.aging_years.round() as i64)
            .or_default()
            .push(record);
    }

    FlavorAxis::ALL
        .into_iter()
        .map(|axis| {
            let points = by_year
                .iter()
                .map(|(year, group)| {
                    let values: Vec<f64> = group.iter().map(|r| r.flavor.get(axis)).collect();
                    CurvePoint {
                        year: *year,
                        value: mean(&values),
                        samples: values.len(),
                    }
                })
                .collect();
            (axis, points)
        })
        .collect()
}

#[derive(Default)]
struct CentroidAccumulator {
    ph_sum: f64,
    dosage_sum: f64,
    count: usize,
}

/// Bucket records by (pH to 0.1, dosage to 3 units, reduction label)
///
/// Records lacking either pH or dosage do not contribute. Each centroid holds
/// the mean of the true (unrounded) values in its bucket. Sorted by
/// descending count; equal counts keep bucket-key order.
pub fn cluster_centroids(records: &[&TerrestrialRecord]) -> Vec<ClusterCentroid> {
    let mut buckets: BTreeMap<(i64, i64, Option<ReductionPotential>), CentroidAccumulator> =
        BTreeMap::new();

    for record in records {
        let (Some(ph), Some(dosage)) = (record.ph, record.dosage) else {
            continue;
        };
        let key = (
            (ph / PH_BUCKET).round() as i64,
            (dosage / DOSAGE_BUCKET).round() as i64,
            record.reduction_potential,
        );
        let acc = buckets.entry(key).or_default();
        acc.ph_sum += ph;
        acc.dosage_sum += dosage;
        acc.count += 1;
    }

    let mut centroids: Vec<ClusterCentroid> = buckets
        .into_iter()
        .map(|((_, _, reduction_potential), acc)| ClusterCentroid {
            ph: acc.ph_sum / acc.count as f64,
            dosage: acc.dosage_sum / acc.count as f64,
            reduction_potential,
            count: acc.count,
        })
        .collect();

    // Stable sort keeps key order for ties
    centroids.sort_by(|a, b| b.count.cmp(&a.count));
    centroids
}

/// Earliest (p25), peak, latest (p75) and mean aging years
///
/// Peak is the rounded year with the highest mean rating when any record
/// carries a rating; otherwise the median aging years.
pub fn drinking_window(records: &[&TerrestrialRecord]) -> DrinkingWindow {
    let mut years: Vec<f64> = records.iter().map(|r| r.aging_years).collect();
    years.sort_by(|a, b| a.total_cmp(b));

    let mut ratings_by_year: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(rating) = record.rating {
            ratings_by_year
                .entry(record.aging_years.round() as i64)
                .or_default()
                .push(rating);
        }
    }

    // First year wins on equal ratings (BTreeMap iterates ascending)
    let best_rated_year = ratings_by_year
        .iter()
        .map(|(year, ratings)| (*year, mean(ratings)))
        .fold(None, |best: Option<(i64, f64)>, (year, rating)| match best {
            Some((_, best_rating)) if best_rating >= rating => best,
            _ => Some((year, rating)),
        })
        .map(|(year, _)| year as f64);

    DrinkingWindow {
        earliest_years: percentile_sorted(&years, 0.25),
        peak_years: best_rated_year.unwrap_or_else(|| percentile_sorted(&years, 0.5)),
        latest_years: percentile_sorted(&years, 0.75),
        mean_years: mean(&years),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepage_common::models::{FlavorProfile, ProductCategory};

    fn record(years: f64, ph: Option<f64>, dosage: Option<f64>) -> TerrestrialRecord {
        TerrestrialRecord {
            product_type: "brut".to_string(),
            category: ProductCategory::SparklingWine,
            ph,
            dosage,
            alcohol: None,
            acidity: None,
            reduction_potential: Some(ReductionPotential::Low),
            flavor: FlavorProfile::uniform(years * 10.0),
            aging_years: years,
            aging_years_confidence: None,
            aging_stage: None,
            data_source: "test".to_string(),
            notes: None,
            rating: None,
        }
    }

    #[test]
    fn test_centroids_bucket_and_average_true_values() {
        let records = [
            record(1.0, Some(3.04), Some(6.0)),
            record(1.0, Some(2.96), Some(7.0)),
            record(1.0, Some(3.31), Some(0.5)),
            record(1.0, None, Some(6.0)),
        ];
        let refs: Vec<&TerrestrialRecord> = records.iter().collect();

        let centroids = cluster_centroids(&refs);

        assert_eq!(centroids.len(), 2);
        assert_eq!(centroids[0].count, 2);
        assert!((centroids[0].ph - 3.0).abs() < 1e-9);
        assert!((centroids[0].dosage - 6.5).abs() < 1e-9);
        assert_eq!(centroids[1].count, 1);
        assert!((centroids[1].ph - 3.31).abs() < 1e-9);
    }

    #[test]
    fn test_transition_curves_keyed_by_rounded_year() {
        let records = [record(1.2, None, None), record(0.8, None, None), record(3.0, None, None)];
        let refs: Vec<&TerrestrialRecord> = records.iter().collect();

        let curves = transition_curves(&refs);
        let fruity = &curves[&FlavorAxis::Fruity];

        assert_eq!(fruity.len(), 2);
        assert_eq!(fruity[0].year, 1);
        assert_eq!(fruity[0].samples, 2);
        assert!((fruity[0].value - 10.0).abs() < 1e-9);
        assert_eq!(fruity[1].year, 3);
    }

    #[test]
    fn test_drinking_window_peak_prefers_best_rating() {
        let mut records = vec![
            record(2.0, None, None),
            record(4.0, None, None),
            record(6.0, None, None),
            record(8.0, None, None),
        ];
        records[0].rating = Some(85.0);
        records[2].rating = Some(93.0);
        let refs: Vec<&TerrestrialRecord> = records.iter().collect();

        let window = drinking_window(&refs);

        assert_eq!(window.peak_years, 6.0);
        assert_eq!(window.mean_years, 5.0);
        assert!((window.earliest_years - 3.5).abs() < 1e-9);
        assert!((window.latest_years - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_drinking_window_peak_falls_back_to_median() {
        let records = [record(2.0, None, None), record(4.0, None, None), record(9.0, None, None)];
        let refs: Vec<&TerrestrialRecord> = records.iter().collect();

        assert_eq!(drinking_window(&refs).peak_years, 4.0);
    }

    #[test]
    fn test_physicochemical_absent_attribute_is_none() {
        let records = [record(1.0, Some(3.1), None), record(2.0, Some(3.3), None)];
        let refs: Vec<&TerrestrialRecord> = records.iter().collect();

        let stats = physicochemical_statistics(&refs);

        assert!(stats.dosage.is_none());
        assert_eq!(stats.ph.unwrap().count, 2);
    }
}
