//! Statistical flavor profile
//!
//! Similarity-weighted mean of the matched clusters' axis means, lifted when
//! the whole profile is faint, then adjusted per axis class for the time
//! spent at depth.

use deepage_common::math::clamp_score;
use deepage_common::models::{AxisClass, CoefficientSet, FlavorProfile};

use crate::matching::ClusterMatch;

/// Profiles whose strongest axis is below this are rescaled
const FAINT_PROFILE_MAX: f64 = 40.0;
/// Rescaled max lands in [RESCALE_BASE, RESCALE_BASE + RESCALE_SPAN]
const RESCALE_BASE: f64 = 65.0;
const RESCALE_SPAN: f64 = 15.0;

const DECAY_RATE: f64 = 0.01;
const MATURATION_RATE: f64 = 0.004;
const LONG_AGING_PER_MONTH: f64 = 0.3;
const OXIDATIVE_RATE: f64 = 0.004;
const MIN_TCI: f64 = 0.01;

/// Similarity-weighted mean profile of the matches
///
/// Neutral when there are no matches or every similarity is zero.
pub fn weighted_profile(matches: &[ClusterMatch<'_>]) -> FlavorProfile {
    let total: f64 = matches.iter().map(|m| m.similarity.max(0.0)).sum();
    if matches.is_empty() || total <= 0.0 {
        return FlavorProfile::neutral();
    }

    let profiles: Vec<(f64, FlavorProfile)> = matches
        .iter()
        .map(|m| (m.similarity.max(0.0), m.model.mean_profile()))
        .collect();

    FlavorProfile::from_fn(|axis| {
        profiles
            .iter()
            .map(|(weight, profile)| weight * profile.get(axis))
            .sum::<f64>()
            / total
    })
}

/// Lift a faint profile so its strongest axis lands in [65, 80]
///
/// Profiles with a max of 0 or at least 40 pass through unchanged.
pub fn rescale_faint(profile: FlavorProfile) -> FlavorProfile {
    let max = profile.max_value();
    if max <= 0.0 || max >= FAINT_PROFILE_MAX {
        return profile;
    }
    let target = RESCALE_BASE + RESCALE_SPAN * (max / FAINT_PROFILE_MAX);
    let factor = target / max;
    profile.map(|_, v| v * factor)
}

/// Apply per-class month/coefficient adjustments, then clamp
pub fn adjust_for_months(
    profile: FlavorProfile,
    months: u32,
    coefficients: &CoefficientSet,
) -> FlavorProfile {
    let m = f64::from(months);
    let fri = coefficients.fri.value;
    let tci = coefficients.tci.value.max(MIN_TCI);

    profile.map(|axis, v| {
        let adjusted = match axis.class() {
            AxisClass::Decay => v * (-DECAY_RATE * m * fri).exp(),
            AxisClass::Maturation => v * (1.0 + MATURATION_RATE * m / tci),
            AxisClass::LongAging => v + LONG_AGING_PER_MONTH * m,
            AxisClass::Oxidative => v * (1.0 + OXIDATIVE_RATE * m * fri),
        };
        clamp_score(adjusted)
    })
}

/// Statistical flavor profile for `months` at depth
pub fn statistical_profile(
    matches: &[ClusterMatch<'_>],
    months: u32,
    coefficients: &CoefficientSet,
) -> FlavorProfile {
    adjust_for_months(rescale_faint(weighted_profile(matches)), months, coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients;
    use deepage_common::models::{
        AgingStage, AxisStatistics, CoefficientOverrides, DrinkingWindow, FlavorAxis,
        PhysicochemicalStats, TrainedClusterModel,
    };
    use deepage_common::params::EnvironmentParams;
    use std::collections::BTreeMap;

    fn model(value: f64) -> TrainedClusterModel {
        let flavor_stats: BTreeMap<FlavorAxis, AxisStatistics> = FlavorAxis::ALL
            .into_iter()
            .map(|axis| (axis, AxisStatistics::from_values(&[value]).unwrap()))
            .collect();
        TrainedClusterModel {
            product_type: "brut".to_string(),
            stage: AgingStage::Developing,
            sample_count: 10,
            flavor_stats,
            physicochemical: PhysicochemicalStats::default(),
            transition_curves: BTreeMap::new(),
            centroids: Vec::new(),
            drinking_window: DrinkingWindow {
                earliest_years: 3.0,
                peak_years: 5.0,
                latest_years: 7.0,
                mean_years: 5.0,
            },
            confidence: 0.1,
        }
    }

    fn default_coefficients() -> CoefficientSet {
        coefficients::compute(&EnvironmentParams::default(), 30.0, &CoefficientOverrides::default())
    }

    #[test]
    fn test_no_matches_is_neutral() {
        assert_eq!(weighted_profile(&[]), FlavorProfile::neutral());
    }

    #[test]
    fn test_zero_similarities_is_neutral() {
        let m = model(80.0);
        let matches = [ClusterMatch {
            model: &m,
            similarity: 0.0,
        }];
        assert_eq!(weighted_profile(&matches), FlavorProfile::neutral());
    }

    #[test]
    fn test_weighted_by_similarity() {
        let high = model(80.0);
        let low = model(20.0);
        let matches = [
            ClusterMatch {
                model: &high,
                similarity: 75.0,
            },
            ClusterMatch {
                model: &low,
                similarity: 25.0,
            },
        ];

        let profile = weighted_profile(&matches);

        assert!((profile.get(FlavorAxis::Creamy) - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_faint_profile_rescaled() {
        let profile = rescale_faint(FlavorProfile::uniform(20.0));
        // 65 + 15 * 0.5
        assert!((profile.max_value() - 72.5).abs() < 1e-9);

        let untouched = FlavorProfile::uniform(45.0);
        assert_eq!(rescale_faint(untouched), untouched);
        assert_eq!(rescale_faint(FlavorProfile::uniform(0.0)), FlavorProfile::uniform(0.0));
    }

    #[test]
    fn test_month_adjustment_directions() {
        let coefficients = default_coefficients();
        let base = FlavorProfile::uniform(50.0);

        let aged = adjust_for_months(base, 18, &coefficients);

        assert!(aged.get(FlavorAxis::Fruity) < 50.0);
        assert!(aged.get(FlavorAxis::Floral) < 50.0);
        assert!(aged.get(FlavorAxis::Creamy) > 50.0);
        assert!((aged.get(FlavorAxis::Toasty) - 55.4).abs() < 1e-9);
        assert!(aged.get(FlavorAxis::Nutty) > 50.0);
    }

    #[test]
    fn test_adjusted_profile_clamped() {
        let aged = adjust_for_months(FlavorProfile::uniform(95.0), 36, &default_coefficients());
        assert!(aged.iter().all(|(_, v)| (0.0..=100.0).contains(&v)));
        assert_eq!(aged.get(FlavorAxis::Creamy), 100.0);
    }
}
