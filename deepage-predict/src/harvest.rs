//! Harvest window optimizer
//!
//! Scans the configured month range and reports the first and last months
//! where texture and aroma both reach their thresholds and off-flavor risk
//! stays below its threshold. Only the extremes are reported; months in
//! between are not re-checked, so a window may span a non-qualifying month.

use deepage_common::models::{
    CandidateProduct, CoefficientSet, HarvestWindow, QualityScores, ReductionPotential,
};
use deepage_common::EngineParams;
use tracing::debug;

use crate::scoring::QualityInputs;

/// Whether one month's scores qualify for harvest
pub fn qualifies(scores: &QualityScores, params: &EngineParams) -> bool {
    scores.texture_maturity >= params.optimal_quality_threshold
        && scores.aroma_freshness >= params.aroma_threshold
        && scores.off_flavor_risk < params.off_flavor_threshold
}

/// First and last qualifying months in the scan range, if any
pub fn qualifying_range(inputs: &QualityInputs, params: &EngineParams) -> Option<(u32, u32)> {
    let mut range: Option<(u32, u32)> = None;
    for month in params.scan_start_month..=params.scan_end_month {
        if qualifies(&inputs.scores_at(month), params) {
            range = Some(match range {
                Some((start, _)) => (start, month),
                None => (month, month),
            });
        }
    }
    range
}

/// Human-readable retrieval advice for a window
pub fn recommendation(window: &HarvestWindow, reduction: ReductionPotential) -> String {
    let (start, end) = (window.start_month, window.end_month);
    let midpoint = window.midpoint();
    if reduction == ReductionPotential::High {
        format!(
            "High reduction potential: retrieve early in the window, between month {} and month {}.",
            start, midpoint
        )
    } else if window.span() >= 12 {
        format!(
            "Wide window of {} months gives flexibility; month {} balances texture and freshness.",
            window.span(),
            midpoint
        )
    } else {
        format!(
            "Retrieve between month {} and month {}; month {} is the suggested target.",
            start, end, midpoint
        )
    }
}

/// Optimal harvest window for prepared quality inputs
pub fn optimal_window(inputs: &QualityInputs, params: &EngineParams) -> HarvestWindow {
    let (start, end, found) = match qualifying_range(inputs, params) {
        Some((start, end)) => (start, end, true),
        None => (params.default_window.0, params.default_window.1, false),
    };

    debug!(start, end, found, "Harvest window selected");

    let mut window = HarvestWindow {
        start_month: start,
        end_month: end,
        recommendation: String::new(),
    };
    let advice = recommendation(&window, inputs.reduction);
    window.recommendation = if found {
        advice
    } else {
        format!("No month met every quality threshold; using the default window. {}", advice)
    };
    window
}

/// Optimal harvest window for a candidate
pub fn harvest_window(
    candidate: &CandidateProduct,
    coefficients: &CoefficientSet,
    params: &EngineParams,
) -> HarvestWindow {
    optimal_window(&QualityInputs::new(candidate, coefficients), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients;
    use deepage_common::models::CoefficientOverrides;

    fn setup(reduction: ReductionPotential) -> (CandidateProduct, CoefficientSet) {
        let mut candidate = CandidateProduct::new("brut", 30.0);
        candidate.reduction_potential = reduction;
        let params = EngineParams::default();
        let coefficients = coefficients::compute(
            &params.environment,
            candidate.aging_depth_m,
            &CoefficientOverrides::default(),
        );
        (candidate, coefficients)
    }

    #[test]
    fn test_impossible_thresholds_give_default_window() {
        let (candidate, coefficients) = setup(ReductionPotential::Low);
        let params = EngineParams {
            optimal_quality_threshold: 100.0,
            aroma_threshold: 100.0,
            off_flavor_threshold: 0.0,
            ..EngineParams::default()
        };

        let window = harvest_window(&candidate, &coefficients, &params);

        assert_eq!((window.start_month, window.end_month), (12, 18));
        assert!(window.recommendation.contains("default window"));
    }

    #[test]
    fn test_window_bounds_qualify() {
        let (candidate, coefficients) = setup(ReductionPotential::Low);
        let params = EngineParams::default();
        let inputs = QualityInputs::new(&candidate, &coefficients);

        let window = optimal_window(&inputs, &params);

        assert!(window.start_month >= params.scan_start_month);
        assert!(window.end_month <= params.scan_end_month);
        assert!(window.start_month <= window.end_month);
        assert!(qualifies(&inputs.scores_at(window.start_month), &params));
        assert!(qualifies(&inputs.scores_at(window.end_month), &params));
        if window.start_month > params.scan_start_month {
            assert!(!qualifies(&inputs.scores_at(window.start_month - 1), &params));
        }
    }

    #[test]
    fn test_high_reduction_never_qualifies_with_default_risk() {
        // Base risk 10 + 40 already exceeds the default threshold of 40
        let (candidate, coefficients) = setup(ReductionPotential::High);

        let window = harvest_window(&candidate, &coefficients, &EngineParams::default());

        assert_eq!((window.start_month, window.end_month), (12, 18));
        assert!(window.recommendation.contains("early in the window"));
    }

    fn window(start_month: u32, end_month: u32) -> HarvestWindow {
        HarvestWindow {
            start_month,
            end_month,
            recommendation: String::new(),
        }
    }

    #[test]
    fn test_recommendation_variants() {
        assert!(recommendation(&window(10, 16), ReductionPotential::High).contains("month 13"));
        let wide = recommendation(&window(10, 30), ReductionPotential::Low);
        assert!(wide.contains("flexibility") && wide.contains("20 months") && wide.contains("month 20"));
        let narrow = recommendation(&window(12, 18), ReductionPotential::Medium);
        assert!(narrow.contains("month 12") && narrow.contains("month 18") && narrow.contains("month 15"));
    }

    #[test]
    fn test_span_boundary_of_wide_window() {
        assert_eq!(window(6, 18).span(), 12);
        assert!(recommendation(&window(6, 18), ReductionPotential::Low).contains("flexibility"));
        assert!(!recommendation(&window(6, 17), ReductionPotential::Low).contains("flexibility"));
        assert_eq!(window(6, 17).midpoint(), 11);
    }
}
