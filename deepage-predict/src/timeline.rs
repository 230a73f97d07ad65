//! Month-by-month quality curves for visualization
//!
//! Land years are ignored so the curves show the effect of undersea aging
//! alone.

use deepage_common::models::{CandidateProduct, CoefficientSet, TimelinePoint};
use deepage_common::EngineParams;

use crate::scoring::QualityInputs;

/// One point per month over the scan range
pub fn timeline(
    candidate: &CandidateProduct,
    coefficients: &CoefficientSet,
    params: &EngineParams,
) -> Vec<TimelinePoint> {
    let inputs = QualityInputs::new(candidate, coefficients).without_land_years();

    (params.scan_start_month..=params.scan_end_month)
        .map(|month| {
            let scores = inputs.scores_at(month);
            TimelinePoint {
                month,
                texture_maturity: scores.texture_maturity,
                aroma_freshness: scores.aroma_freshness,
                off_flavor_risk: scores.off_flavor_risk,
                bubble_refinement: scores.bubble_refinement,
            }
        })
        .collect()
}
