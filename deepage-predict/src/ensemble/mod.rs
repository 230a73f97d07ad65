//! Ensemble blender
//!
//! Combines an externally inferred qualitative prediction with the
//! statistical estimate. Each configured service variant is tried in order
//! under its own timeout; the first schema-valid response is blended
//! 70/30 with the statistical flavor profile. When every variant fails the
//! statistical estimate is returned on its own, so prediction never fails.

pub mod openai_client;
pub mod provider;
pub mod request;
pub mod response;
pub mod strategy;

use deepage_common::math::round_to;
use deepage_common::models::{
    AgingFactors, AgingPrediction, CandidateProduct, CoefficientSet, FlavorProfile,
    PredictionSource, QualityWeights, TrainedClusterModel,
};
use deepage_common::EngineParams;
use tracing::{info, warn};

use crate::matching::{self, ClusterMatch};
use crate::scoring::QualityInputs;
use request::InferenceRequest;
use response::{Fallbacks, SanitizedPrediction};
use strategy::{InferenceStrategy, StatisticalEstimate, StatisticalStrategy};

pub use openai_client::OpenAiCompatibleProvider;
pub use provider::{InferenceError, InferenceProvider};

/// Share of the external flavor value in the final blend
const EXTERNAL_WEIGHT: f64 = 0.7;
const STATISTICAL_WEIGHT: f64 = 0.3;

/// Matched clusters at which prediction confidence saturates
const CONFIDENCE_SATURATION: f64 = 5.0;

/// Everything one prediction needs besides the engine parameters
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    pub candidate: &'a CandidateProduct,
    pub duration_months: u32,
    pub models: &'a [TrainedClusterModel],
    pub coefficients: &'a CoefficientSet,
    /// Qualitative profile from an outside source, forwarded to the service
    pub qualitative_flavor: Option<&'a FlavorProfile>,
}

/// Ordered strategy chain ending in the statistical strategy
#[derive(Debug, Clone, Default)]
pub struct Blender {
    strategies: Vec<InferenceStrategy>,
    statistical: StatisticalStrategy,
}

impl Blender {
    pub fn new(strategies: Vec<InferenceStrategy>) -> Self {
        Self {
            strategies,
            statistical: StatisticalStrategy,
        }
    }

    /// Blender with no external variants (statistical only)
    pub fn statistical_only() -> Self {
        Self::default()
    }

    pub fn variants(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.variant()).collect()
    }

    /// Predict the outcome of aging `input.candidate` for `input.duration_months`
    pub async fn predict(&self, input: PredictionInput<'_>, params: &EngineParams) -> AgingPrediction {
        let matches = matching::find_similar_clusters(input.candidate, input.models, params.top_k);
        let estimate = self.statistical.estimate(
            input.candidate,
            input.duration_months,
            &matches,
            input.coefficients,
            params,
        );

        if self.strategies.is_empty() {
            return statistical_prediction(&input, &matches, estimate, params);
        }

        let request = InferenceRequest::new(
            input.candidate,
            input.duration_months,
            &matches,
            input.coefficients,
            estimate.flavor,
            estimate.quality,
            input.qualitative_flavor.copied(),
        );
        let prompt = request.render();

        for strategy in &self.strategies {
            match strategy.attempt(&prompt).await {
                Ok(external) => {
                    let category = input.candidate.category;
                    let default_factors = AgingFactors::for_category(category);

                    // Supplied factors rescale the quality models that fill
                    // any score the service left out
                    let fallback_quality = match external.supplied_factors(default_factors) {
                        Some(factors) => QualityInputs::new(input.candidate, input.coefficients)
                            .with_factors(factors)
                            .scores_at(input.duration_months),
                        None => estimate.quality,
                    };

                    let sanitized = external.sanitize(&Fallbacks {
                        flavor: estimate.flavor,
                        quality: fallback_quality,
                        window: estimate.window.clone(),
                        aging_factors: default_factors,
                        quality_weights: QualityWeights::for_category(category),
                        scan_range: (params.scan_start_month, params.scan_end_month),
                    });

                    info!(
                        variant = strategy.variant(),
                        clusters = matches.len(),
                        "Prediction blended with external inference"
                    );
                    return blended_prediction(
                        &input,
                        &matches,
                        &estimate,
                        sanitized,
                        strategy.variant(),
                        params,
                    );
                }
                Err(e) => {
                    warn!(variant = strategy.variant(), error = %e, "Inference variant failed, trying next");
                }
            }
        }

        info!(
            variants = self.strategies.len(),
            "All inference variants failed, using statistical prediction"
        );
        statistical_prediction(&input, &matches, estimate, params)
    }
}

/// Statistical-only prediction, no external service involved
pub fn predict_statistical(input: PredictionInput<'_>, params: &EngineParams) -> AgingPrediction {
    let matches = matching::find_similar_clusters(input.candidate, input.models, params.top_k);
    let estimate = StatisticalStrategy.estimate(
        input.candidate,
        input.duration_months,
        &matches,
        input.coefficients,
        params,
    );
    statistical_prediction(&input, &matches, estimate, params)
}

/// Per-axis `round1(0.7·external + 0.3·statistical)`
pub fn blend_flavor(external: &FlavorProfile, statistical: &FlavorProfile) -> FlavorProfile {
    FlavorProfile::from_fn(|axis| {
        round_to(
            EXTERNAL_WEIGHT * external.get(axis) + STATISTICAL_WEIGHT * statistical.get(axis),
            1,
        )
    })
    .clamped()
}

/// min(matched clusters / 5, 1)
pub fn prediction_confidence(matched: usize) -> f64 {
    (matched as f64 / CONFIDENCE_SATURATION).min(1.0)
}

fn statistical_prediction(
    input: &PredictionInput<'_>,
    matches: &[ClusterMatch<'_>],
    estimate: StatisticalEstimate,
    params: &EngineParams,
) -> AgingPrediction {
    let category = input.candidate.category;
    let quality = estimate.quality.clamped();
    let quality_weights = QualityWeights::for_category(category);

    AgingPrediction {
        duration_months: input.duration_months,
        flavor: estimate.flavor.clamped(),
        quality,
        overall_quality: quality.overall(&quality_weights),
        insight: generic_insight(input, matches.len(), &estimate),
        risk_warning: risk_warning(quality.off_flavor_risk, params),
        harvest_window: estimate.window,
        coefficients: input.coefficients.clone(),
        confidence: prediction_confidence(matches.len()),
        aging_factors: AgingFactors::for_category(category),
        quality_weights,
        source: PredictionSource::Statistical,
        matched_clusters: matches.iter().map(ClusterMatch::summary).collect(),
    }
}

fn blended_prediction(
    input: &PredictionInput<'_>,
    matches: &[ClusterMatch<'_>],
    estimate: &StatisticalEstimate,
    external: SanitizedPrediction,
    variant: &str,
    params: &EngineParams,
) -> AgingPrediction {
    let quality = external.quality;
    let insight = external
        .insight
        .unwrap_or_else(|| generic_insight(input, matches.len(), estimate));
    let risk_warning = external
        .risk_warning
        .or_else(|| risk_warning(quality.off_flavor_risk, params));

    AgingPrediction {
        duration_months: input.duration_months,
        flavor: blend_flavor(&external.flavor, &estimate.flavor),
        quality,
        overall_quality: quality.overall(&external.quality_weights),
        harvest_window: external.window,
        insight,
        risk_warning,
        coefficients: input.coefficients.clone(),
        confidence: prediction_confidence(matches.len()),
        aging_factors: external.aging_factors,
        quality_weights: external.quality_weights,
        source: PredictionSource::Ensemble {
            variant: variant.to_string(),
        },
        matched_clusters: matches.iter().map(ClusterMatch::summary).collect(),
    }
}

fn generic_insight(
    input: &PredictionInput<'_>,
    matched: usize,
    estimate: &StatisticalEstimate,
) -> String {
    let basis = if matched == 0 {
        "No comparable historical cluster was found, so the flavor estimate starts from a neutral profile.".to_string()
    } else {
        format!(
            "Estimate based on {} comparable terrestrial cluster{}.",
            matched,
            if matched == 1 { "" } else { "s" }
        )
    };
    format!(
        "{} After {} months at {:.0} m, texture maturity reaches {:.0} and aroma freshness {:.0}. \
         Suggested retrieval: months {} to {}.",
        basis,
        input.duration_months,
        input.candidate.aging_depth_m,
        estimate.quality.texture_maturity,
        estimate.quality.aroma_freshness,
        estimate.window.start_month,
        estimate.window.end_month,
    )
}

fn risk_warning(off_flavor_risk: f64, params: &EngineParams) -> Option<String> {
    (off_flavor_risk >= params.off_flavor_threshold).then(|| {
        format!(
            "Off-flavor risk {:.0} is at or above the threshold of {:.0}; taste-check a sample bottle before retrieving the lot.",
            off_flavor_risk, params.off_flavor_threshold
        )
    })
}
