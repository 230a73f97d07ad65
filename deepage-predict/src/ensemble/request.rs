//! Structured inference request and prompt rendering

use serde::Serialize;

use deepage_common::models::{
    CandidateProduct, Coefficient, CoefficientSet, FlavorAxis, FlavorProfile, QualityScores,
    TrainedClusterModel,
};

use crate::matching::ClusterMatch;

/// Clusters summarized in a request
const MAX_CLUSTERS_IN_PROMPT: usize = 3;

/// Per-axis change across a type's recorded aging history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveHighlight {
    pub axis: FlavorAxis,
    pub from_year: i64,
    pub from_value: f64,
    pub to_year: i64,
    pub to_value: f64,
}

/// One matched cluster as presented to the service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub product_type: String,
    pub stage: String,
    pub similarity: f64,
    pub sample_count: usize,
    pub mean_flavor: FlavorProfile,
    pub drinking_window_years: (f64, f64, f64),
    pub curve_highlights: Vec<CurveHighlight>,
}

impl ClusterSummary {
    pub fn from_match(m: &ClusterMatch<'_>) -> Self {
        let model = m.model;
        Self {
            product_type: model.product_type.clone(),
            stage: model.stage.to_string(),
            similarity: m.similarity,
            sample_count: model.sample_count,
            mean_flavor: model.mean_profile(),
            drinking_window_years: (
                model.drinking_window.earliest_years,
                model.drinking_window.peak_years,
                model.drinking_window.latest_years,
            ),
            curve_highlights: curve_highlights(model),
        }
    }
}

/// First and last recorded point of every axis curve spanning two or more years
fn curve_highlights(model: &TrainedClusterModel) -> Vec<CurveHighlight> {
    model
        .transition_curves
        .iter()
        .filter_map(|(axis, points)| {
            let (first, last) = (points.first()?, points.last()?);
            (first.year != last.year).then(|| CurveHighlight {
                axis: *axis,
                from_year: first.year,
                from_value: first.value,
                to_year: last.year,
                to_value: last.value,
            })
        })
        .collect()
}

/// Coefficient as presented to the service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientSummary {
    pub name: &'static str,
    pub value: f64,
    pub interval: (f64, f64),
    pub provenance: &'static str,
    pub justification: String,
}

impl CoefficientSummary {
    fn new(name: &'static str, coefficient: &Coefficient) -> Self {
        Self {
            name,
            value: coefficient.value,
            interval: (coefficient.interval_low, coefficient.interval_high),
            provenance: coefficient.provenance.as_str(),
            justification: coefficient.justification.clone(),
        }
    }
}

/// Everything the external service sees for one prediction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRequest {
    pub product_type: String,
    pub category: String,
    pub ph: Option<f64>,
    pub dosage: Option<f64>,
    pub alcohol: Option<f64>,
    pub acidity: Option<f64>,
    pub reduction_potential: String,
    pub depth_m: f64,
    pub land_years: f64,
    pub duration_months: u32,
    pub clusters: Vec<ClusterSummary>,
    pub coefficients: Vec<CoefficientSummary>,
    pub statistical_flavor: FlavorProfile,
    pub statistical_quality: QualityScores,
    /// Qualitative profile from an outside source (e.g. a tasting panel)
    pub qualitative_flavor: Option<FlavorProfile>,
}

impl InferenceRequest {
    pub fn new(
        candidate: &CandidateProduct,
        duration_months: u32,
        matches: &[ClusterMatch<'_>],
        coefficients: &CoefficientSet,
        statistical_flavor: FlavorProfile,
        statistical_quality: QualityScores,
        qualitative_flavor: Option<FlavorProfile>,
    ) -> Self {
        Self {
            product_type: candidate.product_type.clone(),
            category: candidate.category.as_str().to_string(),
            ph: candidate.ph,
            dosage: candidate.dosage,
            alcohol: candidate.alcohol,
            acidity: candidate.acidity,
            reduction_potential: candidate.reduction_potential.to_string(),
            depth_m: candidate.aging_depth_m,
            land_years: candidate.effective_land_years(),
            duration_months,
            clusters: matches
                .iter()
                .take(MAX_CLUSTERS_IN_PROMPT)
                .map(ClusterSummary::from_match)
                .collect(),
            coefficients: vec![
                CoefficientSummary::new("TCI", &coefficients.tci),
                CoefficientSummary::new("FRI", &coefficients.fri),
                CoefficientSummary::new("BRI", &coefficients.bri),
            ],
            statistical_flavor,
            statistical_quality,
            qualitative_flavor,
        }
    }

    /// Render the prompt text, including the required answer shape
    pub fn render(&self) -> String {
        let context = serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string());
        format!(
            "Predict the result of aging this product undersea for {months} months.\n\
             \n\
             Context (historical terrestrial clusters, physical coefficients, \
             statistical baseline):\n\
             {context}\n\
             \n\
             Coefficients: TCI < 1 means texture integrates faster than on land; \
             FRI < 1 means slower oxidation; BRI > 1 means finer bubbles.\n\
             \n\
             Respond with JSON only, in exactly this shape (all scores 0-100, months 6-36):\n\
             {shape}\n",
            months = self.duration_months,
            context = context,
            shape = RESPONSE_SHAPE,
        )
    }
}

const RESPONSE_SHAPE: &str = r#"{
  "flavor": {"fruity": 0, "floral": 0, "creamy": 0, "mineral": 0, "toasty": 0, "nutty": 0},
  "quality": {"textureMaturity": 0, "aromaFreshness": 0, "bubbleRefinement": 0, "offFlavorRisk": 0},
  "harvestWindow": {"startMonth": 12, "endMonth": 18, "recommendation": "..."},
  "insight": "...",
  "riskWarning": "... or null",
  "agingFactors": {"texture": 1.0, "aroma": 1.0, "bubble": 1.0},
  "qualityWeights": {"texture": 0.35, "aroma": 0.30, "bubble": 0.25, "risk": 0.10}
}"#;
