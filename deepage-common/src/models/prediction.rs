//! Prediction outputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coefficients::CoefficientSet;
use super::flavor::FlavorProfile;
use super::record::{AgingStage, ProductCategory};
use crate::math::{clamp_score, clamp_to, normalize_weights};

/// The four quality scores, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScores {
    pub texture_maturity: f64,
    pub aroma_freshness: f64,
    pub bubble_refinement: f64,
    /// Higher is worse
    pub off_flavor_risk: f64,
}

impl QualityScores {
    pub fn clamped(&self) -> Self {
        Self {
            texture_maturity: clamp_score(self.texture_maturity),
            aroma_freshness: clamp_score(self.aroma_freshness),
            bubble_refinement: clamp_score(self.bubble_refinement),
            off_flavor_risk: clamp_score(self.off_flavor_risk),
        }
    }

    /// Weighted overall score; risk contributes its complement
    pub fn overall(&self, weights: &QualityWeights) -> f64 {
        clamp_score(
            weights.texture * self.texture_maturity
                + weights.aroma * self.aroma_freshness
                + weights.bubble * self.bubble_refinement
                + weights.risk * (100.0 - self.off_flavor_risk),
        )
    }
}

/// Recommended retrieval window in months of undersea aging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestWindow {
    pub start_month: u32,
    pub end_month: u32,
    pub recommendation: String,
}

impl HarvestWindow {
    pub fn midpoint(&self) -> u32 {
        (self.start_month + self.end_month) / 2
    }

    pub fn span(&self) -> u32 {
        self.end_month.saturating_sub(self.start_month)
    }
}

/// Multipliers applied to the quality models, per category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgingFactors {
    pub texture: f64,
    pub aroma: f64,
    pub bubble: f64,
}

impl AgingFactors {
    /// Valid range of each factor
    pub const MAX: f64 = 3.0;

    pub fn for_category(category: ProductCategory) -> Self {
        let (texture, aroma, bubble) = match category {
            ProductCategory::SparklingWine => (1.0, 1.0, 1.0),
            ProductCategory::StillWine => (1.0, 1.0, 0.0),
            ProductCategory::Sake => (0.8, 1.2, 0.0),
            ProductCategory::Spirits => (1.2, 0.8, 0.0),
            ProductCategory::Other => (1.0, 1.0, 0.5),
        };
        Self { texture, aroma, bubble }
    }

    pub fn clamped(&self) -> Self {
        Self {
            texture: clamp_to(self.texture, 0.0, Self::MAX),
            aroma: clamp_to(self.aroma, 0.0, Self::MAX),
            bubble: clamp_to(self.bubble, 0.0, Self::MAX),
        }
    }
}

/// Relative importance of each quality score; always sums to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub texture: f64,
    pub aroma: f64,
    pub bubble: f64,
    pub risk: f64,
}

impl QualityWeights {
    pub fn for_category(category: ProductCategory) -> Self {
        let (texture, aroma, bubble, risk) = match category {
            ProductCategory::SparklingWine => (0.35, 0.30, 0.25, 0.10),
            ProductCategory::StillWine => (0.45, 0.40, 0.0, 0.15),
            ProductCategory::Sake => (0.30, 0.50, 0.0, 0.20),
            ProductCategory::Spirits => (0.50, 0.30, 0.0, 0.20),
            ProductCategory::Other => (0.40, 0.35, 0.10, 0.15),
        };
        Self { texture, aroma, bubble, risk }
    }

    /// Normalize to a unit sum, falling back to `fallback` when every weight
    /// is zero or invalid
    pub fn normalized_or(&self, fallback: QualityWeights) -> Self {
        match normalize_weights(&[self.texture, self.aroma, self.bubble, self.risk]) {
            Some(w) => Self {
                texture: w[0],
                aroma: w[1],
                bubble: w[2],
                risk: w[3],
            },
            None => fallback,
        }
    }

    pub fn sum(&self) -> f64 {
        self.texture + self.aroma + self.bubble + self.risk
    }
}

/// Which strategy produced a prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PredictionSource {
    /// External inference blended with the statistical estimate
    Ensemble { variant: String },
    /// Statistical estimate only
    Statistical,
}

/// Summary of one matched cluster carried on the prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedCluster {
    pub product_type: String,
    pub stage: AgingStage,
    pub similarity: f64,
}

/// Final output of a single prediction request
///
/// Carries no ids or timestamps: identical inputs produce identical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingPrediction {
    pub duration_months: u32,
    pub flavor: FlavorProfile,
    pub quality: QualityScores,
    pub overall_quality: f64,
    pub harvest_window: HarvestWindow,
    pub insight: String,
    pub risk_warning: Option<String>,
    pub coefficients: CoefficientSet,
    /// min(matched clusters / 5, 1.0)
    pub confidence: f64,
    pub aging_factors: AgingFactors,
    pub quality_weights: QualityWeights,
    pub source: PredictionSource,
    pub matched_clusters: Vec<MatchedCluster>,
}

/// Persisted form of a prediction (append-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub prediction: AgingPrediction,
}

impl PredictionRecord {
    pub fn new(candidate_id: Uuid, prediction: AgingPrediction) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            created_at: Utc::now(),
            prediction,
        }
    }
}

/// One month of the visualization timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub month: u32,
    pub texture_maturity: f64,
    pub aroma_freshness: f64,
    pub off_flavor_risk: f64,
    pub bubble_refinement: f64,
}
