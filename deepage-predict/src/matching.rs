//! Cluster matcher
//!
//! Scores every trained model against a candidate and keeps the top K.
//!
//! | Term      | Points                                     |
//! |-----------|--------------------------------------------|
//! | type      | 50 if product type matches (ignoring case) |
//! | pH        | max(0, 20 − 40·|ΔpH|) to nearest centroid  |
//! | dosage    | max(0, 15 − 1.5·|Δdosage|) to nearest      |
//! | support   | min(samples/100, 1)·15                     |
//!
//! A term whose inputs are missing contributes 0.

use deepage_common::models::{CandidateProduct, MatchedCluster, TrainedClusterModel};

const TYPE_POINTS: f64 = 50.0;
const PH_POINTS: f64 = 20.0;
const PH_PENALTY_PER_UNIT: f64 = 40.0;
const DOSAGE_POINTS: f64 = 15.0;
const DOSAGE_PENALTY_PER_UNIT: f64 = 1.5;
const SUPPORT_POINTS: f64 = 15.0;
const SUPPORT_SATURATION: f64 = 100.0;

/// A trained model paired with its similarity to a candidate
#[derive(Debug, Clone, Copy)]
pub struct ClusterMatch<'a> {
    pub model: &'a TrainedClusterModel,
    pub similarity: f64,
}

impl ClusterMatch<'_> {
    pub fn summary(&self) -> MatchedCluster {
        MatchedCluster {
            product_type: self.model.product_type.clone(),
            stage: self.model.stage,
            similarity: self.similarity,
        }
    }
}

/// Similarity of one model to a candidate (0-100)
pub fn similarity(candidate: &CandidateProduct, model: &TrainedClusterModel) -> f64 {
    let mut score = 0.0;

    if model.product_type.eq_ignore_ascii_case(&candidate.product_type) {
        score += TYPE_POINTS;
    }

    if let Some(distance) = candidate.ph.and_then(|ph| model.nearest_ph_distance(ph)) {
        score += (PH_POINTS - PH_PENALTY_PER_UNIT * distance).max(0.0);
    }

    if let Some(distance) = candidate
        .dosage
        .and_then(|dosage| model.nearest_dosage_distance(dosage))
    {
        score += (DOSAGE_POINTS - DOSAGE_PENALTY_PER_UNIT * distance).max(0.0);
    }

    score += (model.sample_count as f64 / SUPPORT_SATURATION).min(1.0) * SUPPORT_POINTS;
    score
}

/// Top `k` models by descending similarity
///
/// Equal similarities keep the order of `models`.
pub fn find_similar_clusters<'a>(
    candidate: &CandidateProduct,
    models: &'a [TrainedClusterModel],
    k: usize,
) -> Vec<ClusterMatch<'a>> {
    let mut matches: Vec<ClusterMatch<'a>> = models
        .iter()
        .map(|model| ClusterMatch {
            model,
            similarity: similarity(candidate, model),
        })
        .collect();

    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches.truncate(k);
    matches
}
