//! Terrestrial trainer
//!
//! Aggregates historical terrestrial-aging records into one
//! `TrainedClusterModel` per (product type, aging stage) group.
//!
//! # Algorithm
//! 1. Group records by (type, stage); stage is explicit or inferred from years
//! 2. Skip groups smaller than `min_group_size` (no model, no error)
//! 3. For each surviving group compute flavor statistics, physicochemical
//!    statistics, cluster centroids and drinking window over the group
//! 4. Transition curves are computed over every record of the type (all
//!    stages) and shared by that type's models
//! 5. confidence = min(sample_count / 100, 1)
//!
//! Output is ordered by (type, stage) so training is reproducible.

use std::collections::BTreeMap;

use deepage_common::models::{AgingStage, TerrestrialRecord, TrainedClusterModel};
use deepage_common::EngineParams;
use tracing::{debug, info};

use super::aggregates;

/// Sample count at which cluster confidence saturates
const CONFIDENCE_SATURATION: f64 = 100.0;

/// Training run statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingStats {
    /// Records read
    pub records: usize,
    /// (type, stage) groups seen
    pub groups: usize,
    /// Groups that produced a model
    pub models: usize,
    /// Groups skipped for insufficient data
    pub skipped_groups: usize,
}

/// Train cluster models from historical records
pub fn train(records: &[TerrestrialRecord], params: &EngineParams) -> Vec<TrainedClusterModel> {
    train_with_stats(records, params).0
}

/// Train cluster models and report what was skipped
pub fn train_with_stats(
    records: &[TerrestrialRecord],
    params: &EngineParams,
) -> (Vec<TrainedClusterModel>, TrainingStats) {
    let mut by_type: BTreeMap<&str, Vec<&TerrestrialRecord>> = BTreeMap::new();
    let mut by_group: BTreeMap<(&str, AgingStage), Vec<&TerrestrialRecord>> = BTreeMap::new();

    for record in records {
        let product_type = record.product_type.as_str();
        by_type.entry(product_type).or_default().push(record);
        by_group
            .entry((product_type, record.effective_stage()))
            .or_default()
            .push(record);
    }

    let mut stats = TrainingStats {
        records: records.len(),
        groups: by_group.len(),
        ..TrainingStats::default()
    };

    let mut curve_cache = BTreeMap::new();
    let mut models = Vec::new();

    for ((product_type, stage), group) in &by_group {
        if group.len() < params.min_group_size {
            debug!(
                product_type,
                stage = %stage,
                samples = group.len(),
                min = params.min_group_size,
                "Skipping group with insufficient data"
            );
            stats.skipped_groups += 1;
            continue;
        }

        let transition_curves = curve_cache
            .entry(*product_type)
            .or_insert_with(|| aggregates::transition_curves(&by_type[product_type]))
            .clone();

        models.push(TrainedClusterModel {
            product_type: product_type.to_string(),
            stage: *stage,
            sample_count: group.len(),
            flavor_stats: aggregates::flavor_statistics(group),
            physicochemical: aggregates::physicochemical_statistics(group),
            transition_curves,
            centroids: aggregates::cluster_centroids(group),
            drinking_window: aggregates::drinking_window(group),
            confidence: (group.len() as f64 / CONFIDENCE_SATURATION).min(1.0),
        });
    }

    stats.models = models.len();

    info!(
        records = stats.records,
        groups = stats.groups,
        models = stats.models,
        skipped = stats.skipped_groups,
        "Training complete"
    );

    (models, stats)
}
