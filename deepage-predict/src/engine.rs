//! Aging engine facade
//!
//! Owns the immutable parameters, the published model set and the strategy
//! chain. Every operation reads a registry snapshot, so a concurrent
//! `train` never changes the models a prediction is using.

use std::sync::Arc;

use deepage_common::models::{
    AgingPrediction, CandidateProduct, CoefficientOverrides, CoefficientSet, FlavorProfile,
    TerrestrialRecord, TimelinePoint, TrainedClusterModel,
};
use deepage_common::EngineParams;

use crate::coefficients;
use crate::ensemble::{Blender, PredictionInput};
use crate::timeline;
use crate::training::{self, ModelRegistry, TrainingStats};

pub struct AgingEngine {
    params: EngineParams,
    overrides: CoefficientOverrides,
    registry: ModelRegistry,
    blender: Blender,
}

impl AgingEngine {
    pub fn new(params: EngineParams, blender: Blender) -> Self {
        Self {
            params,
            overrides: CoefficientOverrides::default(),
            registry: ModelRegistry::new(),
            blender,
        }
    }

    /// Apply stored coefficient overrides to every computed coefficient set
    pub fn with_overrides(mut self, overrides: CoefficientOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Start from a previously trained model set
    pub fn with_models(mut self, models: Vec<TrainedClusterModel>) -> Self {
        self.registry = ModelRegistry::with_models(models);
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn models(&self) -> Arc<Vec<TrainedClusterModel>> {
        self.registry.snapshot()
    }

    /// Train from records and publish the new model set
    pub fn train(&self, records: &[TerrestrialRecord]) -> (Arc<Vec<TrainedClusterModel>>, TrainingStats) {
        let (models, stats) = training::train_with_stats(records, &self.params);
        (self.registry.replace(models), stats)
    }

    /// Coefficients for a candidate's depth under the configured environment
    pub fn coefficients_for(
        &self,
        candidate: &CandidateProduct,
        overrides: &CoefficientOverrides,
    ) -> CoefficientSet {
        coefficients::compute(&self.params.environment, candidate.aging_depth_m, overrides)
    }

    /// Predict aging outcome; computes coefficients when none are supplied
    pub async fn predict(
        &self,
        candidate: &CandidateProduct,
        duration_months: u32,
        coefficients: Option<&CoefficientSet>,
    ) -> AgingPrediction {
        self.predict_with_qualitative(candidate, duration_months, coefficients, None)
            .await
    }

    /// Predict, forwarding an outside qualitative profile to the service
    pub async fn predict_with_qualitative(
        &self,
        candidate: &CandidateProduct,
        duration_months: u32,
        coefficients: Option<&CoefficientSet>,
        qualitative_flavor: Option<&FlavorProfile>,
    ) -> AgingPrediction {
        let computed;
        let coefficients = match coefficients {
            Some(c) => c,
            None => {
                computed = self.coefficients_for(candidate, &self.overrides);
                &computed
            }
        };
        let models = self.registry.snapshot();

        self.blender
            .predict(
                PredictionInput {
                    candidate,
                    duration_months,
                    models: &models,
                    coefficients,
                    qualitative_flavor,
                },
                &self.params,
            )
            .await
    }

    pub fn timeline(
        &self,
        candidate: &CandidateProduct,
        coefficients: &CoefficientSet,
    ) -> Vec<TimelinePoint> {
        timeline::timeline(candidate, coefficients, &self.params)
    }
}
