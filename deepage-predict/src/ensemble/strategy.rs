//! Prediction strategies
//!
//! The blender walks an ordered chain: one `InferenceStrategy` per service
//! variant, then the infallible `StatisticalStrategy`. The first strategy to
//! produce a schema-valid result wins.

use std::sync::Arc;
use std::time::Duration;

use deepage_common::models::{
    CandidateProduct, CoefficientSet, FlavorProfile, HarvestWindow, QualityScores,
};
use deepage_common::EngineParams;
use tracing::debug;

use super::provider::{InferenceError, InferenceProvider};
use super::response::{parse_response, ExternalPrediction};
use crate::harvest;
use crate::matching::ClusterMatch;
use crate::scoring::{self, QualityInputs};

/// One external service variant with its per-attempt timeout
#[derive(Clone)]
pub struct InferenceStrategy {
    provider: Arc<dyn InferenceProvider>,
    timeout: Duration,
}

impl InferenceStrategy {
    pub fn new(provider: Arc<dyn InferenceProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn variant(&self) -> &str {
        self.provider.name()
    }

    /// Request and validate one completion
    ///
    /// The timeout covers the whole call, including time spent waiting on the
    /// rate limiter.
    pub async fn attempt(&self, prompt: &str) -> Result<ExternalPrediction, InferenceError> {
        debug!(variant = self.variant(), timeout_secs = self.timeout.as_secs(), "Attempting inference");

        let text = tokio::time::timeout(self.timeout, self.provider.complete(prompt))
            .await
            .map_err(|_| InferenceError::Timeout)??;

        parse_response(&text)
    }
}

impl std::fmt::Debug for InferenceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceStrategy")
            .field("variant", &self.variant())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Statistical flavor, quality and window for one candidate and duration
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalEstimate {
    pub flavor: FlavorProfile,
    pub quality: QualityScores,
    pub window: HarvestWindow,
}

/// Terminal strategy; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalStrategy;

impl StatisticalStrategy {
    pub fn estimate(
        &self,
        candidate: &CandidateProduct,
        duration_months: u32,
        matches: &[ClusterMatch<'_>],
        coefficients: &CoefficientSet,
        params: &EngineParams,
    ) -> StatisticalEstimate {
        let inputs = QualityInputs::new(candidate, coefficients);
        StatisticalEstimate {
            flavor: scoring::statistical_profile(matches, duration_months, coefficients),
            quality: inputs.scores_at(duration_months),
            window: harvest::optimal_window(&inputs, params),
        }
    }
}
