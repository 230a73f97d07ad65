//! Data model shared by the trainer, predictor and persistence boundary

pub mod candidate;
pub mod cluster;
pub mod coefficients;
pub mod flavor;
pub mod prediction;
pub mod record;

pub use candidate::{CandidateProduct, CandidateStatus};
pub use cluster::{
    AxisStatistics, ClusterCentroid, CurvePoint, DrinkingWindow, PhysicochemicalStats,
    TrainedClusterModel,
};
pub use coefficients::{Coefficient, CoefficientOverrides, CoefficientSet, Provenance};
pub use flavor::{AxisClass, FlavorAxis, FlavorProfile};
pub use prediction::{
    AgingFactors, AgingPrediction, HarvestWindow, MatchedCluster, PredictionRecord,
    PredictionSource, QualityScores, QualityWeights, TimelinePoint,
};
pub use record::{AgingStage, ProductCategory, ReductionPotential, TerrestrialRecord};
