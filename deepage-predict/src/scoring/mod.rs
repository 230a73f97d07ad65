//! Statistical quality and flavor predictions

pub mod flavor;
pub mod quality;

pub use flavor::statistical_profile;
pub use quality::{
    aroma_freshness, bubble_refinement, off_flavor_risk, quality_scores, texture_maturity,
    QualityInputs,
};
