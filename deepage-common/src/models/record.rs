//! Historical terrestrial-aging records and their classification enums

use serde::{Deserialize, Serialize};
use std::fmt;

use super::flavor::FlavorProfile;

/// Beverage category
///
/// Drives per-category aging-factor and quality-weight defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[default]
    SparklingWine,
    StillWine,
    Sake,
    Spirits,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::SparklingWine => "sparkling_wine",
            ProductCategory::StillWine => "still_wine",
            ProductCategory::Sake => "sake",
            ProductCategory::Spirits => "spirits",
            ProductCategory::Other => "other",
        }
    }
}

/// Qualitative reduction potential (tendency to develop reductive off-flavors)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ReductionPotential {
    #[default]
    Low,
    Medium,
    High,
}

impl ReductionPotential {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReductionPotential::Low => "low",
            ReductionPotential::Medium => "medium",
            ReductionPotential::High => "high",
        }
    }
}

impl fmt::Display for ReductionPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aging stage bucket
///
/// Inclusive upper bounds: youthful ≤ 3 y, developing ≤ 7 y, mature ≤ 15 y,
/// aged beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgingStage {
    Youthful,
    Developing,
    Mature,
    Aged,
}

impl AgingStage {
    /// Infer the stage from aging years
    pub fn from_years(years: f64) -> Self {
        if years <= 3.0 {
            AgingStage::Youthful
        } else if years <= 7.0 {
            AgingStage::Developing
        } else if years <= 15.0 {
            AgingStage::Mature
        } else {
            AgingStage::Aged
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgingStage::Youthful => "youthful",
            AgingStage::Developing => "developing",
            AgingStage::Mature => "mature",
            AgingStage::Aged => "aged",
        }
    }
}

impl fmt::Display for AgingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One historical aging observation
///
/// Immutable once imported; only read during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrestrialRecord {
    /// Product subtype used for grouping (e.g. "blanc_de_blancs")
    pub product_type: String,
    #[serde(default)]
    pub category: ProductCategory,

    #[serde(default)]
    pub ph: Option<f64>,
    /// Residual sugar added at disgorgement (g/L)
    #[serde(default)]
    pub dosage: Option<f64>,
    /// Alcohol by volume (%)
    #[serde(default)]
    pub alcohol: Option<f64>,
    /// Titratable acidity (g/L)
    #[serde(default)]
    pub acidity: Option<f64>,
    #[serde(default)]
    pub reduction_potential: Option<ReductionPotential>,

    pub flavor: FlavorProfile,

    pub aging_years: f64,
    /// Confidence in `aging_years` (0.0-1.0)
    #[serde(default)]
    pub aging_years_confidence: Option<f64>,
    /// Explicit stage; inferred from `aging_years` when absent
    #[serde(default)]
    pub aging_stage: Option<AgingStage>,

    #[serde(default)]
    pub data_source: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl TerrestrialRecord {
    /// Stage used for grouping: explicit if given, else inferred from years
    pub fn effective_stage(&self) -> AgingStage {
        self.aging_stage
            .unwrap_or_else(|| AgingStage::from_years(self.aging_years))
    }
}
