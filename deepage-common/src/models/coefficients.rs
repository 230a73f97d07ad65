//! Physical correction coefficients with provenance

use serde::{Deserialize, Serialize};

/// Where a coefficient value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Literature prior, not yet validated by undersea measurements
    Hypothesis,
    /// Derived from a physical model of the environment
    Physics,
    /// Value supplied by stored configuration
    Configured,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Hypothesis => "hypothesis",
            Provenance::Physics => "physics",
            Provenance::Configured => "configured",
        }
    }
}

/// One correction coefficient with its 95% interval and explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub value: f64,
    pub interval_low: f64,
    pub interval_high: f64,
    pub provenance: Provenance,
    /// One-line justification
    pub justification: String,
    pub references: Vec<String>,
}

/// The three coefficients applied to a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSet {
    /// Texture/Compression Index
    pub tci: Coefficient,
    /// Freshness Retention Index
    pub fri: Coefficient,
    /// Bubble Refinement Index
    pub bri: Coefficient,
}

/// Stored coefficient overrides; `None` means "compute / use the prior"
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoefficientOverrides {
    pub tci: Option<f64>,
    pub fri: Option<f64>,
    pub bri: Option<f64>,
}

impl CoefficientOverrides {
    pub fn is_empty(&self) -> bool {
        self.tci.is_none() && self.fri.is_none() && self.bri.is_none()
    }
}
