//! Candidate product under evaluation

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::{ProductCategory, ReductionPotential};
use crate::{Error, Result};

/// Candidate lifecycle
///
/// `Planned` → `Immersed` → `Harvested`; no other transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Planned,
    Immersed,
    Harvested,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Planned => "planned",
            CandidateStatus::Immersed => "immersed",
            CandidateStatus::Harvested => "harvested",
        }
    }
}

/// Product being considered for (or undergoing) undersea aging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProduct {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub category: ProductCategory,
    /// Subtype compared against cluster product types
    pub product_type: String,
    #[serde(default)]
    pub vintage: Option<i32>,
    #[serde(default)]
    pub producer: Option<String>,

    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub dosage: Option<f64>,
    #[serde(default)]
    pub alcohol: Option<f64>,
    #[serde(default)]
    pub acidity: Option<f64>,
    #[serde(default)]
    pub reduction_potential: ReductionPotential,

    #[serde(default)]
    pub immersion_date: Option<NaiveDate>,
    #[serde(default)]
    pub harvest_date: Option<NaiveDate>,
    #[serde(default)]
    pub planned_duration_months: Option<u32>,
    /// Immersion depth in meters
    pub aging_depth_m: f64,
    /// Years already spent aging on land before immersion
    #[serde(default)]
    pub land_aging_years: Option<f64>,

    #[serde(default)]
    pub status: CandidateStatus,
}

impl CandidateProduct {
    pub fn new(product_type: impl Into<String>, aging_depth_m: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: ProductCategory::default(),
            product_type: product_type.into(),
            vintage: None,
            producer: None,
            ph: None,
            dosage: None,
            alcohol: None,
            acidity: None,
            reduction_potential: ReductionPotential::default(),
            immersion_date: None,
            harvest_date: None,
            planned_duration_months: None,
            aging_depth_m,
            land_aging_years: None,
            status: CandidateStatus::Planned,
        }
    }

    /// Land-aging years fed to the quality models
    ///
    /// Explicit value wins; otherwise immersion year minus vintage (never
    /// negative); otherwise 0.
    pub fn effective_land_years(&self) -> f64 {
        if let Some(years) = self.land_aging_years {
            return years.max(0.0);
        }
        match (self.vintage, self.immersion_date) {
            (Some(vintage), Some(date)) => f64::from((date.year() - vintage).max(0)),
            _ => 0.0,
        }
    }

    /// Mark the candidate as immersed
    pub fn immerse(&mut self, date: NaiveDate) -> Result<()> {
        if self.status != CandidateStatus::Planned {
            return Err(Error::InvalidTransition {
                from: self.status.as_str(),
                to: CandidateStatus::Immersed.as_str(),
            });
        }
        self.immersion_date = Some(date);
        self.status = CandidateStatus::Immersed;
        Ok(())
    }

    /// Mark the candidate as harvested
    pub fn harvest(&mut self, date: NaiveDate) -> Result<()> {
        if self.status != CandidateStatus::Immersed {
            return Err(Error::InvalidTransition {
                from: self.status.as_str(),
                to: CandidateStatus::Harvested.as_str(),
            });
        }
        if let Some(immersed) = self.immersion_date {
            if date < immersed {
                return Err(Error::InvalidInput(format!(
                    "harvest date {} precedes immersion date {}",
                    date, immersed
                )));
            }
        }
        self.harvest_date = Some(date);
        self.status = CandidateStatus::Harvested;
        Ok(())
    }
}
