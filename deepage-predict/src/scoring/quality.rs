//! Quality score models
//!
//! Four closed-form curves evaluated at a month count. All outputs are
//! clamped to [0, 100].
//!
//! - **Texture maturity**: logistic over equivalent land years,
//!   `eq = land + months / (12·TCI)`, midpoint 4 years, steepness 0.8.
//!   Pressure integrates texture faster, so a smaller TCI ages faster.
//! - **Aroma freshness**: exponential decay over oxidative years,
//!   `ox = land + months·FRI / 12`, rate 0.06 per year.
//! - **Bubble refinement**: logistic growth from 40 toward 100 with
//!   `rate = 0.08·(BRI/1.6)·min(depth/30, 1.5)` per month.
//! - **Off-flavor risk**: additive: base 10, reduction potential, months
//!   beyond 24, minus a bonus for well-integrated texture.

use deepage_common::math::{clamp_score, logistic};
use deepage_common::models::{
    AgingFactors, CandidateProduct, CoefficientSet, QualityScores, ReductionPotential,
};

const TEXTURE_MIDPOINT_YEARS: f64 = 4.0;
const TEXTURE_STEEPNESS: f64 = 0.8;
const MIN_TCI: f64 = 0.01;

const AROMA_DECAY_PER_YEAR: f64 = 0.06;

const BUBBLE_START: f64 = 40.0;
const BUBBLE_BASE_RATE: f64 = 0.08;
const BUBBLE_REFERENCE_BRI: f64 = 1.6;
const BUBBLE_REFERENCE_DEPTH_M: f64 = 30.0;
const BUBBLE_MAX_DEPTH_FACTOR: f64 = 1.5;

const RISK_BASE: f64 = 10.0;
const RISK_HIGH_REDUCTION: f64 = 40.0;
const RISK_MEDIUM_REDUCTION: f64 = 20.0;
const RISK_LONG_AGING_START: f64 = 24.0;
const RISK_PER_LONG_MONTH: f64 = 2.0;
const RISK_TEXTURE_BONUS_ABOVE: f64 = 85.0;
const RISK_TEXTURE_BONUS: f64 = 10.0;

/// Texture maturity after `months` at depth
pub fn texture_maturity(land_years: f64, months: f64, tci: f64) -> f64 {
    let equivalent_years = land_years + months / (12.0 * tci.max(MIN_TCI));
    clamp_score(logistic(
        equivalent_years,
        TEXTURE_MIDPOINT_YEARS,
        TEXTURE_STEEPNESS,
        100.0,
    ))
}

/// Aroma freshness after `months` at depth
pub fn aroma_freshness(land_years: f64, months: f64, fri: f64) -> f64 {
    let oxidative_years = land_years + months * fri / 12.0;
    clamp_score(100.0 * (-AROMA_DECAY_PER_YEAR * oxidative_years).exp())
}

/// Bubble refinement after `months` at `depth_m`
pub fn bubble_refinement(months: f64, bri: f64, depth_m: f64) -> f64 {
    let depth_factor = (depth_m / BUBBLE_REFERENCE_DEPTH_M).min(BUBBLE_MAX_DEPTH_FACTOR);
    let rate = BUBBLE_BASE_RATE * (bri / BUBBLE_REFERENCE_BRI) * depth_factor;
    let ratio = (100.0 - BUBBLE_START) / BUBBLE_START;
    clamp_score(100.0 / (1.0 + ratio * (-rate * months).exp()))
}

/// Off-flavor risk after `months`, given the texture score at that month
pub fn off_flavor_risk(reduction: ReductionPotential, months: f64, texture: f64) -> f64 {
    let mut risk = RISK_BASE;
    risk += match reduction {
        ReductionPotential::High => RISK_HIGH_REDUCTION,
        ReductionPotential::Medium => RISK_MEDIUM_REDUCTION,
        ReductionPotential::Low => 0.0,
    };
    if months > RISK_LONG_AGING_START {
        risk += RISK_PER_LONG_MONTH * (months - RISK_LONG_AGING_START);
    }
    if texture > RISK_TEXTURE_BONUS_ABOVE {
        risk -= RISK_TEXTURE_BONUS;
    }
    clamp_score(risk)
}

/// Inputs shared by every month evaluated for one candidate
#[derive(Debug, Clone, Copy)]
pub struct QualityInputs {
    pub land_years: f64,
    pub depth_m: f64,
    pub reduction: ReductionPotential,
    pub tci: f64,
    pub fri: f64,
    pub bri: f64,
    pub factors: AgingFactors,
}

impl QualityInputs {
    /// Inputs for a candidate with unscaled quality models
    pub fn new(candidate: &CandidateProduct, coefficients: &CoefficientSet) -> Self {
        Self {
            land_years: candidate.effective_land_years(),
            depth_m: candidate.aging_depth_m,
            reduction: candidate.reduction_potential,
            tci: coefficients.tci.value,
            fri: coefficients.fri.value,
            bri: coefficients.bri.value,
            factors: AgingFactors {
                texture: 1.0,
                aroma: 1.0,
                bubble: 1.0,
            },
        }
    }

    /// Scale each model's month input by an aging factor
    pub fn with_factors(mut self, factors: AgingFactors) -> Self {
        self.factors = factors.clamped();
        self
    }

    /// Ignore land years (timeline view)
    pub fn without_land_years(mut self) -> Self {
        self.land_years = 0.0;
        self
    }

    /// Evaluate all four scores at `months`
    pub fn scores_at(&self, months: u32) -> QualityScores {
        let months = f64::from(months);
        let texture = texture_maturity(self.land_years, months * self.factors.texture, self.tci);
        QualityScores {
            texture_maturity: texture,
            aroma_freshness: aroma_freshness(self.land_years, months * self.factors.aroma, self.fri),
            bubble_refinement: bubble_refinement(
                months * self.factors.bubble,
                self.bri,
                self.depth_m,
            ),
            off_flavor_risk: off_flavor_risk(self.reduction, months, texture),
        }
    }
}

/// Statistical quality scores for a candidate after `months`
pub fn quality_scores(
    candidate: &CandidateProduct,
    months: u32,
    coefficients: &CoefficientSet,
) -> QualityScores {
    QualityInputs::new(candidate, coefficients).scores_at(months)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aroma_fresh_at_zero_months() {
        for fri in [0.1, 0.564, 1.0, 2.5] {
            assert_eq!(aroma_freshness(0.0, 0.0, fri), 100.0);
        }
    }

    #[test]
    fn test_aroma_one_year_terrestrial() {
        let aroma = aroma_freshness(0.0, 12.0, 1.0);
        assert!((aroma - 94.18).abs() < 0.01, "aroma = {}", aroma);
    }

    #[test]
    fn test_risk_high_reduction_long_aging() {
        assert_eq!(off_flavor_risk(ReductionPotential::High, 30.0, 50.0), 62.0);
    }

    #[test]
    fn test_risk_texture_bonus_and_floor() {
        assert_eq!(off_flavor_risk(ReductionPotential::Low, 12.0, 90.0), 0.0);
        assert_eq!(off_flavor_risk(ReductionPotential::Medium, 12.0, 90.0), 20.0);
    }

    #[test]
    fn test_risk_clamped_at_maximum() {
        assert_eq!(off_flavor_risk(ReductionPotential::High, 120.0, 0.0), 100.0);
    }

    #[test]
    fn test_texture_midpoint() {
        // 4 equivalent years at TCI 1.0 (terrestrial)
        assert!((texture_maturity(0.0, 48.0, 1.0) - 50.0).abs() < 1e-9);
        // Pressure accelerates: same months at TCI 0.3 are further along
        assert!(texture_maturity(0.0, 12.0, 0.3) > texture_maturity(0.0, 12.0, 1.0));
    }

    #[test]
    fn test_texture_tci_floor() {
        let floored = texture_maturity(0.0, 3.0, 0.0);
        assert!(floored.is_finite());
        assert!(floored > 99.0);
    }

    #[test]
    fn test_bubble_starts_at_forty_and_rises() {
        assert!((bubble_refinement(0.0, 3.1, 30.0) - 40.0).abs() < 1e-9);
        assert!(bubble_refinement(18.0, 3.1, 30.0) > bubble_refinement(6.0, 3.1, 30.0));
        assert!(bubble_refinement(600.0, 3.1, 30.0) <= 100.0);
    }

    #[test]
    fn test_zero_bubble_factor_freezes_refinement() {
        use deepage_common::models::{Coefficient, Provenance};

        let coefficient = |value| Coefficient {
            value,
            interval_low: value,
            interval_high: value,
            provenance: Provenance::Physics,
            justification: String::new(),
            references: Vec::new(),
        };
        let coefficients = CoefficientSet {
            tci: coefficient(0.3),
            fri: coefficient(0.564),
            bri: coefficient(3.1),
        };
        let candidate = CandidateProduct::new("junmai", 30.0);

        let inputs = QualityInputs::new(&candidate, &coefficients).with_factors(AgingFactors {
            texture: 1.0,
            aroma: 1.0,
            bubble: 0.0,
        });

        assert!((inputs.scores_at(24).bubble_refinement - 40.0).abs() < 1e-9);
    }
}
