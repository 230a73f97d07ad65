//! Coefficient calculator
//!
//! Derives the three physical correction coefficients that translate
//! terrestrial aging into undersea aging.
//!
//! # TCI (Texture/Compression Index)
//! Literature prior, 0.3 with a 95% interval of [0.06, 0.54]. Undersea
//! measurements have not validated it yet, so it always reports
//! `hypothesis` provenance, even when a stored override replaces the value.
//!
//! # FRI (Freshness Retention Index)
//! Arrhenius rate ratio between ocean and cellar temperature:
//! ```text
//! FRI = exp[(-Ea / R) * (1/T_ocean - 1/T_cellar)]
//! ```
//! with temperatures in Kelvin and R = 8.314 J/(mol·K). The interval comes
//! from evaluating at Ea ± 5 kJ/mol.
//!
//! # BRI (Bubble Refinement Index)
//! Ratio of CO₂ driving force on land vs. at depth, corrected for the
//! colder water's higher solubility:
//! ```text
//! force_land  = 6 - 1
//! force_ocean = max(0.1, 6 - (1 + depth/10))
//! BRI = (force_land / force_ocean) * (1 + 0.03 * (T_cellar - T_ocean))
//! ```
//! The interval comes from perturbing depth ±5 m and both temperatures ±2 °C
//! in the direction that moves BRI the most.

use deepage_common::models::{Coefficient, CoefficientOverrides, CoefficientSet, Provenance};
use deepage_common::params::EnvironmentParams;
use tracing::debug;

/// Gas constant, J/(mol·K)
const GAS_CONSTANT: f64 = 8.314;

/// Offset from Celsius to Kelvin
const KELVIN_OFFSET: f64 = 273.15;

/// TCI literature prior and its 95% interval
const TCI_PRIOR: f64 = 0.3;
const TCI_INTERVAL: (f64, f64) = (0.06, 0.54);

/// Activation energy uncertainty for the FRI interval (kJ/mol)
const EA_UNCERTAINTY_KJ: f64 = 5.0;

/// Internal bottle pressure (bar) and surface pressure (bar)
const BOTTLE_PRESSURE_BAR: f64 = 6.0;
const SURFACE_PRESSURE_BAR: f64 = 1.0;

/// Smallest ocean-side driving force; keeps BRI finite below ~50 m
const MIN_OCEAN_FORCE: f64 = 0.1;

/// CO₂ solubility gain per °C of cooling
const SOLUBILITY_PER_DEGREE: f64 = 0.03;

/// Perturbations for the BRI interval
const DEPTH_UNCERTAINTY_M: f64 = 5.0;
const TEMP_UNCERTAINTY_C: f64 = 2.0;

/// Texture/Compression Index value and interval
pub fn tci(override_value: Option<f64>) -> Coefficient {
    Coefficient {
        value: override_value.unwrap_or(TCI_PRIOR),
        interval_low: TCI_INTERVAL.0,
        interval_high: TCI_INTERVAL.1,
        provenance: Provenance::Hypothesis,
        justification: "Literature prior for pressure-driven texture integration; \
                        not yet validated against undersea harvests"
            .to_string(),
        references: vec![
            "Pressure effects on lees autolysis in bottle-fermented sparkling wine".to_string(),
        ],
    }
}

/// Arrhenius rate ratio for a given activation energy
pub fn arrhenius_ratio(ocean_temp_c: f64, cellar_temp_c: f64, activation_energy_kj: f64) -> f64 {
    let t_ocean = ocean_temp_c + KELVIN_OFFSET;
    let t_cellar = cellar_temp_c + KELVIN_OFFSET;
    let ea = activation_energy_kj * 1000.0;
    ((-ea / GAS_CONSTANT) * (1.0 / t_ocean - 1.0 / t_cellar)).exp()
}

/// Freshness Retention Index value and interval
pub fn fri(env: &EnvironmentParams, override_value: Option<f64>) -> Coefficient {
    let computed = arrhenius_ratio(env.ocean_temp_c, env.cellar_temp_c, env.activation_energy_kj);
    let lower_ea = arrhenius_ratio(
        env.ocean_temp_c,
        env.cellar_temp_c,
        env.activation_energy_kj - EA_UNCERTAINTY_KJ,
    );
    let upper_ea = arrhenius_ratio(
        env.ocean_temp_c,
        env.cellar_temp_c,
        env.activation_energy_kj + EA_UNCERTAINTY_KJ,
    );

    let (value, provenance) = match override_value {
        Some(v) => (v, Provenance::Configured),
        None => (computed, Provenance::Physics),
    };

    Coefficient {
        value,
        interval_low: lower_ea.min(upper_ea),
        interval_high: lower_ea.max(upper_ea),
        provenance,
        justification: format!(
            "Arrhenius ratio at {:.1} °C ocean vs {:.1} °C cellar, Ea {:.0} kJ/mol",
            env.ocean_temp_c, env.cellar_temp_c, env.activation_energy_kj
        ),
        references: vec!["Arrhenius equation for oxidative reaction kinetics".to_string()],
    }
}

/// Raw BRI for one set of conditions
pub fn bubble_ratio(depth_m: f64, ocean_temp_c: f64, cellar_temp_c: f64) -> f64 {
    let force_land = BOTTLE_PRESSURE_BAR - SURFACE_PRESSURE_BAR;
    let force_ocean =
        (BOTTLE_PRESSURE_BAR - (SURFACE_PRESSURE_BAR + depth_m / 10.0)).max(MIN_OCEAN_FORCE);
    let solubility = 1.0 + SOLUBILITY_PER_DEGREE * (cellar_temp_c - ocean_temp_c);
    (force_land / force_ocean) * solubility
}

/// Bubble Refinement Index value and interval
pub fn bri(env: &EnvironmentParams, depth_m: f64, override_value: Option<f64>) -> Coefficient {
    let computed = bubble_ratio(depth_m, env.ocean_temp_c, env.cellar_temp_c);
    let shallow_warm = bubble_ratio(
        (depth_m - DEPTH_UNCERTAINTY_M).max(0.0),
        env.ocean_temp_c + TEMP_UNCERTAINTY_C,
        env.cellar_temp_c - TEMP_UNCERTAINTY_C,
    );
    let deep_cold = bubble_ratio(
        depth_m + DEPTH_UNCERTAINTY_M,
        env.ocean_temp_c - TEMP_UNCERTAINTY_C,
        env.cellar_temp_c + TEMP_UNCERTAINTY_C,
    );

    let (value, provenance) = match override_value {
        Some(v) => (v, Provenance::Configured),
        None => (computed, Provenance::Physics),
    };

    Coefficient {
        value,
        interval_low: shallow_warm.min(deep_cold),
        interval_high: shallow_warm.max(deep_cold),
        provenance,
        justification: format!(
            "Hydrostatic pressure at {:.0} m reduces CO₂ driving force; colder water raises solubility",
            depth_m
        ),
        references: vec![
            "Henry's law CO₂ solubility in hydroalcoholic solutions".to_string(),
            "Hydrostatic pressure: 1 bar per 10 m seawater".to_string(),
        ],
    }
}

/// Compute the full coefficient set for one candidate's conditions
pub fn compute(
    env: &EnvironmentParams,
    depth_m: f64,
    overrides: &CoefficientOverrides,
) -> CoefficientSet {
    let set = CoefficientSet {
        tci: tci(overrides.tci),
        fri: fri(env, overrides.fri),
        bri: bri(env, depth_m, overrides.bri),
    };

    debug!(
        depth_m,
        tci = set.tci.value,
        fri = set.fri.value,
        bri = set.bri.value,
        overridden = !overrides.is_empty(),
        "Computed coefficients"
    );

    set
}
