//! Shared numeric utilities
//!
//! Every score that leaves the engine passes through [`clamp_score`], and every
//! weight set passes through [`normalize_weights`], so the range and sum
//! invariants hold no matter which code path produced the value.

/// Lower bound of every flavor axis and quality score
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of every flavor axis and quality score
pub const SCORE_MAX: f64 = 100.0;

/// Clamp a value into an inclusive range, mapping NaN to the lower bound
pub fn clamp_to(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Clamp a score into [0, 100]
pub fn clamp_score(value: f64) -> f64 {
    clamp_to(value, SCORE_MIN, SCORE_MAX)
}

/// Normalize non-negative weights so they sum to 1.0
///
/// Negative and non-finite entries are treated as zero. Returns `None` when
/// nothing positive remains (caller decides the fallback). Weights are scaled
/// by their maximum before summing so huge finite values cannot overflow.
pub fn normalize_weights(weights: &[f64]) -> Option<Vec<f64>> {
    let cleaned: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let max = cleaned.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return None;
    }
    let scaled: Vec<f64> = cleaned.iter().map(|w| w / max).collect();
    let sum: f64 = scaled.iter().sum();
    Some(scaled.into_iter().map(|w| w / sum).collect())
}

/// Standard logistic curve scaled to [0, `max`]
///
/// `max / (1 + e^(-steepness * (x - midpoint)))`
pub fn logistic(x: f64, midpoint: f64, steepness: f64, max: f64) -> f64 {
    max / (1.0 + (-steepness * (x - midpoint)).exp())
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Population standard deviation (n), deterministic
pub fn population_stddev(xs: &[f64], mean: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / (xs.len() as f64);
    var.sqrt()
}

/// Percentile of an ascending-sorted slice using linear interpolation
///
/// `p` is in [0, 1]; position is `p * (n - 1)`.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}
