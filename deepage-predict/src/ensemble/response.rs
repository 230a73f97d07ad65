//! Parsing and sanitizing external inference responses
//!
//! Responses are untrusted. Every field is optional at the wire level; the
//! `flavor` and `quality` objects are the only hard requirements. Everything
//! else is clamped, normalized or filled from the statistical estimate.

use serde::Deserialize;

use deepage_common::math::{clamp_score, clamp_to};
use deepage_common::models::{
    AgingFactors, FlavorAxis, FlavorProfile, HarvestWindow, QualityScores, QualityWeights,
};

use super::provider::InferenceError;

/// Wire shape of a response; every leaf optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    flavor: Option<RawFlavor>,
    quality: Option<RawQuality>,
    harvest_window: Option<RawWindow>,
    insight: Option<String>,
    risk_warning: Option<String>,
    aging_factors: Option<RawFactors>,
    quality_weights: Option<RawWeights>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFlavor {
    fruity: Option<f64>,
    floral: Option<f64>,
    creamy: Option<f64>,
    mineral: Option<f64>,
    toasty: Option<f64>,
    nutty: Option<f64>,
}

impl RawFlavor {
    fn get(&self, axis: FlavorAxis) -> Option<f64> {
        match axis {
            FlavorAxis::Fruity => self.fruity,
            FlavorAxis::Floral => self.floral,
            FlavorAxis::Creamy => self.creamy,
            FlavorAxis::Mineral => self.mineral,
            FlavorAxis::Toasty => self.toasty,
            FlavorAxis::Nutty => self.nutty,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuality {
    texture_maturity: Option<f64>,
    aroma_freshness: Option<f64>,
    bubble_refinement: Option<f64>,
    off_flavor_risk: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWindow {
    start_month: Option<f64>,
    end_month: Option<f64>,
    recommendation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFactors {
    texture: Option<f64>,
    aroma: Option<f64>,
    bubble: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWeights {
    texture: Option<f64>,
    aroma: Option<f64>,
    bubble: Option<f64>,
    risk: Option<f64>,
}

/// A response that passed validation, before gap-filling
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPrediction {
    /// Axes the service supplied (each clamped)
    pub flavor: [Option<f64>; 6],
    pub texture_maturity: Option<f64>,
    pub aroma_freshness: Option<f64>,
    pub bubble_refinement: Option<f64>,
    pub off_flavor_risk: Option<f64>,
    pub window: Option<(Option<f64>, Option<f64>, Option<String>)>,
    pub insight: Option<String>,
    pub risk_warning: Option<String>,
    pub aging_factors: Option<(Option<f64>, Option<f64>, Option<f64>)>,
    pub quality_weights: Option<(Option<f64>, Option<f64>, Option<f64>, Option<f64>)>,
}

/// Defaults used to fill anything the service left out
#[derive(Debug, Clone)]
pub struct Fallbacks {
    pub flavor: FlavorProfile,
    pub quality: QualityScores,
    pub window: HarvestWindow,
    pub aging_factors: AgingFactors,
    pub quality_weights: QualityWeights,
    pub scan_range: (u32, u32),
}

/// A fully populated, range-checked external result
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedPrediction {
    pub flavor: FlavorProfile,
    pub quality: QualityScores,
    pub window: HarvestWindow,
    pub insight: Option<String>,
    pub risk_warning: Option<String>,
    /// Factors the service supplied, if any (already clamped and completed)
    pub supplied_factors: Option<AgingFactors>,
    pub aging_factors: AgingFactors,
    pub quality_weights: QualityWeights,
}

/// Decode the first JSON object embedded in free text
///
/// Each `{` is tried as a start in turn and only one value is read from it,
/// so fences, leading prose and trailing prose (braces included) are ignored.
fn first_json_object(text: &str) -> Result<RawResponse, InferenceError> {
    let mut last_error = None;
    for (start, _) in text.match_indices('{') {
        let mut values =
            serde_json::Deserializer::from_str(&text[start..]).into_iter::<RawResponse>();
        match values.next() {
            Some(Ok(raw)) => return Ok(raw),
            Some(Err(e)) => {
                last_error.get_or_insert(e);
            }
            None => {}
        }
    }

    Err(match last_error {
        Some(e) => InferenceError::MalformedResponse(format!("Invalid JSON: {}", e)),
        None => InferenceError::MalformedResponse("No JSON object found".to_string()),
    })
}

/// Parse raw completion text; `flavor` and `quality` must both be present
pub fn parse_response(text: &str) -> Result<ExternalPrediction, InferenceError> {
    let raw = first_json_object(text)?;

    let flavor = raw
        .flavor
        .ok_or_else(|| InferenceError::MalformedResponse("Missing flavor object".to_string()))?;
    let quality = raw
        .quality
        .ok_or_else(|| InferenceError::MalformedResponse("Missing quality object".to_string()))?;

    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

    Ok(ExternalPrediction {
        flavor: FlavorAxis::ALL.map(|axis| finite(flavor.get(axis)).map(clamp_score)),
        texture_maturity: finite(quality.texture_maturity).map(clamp_score),
        aroma_freshness: finite(quality.aroma_freshness).map(clamp_score),
        bubble_refinement: finite(quality.bubble_refinement).map(clamp_score),
        off_flavor_risk: finite(quality.off_flavor_risk).map(clamp_score),
        window: raw.harvest_window.map(|w| {
            (
                finite(w.start_month),
                finite(w.end_month),
                w.recommendation.filter(|r| !r.trim().is_empty()),
            )
        }),
        insight: raw.insight.filter(|s| !s.trim().is_empty()),
        risk_warning: raw.risk_warning.filter(|s| !s.trim().is_empty()),
        aging_factors: raw
            .aging_factors
            .map(|f| (finite(f.texture), finite(f.aroma), finite(f.bubble))),
        quality_weights: raw.quality_weights.map(|w| {
            (
                finite(w.texture),
                finite(w.aroma),
                finite(w.bubble),
                finite(w.risk),
            )
        }),
    })
}

impl ExternalPrediction {
    /// Aging factors the service supplied, completed from `defaults` and clamped
    pub fn supplied_factors(&self, defaults: AgingFactors) -> Option<AgingFactors> {
        self.aging_factors.map(|(texture, aroma, bubble)| {
            AgingFactors {
                texture: texture.unwrap_or(defaults.texture),
                aroma: aroma.unwrap_or(defaults.aroma),
                bubble: bubble.unwrap_or(defaults.bubble),
            }
            .clamped()
        })
    }

    /// Fill gaps from `fallbacks` and enforce every documented range
    pub fn sanitize(self, fallbacks: &Fallbacks) -> SanitizedPrediction {
        let flavor = FlavorProfile::from_fn(|axis| {
            let index = FlavorAxis::ALL
                .iter()
                .position(|a| *a == axis)
                .unwrap_or_default();
            self.flavor[index].unwrap_or_else(|| fallbacks.flavor.get(axis))
        });

        let quality = QualityScores {
            texture_maturity: self
                .texture_maturity
                .unwrap_or(fallbacks.quality.texture_maturity),
            aroma_freshness: self
                .aroma_freshness
                .unwrap_or(fallbacks.quality.aroma_freshness),
            bubble_refinement: self
                .bubble_refinement
                .unwrap_or(fallbacks.quality.bubble_refinement),
            off_flavor_risk: self
                .off_flavor_risk
                .unwrap_or(fallbacks.quality.off_flavor_risk),
        }
        .clamped();

        // Borrows `self`, so it must run before the window is moved out
        let supplied_factors = self.supplied_factors(fallbacks.aging_factors);

        let window = sanitize_window(self.window, fallbacks);

        let quality_weights = match self.quality_weights {
            Some((texture, aroma, bubble, risk)) => QualityWeights {
                texture: texture.unwrap_or(fallbacks.quality_weights.texture),
                aroma: aroma.unwrap_or(fallbacks.quality_weights.aroma),
                bubble: bubble.unwrap_or(fallbacks.quality_weights.bubble),
                risk: risk.unwrap_or(fallbacks.quality_weights.risk),
            }
            .normalized_or(fallbacks.quality_weights),
            None => fallbacks.quality_weights,
        };

        SanitizedPrediction {
            flavor: flavor.clamped(),
            quality,
            window,
            insight: self.insight,
            risk_warning: self.risk_warning,
            supplied_factors,
            aging_factors: supplied_factors.unwrap_or(fallbacks.aging_factors),
            quality_weights,
        }
    }
}

fn sanitize_window(
    raw: Option<(Option<f64>, Option<f64>, Option<String>)>,
    fallbacks: &Fallbacks,
) -> HarvestWindow {
    let Some((start, end, recommendation)) = raw else {
        return fallbacks.window.clone();
    };

    let (min, max) = fallbacks.scan_range;
    let to_month = |v: f64| clamp_to(v.round(), f64::from(min), f64::from(max)) as u32;

    let mut start_month = start.map(to_month).unwrap_or(fallbacks.window.start_month);
    let mut end_month = end.map(to_month).unwrap_or(fallbacks.window.end_month);
    if start_month > end_month {
        std::mem::swap(&mut start_month, &mut end_month);
    }

    HarvestWindow {
        start_month,
        end_month,
        recommendation: recommendation.unwrap_or_else(|| fallbacks.window.recommendation.clone()),
    }
}
