//! End-to-end properties of the statistical prediction path
//!
//! Fixtures are built in code: a small terrestrial history with two product
//! types across several aging stages.

use chrono::NaiveDate;
use deepage_common::models::{
    AgingStage, CandidateProduct, CoefficientOverrides, FlavorProfile, PredictionSource,
    ProductCategory, QualityWeights, ReductionPotential, TerrestrialRecord,
};
use deepage_common::EngineParams;
use deepage_predict::scoring::{aroma_freshness, off_flavor_risk};
use deepage_predict::{
    coefficients, find_similar_clusters, harvest, predict_statistical, train, AgingEngine, Blender,
    PredictionInput,
};

fn record(
    product_type: &str,
    years: f64,
    ph: f64,
    dosage: f64,
    flavor: FlavorProfile,
) -> TerrestrialRecord {
    TerrestrialRecord {
        product_type: product_type.to_string(),
        category: ProductCategory::SparklingWine,
        ph: Some(ph),
        dosage: Some(dosage),
        alcohol: Some(12.0),
        acidity: Some(6.5),
        reduction_potential: Some(ReductionPotential::Low),
        flavor,
        aging_years: years,
        aging_years_confidence: Some(0.8),
        aging_stage: None,
        data_source: "cellar-log".to_string(),
        notes: None,
        rating: Some(88.0 + years),
    }
}

fn history() -> Vec<TerrestrialRecord> {
    let mut records = Vec::new();
    for i in 0..6 {
        let jitter = f64::from(i) * 0.02;
        records.push(record(
            "brut",
            2.0 + jitter,
            3.05 + jitter,
            6.0,
            FlavorProfile {
                fruity: 72.0,
                floral: 60.0,
                creamy: 45.0,
                mineral: 55.0,
                toasty: 30.0,
                nutty: 20.0,
            },
        ));
        records.push(record(
            "brut",
            5.0 + jitter,
            3.1,
            7.5,
            FlavorProfile {
                fruity: 55.0,
                floral: 48.0,
                creamy: 62.0,
                mineral: 58.0,
                toasty: 52.0,
                nutty: 38.0,
            },
        ));
        records.push(record(
            "blanc_de_noirs",
            9.0 + jitter,
            3.3,
            3.0,
            FlavorProfile {
                fruity: 35.0,
                floral: 30.0,
                creamy: 70.0,
                mineral: 50.0,
                toasty: 68.0,
                nutty: 60.0,
            },
        ));
    }
    records
}

fn candidate() -> CandidateProduct {
    let mut candidate = CandidateProduct::new("brut", 30.0);
    candidate.ph = Some(3.08);
    candidate.dosage = Some(6.5);
    candidate.vintage = Some(2021);
    candidate
        .immerse(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap())
        .unwrap();
    candidate
}

fn assert_in_score_range(value: f64, what: &str) {
    assert!((0.0..=100.0).contains(&value), "{} out of range: {}", what, value);
}

#[test]
fn test_training_groups_by_type_and_stage() {
    let models = train(&history(), &EngineParams::default());

    let keys: Vec<(&str, AgingStage)> = models
        .iter()
        .map(|m| (m.product_type.as_str(), m.stage))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("blanc_de_noirs", AgingStage::Mature),
            ("brut", AgingStage::Youthful),
            ("brut", AgingStage::Developing),
        ]
    );
}

#[test]
fn test_group_threshold_four_versus_five() {
    let youthful_brut: Vec<_> = history()
        .into_iter()
        .filter(|r| r.product_type == "brut" && r.aging_years < 3.0)
        .collect();

    assert!(train(&youthful_brut[..4], &EngineParams::default()).is_empty());
    assert_eq!(train(&youthful_brut[..5], &EngineParams::default()).len(), 1);
}

#[test]
fn test_matching_sorted_and_bounded() {
    let models = train(&history(), &EngineParams::default());

    for k in [1, 2, 5] {
        let matches = find_similar_clusters(&candidate(), &models, k);
        assert!(matches.len() <= k);
        assert!(matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    assert!(find_similar_clusters(&candidate(), &[], 5).is_empty());
}

#[test]
fn test_reference_quality_values() {
    assert_eq!(aroma_freshness(0.0, 0.0, 0.42), 100.0);
    assert!((aroma_freshness(0.0, 12.0, 1.0) - 94.18).abs() < 0.01);
    assert_eq!(off_flavor_risk(ReductionPotential::High, 30.0, 50.0), 62.0);
}

#[test]
fn test_impossible_thresholds_fall_back_to_default_window() {
    let params = EngineParams {
        optimal_quality_threshold: 100.0,
        aroma_threshold: 100.0,
        off_flavor_threshold: 0.0,
        ..EngineParams::default()
    };
    let candidate = candidate();
    let coefficients = coefficients::compute(
        &params.environment,
        candidate.aging_depth_m,
        &CoefficientOverrides::default(),
    );

    let window = harvest::harvest_window(&candidate, &coefficients, &params);

    assert_eq!((window.start_month, window.end_month), (12, 18));
}

#[test]
fn test_statistical_prediction_in_range_for_every_duration() {
    let params = EngineParams::default();
    let models = train(&history(), &params);
    let candidate = candidate();
    let coefficients = coefficients::compute(
        &params.environment,
        candidate.aging_depth_m,
        &CoefficientOverrides::default(),
    );

    for months in [0, 6, 12, 18, 24, 36, 60, 120] {
        let prediction = predict_statistical(
            PredictionInput {
                candidate: &candidate,
                duration_months: months,
                models: &models,
                coefficients: &coefficients,
                qualitative_flavor: None,
            },
            &params,
        );

        for (axis, value) in prediction.flavor.iter() {
            assert_in_score_range(value, axis.as_str());
        }
        assert_in_score_range(prediction.quality.texture_maturity, "texture");
        assert_in_score_range(prediction.quality.aroma_freshness, "aroma");
        assert_in_score_range(prediction.quality.bubble_refinement, "bubble");
        assert_in_score_range(prediction.quality.off_flavor_risk, "risk");
        assert_in_score_range(prediction.overall_quality, "overall");
        assert!((prediction.quality_weights.sum() - 1.0).abs() < 1e-6);
        assert_eq!(prediction.source, PredictionSource::Statistical);
    }
}

#[test]
fn test_category_weights_sum_to_one() {
    for category in [
        ProductCategory::SparklingWine,
        ProductCategory::StillWine,
        ProductCategory::Sake,
        ProductCategory::Spirits,
        ProductCategory::Other,
    ] {
        assert!((QualityWeights::for_category(category).sum() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn test_land_years_come_from_vintage() {
    // Vintage 2021 immersed in 2023: two years on land
    assert_eq!(candidate().effective_land_years(), 2.0);
}

#[tokio::test]
async fn test_unavailable_service_predictions_identical() {
    let engine = AgingEngine::new(EngineParams::default(), Blender::statistical_only());
    engine.train(&history());
    let candidate = candidate();

    let first = engine.predict(&candidate, 18, None).await;
    let second = engine.predict(&candidate, 18, None).await;

    assert_eq!(first, second);
    assert!((first.confidence - 0.6).abs() < 1e-9);
    assert_eq!(first.matched_clusters.len(), 3);
}

#[tokio::test]
async fn test_risk_warning_only_at_or_above_threshold() {
    let engine = AgingEngine::new(EngineParams::default(), Blender::statistical_only());
    engine.train(&history());

    let mut risky = candidate();
    risky.reduction_potential = ReductionPotential::High;
    let safe = candidate();

    let risky_prediction = engine.predict(&risky, 18, None).await;
    let safe_prediction = engine.predict(&safe, 18, None).await;

    assert!(risky_prediction.quality.off_flavor_risk >= 40.0);
    assert!(risky_prediction.risk_warning.is_some());
    assert!(safe_prediction.quality.off_flavor_risk < 40.0);
    assert!(safe_prediction.risk_warning.is_none());
}

#[tokio::test]
async fn test_no_models_gives_neutral_based_prediction() {
    let engine = AgingEngine::new(EngineParams::default(), Blender::statistical_only());

    let prediction = engine.predict(&candidate(), 0, None).await;

    assert_eq!(prediction.flavor, FlavorProfile::neutral());
    assert_eq!(prediction.confidence, 0.0);
    assert!(prediction.matched_clusters.is_empty());
}
