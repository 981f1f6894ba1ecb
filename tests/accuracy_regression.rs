//! Accuracy regression tests for taiga-rf.
//!
//! These tests verify that algorithmic changes do not degrade Random Forest
//! regression accuracy on a deterministic synthetic forecasting dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use taiga_rf::{
    CrossValidation, MaxFeatures, OobMode, RandomForestConfig, RegressionTreeConfig, RfError,
    SampleSize,
};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic traffic-style dataset
// ---------------------------------------------------------------------------

/// Generate a 300-sample, 8-feature regression dataset shaped like the
/// traffic-forecasting problem: three lag features carry the signal, the
/// remaining five (weather code, temperature, cloud cover, holiday flag,
/// timestamp stand-in) are noise covariates.
///
/// The target is a smooth function of the lags plus bounded noise.
fn make_traffic_like() -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 300;

    let mut features = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        // Daily-cycle base level, like hourly vehicle counts.
        let phase = (i % 24) as f64 / 24.0 * std::f64::consts::TAU;
        let level = 3000.0 + 2000.0 * phase.sin();

        let lag1 = level + rng.r#gen::<f64>() * 100.0;
        let lag2 = level + rng.r#gen::<f64>() * 100.0;
        let lag3 = level + rng.r#gen::<f64>() * 100.0;
        let weather = (1 + i % 9) as f64;
        let temp = 260.0 + rng.r#gen::<f64>() * 40.0;
        let clouds = rng.r#gen::<f64>() * 100.0;
        let holiday = if i % 50 == 0 { 1.0 } else { 0.0 };
        let stamp = i as f64;

        features.push(vec![lag1, lag2, lag3, weather, temp, clouds, holiday, stamp]);
        targets.push(level + rng.r#gen::<f64>() * 100.0);
    }
    (features, targets)
}

fn mse(predictions: &[f64], targets: &[f64]) -> f64 {
    predictions
        .iter()
        .zip(targets)
        .map(|(&p, &t)| (p - t) * (p - t))
        .sum::<f64>()
        / targets.len() as f64
}

fn r2(predictions: &[f64], targets: &[f64]) -> f64 {
    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let total: f64 = targets.iter().map(|&t| (t - mean) * (t - mean)).sum();
    let residual: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(&p, &t)| (p - t) * (p - t))
        .sum();
    1.0 - residual / total
}

// ---------------------------------------------------------------------------
// a) training_r2_above_threshold
// ---------------------------------------------------------------------------

/// Training-set R² with 100 trees must exceed 0.9 (RF should memorize
/// training data when the signal features are informative).
#[test]
fn training_r2_above_threshold() {
    let (features, targets) = make_traffic_like();
    let config = RandomForestConfig::new(100).unwrap().with_seed(42);
    let result = config.fit(&features, &targets).unwrap();

    let predictions = result.forest().predict_batch(&features).unwrap();
    let score = r2(&predictions, &targets);
    assert!(score > 0.9, "training r2 {score} <= 0.9");
}

// ---------------------------------------------------------------------------
// b) oob_beats_mean_baseline
// ---------------------------------------------------------------------------

/// OOB R² with 100 trees must beat the predict-the-mean baseline (R² > 0.5
/// on this strongly lag-driven dataset).
#[test]
fn oob_beats_mean_baseline() {
    let (features, targets) = make_traffic_like();
    let config = RandomForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .with_oob_mode(OobMode::Enabled);
    let result = config.fit(&features, &targets).unwrap();

    let oob = result
        .oob_score()
        .expect("OOB score must be computed when OobMode::Enabled");
    assert!(oob.r2 > 0.5, "oob r2 {} <= 0.5", oob.r2);
    assert!(oob.n_oob_samples > 0);
}

// ---------------------------------------------------------------------------
// c) cv_r2_above_threshold
// ---------------------------------------------------------------------------

/// 5-fold cross-validation mean R² must exceed 0.5.
#[test]
fn cv_r2_above_threshold() {
    let (features, targets) = make_traffic_like();
    let rf_config = RandomForestConfig::new(50).unwrap().with_seed(42);
    let cv = CrossValidation::new(5).unwrap().with_seed(42);
    let result = cv.evaluate(&rf_config, &features, &targets).unwrap();

    assert!(result.mean_r2 > 0.5, "cv mean_r2 {} <= 0.5", result.mean_r2);
}

// ---------------------------------------------------------------------------
// d) deterministic_predictions
// ---------------------------------------------------------------------------

/// Same config and seed must produce bit-identical predictions across two
/// independent runs, including under parallel training.
#[test]
fn deterministic_predictions() {
    let (features, targets) = make_traffic_like();
    let config = RandomForestConfig::new(50).unwrap().with_seed(42);

    let result1 = config.fit(&features, &targets).unwrap();
    let result2 = config.fit(&features, &targets).unwrap();

    let preds1 = result1.forest().predict_batch(&features).unwrap();
    let preds2 = result2.forest().predict_batch(&features).unwrap();

    let bits1: Vec<u64> = preds1.iter().map(|p| p.to_bits()).collect();
    let bits2: Vec<u64> = preds2.iter().map(|p| p.to_bits()).collect();
    assert_eq!(bits1, bits2, "predictions differ across runs with the same seed");
}

// ---------------------------------------------------------------------------
// e) single_tree_forest_matches_plain_tree_range
// ---------------------------------------------------------------------------

/// A forest with one tree and all features considered degenerates to a
/// plain regression tree: every prediction stays inside the min/max range
/// of the training targets.
#[test]
fn single_tree_forest_stays_in_target_range() {
    let (features, targets) = make_traffic_like();
    let config = RandomForestConfig::new(1)
        .unwrap()
        .with_max_features(MaxFeatures::All)
        .with_seed(42);
    let forest = config.fit(&features, &targets).unwrap().into_forest();

    let lo = targets.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    for sample in &features {
        let pred = forest.predict(sample).unwrap();
        assert!((lo..=hi).contains(&pred), "pred {pred} outside [{lo}, {hi}]");
    }
}

// ---------------------------------------------------------------------------
// f) duplicated low rows and one high row
// ---------------------------------------------------------------------------

/// A single tree over `[1,0]→10, [1,0]→10, [5,0]→50` considering both
/// features must separate the groups exactly.
#[test]
fn duplicated_rows_separate_cleanly() {
    let features = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![5.0, 0.0]];
    let targets = vec![10.0, 10.0, 50.0];
    let tree = RegressionTreeConfig::new()
        .with_max_features(Some(2))
        .with_seed(42)
        .fit(&features, &targets)
        .unwrap();

    assert!((tree.predict(&[1.0, 0.0]).unwrap() - 10.0).abs() < f64::EPSILON);
    assert!((tree.predict(&[5.0, 0.0]).unwrap() - 50.0).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// g) configuration and validation failures
// ---------------------------------------------------------------------------

#[test]
fn zero_trees_is_a_configuration_error() {
    let err = RandomForestConfig::new(0).unwrap_err();
    assert!(matches!(err, RfError::InvalidTreeCount { n_trees: 0 }));
}

#[test]
fn wrong_query_length_is_rejected() {
    // Train on length-7 vectors, query with length 5.
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let features: Vec<Vec<f64>> = (0..40)
        .map(|_| (0..7).map(|_| rng.r#gen::<f64>() * 10.0).collect())
        .collect();
    let targets: Vec<f64> = features.iter().map(|row| row[0] * 3.0).collect();

    let forest = RandomForestConfig::new(5)
        .unwrap()
        .with_seed(42)
        .fit(&features, &targets)
        .unwrap()
        .into_forest();

    let err = forest.predict(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap_err();
    assert!(matches!(
        err,
        RfError::PredictionFeatureMismatch { expected: 7, got: 5 }
    ));
}

#[test]
fn failed_retrain_leaves_previous_forest_usable() {
    let (features, targets) = make_traffic_like();
    let config = RandomForestConfig::new(10).unwrap().with_seed(42);
    let forest = config.fit(&features, &targets).unwrap().into_forest();

    // A retrain attempt with bad data fails without producing a forest...
    let bad = config.fit(&[], &[]).unwrap_err();
    assert!(matches!(bad, RfError::EmptyDataset));

    // ...and the previously built forest still serves predictions.
    let pred = forest.predict(&features[0]).unwrap();
    assert!(pred.is_finite());
}

// ---------------------------------------------------------------------------
// h) oversampled bootstrap still trains
// ---------------------------------------------------------------------------

/// Drawing more bootstrap samples than the dataset holds is legal and must
/// not change the feature contract or degrade determinism.
#[test]
fn oversampled_bootstrap_trains_and_predicts() {
    let (features, targets) = make_traffic_like();
    let config = RandomForestConfig::new(10)
        .unwrap()
        .with_sample_size(SampleSize::Fraction(1.5))
        .with_seed(42);
    let result = config.fit(&features, &targets).unwrap();
    assert_eq!(result.metadata().sample_size_resolved, 450);

    let pred = result.forest().predict(&features[0]).unwrap();
    assert!(pred.is_finite());
}
