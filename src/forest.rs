//! Random Forest regression training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{MaxFeatures, OobMode, RandomForestConfig, SampleSize};
use crate::error::RfError;
use crate::oob::compute_oob;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{RegressionTree, RegressionTreeConfig};

/// A fitted Random Forest regression ensemble.
///
/// Immutable after training: prediction is read-only and safe to call from
/// any number of threads. Retraining produces a fresh value via
/// [`RandomForestConfig::fit`]; the previous forest stays valid until the
/// caller swaps it out.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<RegressionTree>,
    pub(crate) n_features: usize,
}

/// Resolve `MaxFeatures` to a concrete count.
pub(crate) fn resolve_max_features(
    max_features: MaxFeatures,
    n_features: usize,
) -> Result<usize, RfError> {
    let resolved = match max_features {
        MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
        MaxFeatures::Log2 => (n_features as f64).log2().ceil().max(1.0) as usize,
        MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
        MaxFeatures::Fixed(n) => n,
        MaxFeatures::All => n_features,
    };
    if resolved == 0 || resolved > n_features {
        return Err(RfError::InvalidMaxFeatures {
            max_features: resolved,
            n_features,
        });
    }
    Ok(resolved)
}

/// Resolve `SampleSize` to a concrete draw count.
///
/// The count may exceed `n_samples` (draws are with replacement); it only
/// must be at least 1.
pub(crate) fn resolve_sample_size(
    sample_size: SampleSize,
    n_samples: usize,
) -> Result<usize, RfError> {
    let resolved = match sample_size {
        SampleSize::Full => n_samples,
        SampleSize::Fraction(f) => {
            if f <= 0.0 || !f.is_finite() {
                return Err(RfError::InvalidSampleSize { sample_size: 0 });
            }
            ((n_samples as f64) * f).ceil() as usize
        }
        SampleSize::Fixed(n) => n,
    };
    if resolved == 0 {
        return Err(RfError::InvalidSampleSize {
            sample_size: resolved,
        });
    }
    Ok(resolved)
}

/// Generate a bootstrap sample and the out-of-bag indices.
///
/// Draws `draw_count` indices uniformly with replacement from
/// `0..n_samples`; duplicates are expected. OOB indices are the samples
/// never drawn.
fn bootstrap_sample(
    n_samples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_samples];
    let mut bootstrap_indices = Vec::with_capacity(draw_count);
    for _ in 0..draw_count {
        let idx = rng.gen_range(0..n_samples);
        bootstrap_indices.push(idx);
        in_bag[idx] = true;
    }
    let oob_indices: Vec<usize> = (0..n_samples).filter(|&i| !in_bag[i]).collect();
    (bootstrap_indices, oob_indices)
}

/// Train the Random Forest regression ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    targets: &[f64],
) -> Result<RandomForestResult, RfError> {
    // --- Validate inputs ---
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_samples = features.len();
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if targets.len() != n_samples {
        return Err(RfError::TargetCountMismatch {
            expected: n_samples,
            got: targets.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    feature_index: Some(feature_index),
                });
            }
        }
        if !targets[sample_index].is_finite() {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index: None,
            });
        }
    }

    // --- Validate config ---
    let max_features_resolved = resolve_max_features(config.max_features, n_features)?;
    let draw_count = resolve_sample_size(config.sample_size, n_samples)?;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        max_features = max_features_resolved,
        draw_count,
        "training random forest regressor"
    );

    // Generate per-tree seeds from a master RNG so parallel training stays
    // reproducible: each worker owns an independent seeded source.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    // Capture config fields needed in closure (avoids borrowing config across thread boundary).
    let max_depth = config.max_depth;
    let min_samples_split = config.min_samples_split;
    let min_samples_leaf = config.min_samples_leaf;

    // Parallel tree training: trees are independent, no cross-tree state.
    let tree_results: Result<Vec<(RegressionTree, Vec<usize>)>, RfError> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (bootstrap_indices, oob_indices) =
                bootstrap_sample(n_samples, draw_count, &mut rng);

            // Build bootstrap dataset: row-major features.
            let boot_features: Vec<Vec<f64>> = bootstrap_indices
                .iter()
                .map(|&i| features[i].clone())
                .collect();
            let boot_targets: Vec<f64> =
                bootstrap_indices.iter().map(|&i| targets[i]).collect();

            let tree_config = RegressionTreeConfig::new()
                .with_max_depth(max_depth)
                .with_min_samples_split(min_samples_split)
                .with_min_samples_leaf(min_samples_leaf)
                .with_max_features(Some(max_features_resolved))
                .with_seed(rng.r#gen());

            let tree = tree_config.fit(&boot_features, &boot_targets)?;

            Ok((tree, oob_indices))
        })
        .collect();

    let mut trees = Vec::with_capacity(config.n_trees);
    let mut oob_indices_per_tree = Vec::with_capacity(config.n_trees);
    for (tree, oob) in tree_results? {
        trees.push(tree);
        oob_indices_per_tree.push(oob);
    }

    debug!(n_trees_trained = trees.len(), "tree training complete");

    // OOB evaluation.
    let oob_score = if config.oob_mode == OobMode::Enabled {
        Some(compute_oob(&trees, features, targets, &oob_indices_per_tree)?)
    } else {
        None
    };

    let forest = RandomForest { trees, n_features };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_samples,
        max_features_resolved,
        sample_size_resolved: draw_count,
    };

    info!(
        oob_rmse = oob_score.as_ref().map(|s| s.rmse),
        "random forest training complete"
    );

    Ok(RandomForestResult::new(forest, oob_score, metadata))
}
