//! K-fold cross-validation for Random Forest regression.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of k-fold cross-validation.
#[derive(Debug)]
pub struct CrossValidationResult {
    /// Mean squared error for each fold.
    pub fold_mse: Vec<f64>,
    /// Coefficient of determination for each fold.
    pub fold_r2: Vec<f64>,
    /// Mean MSE across folds.
    pub mean_mse: f64,
    /// Standard deviation of fold MSEs.
    pub std_mse: f64,
    /// Mean R² across folds.
    pub mean_r2: f64,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
    /// Number of features.
    pub n_features: usize,
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run k-fold cross-validation.
    ///
    /// Shuffles the samples once with the configured seed, assigns them
    /// round-robin to `n_folds` folds, then for each fold trains a forest
    /// on the remaining folds and scores it on the held-out fold.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero samples |
    /// | [`RfError::InvalidFoldCount`] | More folds than samples |
    /// | Other RF errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<CrossValidationResult, RfError> {
        if features.is_empty() {
            return Err(RfError::EmptyDataset);
        }

        let n_samples = features.len();
        let n_features = features[0].len();

        if n_samples < self.n_folds {
            return Err(RfError::InvalidFoldCount {
                n_folds: self.n_folds,
            });
        }

        // Shuffle once, then assign folds round-robin.
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(&mut rng);

        let mut fold_assignments = vec![0usize; n_samples];
        for (j, &idx) in order.iter().enumerate() {
            fold_assignments[idx] = j % self.n_folds;
        }

        let mut fold_mse = Vec::with_capacity(self.n_folds);
        let mut fold_r2 = Vec::with_capacity(self.n_folds);

        for fold in 0..self.n_folds {
            let mut train_features = Vec::new();
            let mut train_targets = Vec::new();
            let mut test_features = Vec::new();
            let mut test_targets = Vec::new();

            for (i, &assigned_fold) in fold_assignments.iter().enumerate() {
                if assigned_fold == fold {
                    test_features.push(features[i].clone());
                    test_targets.push(targets[i]);
                } else {
                    train_features.push(features[i].clone());
                    train_targets.push(targets[i]);
                }
            }

            // Clone config and override seed so each fold trains with different randomness.
            let fold_config = config
                .clone()
                .with_seed(config.seed.wrapping_add(fold as u64));

            let result = fold_config.fit(&train_features, &train_targets)?;
            let predictions = result.forest().predict_batch(&test_features)?;

            let n_test = test_targets.len() as f64;
            let mse = predictions
                .iter()
                .zip(&test_targets)
                .map(|(&p, &t)| (p - t) * (p - t))
                .sum::<f64>()
                / n_test;

            let test_mean = test_targets.iter().sum::<f64>() / n_test;
            let total_var: f64 = test_targets
                .iter()
                .map(|&t| (t - test_mean) * (t - test_mean))
                .sum();
            let r2 = if total_var > 0.0 {
                1.0 - mse * n_test / total_var
            } else if mse == 0.0 {
                1.0
            } else {
                0.0
            };

            info!(fold, mse, r2, "fold completed");

            fold_mse.push(mse);
            fold_r2.push(r2);
        }

        let mean_mse = fold_mse.iter().sum::<f64>() / self.n_folds as f64;
        let std_mse = {
            let variance = fold_mse
                .iter()
                .map(|&m| (m - mean_mse).powi(2))
                .sum::<f64>()
                / self.n_folds as f64;
            variance.sqrt()
        };
        let mean_r2 = fold_r2.iter().sum::<f64>() / self.n_folds as f64;

        info!(mean_mse, std_mse, mean_r2, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_mse,
            fold_r2,
            mean_mse,
            std_mse,
            mean_r2,
            n_folds: self.n_folds,
            n_samples,
            n_features,
        })
    }
}
