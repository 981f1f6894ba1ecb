//! Prediction methods for the Random Forest regression ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;

impl RandomForest {
    /// Predict the target value for a single sample.
    ///
    /// Returns the arithmetic mean of the per-tree predictions. The forest
    /// always holds at least one tree ([`crate::RandomForestConfig::new`]
    /// rejects `n_trees = 0`), so the mean is well defined.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`; no tree is traversed in that case.
    pub fn predict(&self, sample: &[f64]) -> Result<f64, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut sum = 0.0f64;
        for tree in &self.trees {
            sum += tree.predict(sample)?;
        }
        Ok(sum / self.trees.len() as f64)
    }

    /// Predict target values for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the
    /// wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
