//! Out-of-bag (OOB) evaluation for Random Forest regression.

use crate::error::RfError;
use crate::tree::RegressionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// Mean squared error over OOB predictions.
    pub mse: f64,
    /// Root mean squared error over OOB predictions.
    pub rmse: f64,
    /// Coefficient of determination over OOB predictions.
    ///
    /// 1.0 is a perfect fit; 0.0 is no better than predicting the mean
    /// target. Negative values are possible for a bad fit.
    pub r2: f64,
    /// Number of samples that had at least one OOB tree.
    pub n_oob_samples: usize,
}

/// Compute out-of-bag predictions and regression error.
///
/// For each sample, only trees where the sample was NOT in the bootstrap
/// are used for prediction (averaged). Samples with no OOB trees are
/// skipped.
pub(crate) fn compute_oob(
    trees: &[RegressionTree],
    features: &[Vec<f64>],
    targets: &[f64],
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, RfError> {
    let n_samples = features.len();

    // For each sample, accumulate predictions from OOB trees.
    let mut oob_sums = vec![0.0f64; n_samples];
    let mut oob_counts = vec![0usize; n_samples];

    for (tree_idx, oob_indices) in oob_indices_per_tree.iter().enumerate() {
        for &sample_idx in oob_indices {
            let pred = trees[tree_idx].predict(&features[sample_idx])?;
            oob_sums[sample_idx] += pred;
            oob_counts[sample_idx] += 1;
        }
    }

    let n_oob_samples = oob_counts.iter().filter(|&&c| c > 0).count();
    if n_oob_samples == 0 {
        return Err(RfError::OobEvaluationFailed {
            reason: "no sample has any OOB tree".to_string(),
        });
    }

    // MSE over evaluated samples, and the target mean for R².
    let mut sq_error = 0.0f64;
    let mut target_sum = 0.0f64;
    for i in 0..n_samples {
        if oob_counts[i] == 0 {
            continue;
        }
        let pred = oob_sums[i] / oob_counts[i] as f64;
        let err = pred - targets[i];
        sq_error += err * err;
        target_sum += targets[i];
    }
    let mse = sq_error / n_oob_samples as f64;
    let target_mean = target_sum / n_oob_samples as f64;

    let mut total_var = 0.0f64;
    for i in 0..n_samples {
        if oob_counts[i] == 0 {
            continue;
        }
        let dev = targets[i] - target_mean;
        total_var += dev * dev;
    }

    let r2 = if total_var > 0.0 {
        1.0 - sq_error / total_var
    } else {
        // Constant targets: the fit is perfect iff the error is zero.
        if sq_error == 0.0 { 1.0 } else { 0.0 }
    };

    Ok(OobScore {
        mse,
        rmse: mse.sqrt(),
        r2,
        n_oob_samples,
    })
}
