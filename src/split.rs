use rand::Rng;

use crate::node::FeatureIndex;

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Feature used for the split.
    pub(crate) feature: FeatureIndex,
    /// Threshold value (midpoint of the adjacent observed pair).
    pub(crate) threshold: f64,
    /// Size-weighted variance cost of the winning partition.
    pub(crate) cost: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
    /// Number of samples in left child.
    pub(crate) n_left: usize,
    /// Number of samples in right child.
    pub(crate) n_right: usize,
}

/// Size-weighted population variance: `n * var(targets)` expressed via the
/// running sums, i.e. `sum_sq - sum^2 / n`. Zero for a singleton.
fn weighted_variance(sum: f64, sum_sq: f64, n: usize) -> f64 {
    let raw = sum_sq - sum * sum / n as f64;
    // Guard against tiny negative values from floating-point cancellation.
    raw.max(0.0)
}

/// Find the best split among a random subset of features.
///
/// For each of `max_features` randomly chosen features, sorts the
/// `(value, target)` pairs, scans left-to-right with incremental
/// sum / sum-of-squares updates, and tracks the globally best split
/// by size-weighted variance cost:
///
/// `cost = n_left * var(left targets) + n_right * var(right targets)`
///
/// using population variance (divide by count). Candidate thresholds are
/// the midpoints of adjacent distinct values; boundaries between equal
/// values are skipped, so neither partition can be empty.
///
/// Tie-breaks are deterministic for a fixed RNG: cost comparison is strict,
/// so the first candidate scanned (earliest boundary of the first-drawn
/// feature) wins exact ties.
///
/// Returns `None` when no valid split exists (fewer than 2 samples, all
/// values identical, or every boundary would violate `min_samples_leaf`).
///
/// # Column-major layout
///
/// `features` is column-major: `features[feature_idx][sample_idx]`.
/// `sample_indices` are indices into these inner Vecs and into `targets`.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    targets: &[f64],
    sample_indices: &[usize],
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = features.len();
    let n_samples = sample_indices.len();

    if n_samples < 2 || n_features == 0 {
        return None;
    }

    // Parent sums, reused as the starting right-side accumulator per feature.
    let mut total_sum = 0.0f64;
    let mut total_sum_sq = 0.0f64;
    for &si in sample_indices {
        total_sum += targets[si];
        total_sum_sq += targets[si] * targets[si];
    }

    // Partial Fisher-Yates: shuffle only the first `max_features` positions.
    let mut feature_order: Vec<usize> = (0..n_features).collect();
    let take = max_features.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
    }
    let selected_features = &feature_order[..take];

    let mut best_cost = f64::INFINITY;
    let mut best: Option<(FeatureIndex, f64)> = None;

    for &feat_idx in selected_features {
        let feat_col = &features[feat_idx];

        // Collect (value, target) pairs for this feature.
        let mut sorted: Vec<(f64, f64)> = sample_indices
            .iter()
            .map(|&si| (feat_col[si], targets[si]))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        // Incremental scan: left grows from empty, right shrinks from full.
        let mut left_sum = 0.0f64;
        let mut left_sum_sq = 0.0f64;

        for i in 0..(n_samples - 1) {
            let (val_i, target_i) = sorted[i];

            // Move sample i from right to left.
            left_sum += target_i;
            left_sum_sq += target_i * target_i;

            let n_left = i + 1;
            let n_right = n_samples - n_left;

            // Skip if next value is identical (no valid boundary here).
            let val_next = sorted[i + 1].0;
            if val_i == val_next {
                continue;
            }

            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sum_sq = total_sum_sq - left_sum_sq;

            let cost = weighted_variance(left_sum, left_sum_sq, n_left)
                + weighted_variance(right_sum, right_sum_sq, n_right);

            if cost < best_cost {
                best_cost = cost;
                let threshold = (val_i + val_next) / 2.0;
                best = Some((FeatureIndex::new(feat_idx), threshold));
            }
        }
    }

    let (best_feature, threshold) = best?;

    // Partition sample_indices into left/right.
    let feat_col = &features[best_feature.index()];
    let mut left_indices = Vec::with_capacity(n_samples / 2);
    let mut right_indices = Vec::with_capacity(n_samples / 2);
    for &si in sample_indices {
        if feat_col[si] <= threshold {
            left_indices.push(si);
        } else {
            right_indices.push(si);
        }
    }
    let n_left = left_indices.len();
    let n_right = right_indices.len();

    Some(SplitResult {
        feature: best_feature,
        threshold,
        cost: best_cost,
        left_indices,
        right_indices,
        n_left,
        n_right,
    })
}
