//! Random Forest regression: train, evaluate, predict.
//!
//! Provides a hand-rolled Random Forest regressor built from CART-style
//! regression trees with variance-cost splits, bootstrap sampling,
//! randomized feature subsetting, parallel training via rayon, out-of-bag
//! evaluation, and k-fold cross-validation. Built for forecasting a numeric
//! time series (e.g. hourly traffic volume) from lagged values and
//! exogenous covariates, though any fixed-length numeric feature matrix
//! works.
//!
//! The caller owns data preparation: feature vectors must be uniform-length
//! numeric rows with categorical values already encoded. Training returns
//! an immutable [`RandomForest`]; prediction is read-only and safe to share
//! across threads. Retraining builds a fresh forest value while the old one
//! stays servable.

mod config;
mod error;
mod eval;
mod forest;
mod node;
mod oob;
mod predict;
mod result;
mod split;
mod tree;

pub use config::{MaxFeatures, OobMode, RandomForestConfig, SampleSize};
pub use error::RfError;
pub use eval::{CrossValidation, CrossValidationResult};
pub use forest::RandomForest;
pub use node::{FeatureIndex, Node, NodeIndex};
pub use oob::OobScore;
pub use result::{RandomForestResult, TrainingMetadata};
pub use tree::{RegressionTree, RegressionTreeConfig};
