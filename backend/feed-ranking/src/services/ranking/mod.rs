/// Ranking Module
///
/// Learned second stage over the Stage-1 candidate set.
///
/// # Architecture
/// - **Feature Layer**: fixed-order vectors, with or without the keyword feature
/// - **Model Layer**: online logistic regression trained fresh each pass
/// - **Hybrid Layer**: blends both models and orders unseen-first
///
/// # Workflow
/// 1. Build training rows from engaged Stage-1 candidates
/// 2. Train the "learned" (8 features) and "hybrid" (9 features) models
/// 3. Score every candidate with both models → blended final score
/// 4. Sort unseen-first, then final score, then Stage-1 score
pub mod features;
pub mod hybrid;
pub mod model;

pub use features::{FeatureInputs, ModelVariant};
pub use hybrid::{BlendWeights, HybridRanker, TrainedModels};
pub use model::{LearnerConfig, LogisticModel, Sample};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Feature vector length mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
