use super::features::{FeatureInputs, ModelVariant};
use super::model::{LearnerConfig, LogisticModel, Sample};
use crate::models::{RankedEntry, Stage1Candidate};
use crate::services::signals::SignalSource;
use crate::services::training::TrainingRow;
use crate::utils::desc;
use std::collections::HashMap;
use tracing::{debug, info};

/// Final score = hybrid * p_hybrid + learned * p_learned
#[derive(Debug, Clone, PartialEq)]
pub struct BlendWeights {
    pub hybrid: f64,
    pub learned: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            hybrid: 0.85,
            learned: 0.15,
        }
    }
}

/// Convert rows into labeled samples for one model variant
pub fn to_samples(rows: &[TrainingRow], variant: ModelVariant) -> Vec<Sample> {
    rows.iter()
        .map(|row| Sample {
            item_id: row.item_id.clone(),
            label: f64::from(row.label),
            features: row.features(variant),
        })
        .collect()
}

/// The two models fitted in one pass
#[derive(Debug, Clone, Default)]
pub struct TrainedModels {
    pub learned: LogisticModel,
    pub hybrid: LogisticModel,
}

impl TrainedModels {
    pub fn train(train_rows: &[TrainingRow], config: &LearnerConfig) -> Self {
        Self {
            learned: Self::train_variant(train_rows, ModelVariant::Learned, config),
            hybrid: Self::train_variant(train_rows, ModelVariant::Hybrid, config),
        }
    }

    fn train_variant(
        rows: &[TrainingRow],
        variant: ModelVariant,
        config: &LearnerConfig,
    ) -> LogisticModel {
        let samples = to_samples(rows, variant);
        debug!(
            variant = variant.as_str(),
            samples = samples.len(),
            "Training model variant"
        );
        LogisticModel::train(&samples, variant.feature_len(), config)
    }

    pub fn model(&self, variant: ModelVariant) -> &LogisticModel {
        match variant {
            ModelVariant::Learned => &self.learned,
            ModelVariant::Hybrid => &self.hybrid,
        }
    }

    /// Probability for a vector; 0 when the model has no weights
    pub fn probability(&self, variant: ModelVariant, features: &[f64]) -> f64 {
        let model = self.model(variant);
        if model.is_empty() || features.is_empty() {
            0.0
        } else {
            model.predict(features)
        }
    }

    /// Item id → probability for each row
    pub fn predict_rows(&self, rows: &[TrainingRow], variant: ModelVariant) -> HashMap<String, f64> {
        rows.iter()
            .map(|row| {
                let p = self.probability(variant, &row.features(variant));
                (row.item_id.clone(), p)
            })
            .collect()
    }
}

/// Hybrid Ranking Layer - 兩個模型混合打分
pub struct HybridRanker {
    blend: BlendWeights,
}

impl Default for HybridRanker {
    fn default() -> Self {
        Self::new(BlendWeights::default())
    }
}

impl HybridRanker {
    pub fn new(blend: BlendWeights) -> Self {
        Self { blend }
    }

    /// Score every Stage-1 candidate and order unseen-first
    pub fn rank<S>(
        &self,
        candidates: &[Stage1Candidate],
        models: &TrainedModels,
        signals: &S,
    ) -> Vec<RankedEntry>
    where
        S: SignalSource + ?Sized,
    {
        let mut entries: Vec<RankedEntry> = candidates
            .iter()
            .enumerate()
            .map(|(stage1_rank_index, candidate)| {
                let inputs = FeatureInputs::from_candidate(candidate, stage1_rank_index, signals);
                let learned_probability = models.probability(
                    ModelVariant::Learned,
                    &inputs.vector(ModelVariant::Learned),
                );
                let hybrid_probability = models
                    .probability(ModelVariant::Hybrid, &inputs.vector(ModelVariant::Hybrid));

                RankedEntry {
                    id: candidate.item.id.clone(),
                    has_seen: candidate.item.has_seen,
                    stage1_score: candidate.keyword_score,
                    learned_probability,
                    hybrid_probability,
                    final_score: self.blend.hybrid * hybrid_probability
                        + self.blend.learned * learned_probability,
                }
            })
            .collect();

        sort_unseen_first(&mut entries);

        info!(
            candidate_count = entries.len(),
            unseen_count = entries.iter().filter(|e| !e.has_seen).count(),
            "Hybrid ranking completed"
        );

        entries
    }
}

/// Unseen before seen, then final score, then Stage-1 score
pub fn sort_unseen_first(entries: &mut [RankedEntry]) {
    entries.sort_by(|a, b| {
        a.has_seen
            .cmp(&b.has_seen)
            .then_with(|| desc(a.final_score, b.final_score))
            .then_with(|| desc(a.stage1_score, b.stage1_score))
    });
}
