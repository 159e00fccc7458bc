// ============================================
// Training Rows & Train/Test Split
// ============================================
//
// Implicit feedback only: an item becomes a labeled row once the viewer
// has watched it or liked it. label = 1 iff currently liked, so a viewed
// but unliked item counts as a negative.
//
// The split is a stable hash of the item id, not a random draw, so
// repeated passes over the same pool keep every row in the same bucket.

use crate::models::Stage1Candidate;
use crate::services::ranking::features::{FeatureInputs, ModelVariant};
use crate::services::signals::SignalSource;
use tracing::debug;

/// Buckets 0..=TRAIN_MAX_BUCKET go to train (80%)
pub const TRAIN_MAX_BUCKET: u32 = 7;
pub const BUCKET_COUNT: u32 = 10;

#[derive(Debug, Clone)]
pub struct TrainingRow {
    pub item_id: String,
    pub label: u8,
    /// Position of the item in the Stage-1 list
    pub stage1_rank_index: usize,
    pub keyword_score: f64,
    pub inputs: FeatureInputs,
}

impl TrainingRow {
    pub fn features(&self, variant: ModelVariant) -> Vec<f64> {
        self.inputs.vector(variant)
    }

    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// One row per Stage-1 candidate the viewer has viewed or liked, in Stage-1 order
pub fn build_training_rows<S>(candidates: &[Stage1Candidate], signals: &S) -> Vec<TrainingRow>
where
    S: SignalSource + ?Sized,
{
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| signals.view_count(&c.item.id) > 0 || c.item.is_liked)
        .map(|(stage1_rank_index, c)| TrainingRow {
            item_id: c.item.id.clone(),
            label: u8::from(c.item.is_liked),
            stage1_rank_index,
            keyword_score: c.keyword_score,
            inputs: FeatureInputs::from_candidate(c, stage1_rank_index, signals),
        })
        .collect()
}

/// Sum of UTF-16 code units of the id, mod 10
pub fn split_bucket(item_id: &str) -> u32 {
    let sum: u64 = item_id.encode_utf16().map(u64::from).sum();
    (sum % u64::from(BUCKET_COUNT)) as u32
}

#[derive(Debug, Clone, Default)]
pub struct TrainTestSplit {
    pub train: Vec<TrainingRow>,
    pub test: Vec<TrainingRow>,
}

impl TrainTestSplit {
    pub fn total(&self) -> usize {
        self.train.len() + self.test.len()
    }
}

/// Deterministic partition; relative order is preserved within each bucket
pub fn split_train_test(rows: Vec<TrainingRow>) -> TrainTestSplit {
    let (train, test): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| split_bucket(&row.item_id) <= TRAIN_MAX_BUCKET);

    debug!(
        train_count = train.len(),
        test_count = test.len(),
        "Train/test split computed"
    );

    TrainTestSplit { train, test }
}
