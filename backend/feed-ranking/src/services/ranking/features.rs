/// Feature Vector Construction
///
/// Fixed-order vectors shared by training and inference.
///
/// Layout:
/// - [0]: bias (always 1)
/// - [1..4]: unseen, followed, liked (0/1)
/// - [4..6]: log-scaled views and authored comments, capped at 1
/// - [6]: profile similarity
/// - [7]: Stage-1 rank confidence, `1 - min(1, rank / 40)`
/// - [8]: log-scaled keyword score (hybrid variant only)
use crate::models::Stage1Candidate;
use crate::services::signals::SignalSource;
use crate::utils::log_count;

pub const BASE_FEATURE_LEN: usize = 8;
pub const HYBRID_FEATURE_LEN: usize = BASE_FEATURE_LEN + 1;

const RANK_HORIZON: f64 = 40.0;

/// Which of the two per-pass models a vector is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// Excludes the Stage-1 score
    Learned,
    /// Includes the Stage-1 score as a ninth feature
    Hybrid,
}

impl ModelVariant {
    pub fn includes_keyword_feature(self) -> bool {
        matches!(self, ModelVariant::Hybrid)
    }

    pub fn feature_len(self) -> usize {
        if self.includes_keyword_feature() {
            HYBRID_FEATURE_LEN
        } else {
            BASE_FEATURE_LEN
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelVariant::Learned => "learned",
            ModelVariant::Hybrid => "hybrid",
        }
    }
}

/// Raw per-candidate values the vectors are derived from
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInputs {
    pub unseen: bool,
    pub followed: bool,
    pub liked: bool,
    pub view_count: u64,
    pub comment_count: u64,
    pub similarity: f64,
    pub keyword_score: f64,
    pub stage1_rank_index: usize,
}

impl FeatureInputs {
    pub fn from_candidate<S>(candidate: &Stage1Candidate, stage1_rank_index: usize, signals: &S) -> Self
    where
        S: SignalSource + ?Sized,
    {
        let item = &candidate.item;
        Self {
            unseen: !item.has_seen,
            followed: signals.is_following(&item.author),
            liked: item.is_liked,
            view_count: signals.view_count(&item.id),
            comment_count: signals.comment_count(&item.id),
            similarity: candidate.similarity,
            keyword_score: candidate.keyword_score,
            stage1_rank_index,
        }
    }

    pub fn vector(&self, variant: ModelVariant) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let similarity = if self.similarity.is_finite() {
            self.similarity.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut features = Vec::with_capacity(variant.feature_len());
        features.extend([
            1.0,
            flag(self.unseen),
            flag(self.followed),
            flag(self.liked),
            (log_count(self.view_count) / 3.0).min(1.0),
            (log_count(self.comment_count) / 3.0).min(1.0),
            similarity,
            self.rank_norm(),
        ]);

        if variant.includes_keyword_feature() {
            features.push(self.keyword_feature());
        }
        features
    }

    fn rank_norm(&self) -> f64 {
        1.0 - (self.stage1_rank_index as f64 / RANK_HORIZON).min(1.0)
    }

    fn keyword_feature(&self) -> f64 {
        let score = if self.keyword_score.is_finite() {
            self.keyword_score.max(0.0)
        } else {
            0.0
        };
        (score.ln_1p() / 8.0).min(1.5)
    }
}
