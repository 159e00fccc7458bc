// ============================================
// Feed Ranking Pipeline
// ============================================
//
// Pool → Stage-1 → { rows → split → models → evaluation }
//                → hybrid ranking → continuity merge → ids
//
// Every pass is a pure function of its inputs. The only carried state
// is the previously displayed sequence and scroll position, which the
// caller owns and passes back in.

use crate::config::Config;
use crate::models::{FeedItem, FeedMode, RankedEntry, ScrollState};
use crate::services::candidate_pool::prepare_pool;
use crate::services::coarse_ranking::Stage1Scorer;
use crate::services::continuity::merge_with_previous;
use crate::services::evaluation::{EvaluationReport, Evaluator};
use crate::services::ranking::{HybridRanker, LearnerConfig, TrainedModels};
use crate::services::signals::{SignalSnapshot, SignalSource};
use crate::services::training::{build_training_rows, split_train_test};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PassStats {
    pub pool_count: usize,
    pub stage1_count: usize,
    pub training_rows: usize,
    pub train_count: usize,
    pub test_count: usize,
}

/// Result of ranking one candidate pool
#[derive(Debug, Clone, Default)]
pub struct RankingOutcome {
    pub entries: Vec<RankedEntry>,
    pub evaluation: Option<EvaluationReport>,
    pub stats: PassStats,
}

impl RankingOutcome {
    pub fn ranked_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }
}

/// Inputs of one display refresh
#[derive(Debug, Clone)]
pub struct FeedPass<'a> {
    pub items: &'a [FeedItem],
    pub mode: &'a FeedMode,
    pub query: &'a str,
    /// Sequence currently on screen; empty on first load or after a filter change
    pub previous: &'a [String],
    pub scroll: &'a ScrollState,
}

/// One ranking request as handed over by the display layer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankRequest {
    pub items: Vec<FeedItem>,
    /// `follows` and `counters` sit at the top level of the request
    #[serde(flatten)]
    pub signals: SignalSnapshot,
    #[serde(default = "default_mode")]
    pub mode: FeedMode,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub previous: Vec<String>,
    #[serde(default)]
    pub scroll: ScrollState,
}

fn default_mode() -> FeedMode {
    FeedMode::ForYou {
        viewer: String::new(),
    }
}

impl RankRequest {
    pub fn pass(&self) -> FeedPass<'_> {
        FeedPass {
            items: &self.items,
            mode: &self.mode,
            query: &self.query,
            previous: &self.previous,
            scroll: &self.scroll,
        }
    }
}

/// What the display should render next
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub ids: Vec<String>,
    pub entries: Vec<RankedEntry>,
    pub evaluation: Option<EvaluationReport>,
    pub stats: PassStats,
}

pub struct FeedRanker {
    stage1: Stage1Scorer,
    learner: LearnerConfig,
    hybrid: HybridRanker,
    evaluator: Evaluator,
}

impl Default for FeedRanker {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl FeedRanker {
    pub fn new(config: &Config) -> Self {
        Self {
            stage1: Stage1Scorer::new(config.max_candidates),
            learner: config.learner(),
            hybrid: HybridRanker::new(config.blend()),
            evaluator: Evaluator::new(config.evaluator()),
        }
    }

    /// Create from explicit components
    pub fn with_components(
        stage1: Stage1Scorer,
        learner: LearnerConfig,
        hybrid: HybridRanker,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            stage1,
            learner,
            hybrid,
            evaluator,
        }
    }

    /// Full two-stage ranking of a prepared pool
    pub fn rank<S>(&self, pool: &[FeedItem], signals: &S) -> RankingOutcome
    where
        S: SignalSource + ?Sized,
    {
        if pool.is_empty() {
            return RankingOutcome::default();
        }

        let candidates = self.stage1.score(pool, signals);
        let rows = build_training_rows(&candidates, signals);
        let training_rows = rows.len();
        let split = split_train_test(rows);

        let models = TrainedModels::train(&split.train, &self.learner);
        let evaluation = self.evaluator.evaluate(&split, &models);
        let entries = self.hybrid.rank(&candidates, &models, signals);

        let stats = PassStats {
            pool_count: pool.len(),
            stage1_count: candidates.len(),
            training_rows,
            train_count: split.train.len(),
            test_count: split.test.len(),
        };

        info!(
            pool_count = stats.pool_count,
            stage1_count = stats.stage1_count,
            training_rows = stats.training_rows,
            train_count = stats.train_count,
            test_count = stats.test_count,
            evaluated = evaluation.is_some(),
            "Ranking pass completed"
        );

        RankingOutcome {
            entries,
            evaluation,
            stats,
        }
    }

    /// Prepare the pool, rank it for the mode, and merge with what is on screen
    pub fn next_page<S>(&self, pass: &FeedPass<'_>, signals: &S) -> FeedPage
    where
        S: SignalSource + ?Sized,
    {
        let pool = prepare_pool(pass.items, pass.mode, pass.query);

        if !pass.mode.is_ranked() {
            let mut shown = HashSet::new();
            return FeedPage {
                ids: pool
                    .iter()
                    .filter(|item| shown.insert(item.id.as_str()))
                    .map(|item| item.id.clone())
                    .collect(),
                stats: PassStats {
                    pool_count: pool.len(),
                    ..Default::default()
                },
                ..Default::default()
            };
        }

        let outcome = self.rank(&pool, signals);
        let ids = merge_with_previous(pass.previous, &outcome.ranked_ids(), pass.scroll);

        FeedPage {
            ids,
            entries: outcome.entries,
            evaluation: outcome.evaluation,
            stats: outcome.stats,
        }
    }
}
