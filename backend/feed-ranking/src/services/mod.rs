pub mod candidate_pool;
pub mod coarse_ranking;
pub mod continuity;
pub mod evaluation;
pub mod pipeline;
pub mod ranking;
pub mod signals;
pub mod tokenizer;
pub mod training;

pub use coarse_ranking::Stage1Scorer;
pub use continuity::merge_with_previous;
pub use evaluation::{EvaluationJournal, EvaluationReport, Evaluator};
pub use pipeline::{FeedPage, FeedPass, FeedRanker, RankRequest, RankingOutcome};
pub use ranking::HybridRanker;
pub use signals::{SignalSnapshot, SignalSource};
