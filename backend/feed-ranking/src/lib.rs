pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use models::{FeedItem, FeedMode, InteractionCounters, RankedEntry, ScrollState};
pub use services::{
    EvaluationJournal, EvaluationReport, FeedPage, FeedPass, FeedRanker, RankRequest,
    SignalSnapshot, SignalSource,
};
