// ============================================
// Stage-1 Candidate Scoring (粗排层)
// ============================================
//
// Two-stage pipeline: Stage-1 keyword scoring → learned hybrid ranking
//
// Purpose:
// - Build a per-pass taste profile as token-weight mass
// - Score every candidate by profile similarity plus interaction bonuses
// - Cut to a bounded candidate set for the learned stage
//
// Architecture:
// - ProfileWeights: immutable token → weight map built once per pass
// - Stage1Scorer: rule-based scoring with configurable weights

pub mod keyword_scorer;
pub mod profile;

pub use keyword_scorer::{Stage1Scorer, Stage1Weights};
pub use profile::{InteractionWeights, PreparedItem, ProfileWeights};
