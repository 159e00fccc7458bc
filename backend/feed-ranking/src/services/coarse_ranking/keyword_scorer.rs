// ============================================
// Stage-1 Keyword Scorer (关键词粗排打分器)
// ============================================
//
// Features used:
// - Followed author / liked / unseen bonuses
// - Authored comments (capped at 3) and log-scaled views (capped at 2.5)
// - Profile similarity (token-weight overlap)
// - Position prior: linear decay over the first 20 pool slots

use super::profile::{InteractionWeights, PreparedItem, ProfileWeights};
use crate::models::{FeedItem, Stage1Candidate};
use crate::services::signals::SignalSource;
use crate::utils::{desc, log_count};
use tracing::{debug, info};

/// Configurable weights for the keyword score
#[derive(Debug, Clone)]
pub struct Stage1Weights {
    pub followed: f64,
    pub liked: f64,
    pub unseen: f64,
    pub commented: f64,
    pub comment_cap: f64,
    pub views: f64,
    pub view_cap: f64,
    pub similarity: f64,
    pub position: f64,
    /// Pool slots over which the position prior decays to zero
    pub position_horizon: f64,
}

impl Default for Stage1Weights {
    fn default() -> Self {
        Self {
            followed: 120.0,
            liked: 95.0,
            unseen: 220.0,
            commented: 35.0,
            comment_cap: 3.0,
            views: 22.0,
            view_cap: 2.5,
            similarity: 80.0,
            position: 8.0,
            position_horizon: 20.0,
        }
    }
}

/// Stage-1 ranking layer
pub struct Stage1Scorer {
    weights: Stage1Weights,
    interaction: InteractionWeights,
    /// None keeps every candidate
    max_candidates: Option<usize>,
}

impl Default for Stage1Scorer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Stage1Scorer {
    pub fn new(max_candidates: Option<usize>) -> Self {
        Self {
            weights: Stage1Weights::default(),
            interaction: InteractionWeights::default(),
            max_candidates,
        }
    }

    /// Create with custom weights
    pub fn with_weights(
        max_candidates: Option<usize>,
        weights: Stage1Weights,
        interaction: InteractionWeights,
    ) -> Self {
        Self {
            weights,
            interaction,
            max_candidates,
        }
    }

    /// Score and order the pool best-first, truncated to the cap
    pub fn score<S>(&self, items: &[FeedItem], signals: &S) -> Vec<Stage1Candidate>
    where
        S: SignalSource + ?Sized,
    {
        if items.is_empty() {
            return Vec::new();
        }

        let prepared = PreparedItem::prepare(items);
        let profile = ProfileWeights::build(&prepared, signals, &self.interaction);

        let mut scored: Vec<Stage1Candidate> = prepared
            .into_iter()
            .map(|entry| {
                let similarity = profile.similarity(&entry.tokens);
                let keyword_score =
                    self.keyword_score(&entry.item, entry.index, similarity, signals);

                debug!(
                    item_id = %entry.item.id,
                    similarity = similarity,
                    keyword_score = keyword_score,
                    "Stage-1 score computed"
                );

                Stage1Candidate {
                    item: entry.item,
                    index: entry.index,
                    keyword_score,
                    similarity,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            desc(a.keyword_score, b.keyword_score).then_with(|| a.index.cmp(&b.index))
        });

        let limit = self.max_candidates.unwrap_or(scored.len());
        scored.truncate(limit);

        info!(
            input_count = items.len(),
            output_count = scored.len(),
            profile_mass = profile.mass(),
            "Stage-1 ranking completed"
        );

        scored
    }

    /// Weighted keyword score for one candidate
    pub fn keyword_score<S>(&self, item: &FeedItem, index: usize, similarity: f64, signals: &S) -> f64
    where
        S: SignalSource + ?Sized,
    {
        let w = &self.weights;
        let comments = signals.comment_count(&item.id) as f64;
        let views = log_count(signals.view_count(&item.id));

        let mut score = 0.0;
        if signals.is_following(&item.author) {
            score += w.followed;
        }
        if item.is_liked {
            score += w.liked;
        }
        if !item.has_seen {
            score += w.unseen;
        }
        score += w.commented * comments.min(w.comment_cap);
        score += w.views * views.min(w.view_cap);
        score += w.similarity * similarity;
        score += w.position * self.position_prior(index);
        score
    }

    fn position_prior(&self, index: usize) -> f64 {
        (1.0 - index as f64 / self.weights.position_horizon).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::SignalSnapshot;

    fn unseen(id: &str, author: &str) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            author: author.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_pool() {
        let scorer = Stage1Scorer::default();
        assert!(scorer.score(&[], &SignalSnapshot::default()).is_empty());
    }

    #[test]
    fn test_no_history_keeps_input_order() {
        let scorer = Stage1Scorer::default();
        let items: Vec<FeedItem> = (0..5).map(|i| unseen(&format!("v{i}"), "xy")).collect();

        let ranked = scorer.score(&items, &SignalSnapshot::default());

        let ids: Vec<_> = ranked.iter().map(|c| c.item.id.as_str()).collect();
        assert_eq!(ids, vec!["v0", "v1", "v2", "v3", "v4"]);
        for candidate in &ranked {
            let expected = 220.0 + 8.0 * (1.0 - candidate.index as f64 / 20.0).max(0.0);
            assert!((candidate.keyword_score - expected).abs() < 1e-9);
            assert_eq!(candidate.similarity, 0.0);
        }
    }

    #[test]
    fn test_followed_author_bonus_is_exact() {
        let scorer = Stage1Scorer::default();
        let signals = SignalSnapshot::default().with_follow("ana");
        let followed = unseen("a", "ana");
        let other = unseen("b", "bob");

        let s_followed = scorer.keyword_score(&followed, 3, 0.0, &signals);
        let s_other = scorer.keyword_score(&other, 3, 0.0, &signals);
        assert!((s_followed - s_other - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_comment_and_view_caps() {
        let scorer = Stage1Scorer::default();
        let signals = SignalSnapshot::default().with_counters("v1", 1_000_000, 10);
        let mut item = unseen("v1", "ana");
        item.has_seen = true;

        let score = scorer.keyword_score(&item, 100, 0.0, &signals);
        assert!((score - (35.0 * 3.0 + 22.0 * 2.5)).abs() < 1e-9);
    }

    #[test]
    fn test_truncates_and_breaks_ties_by_index() {
        let scorer = Stage1Scorer::new(Some(25));
        let items: Vec<FeedItem> = (0..30).map(|i| unseen(&format!("v{i}"), "xy")).collect();

        let ranked = scorer.score(&items, &SignalSnapshot::default());
        assert_eq!(ranked.len(), 25);
        // Past the position horizon every unseen item scores 220
        let tied: Vec<usize> = ranked[20..].iter().map(|c| c.index).collect();
        assert_eq!(tied, vec![20, 21, 22, 23, 24]);
        assert!(ranked[20..].iter().all(|c| (c.keyword_score - 220.0).abs() < 1e-9));
    }

    #[test]
    fn test_seen_item_drops_below_unseen() {
        let scorer = Stage1Scorer::default();
        let mut seen = unseen("seen", "ana");
        seen.has_seen = true;
        let items = vec![seen, unseen("fresh", "bob")];

        let ranked = scorer.score(&items, &SignalSnapshot::default());
        assert_eq!(ranked[0].item.id, "fresh");
    }

    #[test]
    fn test_custom_weights_reorder_pool() {
        let mut liked = unseen("liked", "ana");
        liked.has_seen = true;
        liked.is_liked = true;
        let items = vec![unseen("fresh", "bob"), liked];
        let signals = SignalSnapshot::default();

        let default_ids: Vec<_> = Stage1Scorer::default()
            .score(&items, &signals)
            .into_iter()
            .map(|c| c.item.id)
            .collect();
        assert_eq!(default_ids, vec!["fresh", "liked"]);

        let scorer = Stage1Scorer::with_weights(
            None,
            Stage1Weights {
                unseen: 0.0,
                ..Default::default()
            },
            InteractionWeights::default(),
        );
        let ranked = scorer.score(&items, &signals);
        let ids: Vec<_> = ranked.iter().map(|c| c.item.id.as_str()).collect();
        assert_eq!(ids, vec!["liked", "fresh"]);
        assert!((ranked[1].keyword_score - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_interaction_weights_disable_profile() {
        let mut liked = unseen("liked", "ana");
        liked.caption = "sunset beach".to_string();
        liked.has_seen = true;
        liked.is_liked = true;
        let mut similar = unseen("similar", "bob");
        similar.caption = "sunset beach".to_string();
        let items = vec![liked, similar];

        let scorer = Stage1Scorer::with_weights(
            None,
            Stage1Weights::default(),
            InteractionWeights {
                liked: 0.0,
                ..Default::default()
            },
        );
        let ranked = scorer.score(&items, &SignalSnapshot::default());

        assert!(ranked.iter().all(|c| c.similarity == 0.0));
    }
}
