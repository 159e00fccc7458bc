// ============================================
// Taste Profile (用户兴趣画像)
// ============================================
//
// Every candidate the viewer engaged with spreads its interaction
// weight over its tokens:
//   followed author  +4.0
//   liked            +3.5
//   comments         +1.2 per authored comment
//   views            +min(2.2, ln(1 + views))
//
// Similarity of a candidate = profile mass on its tokens / total mass

use crate::models::FeedItem;
use crate::services::signals::SignalSource;
use crate::services::tokenizer::{item_tokens, TokenSet};
use crate::utils::log_count;
use std::collections::BTreeMap;

/// Per-signal contributions to an item's interaction weight
#[derive(Debug, Clone)]
pub struct InteractionWeights {
    pub followed: f64,
    pub liked: f64,
    pub per_comment: f64,
    /// Cap on the `ln(1 + views)` contribution
    pub view_cap: f64,
}

impl Default for InteractionWeights {
    fn default() -> Self {
        Self {
            followed: 4.0,
            liked: 3.5,
            per_comment: 1.2,
            view_cap: 2.2,
        }
    }
}

impl InteractionWeights {
    pub fn interaction_weight<S>(&self, item: &FeedItem, signals: &S) -> f64
    where
        S: SignalSource + ?Sized,
    {
        let mut weight = 0.0;
        if signals.is_following(&item.author) {
            weight += self.followed;
        }
        if item.is_liked {
            weight += self.liked;
        }
        let comments = signals.comment_count(&item.id);
        if comments > 0 {
            weight += self.per_comment * comments as f64;
        }
        let views = signals.view_count(&item.id);
        if views > 0 {
            weight += log_count(views).min(self.view_cap);
        }
        weight
    }
}

/// Candidate with its pool position and token set
#[derive(Debug, Clone)]
pub struct PreparedItem {
    pub item: FeedItem,
    pub index: usize,
    pub tokens: TokenSet,
}

impl PreparedItem {
    pub fn prepare(items: &[FeedItem]) -> Vec<PreparedItem> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| PreparedItem {
                item: item.clone(),
                index,
                tokens: item_tokens(item),
            })
            .collect()
    }
}

/// Token → accumulated interaction weight for one pass
#[derive(Debug, Clone, Default)]
pub struct ProfileWeights {
    weights: BTreeMap<String, f64>,
    mass: f64,
}

impl ProfileWeights {
    pub fn build<S>(prepared: &[PreparedItem], signals: &S, weights: &InteractionWeights) -> Self
    where
        S: SignalSource + ?Sized,
    {
        let mut tokens: BTreeMap<String, f64> = BTreeMap::new();

        for entry in prepared {
            let weight = weights.interaction_weight(&entry.item, signals);
            if weight <= 0.0 {
                continue;
            }
            for token in &entry.tokens {
                *tokens.entry(token.clone()).or_insert(0.0) += weight;
            }
        }

        let mass = tokens.values().sum();
        Self {
            weights: tokens,
            mass,
        }
    }

    pub fn weight(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    /// Sum of all token weights
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Share of profile mass covered by `tokens`, in [0, 1]
    pub fn similarity(&self, tokens: &TokenSet) -> f64 {
        if self.mass <= 0.0 || tokens.is_empty() {
            return 0.0;
        }
        let overlap: f64 = tokens.iter().map(|t| self.weight(t)).sum();
        (overlap / self.mass).clamp(0.0, 1.0)
    }
}
