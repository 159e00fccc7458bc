// ============================================
// Signal Store
// ============================================
//
// Read-only view of the viewer's engagement signals:
// follow membership, per-item view counts and authored comments.
// `is_liked` / `has_seen` travel on the item itself.

use crate::models::InteractionCounters;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Engagement lookups consumed by the ranking stages
pub trait SignalSource {
    fn is_following(&self, author: &str) -> bool;
    fn counters(&self, item_id: &str) -> InteractionCounters;

    fn view_count(&self, item_id: &str) -> u64 {
        self.counters(item_id).view_count
    }

    fn comment_count(&self, item_id: &str) -> u64 {
        self.counters(item_id).comment_count_by_user
    }
}

/// Immutable snapshot handed in for one ranking pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSnapshot {
    #[serde(default)]
    pub follows: HashSet<String>,
    #[serde(default)]
    pub counters: HashMap<String, InteractionCounters>,
}

impl SignalSnapshot {
    pub fn new(follows: HashSet<String>, counters: HashMap<String, InteractionCounters>) -> Self {
        Self { follows, counters }
    }

    pub fn with_follow(mut self, author: impl Into<String>) -> Self {
        self.follows.insert(author.into());
        self
    }

    pub fn with_counters(
        mut self,
        item_id: impl Into<String>,
        view_count: u64,
        comment_count_by_user: u64,
    ) -> Self {
        self.counters.insert(
            item_id.into(),
            InteractionCounters {
                view_count,
                comment_count_by_user,
            },
        );
        self
    }
}

impl SignalSource for SignalSnapshot {
    fn is_following(&self, author: &str) -> bool {
        self.follows.contains(author)
    }

    fn counters(&self, item_id: &str) -> InteractionCounters {
        self.counters.get(item_id).copied().unwrap_or_default()
    }
}
