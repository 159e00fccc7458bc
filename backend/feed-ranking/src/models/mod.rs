use crate::utils::lenient_count;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    #[serde(default)]
    pub text: String,
}

/// A video item as supplied by the content feed. Read-only to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub audio_label: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub has_seen: bool,
    /// RFC 3339 timestamp (bare dates also accepted), only consulted by profile feeds
    #[serde(default)]
    pub created_at: Option<String>,
}

impl FeedItem {
    /// All comment texts joined by single spaces
    pub fn comments_text(&self) -> String {
        self.comments
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Per viewer × item engagement counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCounters {
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comment_count_by_user: u64,
}

/// Item scored by the keyword/profile heuristic
#[derive(Debug, Clone)]
pub struct Stage1Candidate {
    pub item: FeedItem,
    /// Position in the input pool (stable tie-break and position prior)
    pub index: usize,
    pub keyword_score: f64,
    pub similarity: f64,
}

/// Output row of the hybrid ranker
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub id: String,
    pub has_seen: bool,
    pub stage1_score: f64,
    pub learned_probability: f64,
    pub hybrid_probability: f64,
    pub final_score: f64,
}

/// Which slice of the feed is being ranked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeedMode {
    /// Personalized feed of everyone except the viewer
    ForYou {
        #[serde(default)]
        viewer: String,
    },
    /// One author's uploads, newest first, unranked
    Profile { author: String },
}

impl FeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::ForYou { .. } => "for_you",
            FeedMode::Profile { .. } => "profile",
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, FeedMode::ForYou { .. })
    }
}

/// Where the viewer currently is in the displayed list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    /// Furthest index reached so far
    #[serde(default)]
    pub max_index: usize,
    /// Index of the item on screen
    #[serde(default)]
    pub active_index: usize,
    #[serde(default)]
    pub visible_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_text_joins_with_spaces() {
        let item = FeedItem {
            id: "v1".to_string(),
            comments: vec![
                Comment {
                    text: "great drop".to_string(),
                },
                Comment {
                    text: "again".to_string(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(item.comments_text(), "great drop again");
    }

    #[test]
    fn test_counters_coerce_bad_numbers() {
        let counters: InteractionCounters =
            serde_json::from_str(r#"{"viewCount": -3, "commentCountByUser": 2.7}"#).unwrap();
        assert_eq!(counters.view_count, 0);
        assert_eq!(counters.comment_count_by_user, 2);
    }

    #[test]
    fn test_feed_mode_tagged() {
        let mode: FeedMode =
            serde_json::from_str(r#"{"kind": "profile", "author": "mira"}"#).unwrap();
        assert_eq!(
            mode,
            FeedMode::Profile {
                author: "mira".to_string()
            }
        );
        assert!(!mode.is_ranked());
    }
}
