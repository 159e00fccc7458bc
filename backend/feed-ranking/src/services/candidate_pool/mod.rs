// ============================================
// Candidate Pool Preparation
// ============================================
//
// Narrows the caller's raw feed into the pool handed to ranking:
// - Feed mode: "for you" drops the viewer's own uploads,
//   "profile" keeps one author's uploads newest-first
// - Search: tiered match on author → caption → audio → comments

use crate::models::{FeedItem, FeedMode};
use crate::services::tokenizer::normalize;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tracing::debug;

/// Build the candidate pool for one pass
pub fn prepare_pool(items: &[FeedItem], mode: &FeedMode, query: &str) -> Vec<FeedItem> {
    let base: Vec<FeedItem> = match mode {
        FeedMode::ForYou { viewer } => items
            .iter()
            .filter(|item| &item.author != viewer)
            .cloned()
            .collect(),
        FeedMode::Profile { author } => sort_by_created_desc(
            items
                .iter()
                .filter(|item| &item.author == author)
                .cloned()
                .collect(),
        ),
    };

    let pool = search_matches_in_order(base, query);

    debug!(
        mode = mode.as_str(),
        input_count = items.len(),
        output_count = pool.len(),
        "Candidate pool prepared"
    );

    pool
}

/// Every query token must occur as a substring of the normalized text
pub fn text_matches_query(query: &str, text: &str) -> bool {
    let query = normalize(query);
    if query.is_empty() {
        return false;
    }
    let text = normalize(text);
    if text.is_empty() {
        return false;
    }
    query.split(' ').all(|token| text.contains(token))
}

/// Filter by query, ordering matches by the field that matched first
pub fn search_matches_in_order(items: Vec<FeedItem>, query: &str) -> Vec<FeedItem> {
    if query.trim().is_empty() {
        return items;
    }

    let fields: [fn(&FeedItem) -> String; 4] = [
        |item: &FeedItem| item.author.clone(),
        |item: &FeedItem| item.caption.clone(),
        |item: &FeedItem| item.audio_label.clone(),
        |item: &FeedItem| item.comments_text(),
    ];

    let mut matched: HashSet<usize> = HashSet::new();
    let mut ordered: Vec<usize> = Vec::new();

    for field in fields {
        for (idx, item) in items.iter().enumerate() {
            if matched.contains(&idx) {
                continue;
            }
            if text_matches_query(query, &field(item)) {
                matched.insert(idx);
                ordered.push(idx);
            }
        }
    }

    ordered.into_iter().map(|idx| items[idx].clone()).collect()
}

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC 3339 first, then offset-less date-times and bare dates read as UTC
fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn created_at_millis(item: &FeedItem) -> i64 {
    item.created_at
        .as_deref()
        .and_then(parse_timestamp_millis)
        .unwrap_or(0)
}

/// Newest first; stable for equal or unparseable timestamps
fn sort_by_created_desc(mut items: Vec<FeedItem>) -> Vec<FeedItem> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at_millis(item)));
    items
}
