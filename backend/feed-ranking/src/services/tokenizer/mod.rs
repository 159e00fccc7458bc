/// Text normalization shared by profile building and search.
use crate::models::FeedItem;
use std::collections::BTreeSet;

/// Tokens shorter than this are dropped
pub const MIN_TOKEN_LEN: usize = 3;

/// Ordered so that weight sums are reproducible across passes
pub type TokenSet = BTreeSet<String>;

/// Lower-case and collapse every run of non `[a-z0-9]` characters into one space
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }

    out
}

pub fn tokenize(text: &str) -> TokenSet {
    normalize(text)
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Tokens of an item's author, caption, audio label and comments
pub fn item_tokens(item: &FeedItem) -> TokenSet {
    tokenize(&format!(
        "{} {} {} {}",
        item.author,
        item.caption,
        item.audio_label,
        item.comments_text()
    ))
}
