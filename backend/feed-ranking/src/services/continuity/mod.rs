// ============================================
// Continuity Merge
// ============================================
//
// Re-ranking after every view or like must not reshuffle what the viewer
// already scrolled past:
// 1. Freeze prev[..=max_index], keeping ids still ranked, de-duplicated
// 2. Append the rest of the new ranking
// 3. Move the on-screen item back under the viewer if it shifted

use crate::models::ScrollState;
use std::collections::HashSet;
use tracing::debug;

/// Merge a fresh ranking into the sequence currently on screen
pub fn merge_with_previous(previous: &[String], ranked: &[String], scroll: &ScrollState) -> Vec<String> {
    if ranked.is_empty() {
        return Vec::new();
    }
    if previous.is_empty() {
        return ranked.to_vec();
    }

    let valid: HashSet<&str> = ranked.iter().map(String::as_str).collect();
    let mut placed: HashSet<&str> = HashSet::with_capacity(ranked.len());

    let freeze_count = previous.len().min(scroll.max_index.saturating_add(1));
    let mut merged: Vec<String> = Vec::with_capacity(ranked.len());

    for id in &previous[..freeze_count] {
        if valid.contains(id.as_str()) && placed.insert(id.as_str()) {
            merged.push(id.clone());
        }
    }
    let frozen_len = merged.len();

    for id in ranked {
        if placed.insert(id.as_str()) {
            merged.push(id.clone());
        }
    }

    let relocated = match scroll.visible_id.as_deref() {
        Some(visible) if valid.contains(visible) => {
            relocate(&mut merged, visible, scroll.active_index)
        }
        _ => false,
    };

    debug!(
        frozen_count = frozen_len,
        tail_count = merged.len() - frozen_len,
        relocated = relocated,
        "Continuity merge completed"
    );

    merged
}

/// Stable single-element move of `id` to `target` (clamped); true if moved
fn relocate(merged: &mut Vec<String>, id: &str, target: usize) -> bool {
    if merged.get(target).map(String::as_str) == Some(id) {
        return false;
    }
    let Some(source) = merged.iter().position(|x| x == id) else {
        return false;
    };
    let target = target.min(merged.len() - 1);
    let picked = merged.remove(source);
    merged.insert(target, picked);
    true
}
