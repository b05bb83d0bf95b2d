//! Relevance scoring.
//!
//! `score = importance + INTENT_TAG_WEIGHT × overlap`, where `overlap` is the
//! number of distinct item tags that also appear in the caller's intent
//! tags. Matching is exact and case-sensitive.

use jarvis_core::KnowledgeItem;
use std::collections::HashSet;

/// Bonus added per intent tag the item carries.
pub const INTENT_TAG_WEIGHT: f64 = 2.0;

/// Number of distinct tags on `item` that appear in `intent_tags`.
pub fn tag_overlap(item: &KnowledgeItem, intent_tags: &[String]) -> usize {
    if intent_tags.is_empty() || item.tags.is_empty() {
        return 0;
    }
    let wanted: HashSet<&str> = intent_tags.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(item.tags.len());
    item.tags
        .iter()
        .map(String::as_str)
        .filter(|tag| wanted.contains(tag) && seen.insert(*tag))
        .count()
}

/// Relevance of `item` for the given intent.
///
/// With no intent tags (or an empty list) the score is the item's resolved
/// importance.
pub fn score(item: &KnowledgeItem, intent_tags: Option<&[String]>) -> f64 {
    let base = item.resolved_importance();
    match intent_tags {
        Some(tags) if !tags.is_empty() => base + INTENT_TAG_WEIGHT * tag_overlap(item, tags) as f64,
        _ => base,
    }
}
