//! Context builder: ranks the active knowledge pool and keeps the top K.
//!
//! # Determinism
//!
//! For an unchanged store, identical options always produce identical
//! output: scoring is pure and the sort is stable, so items with equal
//! scores keep the order the store returned them in.

pub use jarvis_core::DEFAULT_MAX_ITEMS;

use jarvis_core::{KnowledgeItem, KnowledgeStore, ListFilter, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::scorer;

// ── Types ─────────────────────────────────────────────────────────────────

/// Options for a single build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
    /// Topical hints; items carrying them are boosted.
    pub intent_tags: Option<Vec<String>>,
    /// Maximum number of blocks to return.
    pub max_items: Option<usize>,
}

impl BuildOptions {
    pub fn with_intent_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intent_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// A knowledge item paired with its relevance score. Lives only for the
/// duration of a build.
#[derive(Debug, Clone, Copy)]
pub struct ScoredItem<'a> {
    pub item: &'a KnowledgeItem,
    pub score: f64,
}

/// Prompt-ready projection of a knowledge item. Identifiers, tags and
/// status are deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeContextBlock {
    pub title: String,
    pub item_type: String,
    pub importance: Option<f64>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl From<&KnowledgeItem> for KnowledgeContextBlock {
    fn from(item: &KnowledgeItem) -> Self {
        Self {
            title: item.title.clone(),
            item_type: item.item_type.clone(),
            importance: item.importance,
            content: item.content_markdown.clone().unwrap_or_default(),
            instructions: item.jarvis_instructions.clone(),
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────

/// Builds knowledge context from a store. Holds no per-build state.
pub struct ContextBuilder {
    store: Arc<dyn KnowledgeStore>,
    default_max_items: usize,
}

impl ContextBuilder {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            default_max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Budget applied when [`BuildOptions::max_items`] is `None`.
    pub fn with_default_max_items(mut self, max_items: usize) -> Self {
        self.default_max_items = max_items;
        self
    }

    /// Fetch the active pool, rank it, and project the top items.
    ///
    /// Store failures are returned exactly as the store raised them.
    pub async fn build_context(
        &self,
        options: &BuildOptions,
    ) -> Result<Vec<KnowledgeContextBlock>, StoreError> {
        let max_items = options.max_items.unwrap_or(self.default_max_items);
        let pool = self.store.list(ListFilter::active()).await?;

        let ranked = Self::rank(&pool, options.intent_tags.as_deref(), max_items);
        debug!(
            store = self.store.name(),
            pool = pool.len(),
            selected = ranked.len(),
            max_items,
            "Built knowledge context"
        );

        Ok(ranked.iter().map(|s| KnowledgeContextBlock::from(s.item)).collect())
    }

    /// Score every item, stable-sort by descending score, keep `max_items`.
    pub fn rank<'a>(
        pool: &'a [KnowledgeItem],
        intent_tags: Option<&[String]>,
        max_items: usize,
    ) -> Vec<ScoredItem<'a>> {
        let mut scored: Vec<ScoredItem<'a>> = pool
            .iter()
            .map(|item| ScoredItem {
                item,
                score: scorer::score(item, intent_tags),
            })
            .collect();

        // `sort_by` is stable: equal scores keep store order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(max_items);
        scored
    }
}
