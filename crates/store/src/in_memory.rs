//! In-memory knowledge store for tests and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use jarvis_core::{KnowledgeItem, KnowledgeStore, KnowledgeUpsert, ListFilter, StoreError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Items in write order, oldest first. `list` walks the vector backwards.
pub struct InMemoryStore {
    items: Arc<RwLock<Vec<KnowledgeItem>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Seed the store with raw items, bypassing upsert validation.
    ///
    /// `list` returns matching items in the order given here.
    pub fn from_items(items: Vec<KnowledgeItem>) -> Self {
        let mut items = items;
        items.reverse();
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryStore {
    fn name(&self) -> &str { "in_memory" }

    async fn list(&self, filter: ListFilter) -> Result<Vec<KnowledgeItem>, StoreError> {
        let items = self.items.read().await;
        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(items
            .iter()
            .rev()
            .filter(|item| filter.matches(item))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn upsert(&self, input: KnowledgeUpsert) -> Result<KnowledgeItem, StoreError> {
        input.validate()?;

        let mut items = self.items.write().await;
        let now = Utc::now();

        let existing = input
            .id
            .as_deref()
            .and_then(|id| items.iter().position(|i| i.id == id));

        let (id, created_at) = match existing {
            // Re-append so the rewritten item lists as most recent.
            Some(pos) => {
                let old = items.remove(pos);
                (old.id, old.created_at)
            }
            None => (
                input
                    .id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                now,
            ),
        };

        let item = KnowledgeItem::from_upsert(input, id, created_at, now);
        items.push(item.clone());
        debug!(id = %item.id, "Upserted knowledge item");
        Ok(item)
    }

    async fn get(&self, id: &str) -> Result<Option<KnowledgeItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let len_before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < len_before)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.items.read().await.len())
    }
}
