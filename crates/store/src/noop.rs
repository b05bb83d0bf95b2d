//! No-op store, used when knowledge persistence is disabled.

use async_trait::async_trait;
use chrono::Utc;
use jarvis_core::{KnowledgeItem, KnowledgeStore, KnowledgeUpsert, ListFilter, StoreError};

/// A store that keeps nothing. Upserts are validated and echoed back;
/// every listing is empty.
pub struct NoopStore;

#[async_trait]
impl KnowledgeStore for NoopStore {
    fn name(&self) -> &str { "none" }

    async fn list(&self, _filter: ListFilter) -> Result<Vec<KnowledgeItem>, StoreError> {
        Ok(Vec::new())
    }

    async fn upsert(&self, input: KnowledgeUpsert) -> Result<KnowledgeItem, StoreError> {
        input.validate()?;
        let id = input.id.clone().unwrap_or_default();
        let now = Utc::now();
        Ok(KnowledgeItem::from_upsert(input, id, now, now))
    }

    async fn get(&self, _id: &str) -> Result<Option<KnowledgeItem>, StoreError> {
        Ok(None)
    }

    async fn delete(&self, _id: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}
