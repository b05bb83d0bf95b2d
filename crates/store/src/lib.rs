//! Knowledge store implementations for Jarvis.

pub mod in_memory;
pub mod noop;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use noop::NoopStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use jarvis_config::{StoreBackend, StoreConfig};
use jarvis_core::{KnowledgeStore, StoreError};
use std::sync::Arc;
use tracing::info;

/// Open the store selected by `config`.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn KnowledgeStore>, StoreError> {
    let store: Arc<dyn KnowledgeStore> = match config.backend {
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(&config.database_url()).await?),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => {
            return Err(StoreError::Unavailable(
                "built without the `sqlite` feature".into(),
            ));
        }
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        StoreBackend::None => Arc::new(NoopStore),
    };
    info!(backend = store.name(), "Knowledge store opened");
    Ok(store)
}
