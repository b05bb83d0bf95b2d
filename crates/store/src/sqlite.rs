//! SQLite knowledge store.
//!
//! One table, `knowledge_items`. Every write bumps a `revision` counter so
//! `list` can return items most recently written first without relying on
//! timestamp resolution.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use jarvis_core::{KnowledgeItem, KnowledgeStore, KnowledgeUpsert, ListFilter, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// A SQLite-backed knowledge store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a store from a SQLite URL or file path.
    ///
    /// The database and schema are created automatically.
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite knowledge store initialized at {url}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS knowledge_items (
                iid                 INTEGER PRIMARY KEY AUTOINCREMENT,
                id                  TEXT UNIQUE NOT NULL,
                title               TEXT NOT NULL,
                item_type           TEXT NOT NULL,
                importance          REAL,
                tags                TEXT NOT NULL DEFAULT '[]',
                content_markdown    TEXT,
                jarvis_instructions TEXT,
                status              TEXT NOT NULL,
                module_slug         TEXT,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL,
                revision            INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("knowledge_items table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_knowledge_status_module \
             ON knowledge_items(status, module_slug)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("status index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_knowledge_revision ON knowledge_items(revision DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("revision index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<KnowledgeItem, StoreError> {
        fn col<'r, T>(row: &'r sqlx::sqlite::SqliteRow, name: &str) -> Result<T, StoreError>
        where
            T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
        {
            row.try_get(name)
                .map_err(|e| StoreError::QueryFailed(format!("{name} column: {e}")))
        }

        let tags_json: String = col(row, "tags")?;
        let status: String = col(row, "status")?;
        let created_at: String = col(row, "created_at")?;
        let updated_at: String = col(row, "updated_at")?;

        Ok(KnowledgeItem {
            id: col(row, "id")?,
            title: col(row, "title")?,
            item_type: col(row, "item_type")?,
            importance: col(row, "importance")?,
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            content_markdown: col(row, "content_markdown")?,
            jarvis_instructions: col(row, "jarvis_instructions")?,
            status: status
                .parse()
                .map_err(|_| StoreError::QueryFailed(format!("bad status '{status}' in row")))?,
            module_slug: col(row, "module_slug")?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

/// Fixed-width RFC 3339, so stored timestamps also sort as text.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl KnowledgeStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<KnowledgeItem>, StoreError> {
        // LIMIT -1 means "no limit" in SQLite.
        let limit = filter
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        let rows = sqlx::query(
            r#"
            SELECT * FROM knowledge_items
            WHERE status = ?1
              AND (?2 IS NULL OR module_slug = ?2)
            ORDER BY revision DESC, iid DESC
            LIMIT ?3
            "#,
        )
        .bind(filter.status.as_str())
        .bind(filter.module_slug.as_deref())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("List failed: {e}")))?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn upsert(&self, input: KnowledgeUpsert) -> Result<KnowledgeItem, StoreError> {
        input.validate()?;

        let existing = match input.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => self.get(id).await?,
            None => None,
        };

        // Stored at microsecond precision; keep the returned item identical.
        let now = Utc::now().trunc_subsecs(6);
        let (id, created_at) = match existing {
            Some(old) => (old.id, old.created_at),
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
        let tags_json = serde_json::to_string(&item.tags)
            .map_err(|e| StoreError::QueryFailed(format!("Tags serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO knowledge_items (
                id, title, item_type, importance, tags, content_markdown,
                jarvis_instructions, status, module_slug, created_at, updated_at, revision
            )
            VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                (SELECT COALESCE(MAX(revision), 0) + 1 FROM knowledge_items)
            )
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                item_type = excluded.item_type,
                importance = excluded.importance,
                tags = excluded.tags,
                content_markdown = excluded.content_markdown,
                jarvis_instructions = excluded.jarvis_instructions,
                status = excluded.status,
                module_slug = excluded.module_slug,
                updated_at = excluded.updated_at,
                revision = excluded.revision
            "#,
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.item_type)
        .bind(item.importance)
        .bind(&tags_json)
        .bind(item.content_markdown.as_deref())
        .bind(item.jarvis_instructions.as_deref())
        .bind(item.status.as_str())
        .bind(item.module_slug.as_deref())
        .bind(format_timestamp(&item.created_at))
        .bind(format_timestamp(&item.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("Upsert failed: {e}")))?;

        debug!(id = %item.id, "Upserted knowledge item");
        Ok(item)
    }

    async fn get(&self, id: &str) -> Result<Option<KnowledgeItem>, StoreError> {
        let row = sqlx::query("SELECT * FROM knowledge_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Get failed: {e}")))?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM knowledge_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Delete failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM knowledge_items")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Count failed: {e}")))?;

        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::QueryFailed(format!("count column: {e}")))?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_core::KnowledgeStatus;

    async fn test_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn titles(items: &[KnowledgeItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[tokio::test]
    async fn upsert_and_get_roundtrip_fields() {
        let store = test_store().await;
        let item = store
            .upsert(
                KnowledgeUpsert::new("Risk rule", "Never risk more than **1%**")
                    .with_importance(4.5)
                    .with_tags(["trading", "risk"])
                    .with_module("trading")
                    .with_instructions("Remind the user before large orders"),
            )
            .await
            .unwrap();

        let fetched = store.get(&item.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Risk rule");
        assert_eq!(fetched.importance, Some(4.5));
        assert_eq!(fetched.tags, vec!["trading".to_string(), "risk".to_string()]);
        assert_eq!(fetched.module_slug.as_deref(), Some("trading"));
        assert_eq!(
            fetched.jarvis_instructions.as_deref(),
            Some("Remind the user before large orders")
        );
        assert_eq!(fetched.status, KnowledgeStatus::Active);
    }

    #[tokio::test]
    async fn missing_importance_stays_null() {
        let store = test_store().await;
        let item = store.upsert(KnowledgeUpsert::new("A", "a")).await.unwrap();
        let fetched = store.get(&item.id).await.unwrap().unwrap();
        assert_eq!(fetched.importance, None);
        assert_eq!(fetched.resolved_importance(), 1.0);
    }

    #[tokio::test]
    async fn list_orders_by_latest_write() {
        let store = test_store().await;
        let a = store.upsert(KnowledgeUpsert::new("A", "a")).await.unwrap();
        store.upsert(KnowledgeUpsert::new("B", "b")).await.unwrap();
        store.upsert(KnowledgeUpsert::new("C", "c")).await.unwrap();

        let items = store.list(ListFilter::active()).await.unwrap();
        assert_eq!(titles(&items), vec!["C", "B", "A"]);

        let mut touch = KnowledgeUpsert::new("A", "a2");
        touch.id = Some(a.id.clone());
        let touched = store.upsert(touch).await.unwrap();
        assert_eq!(touched.created_at, a.created_at);

        let items = store.list(ListFilter::active()).await.unwrap();
        assert_eq!(titles(&items), vec!["A", "C", "B"]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn list_filters_and_limits() {
        let store = test_store().await;
        for (title, module) in [("T1", "trading"), ("P1", "psych"), ("T2", "trading")] {
            store
                .upsert(KnowledgeUpsert::new(title, "x").with_module(module))
                .await
                .unwrap();
        }
        store
            .upsert(KnowledgeUpsert::new("Gone", "x").with_status(KnowledgeStatus::Archived))
            .await
            .unwrap();

        let trading = store
            .list(ListFilter::active().with_module("trading"))
            .await
            .unwrap();
        assert_eq!(titles(&trading), vec!["T2", "T1"]);

        let all_active = store.list(ListFilter::active()).await.unwrap();
        assert_eq!(all_active.len(), 3);

        let limited = store.list(ListFilter::active().with_limit(2)).await.unwrap();
        assert_eq!(titles(&limited), vec!["T2", "P1"]);

        let archived = store
            .list(ListFilter::active().with_status(KnowledgeStatus::Archived))
            .await
            .unwrap();
        assert_eq!(titles(&archived), vec!["Gone"]);

        let unknown = store
            .list(ListFilter::active().with_module("nope"))
            .await
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_do_not_write() {
        let store = test_store().await;
        let err = store.upsert(KnowledgeUpsert::new("", "body")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_entry() {
        let store = test_store().await;
        let item = store.upsert(KnowledgeUpsert::new("Gone", "soon")).await.unwrap();
        assert!(store.delete(&item.id).await.unwrap());
        assert!(store.get(&item.id).await.unwrap().is_none());
        assert!(!store.delete(&item.id).await.unwrap());
    }

    #[tokio::test]
    async fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("kb.sqlite").display());

        let id = {
            let store = SqliteStore::new(&url).await.unwrap();
            store
                .upsert(KnowledgeUpsert::new("Durable", "survives reopen"))
                .await
                .unwrap()
                .id
        };

        let reopened = SqliteStore::new(&url).await.unwrap();
        let item = reopened.get(&id).await.unwrap().unwrap();
        assert_eq!(item.title, "Durable");
    }

    #[tokio::test]
    async fn unreachable_path_is_unavailable() {
        let err = SqliteStore::new("sqlite:///nonexistent-dir/deeper/kb.sqlite")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
