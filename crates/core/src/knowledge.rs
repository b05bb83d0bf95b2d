//! Knowledge items and the store boundary.
//!
//! A knowledge item is a stored fact, rule, or preference that may be
//! injected into an assistant prompt. Items carry an importance weight and
//! topical tags; the context builder uses both to rank them.
//!
//! Items are read leniently: a record with a missing or non-numeric
//! `importance`, no `tags`, or no `content_markdown` still deserializes.
//! Writes go through [`KnowledgeUpsert`], which is strict about `title` and
//! `content_markdown`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Importance used when an item has none (or a non-finite one).
pub const DEFAULT_IMPORTANCE: f64 = 1.0;

/// Context blocks kept when a build names no budget of its own.
pub const DEFAULT_MAX_ITEMS: usize = 8;

/// Item type used when an upsert omits `item_type`.
pub const DEFAULT_ITEM_TYPE: &str = "fact";

/// Lifecycle flag of a knowledge item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeStatus {
    #[default]
    Active,
    Archived,
}

impl KnowledgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for KnowledgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnowledgeStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(StoreError::Validation(format!(
                "unknown status '{other}' (expected 'active' or 'archived')"
            ))),
        }
    }
}

/// A stored knowledge item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: String,

    pub title: String,

    /// Kind of fact, e.g. `fact`, `rule`, `preference`.
    #[serde(default = "default_item_type")]
    pub item_type: String,

    /// Salience weight. `None` means "not set"; see [`Self::resolved_importance`].
    #[serde(default, deserialize_with = "lenient_number")]
    pub importance: Option<f64>,

    /// Topical tags. Treated as a set.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_markdown: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jarvis_instructions: Option<String>,

    #[serde(default)]
    pub status: KnowledgeStatus,

    #[serde(
        default,
        rename = "moduleSlug",
        alias = "module_slug",
        skip_serializing_if = "Option::is_none"
    )]
    pub module_slug: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_item_type() -> String {
    DEFAULT_ITEM_TYPE.into()
}

/// Accepts any JSON value and keeps it only if it is a number.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

impl KnowledgeItem {
    /// Importance with the default applied. Absent, NaN and infinite
    /// values all resolve to [`DEFAULT_IMPORTANCE`]; zero and negative
    /// weights are kept as-is.
    pub fn resolved_importance(&self) -> f64 {
        match self.importance {
            Some(v) if v.is_finite() => v,
            _ => DEFAULT_IMPORTANCE,
        }
    }

    /// Build a stored item from validated upsert input.
    pub fn from_upsert(
        input: KnowledgeUpsert,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: input.title.trim().to_string(),
            item_type: input
                .item_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(default_item_type),
            importance: input.importance,
            tags: dedup_tags(input.tags),
            content_markdown: input.content_markdown,
            jarvis_instructions: input.jarvis_instructions.filter(|s| !s.trim().is_empty()),
            status: input.status,
            module_slug: input.module_slug.filter(|s| !s.trim().is_empty()),
            created_at,
            updated_at,
        }
    }
}

/// Drop repeated and blank tags, keeping the first occurrence of each.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Write input for [`KnowledgeStore::upsert`]; the body of the save endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeUpsert {
    /// Existing item to replace. A fresh id is generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub importance: Option<f64>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub content_markdown: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jarvis_instructions: Option<String>,

    #[serde(default)]
    pub status: KnowledgeStatus,

    #[serde(
        default,
        rename = "moduleSlug",
        alias = "module_slug",
        skip_serializing_if = "Option::is_none"
    )]
    pub module_slug: Option<String>,
}

impl KnowledgeUpsert {
    pub fn new(title: impl Into<String>, content_markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content_markdown: Some(content_markdown.into()),
            ..Self::default()
        }
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_module(mut self, module_slug: impl Into<String>) -> Self {
        self.module_slug = Some(module_slug.into());
        self
    }

    pub fn with_status(mut self, status: KnowledgeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.jarvis_instructions = Some(instructions.into());
        self
    }

    /// Check the constraints every store enforces before writing.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() {
            return Err(StoreError::Validation("title is required".into()));
        }
        let has_content = self
            .content_markdown
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if !has_content {
            return Err(StoreError::Validation("content_markdown is required".into()));
        }
        Ok(())
    }
}

/// Filter for [`KnowledgeStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub module_slug: Option<String>,
    pub status: KnowledgeStatus,
    /// Maximum number of items. `None` returns the whole matching pool.
    pub limit: Option<usize>,
}

impl ListFilter {
    /// All active items, no module restriction, no limit.
    pub fn active() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module_slug: impl Into<String>) -> Self {
        self.module_slug = Some(module_slug.into());
        self
    }

    pub fn with_status(mut self, status: KnowledgeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `item` passes the status and module criteria.
    pub fn matches(&self, item: &KnowledgeItem) -> bool {
        item.status == self.status
            && self
                .module_slug
                .as_deref()
                .is_none_or(|m| item.module_slug.as_deref() == Some(m))
    }
}

/// The knowledge store boundary.
///
/// Implementations: SQLite, in-memory (for testing), none (no-op).
///
/// `list` returns items most recently written first. The context builder
/// relies on that order being stable between calls over an unchanged store.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory", "none").
    fn name(&self) -> &str;

    /// List items matching `filter`.
    async fn list(&self, filter: ListFilter) -> Result<Vec<KnowledgeItem>, StoreError>;

    /// Validate and insert or replace an item.
    async fn upsert(&self, input: KnowledgeUpsert) -> Result<KnowledgeItem, StoreError>;

    /// Get an item by ID.
    async fn get(&self, id: &str) -> Result<Option<KnowledgeItem>, StoreError>;

    /// Delete an item by ID. Returns whether anything was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Total number of items, regardless of status.
    async fn count(&self) -> Result<usize, StoreError>;
}
