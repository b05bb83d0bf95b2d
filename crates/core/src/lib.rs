//! # Jarvis Core
//!
//! Domain types, the knowledge store trait, and error definitions for the
//! Jarvis knowledge context service. This crate has **no storage or HTTP
//! dependencies**: it defines the model every other crate works against.
//!
//! The store is a trait here; its implementations live in `jarvis-store`.
//! The context builder in `jarvis-context` only ever sees
//! `Arc<dyn KnowledgeStore>`, so tests can swap in an in-memory pool.

pub mod error;
pub mod knowledge;

pub use error::StoreError;
pub use knowledge::{
    DEFAULT_IMPORTANCE, DEFAULT_ITEM_TYPE, DEFAULT_MAX_ITEMS, KnowledgeItem, KnowledgeStatus,
    KnowledgeStore, KnowledgeUpsert, ListFilter,
};
