//! Knowledge context assembly.
//!
//! Turns the pool of active knowledge items into a short, ranked list of
//! context blocks for an assistant prompt:
//!
//! 1. **Fetch** every active item from the [`KnowledgeStore`](jarvis_core::KnowledgeStore)
//! 2. **Score** each item: importance + 2 × matching intent tags
//! 3. **Sort** by score, descending, keeping store order on ties
//! 4. **Truncate** to the item budget (default 8)
//! 5. **Project** survivors to [`KnowledgeContextBlock`]s
//!
//! Nothing is cached between builds; each call sees the store as it is now.

pub mod builder;
pub mod render;
pub mod scorer;

pub use builder::{BuildOptions, ContextBuilder, DEFAULT_MAX_ITEMS, KnowledgeContextBlock, ScoredItem};
pub use render::render_context;
pub use scorer::{INTENT_TAG_WEIGHT, score, tag_overlap};
