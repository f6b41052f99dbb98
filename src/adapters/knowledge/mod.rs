//! Knowledge-base adapters.

mod http_search;
mod static_knowledge;

pub use http_search::{HttpKnowledgeBase, KnowledgeConfig};
pub use static_knowledge::StaticKnowledgeBase;
