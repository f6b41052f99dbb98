//! Ports - narrow interfaces to external collaborators.
//!
//! The engine only ever talks to storage, the knowledge base, the language
//! model, and the outbound gateway through these traits; adapters provide
//! the implementations.

mod conversation_store;
mod knowledge_base;
mod language_model;
mod message_sender;

pub use conversation_store::{ConversationStore, StoreError};
pub use knowledge_base::{KnowledgeBase, KnowledgeError, Snippet, SnippetLink};
pub use language_model::{
    ChatMessage, ChatRequest, ChatRole, LanguageModel, ModelError, ModelReply, ToolCall, ToolSpec,
};
pub use message_sender::{DeliveryReceipt, MessageSender};
