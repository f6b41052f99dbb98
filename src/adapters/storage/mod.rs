//! Conversation storage adapters.
//!
//! Two implementations of the same port, selected by configuration:
//! PostgreSQL for deployments and an in-memory store for tests, development,
//! and degraded operation.

mod in_memory_store;
mod postgres_store;

pub use in_memory_store::InMemoryStore;
pub use postgres_store::PostgresStore;
