//! Knowledge-base search port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A link extracted from a knowledge-base page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetLink {
    /// Link text ("Payment options").
    pub label: String,
    /// Full URL.
    pub url: String,
}

/// One retrieved knowledge snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Similarity score from the search backend.
    pub score: f32,
    /// Page text.
    pub text: String,
    /// Source page URL.
    pub url: Option<String>,
    /// Page title.
    pub title: Option<String>,
    /// Links extracted from the page.
    pub links: Vec<SnippetLink>,
}

impl Snippet {
    /// Creates a text-only snippet.
    pub fn text_only(score: f32, text: impl Into<String>) -> Self {
        Self {
            score,
            text: text.into(),
            url: None,
            title: None,
            links: Vec::new(),
        }
    }

    /// Sets the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds an extracted link.
    pub fn with_link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.push(SnippetLink {
            label: label.into(),
            url: url.into(),
        });
        self
    }

    /// Returns true if the snippet carries a URL or extracted links.
    pub fn has_links(&self) -> bool {
        self.url.is_some() || !self.links.is_empty()
    }
}

/// Knowledge-base collaborator errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge base unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Port for text-similarity search over the knowledge base.
///
/// Ranking and truncation of results happen in the core; adapters may use
/// `link_priority` to widen the fetch when links matter.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        link_priority: bool,
    ) -> Result<Vec<Snippet>, KnowledgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_base_is_object_safe() {
        fn _accepts_dyn(_kb: &dyn KnowledgeBase) {}
    }

    #[test]
    fn snippet_builder_works() {
        let snippet = Snippet::text_only(0.92, "Pay tuition online.")
            .with_url("https://college.example.edu/pay")
            .with_title("Payment options")
            .with_link("Payment plan", "https://college.example.edu/plan");

        assert!(snippet.has_links());
        assert_eq!(snippet.links.len(), 1);
        assert_eq!(snippet.title.as_deref(), Some("Payment options"));
    }

    #[test]
    fn text_only_snippet_has_no_links() {
        assert!(!Snippet::text_only(0.5, "hours: 9-5").has_links());
    }
}
