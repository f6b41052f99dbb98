//! Fixture-backed knowledge base for tests and development.

use async_trait::async_trait;

use crate::ports::{KnowledgeBase, KnowledgeError, Snippet};

/// In-memory keyword search over seeded snippets.
///
/// Scores each snippet by how many query words appear in its text or title,
/// scaled by the seeded similarity score, and returns the top matches. Not a
/// real similarity search; just enough retrieval behavior to exercise the
/// engine end to end.
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledgeBase {
    snippets: Vec<Snippet>,
}

impl StaticKnowledgeBase {
    /// Creates an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the knowledge base with fixed snippets.
    pub fn with_snippets(snippets: Vec<Snippet>) -> Self {
        Self { snippets }
    }

    fn overlap(snippet: &Snippet, query_words: &[String]) -> usize {
        let haystack = format!(
            "{} {}",
            snippet.text.to_lowercase(),
            snippet.title.as_deref().unwrap_or("").to_lowercase()
        );
        query_words
            .iter()
            .filter(|word| haystack.contains(word.as_str()))
            .count()
    }
}

#[async_trait]
impl KnowledgeBase for StaticKnowledgeBase {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        link_priority: bool,
    ) -> Result<Vec<Snippet>, KnowledgeError> {
        let query_words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .map(|w| w.to_string())
            .collect();

        let mut scored: Vec<(usize, &Snippet)> = self
            .snippets
            .iter()
            .map(|s| (Self::overlap(s, &query_words), s))
            .filter(|(overlap, _)| *overlap > 0 || query_words.is_empty())
            .collect();
        scored.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.score.partial_cmp(&a.1.score).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut results: Vec<Snippet> = scored.into_iter().map(|(_, s)| s.clone()).collect();
        if link_priority {
            // Stable: preserves relevance order within each partition.
            results.sort_by_key(|s| !s.has_links());
        }
        results.truncate(top_k);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> StaticKnowledgeBase {
        StaticKnowledgeBase::with_snippets(vec![
            Snippet::text_only(0.9, "Tuition payment is due at the start of each term.")
                .with_title("Tuition"),
            Snippet::text_only(0.8, "Pay tuition online at the student portal.")
                .with_url("https://college.example.edu/pay"),
            Snippet::text_only(0.7, "The library is open 8am to 10pm."),
        ])
    }

    #[tokio::test]
    async fn matches_rank_above_non_matches() {
        let kb = fixture();
        let results = kb.search("where do I pay tuition", 3, false).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].text.contains("Tuition payment") || results[0].text.contains("Pay tuition"));
        assert!(results.iter().all(|s| !s.text.contains("library")));
    }

    #[tokio::test]
    async fn link_priority_puts_linked_snippets_first() {
        let kb = fixture();
        let results = kb.search("pay tuition", 3, true).await.unwrap();

        assert!(results[0].has_links());
    }

    #[tokio::test]
    async fn top_k_bounds_results() {
        let kb = fixture();
        let results = kb.search("tuition pay", 1, false).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn no_match_returns_empty() {
        let kb = fixture();
        let results = kb.search("parking permit", 3, false).await.unwrap();
        assert!(results.is_empty());
    }
}
