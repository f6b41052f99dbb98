//! Knowledge-context assembly.
//!
//! Retrieved snippets are deduplicated, truncated to a per-snippet token
//! budget with sentence-boundary-aware cutting, and concatenated with
//! explicit separators. When the caller prioritizes links, snippets that
//! carry a URL or extracted links sort ahead of those that do not.

use std::collections::HashSet;

use crate::ports::Snippet;

/// Per-snippet token budget.
pub const SNIPPET_TOKEN_BUDGET: usize = 500;

/// Separator between snippets in the assembled context block.
const SNIPPET_SEPARATOR: &str = "\n\n---\n\n";

/// Maximum extracted links appended per snippet.
const MAX_LINKS_PER_SNIPPET: usize = 3;

/// Fraction of the budget within which a sentence boundary is preferred
/// over a hard cut.
const BOUNDARY_FRACTION: f64 = 0.7;

/// Estimates token count for a text.
///
/// Rough estimate: ~4 chars per token.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}

/// Truncates text to at most `budget` tokens.
///
/// Prefers cutting at a sentence boundary (`.`, `!`, `?`, or newline) when
/// one exists within the last 30% of the budget; otherwise hard-cuts at the
/// budget.
pub fn truncate_to_budget(text: &str, budget: usize) -> String {
    if estimate_tokens(text) <= budget {
        return text.to_string();
    }

    let max_chars = budget * 4;
    let hard_cut: String = text.chars().take(max_chars).collect();

    let boundary = hard_cut
        .char_indices()
        .filter(|(_, c)| matches!(c, '.' | '!' | '?' | '\n'))
        .map(|(i, c)| i + c.len_utf8())
        .last();

    if let Some(end) = boundary {
        let kept_chars = hard_cut[..end].chars().count();
        if kept_chars as f64 > max_chars as f64 * BOUNDARY_FRACTION {
            return hard_cut[..end].trim_end().to_string();
        }
    }

    hard_cut
}

/// Assembles retrieved snippets into one context block.
///
/// Returns `None` when nothing useful was retrieved.
pub fn assemble_context(snippets: &[Snippet], link_priority: bool) -> Option<String> {
    let deduped = dedupe(snippets);
    if deduped.is_empty() {
        return None;
    }

    let ordered: Vec<&Snippet> = if link_priority {
        let (with_links, without): (Vec<&Snippet>, Vec<&Snippet>) =
            deduped.iter().partition(|s| s.has_links());
        with_links.into_iter().chain(without).collect()
    } else {
        deduped
    };

    let parts: Vec<String> = ordered
        .iter()
        .filter_map(|snippet| format_snippet(snippet, link_priority))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(SNIPPET_SEPARATOR))
    }
}

fn dedupe(snippets: &[Snippet]) -> Vec<&Snippet> {
    let mut seen = HashSet::new();
    snippets
        .iter()
        .filter(|s| {
            let key = s
                .url
                .clone()
                .unwrap_or_else(|| s.text.clone());
            seen.insert(key)
        })
        .collect()
}

fn format_snippet(snippet: &Snippet, link_priority: bool) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(title) = snippet.title.as_deref() {
        if !title.is_empty() {
            parts.push(title.to_string());
        }
    }

    if !snippet.text.trim().is_empty() {
        parts.push(truncate_to_budget(&snippet.text, SNIPPET_TOKEN_BUDGET));
    }

    if let Some(url) = snippet.url.as_deref() {
        parts.push(format!("Source: {}", url));
    }

    if link_priority && !snippet.links.is_empty() {
        let links: Vec<String> = snippet
            .links
            .iter()
            .take(MAX_LINKS_PER_SNIPPET)
            .map(|link| {
                if link.label.is_empty() {
                    link.url.clone()
                } else {
                    format!("{}: {}", link.label, link.url)
                }
            })
            .collect();
        parts.push(format!("Relevant links: {}", links.join(" | ")));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_is_unchanged() {
        let text = "Pay tuition at the cashier's office.";
        assert_eq!(truncate_to_budget(text, SNIPPET_TOKEN_BUDGET), text);
    }

    #[test]
    fn truncated_text_fits_budget() {
        let text = "word ".repeat(2000);
        let truncated = truncate_to_budget(&text, 100);
        assert!(estimate_tokens(&truncated) <= 100);
    }

    #[test]
    fn prefers_sentence_boundary_near_end() {
        // One sentence ends at ~90% of the budget; the rest runs past it.
        let sentence = format!("{}.", "a".repeat(358));
        let text = format!("{} {}", sentence, "b".repeat(200));
        let truncated = truncate_to_budget(&text, 100);

        assert!(truncated.ends_with('.'));
        assert_eq!(truncated, sentence);
        assert!(estimate_tokens(&truncated) <= 100);
    }

    #[test]
    fn hard_cuts_when_boundary_is_too_early() {
        // The only sentence boundary sits at 25% of the budget.
        let text = format!("{}.{}", "a".repeat(99), "b".repeat(900));
        let truncated = truncate_to_budget(&text, 100);

        assert_eq!(truncated.chars().count(), 400);
        assert!(!truncated.ends_with('.'));
    }

    #[test]
    fn assembles_with_separators() {
        let snippets = vec![
            Snippet::text_only(0.9, "First snippet."),
            Snippet::text_only(0.8, "Second snippet."),
        ];
        let context = assemble_context(&snippets, false).unwrap();
        assert!(context.contains("First snippet."));
        assert!(context.contains("---"));
        assert!(context.contains("Second snippet."));
    }

    #[test]
    fn dedupes_by_url() {
        let snippets = vec![
            Snippet::text_only(0.9, "Copy A").with_url("https://college.example.edu/pay"),
            Snippet::text_only(0.8, "Copy B").with_url("https://college.example.edu/pay"),
        ];
        let context = assemble_context(&snippets, false).unwrap();
        assert!(context.contains("Copy A"));
        assert!(!context.contains("Copy B"));
    }

    #[test]
    fn dedupes_identical_text_without_urls() {
        let snippets = vec![
            Snippet::text_only(0.9, "Same text"),
            Snippet::text_only(0.8, "Same text"),
        ];
        let context = assemble_context(&snippets, false).unwrap();
        assert_eq!(context.matches("Same text").count(), 1);
    }

    #[test]
    fn link_priority_sorts_linked_snippets_first() {
        let snippets = vec![
            Snippet::text_only(0.9, "No links here."),
            Snippet::text_only(0.8, "Payment page.")
                .with_url("https://college.example.edu/pay"),
        ];
        let context = assemble_context(&snippets, true).unwrap();

        let linked_pos = context.find("Payment page.").unwrap();
        let plain_pos = context.find("No links here.").unwrap();
        assert!(linked_pos < plain_pos);
    }

    #[test]
    fn link_priority_appends_up_to_three_links() {
        let snippet = Snippet::text_only(0.9, "Registration info.")
            .with_url("https://college.example.edu/register")
            .with_link("Course search", "https://college.example.edu/courses")
            .with_link("Prerequisites", "https://college.example.edu/prereqs")
            .with_link("Waitlist", "https://college.example.edu/waitlist")
            .with_link("Extra", "https://college.example.edu/extra");

        let context = assemble_context(&[snippet], true).unwrap();
        assert!(context.contains("Course search: https://college.example.edu/courses"));
        assert!(context.contains("Waitlist"));
        assert!(!context.contains("Extra"));
    }

    #[test]
    fn links_are_omitted_without_priority() {
        let snippet = Snippet::text_only(0.9, "Registration info.")
            .with_link("Course search", "https://college.example.edu/courses");
        let context = assemble_context(&[snippet], false).unwrap();
        assert!(!context.contains("Relevant links"));
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(assemble_context(&[], false).is_none());
    }

    proptest! {
        /// Truncated output never exceeds the budget, whatever the input.
        #[test]
        fn truncation_respects_budget(text in ".{0,4000}", budget in 1usize..200) {
            let truncated = truncate_to_budget(&text, budget);
            prop_assert!(estimate_tokens(&truncated) <= budget);
        }
    }
}
