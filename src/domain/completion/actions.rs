//! Best-effort action-item extraction from assistant free text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Explicit action-line markers, checked in order.
const MARKERS: [&str; 4] = ["Action:", "ACTION:", "TODO:", "To do:"];

/// Verbs that make a numbered step worth tracking.
const ACTION_VERBS: [&str; 8] = [
    "pay", "register", "submit", "complete", "schedule", "contact", "meet", "apply",
];

/// Numbered steps only count past this length.
const MIN_NUMBERED_LEN: usize = 10;

static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s+").expect("valid numbered-line pattern"));

/// Scans assistant text for action items.
///
/// Matches explicit marker lines (`Action:`, `TODO:`, ...) and numbered list
/// lines whose text contains one of a fixed set of action verbs. Extraction
/// is best-effort and total: unmatched text simply yields nothing.
pub fn extract_action_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();

    for line in text.lines() {
        let line = line.trim();

        if let Some(action) = strip_marker(line) {
            if !action.is_empty() {
                items.push(action.to_string());
            }
        } else if NUMBERED.is_match(line) && line.len() > MIN_NUMBERED_LEN {
            let action = NUMBERED.replace(line, "").trim().to_string();
            let lower = action.to_lowercase();
            if ACTION_VERBS.iter().any(|verb| lower.contains(verb)) {
                items.push(action);
            }
        }
    }

    items
}

fn strip_marker(line: &str) -> Option<&str> {
    MARKERS
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_marker_lines() {
        let text = "Here's the plan.\nAction: Pay your balance by Friday\nTODO: Submit the FAFSA";
        let items = extract_action_items(text);
        assert_eq!(
            items,
            vec!["Pay your balance by Friday", "Submit the FAFSA"]
        );
    }

    #[test]
    fn extracts_numbered_steps_with_action_verbs() {
        let text = "Based on your situation:\n1. Pay your outstanding balance online\n2. Contact your advisor this week";
        let items = extract_action_items(text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], "Pay your outstanding balance online");
    }

    #[test]
    fn skips_numbered_lines_without_verbs() {
        let text = "1. Here is some info about campus\n2. The library is open late";
        assert!(extract_action_items(text).is_empty());
    }

    #[test]
    fn skips_short_numbered_lines() {
        assert!(extract_action_items("1. pay").is_empty());
    }

    #[test]
    fn supports_parenthesis_numbering() {
        let items = extract_action_items("1) Register for MAT 140 today");
        assert_eq!(items, vec!["Register for MAT 140 today"]);
    }

    #[test]
    fn empty_marker_lines_are_ignored() {
        assert!(extract_action_items("Action:   ").is_empty());
    }

    #[test]
    fn plain_text_yields_nothing() {
        assert!(extract_action_items("You're all set, have a great semester!").is_empty());
    }
}
