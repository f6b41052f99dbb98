//! Typed intent rules.
//!
//! Each intent category is a fixed list of patterns tested case-insensitively
//! against the raw message. The table is data: adding a category means adding
//! a row, not another detection method.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// The intent categories a message can match.
///
/// Categories are independent; a message may match several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    /// Asking for a link/page/portal.
    LinkRequest,
    /// Asking how a policy works.
    PolicyQuestion,
    /// Asking about financial aid.
    FinancialAid,
    /// Asking about an account hold.
    Hold,
    /// Reporting trouble registering.
    RegistrationTrouble,
    /// Asking what to do next.
    NextSteps,
}

/// A single intent category and the patterns that detect it.
pub struct IntentRule {
    pub kind: IntentKind,
    pub patterns: &'static [&'static str],
}

/// The full rule table, one row per category.
pub const RULES: &[IntentRule] = &[
    IntentRule {
        kind: IntentKind::LinkRequest,
        patterns: &[
            r"\bwhere\s+(do\s+I\s+)?(pay|register|drop|withdraw|apply|login|access)",
            r"\b(link|url|page|website|portal)\s+(for|to|to\s+pay|to\s+register)",
            r"\b(payment|registration|registration\s+page|academic\s+calendar|drop\s+class|withdraw)",
            r"\bsend\s+me\s+(the\s+)?(link|url|page)",
            r"\bhow\s+do\s+I\s+(pay|register|drop|access|login)",
            r"\b(pay|register|drop|login|access)\s+(link|page|url|website)",
        ],
    },
    IntentRule {
        kind: IntentKind::PolicyQuestion,
        patterns: &[
            r"\b(explain|what\s+is|tell\s+me\s+about|how\s+does)\s+(the\s+)?(withdrawal|withdraw|drop|payment|refund|SAP|satisfactory\s+academic|attendance|policy)",
            r"\b(withdrawal|withdraw|drop|payment|refund|SAP|satisfactory\s+academic|attendance)\s+(policy|rule|requirement|works)",
            r"\bcan\s+I\s+(withdraw|drop|get\s+a\s+refund|still\s+pay)",
            r"\bwhat\s+happens\s+if\s+I\s+(withdraw|drop|don't\s+pay)",
        ],
    },
    IntentRule {
        kind: IntentKind::FinancialAid,
        patterns: &[
            r"\b(financial\s+aid|fafsa|pell|grant|scholarship|disbursement|verification|refund)",
            r"\bwhy\s+(didn't|did\s+not|hasn't|has\s+not)\s+(my\s+)?(aid|money|funds|payment)",
            r"\bwhen\s+(will|do)\s+(I\s+get|my\s+aid|financial\s+aid)",
            r"\b(explain|what\s+is|tell\s+me\s+about)\s+(fafsa|verification|disbursement|pell|financial\s+aid)",
            r"\b(dependent|independent|eligibility|sap)\s+(status|requirement)",
        ],
    },
    IntentRule {
        kind: IntentKind::Hold,
        patterns: &[
            r"\b(hold|blocked|can't\s+register|registration\s+blocked)",
            r"\bwhy\s+can't\s+I\s+register",
            r"\b(fix|remove|resolve|clear)\s+(my\s+)?(hold|block)",
            r"\bwhat\s+(is|does)\s+(the\s+)?(hold|block)\s+mean",
        ],
    },
    IntentRule {
        kind: IntentKind::RegistrationTrouble,
        patterns: &[
            r"\bwhy\s+can't\s+I\s+register",
            r"\b(can't|cannot)\s+register",
            r"\bregistration\s+(error|blocked|won't\s+work|problem)",
            r"\bwhat\s+(message|error)\s+(do\s+I\s+see|am\s+I\s+seeing)",
            r"\b(error|message|blocked)\s+(when\s+)?(trying\s+to\s+)?register",
        ],
    },
    IntentRule {
        kind: IntentKind::NextSteps,
        patterns: &[
            r"\bwhat\s+(do\s+I\s+need\s+to\s+do|should\s+I\s+do|are\s+my\s+next\s+steps)",
            r"\btell\s+me\s+what\s+I\s+need\s+to\s+do",
            r"\bwhat's\s+next",
            r"\bhelp\s+me\s+figure\s+out\s+what\s+to\s+do",
            r"\bwhat\s+should\s+I\s+do\s+next",
            r"\bchecklist|next\s+steps|what\s+to\s+do",
        ],
    },
];

/// Compiled form of [`RULES`], built once.
pub(super) static COMPILED: Lazy<Vec<(IntentKind, Vec<Regex>)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| {
            let patterns = rule
                .patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .unwrap_or_else(|e| panic!("invalid intent pattern {:?}: {}", p, e))
                })
                .collect();
            (rule.kind, patterns)
        })
        .collect()
});
