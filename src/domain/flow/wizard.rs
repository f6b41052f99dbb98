//! Next-steps diagnostic wizard.
//!
//! A fixed, ordered list of four diagnostic questions. Progress is derived
//! from the trailing message window: which questions have been asked (by
//! tag) and which answers were captured.

use crate::domain::conversation::Message;

use super::tag::FlowTag;

/// Trailing window inspected for wizard activity.
pub const WIZARD_WINDOW: usize = 10;

/// Key identifying one wizard question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardKey {
    Registered,
    Payment,
    Documents,
    Holds,
}

impl WizardKey {
    /// Returns the snake_case key used in prompt summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardKey::Registered => "registered",
            WizardKey::Payment => "payment",
            WizardKey::Documents => "documents",
            WizardKey::Holds => "holds",
        }
    }
}

/// One fixed diagnostic question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardQuestion {
    pub key: WizardKey,
    pub question: &'static str,
    pub follow_up: &'static str,
}

/// The diagnostic questions, in the order they are asked.
pub const WIZARD_QUESTIONS: [WizardQuestion; 4] = [
    WizardQuestion {
        key: WizardKey::Registered,
        question: "Have you registered for classes yet? (yes/no)",
        follow_up: "Which semester are you trying to register for?",
    },
    WizardQuestion {
        key: WizardKey::Payment,
        question: "Do you have any outstanding balance or payment due? (yes/no/not sure)",
        follow_up: "How much do you owe? (or \"not sure\")",
    },
    WizardQuestion {
        key: WizardKey::Documents,
        question: "Do you need to submit any documents? (transcripts, vaccination proof, financial aid forms, etc.)",
        follow_up: "What documents do you need to submit?",
    },
    WizardQuestion {
        key: WizardKey::Holds,
        question: "Do you have any holds on your account? (yes/no/not sure)",
        follow_up: "What does the hold message say?",
    },
];

fn question_index(key: WizardKey) -> usize {
    WIZARD_QUESTIONS
        .iter()
        .position(|q| q.key == key)
        .expect("every key appears in WIZARD_QUESTIONS")
}

/// Derived wizard state for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardProgress {
    active: bool,
    asked: [bool; 4],
    answers: [Option<String>; 4],
    current_index: usize,
}

impl WizardProgress {
    /// Reconstructs wizard progress from the trailing message window.
    ///
    /// Walks the window in order. Each not-yet-seen wizard question tag marks
    /// that question asked and moves the current index past it; the next user
    /// message after an asked question fills that question's empty answer
    /// slot.
    pub fn reconstruct(messages: &[Message]) -> Self {
        let start = messages.len().saturating_sub(WIZARD_WINDOW);
        let window = &messages[start..];

        let mut progress = WizardProgress::default();
        let mut last_asked: Option<usize> = None;

        for msg in window {
            if msg.is_assistant() {
                if let Some(FlowTag::WizardQuestion(key)) = msg.flow_tag() {
                    let idx = question_index(*key);
                    if !progress.asked[idx] {
                        progress.asked[idx] = true;
                        progress.current_index = idx + 1;
                        last_asked = Some(idx);
                    }
                    progress.active = true;
                }
            } else if msg.is_user() {
                if let Some(idx) = last_asked {
                    if progress.answers[idx].is_none() {
                        progress.answers[idx] = Some(msg.content().trim().to_string());
                    }
                }
            }
        }

        progress
    }

    /// Returns true if any wizard question appears in the window.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true once every question has a recorded answer.
    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(|a| a.is_some())
    }

    /// The number of recorded answers.
    pub fn answer_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// The next question to ask, by list order.
    ///
    /// Starts at the current index and skips anything already answered, so
    /// an answered question is never asked again. `None` once the wizard is
    /// complete or past the end of the list.
    pub fn next_question(&self) -> Option<&'static WizardQuestion> {
        WIZARD_QUESTIONS
            .iter()
            .enumerate()
            .skip(self.current_index)
            .find(|(idx, _)| self.answers[*idx].is_none())
            .map(|(_, q)| q)
    }

    /// Recorded answers as (key, answer) pairs, in question order.
    pub fn answered(&self) -> Vec<(&'static str, &str)> {
        WIZARD_QUESTIONS
            .iter()
            .enumerate()
            .filter_map(|(idx, q)| {
                self.answers[idx]
                    .as_deref()
                    .map(|a| (q.key.as_str(), a))
            })
            .collect()
    }
}
