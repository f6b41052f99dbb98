//! Profile collection flow.
//!
//! New students are walked through three questions (name, student id,
//! program), one per turn. Progress is derived from the trailing window:
//! tagged profile questions set a pending field pointer, and the next short
//! user message is taken as that field's answer.

use once_cell::sync::Lazy;
use regex::RegexBuilder;

use crate::domain::conversation::Message;

use super::tag::{FlowTag, ProfileField};

/// Trailing window inspected for profile-flow activity.
pub const PROFILE_WINDOW: usize = 10;

/// Answers longer than this are assumed to be unrelated text, not a profile
/// field.
const MAX_ANSWER_LEN: usize = 100;

/// Raw answers collected so far, keyed by profile field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub program: Option<String>,
}

impl ProfileFields {
    fn set(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::Name => self.name = Some(value),
            ProfileField::StudentId => self.student_id = Some(value),
            ProfileField::Program => self.program = Some(value),
        }
    }

    /// Returns the raw answer for a field.
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Name => self.name.as_deref(),
            ProfileField::StudentId => self.student_id.as_deref(),
            ProfileField::Program => self.program.as_deref(),
        }
    }

    /// The first field with no answer, in fixed collection order.
    pub fn next_missing(&self) -> Option<ProfileField> {
        ProfileField::ORDER
            .into_iter()
            .find(|f| self.get(*f).is_none())
    }

    /// Collected (key, answer) pairs in collection order.
    pub fn collected(&self) -> Vec<(&'static str, &str)> {
        ProfileField::ORDER
            .into_iter()
            .filter_map(|f| self.get(f).map(|v| (f.key(), v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.collected().is_empty()
    }
}

/// Derived profile-flow state for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFlow {
    active: bool,
    fields: ProfileFields,
}

impl ProfileFlow {
    /// Reconstructs profile-flow state from the trailing message window.
    ///
    /// Walks the window in order: a tagged profile question sets the pending
    /// field (a later question for the same or another field overwrites the
    /// pointer); the next user message under 100 characters is recorded as
    /// the pending field's answer and clears the pointer.
    pub fn reconstruct(messages: &[Message]) -> Self {
        let start = messages.len().saturating_sub(PROFILE_WINDOW);
        let window = &messages[start..];

        let mut flow = ProfileFlow::default();
        let mut pending: Option<ProfileField> = None;

        for msg in window {
            if msg.is_assistant() {
                if let Some(FlowTag::ProfileQuestion(field)) = msg.flow_tag() {
                    pending = Some(*field);
                    flow.active = true;
                }
            } else if msg.is_user() {
                if let Some(field) = pending.take() {
                    let answer = msg.content().trim();
                    if !answer.is_empty() && answer.len() < MAX_ANSWER_LEN {
                        flow.fields.set(field, answer.to_string());
                    }
                }
            }
        }

        flow
    }

    /// Returns true if a profile question appears in the window.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Raw answers collected so far.
    pub fn fields(&self) -> &ProfileFields {
        &self.fields
    }
}

static NAME_PREFIX: Lazy<regex::Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^(my name is|i'm|i am|this is|it's|it is)\s+")
        .case_insensitive(true)
        .build()
        .expect("valid name prefix pattern")
});

static PROGRAM_PREFIX: Lazy<regex::Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^(i'm studying|i study|i'm in|majoring in|studying|program is)\s+")
        .case_insensitive(true)
        .build()
        .expect("valid program prefix pattern")
});

static TRAILING_PUNCT: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"[.,!?]+$").expect("valid punctuation pattern"));

/// Cleans a raw user answer into a storable profile value.
///
/// Strips conversational prefixes ("my name is ...") and trailing
/// punctuation; normalizes student ids to bare uppercase alphanumerics and
/// rejects ids outside 5-15 characters.
pub fn clean_answer(field: ProfileField, raw: &str) -> Option<String> {
    let raw = raw.trim();
    match field {
        ProfileField::Name => {
            let name = NAME_PREFIX.replace(raw, "");
            let name = TRAILING_PUNCT.replace(name.trim(), "");
            let name = name.trim();
            (!name.is_empty() && name.len() < MAX_ANSWER_LEN).then(|| name.to_string())
        }
        ProfileField::StudentId => {
            let id: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
            (5..=15)
                .contains(&id.len())
                .then(|| id.to_ascii_uppercase())
        }
        ProfileField::Program => {
            let program = PROGRAM_PREFIX.replace(raw, "");
            let program = TRAILING_PUNCT.replace(program.trim(), "");
            let program = program.trim();
            (!program.is_empty() && program.len() < MAX_ANSWER_LEN).then(|| program.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(field: ProfileField) -> Message {
        Message::assistant_asking(
            format!("Quick question - {}?", field.key()),
            FlowTag::ProfileQuestion(field),
        )
        .unwrap()
    }

    fn say(text: &str) -> Message {
        Message::user(text).unwrap()
    }

    #[test]
    fn inactive_without_profile_questions() {
        let messages = vec![
            Message::assistant("Here's the payment page.").unwrap(),
            say("thanks"),
        ];
        let flow = ProfileFlow::reconstruct(&messages);
        assert!(!flow.is_active());
        assert!(flow.fields().is_empty());
    }

    #[test]
    fn captures_answers_in_order() {
        let messages = vec![
            ask(ProfileField::Name),
            say("Jordan Reyes"),
            ask(ProfileField::StudentId),
            say("B00412345"),
        ];
        let flow = ProfileFlow::reconstruct(&messages);

        assert!(flow.is_active());
        assert_eq!(flow.fields().name.as_deref(), Some("Jordan Reyes"));
        assert_eq!(flow.fields().student_id.as_deref(), Some("B00412345"));
        assert_eq!(flow.fields().next_missing(), Some(ProfileField::Program));
    }

    #[test]
    fn long_answers_are_not_absorbed() {
        let rambling = "well it's a long story, let me tell you about my week first because \
                        honestly everything went wrong starting monday morning";
        let messages = vec![ask(ProfileField::Name), say(rambling)];
        let flow = ProfileFlow::reconstruct(&messages);

        assert!(flow.is_active());
        assert!(flow.fields().name.is_none());
    }

    #[test]
    fn later_question_overwrites_pending_field() {
        let messages = vec![
            ask(ProfileField::Name),
            ask(ProfileField::Program),
            say("Nursing"),
        ];
        let flow = ProfileFlow::reconstruct(&messages);

        assert_eq!(flow.fields().program.as_deref(), Some("Nursing"));
        assert!(flow.fields().name.is_none());
    }

    #[test]
    fn answer_consumes_pending_pointer() {
        let messages = vec![
            ask(ProfileField::Name),
            say("Jordan"),
            say("actually, where do I pay?"),
        ];
        let flow = ProfileFlow::reconstruct(&messages);

        // Second user message is not treated as another name answer.
        assert_eq!(flow.fields().name.as_deref(), Some("Jordan"));
    }

    #[test]
    fn window_bounds_apply() {
        let mut messages = vec![ask(ProfileField::Name), say("Jordan")];
        for i in 0..PROFILE_WINDOW {
            messages.push(say(&format!("digression {}", i)));
        }
        let flow = ProfileFlow::reconstruct(&messages);
        assert!(!flow.is_active());
    }

    #[test]
    fn reconstruction_is_idempotent() {
        let messages = vec![ask(ProfileField::Name), say("Jordan Reyes")];
        assert_eq!(
            ProfileFlow::reconstruct(&messages),
            ProfileFlow::reconstruct(&messages)
        );
    }

    mod clean_answer {
        use super::*;

        #[test]
        fn strips_name_prefixes() {
            assert_eq!(
                clean_answer(ProfileField::Name, "My name is Jordan Reyes.").as_deref(),
                Some("Jordan Reyes")
            );
            assert_eq!(
                clean_answer(ProfileField::Name, "I'm Jordan").as_deref(),
                Some("Jordan")
            );
        }

        #[test]
        fn normalizes_student_ids() {
            assert_eq!(
                clean_answer(ProfileField::StudentId, "it's b00-412-345").as_deref(),
                Some("ITSB00412345")
            );
            assert_eq!(
                clean_answer(ProfileField::StudentId, "B00412345").as_deref(),
                Some("B00412345")
            );
        }

        #[test]
        fn rejects_out_of_range_student_ids() {
            assert!(clean_answer(ProfileField::StudentId, "123").is_none());
            assert!(clean_answer(ProfileField::StudentId, &"9".repeat(30)).is_none());
        }

        #[test]
        fn strips_program_prefixes() {
            assert_eq!(
                clean_answer(ProfileField::Program, "I'm studying Nursing!").as_deref(),
                Some("Nursing")
            );
            assert_eq!(
                clean_answer(ProfileField::Program, "majoring in computer science").as_deref(),
                Some("computer science")
            );
        }

        #[test]
        fn rejects_empty_answers() {
            assert!(clean_answer(ProfileField::Name, "   ").is_none());
            assert!(clean_answer(ProfileField::Program, "!!").is_none());
        }
    }
}
