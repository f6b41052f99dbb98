//! Student profile and deadline records used to enrich prompts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SenderId, Timestamp};

/// Basic profile collected through the profile setup flow.
///
/// All fields besides the sender are optional; the profile flow fills them in
/// one question at a time and merges answers into whatever already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub sender: SenderId,
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub program: Option<String>,
    pub email: Option<String>,
    pub enrollment_status: Option<String>,
    pub balance: Option<String>,
    pub updated_at: Timestamp,
}

impl StudentProfile {
    /// Creates an empty profile for a sender.
    pub fn empty(sender: SenderId) -> Self {
        Self {
            sender,
            name: None,
            student_id: None,
            program: None,
            email: None,
            enrollment_status: None,
            balance: None,
            updated_at: Timestamp::now(),
        }
    }

    /// Merges newly collected fields into this profile.
    ///
    /// Present values win; existing values are kept where the update has
    /// nothing new.
    pub fn merge(
        &mut self,
        name: Option<String>,
        student_id: Option<String>,
        program: Option<String>,
    ) {
        if name.is_some() {
            self.name = name;
        }
        if student_id.is_some() {
            self.student_id = student_id;
        }
        if program.is_some() {
            self.program = program;
        }
        self.updated_at = Timestamp::now();
    }

    /// Returns true if no profile field has been collected yet.
    pub fn is_blank(&self) -> bool {
        self.name.is_none()
            && self.student_id.is_none()
            && self.program.is_none()
            && self.email.is_none()
    }
}

/// An upcoming institutional deadline surfaced into the prompt context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub description: String,
    pub due_on: NaiveDate,
    pub days_until: i64,
}

impl Deadline {
    pub fn new(description: impl Into<String>, due_on: NaiveDate, days_until: i64) -> Self {
        Self {
            description: description.into(),
            due_on,
            days_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SenderId {
        SenderId::new("+18475551234").unwrap()
    }

    #[test]
    fn empty_profile_is_blank() {
        assert!(StudentProfile::empty(sender()).is_blank());
    }

    #[test]
    fn merge_keeps_existing_values() {
        let mut profile = StudentProfile::empty(sender());
        profile.merge(Some("Jordan Reyes".into()), None, None);
        profile.merge(None, Some("B00412345".into()), None);

        assert_eq!(profile.name.as_deref(), Some("Jordan Reyes"));
        assert_eq!(profile.student_id.as_deref(), Some("B00412345"));
        assert!(profile.program.is_none());
        assert!(!profile.is_blank());
    }

    #[test]
    fn merge_overwrites_with_new_values() {
        let mut profile = StudentProfile::empty(sender());
        profile.merge(Some("Jordan".into()), None, None);
        profile.merge(Some("Jordan Reyes".into()), None, None);

        assert_eq!(profile.name.as_deref(), Some("Jordan Reyes"));
    }
}
