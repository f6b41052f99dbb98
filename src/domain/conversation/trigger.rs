//! Outreach triggers - why a conversation was started.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The external event category that caused a conversation to start.
///
/// Each trigger carries a fixed opening message, sent as the seeded first
/// assistant turn, and biases the prompt composer toward action relevant to
/// why the conversation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    OverdueBalance,
    NotRegistered,
    UpcomingDeadline,
    HoldOnAccount,
    #[serde(rename = "payment_deadline_7days")]
    PaymentDeadline7Days,
    #[serde(rename = "payment_deadline_3days")]
    PaymentDeadline3Days,
    #[serde(rename = "payment_deadline_1day")]
    PaymentDeadline1Day,
    RegistrationOpens,
    ClassStartsSoon,
    DropDeadlineWarning,
    FinancialAidDeadline,
    AdvisingReminder,
    GraduationChecklist,
    #[default]
    Default,
}

impl TriggerKind {
    /// Fixed opening message for a conversation started by this trigger.
    pub fn opening_message(&self) -> &'static str {
        match self {
            TriggerKind::OverdueBalance => {
                "Hi! I noticed you have an outstanding balance on your account. I'm here to help you understand your options and get it paid. What questions do you have?"
            }
            TriggerKind::NotRegistered => {
                "Hey! Registration opens soon. Want help planning your classes and getting registered?"
            }
            TriggerKind::UpcomingDeadline => {
                "Hi! I wanted to let you know about an important deadline coming up. Would you like me to help you prepare?"
            }
            TriggerKind::HoldOnAccount => {
                "Hi! There's a hold on your account that might prevent registration. I can help you understand what it is and how to resolve it. What would you like to know?"
            }
            TriggerKind::PaymentDeadline7Days => {
                "Hi! Your payment deadline is in 7 days. Want help understanding your payment options or setting up a payment plan?"
            }
            TriggerKind::PaymentDeadline3Days => {
                "Hi! Your payment deadline is in 3 days. I can help you pay now or set up a payment plan. What would you like to do?"
            }
            TriggerKind::PaymentDeadline1Day => {
                "Your payment deadline is tomorrow! Let me help you get this sorted quickly. What questions do you have?"
            }
            TriggerKind::RegistrationOpens => {
                "Good news! Registration opens soon. I can help you find classes, check prerequisites, and get registered. Ready to start?"
            }
            TriggerKind::ClassStartsSoon => {
                "Heads up! Classes start soon. Make sure you're registered, have your textbooks, and know where your classes are. Need help with any of that?"
            }
            TriggerKind::DropDeadlineWarning => {
                "Reminder: The deadline to drop classes with a refund is coming up. If you need to adjust your schedule, let me know and I can help!"
            }
            TriggerKind::FinancialAidDeadline => {
                "Important: Financial aid deadline is approaching. Need help with FAFSA, scholarships, or other aid options? I'm here to help!"
            }
            TriggerKind::AdvisingReminder => {
                "Time for advising! Schedule a meeting with your advisor to plan next semester. Want help finding your advisor or preparing questions?"
            }
            TriggerKind::GraduationChecklist => {
                "Congrats on getting close to graduation! Let me help you check off remaining requirements and deadlines. What do you need help with?"
            }
            TriggerKind::Default => {
                "Hi! I'm here to help with any questions about the college. How can I assist you today?"
            }
        }
    }

    /// Short framing sentence appended to the system prompt, steering the
    /// assistant toward action relevant to why the conversation started.
    pub fn context_sentence(&self) -> &'static str {
        match self {
            TriggerKind::PaymentDeadline7Days
            | TriggerKind::PaymentDeadline3Days
            | TriggerKind::PaymentDeadline1Day
            | TriggerKind::OverdueBalance => {
                "You're reminding the student about a payment deadline. Be proactive: offer payment options, explain the payment plan, and help them take action now."
            }
            TriggerKind::RegistrationOpens | TriggerKind::NotRegistered => {
                "Registration is opening. Help them get ready: check prerequisites, find classes, and register early."
            }
            TriggerKind::ClassStartsSoon => {
                "Classes start soon. Make sure they're ready: registered, have textbooks, know locations."
            }
            TriggerKind::UpcomingDeadline
            | TriggerKind::DropDeadlineWarning
            | TriggerKind::FinancialAidDeadline => {
                "There's an important deadline coming up. Explain what it means, why it matters, and help them prepare."
            }
            TriggerKind::AdvisingReminder | TriggerKind::GraduationChecklist => {
                "This is academic planning related. Help them organize, prepare questions, and take next steps."
            }
            TriggerKind::HoldOnAccount => {
                "There's a hold on the student's account. Help them identify it and walk them through resolving it."
            }
            TriggerKind::Default => {
                "The student reached out directly. Answer their question and offer a concrete next step."
            }
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::OverdueBalance => "overdue_balance",
            TriggerKind::NotRegistered => "not_registered",
            TriggerKind::UpcomingDeadline => "upcoming_deadline",
            TriggerKind::HoldOnAccount => "hold_on_account",
            TriggerKind::PaymentDeadline7Days => "payment_deadline_7days",
            TriggerKind::PaymentDeadline3Days => "payment_deadline_3days",
            TriggerKind::PaymentDeadline1Day => "payment_deadline_1day",
            TriggerKind::RegistrationOpens => "registration_opens",
            TriggerKind::ClassStartsSoon => "class_starts_soon",
            TriggerKind::DropDeadlineWarning => "drop_deadline_warning",
            TriggerKind::FinancialAidDeadline => "financial_aid_deadline",
            TriggerKind::AdvisingReminder => "advising_reminder",
            TriggerKind::GraduationChecklist => "graduation_checklist",
            TriggerKind::Default => "default",
        }
    }

    /// All trigger kinds, in declaration order.
    pub const ALL: [TriggerKind; 14] = [
        TriggerKind::OverdueBalance,
        TriggerKind::NotRegistered,
        TriggerKind::UpcomingDeadline,
        TriggerKind::HoldOnAccount,
        TriggerKind::PaymentDeadline7Days,
        TriggerKind::PaymentDeadline3Days,
        TriggerKind::PaymentDeadline1Day,
        TriggerKind::RegistrationOpens,
        TriggerKind::ClassStartsSoon,
        TriggerKind::DropDeadlineWarning,
        TriggerKind::FinancialAidDeadline,
        TriggerKind::AdvisingReminder,
        TriggerKind::GraduationChecklist,
        TriggerKind::Default,
    ];
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned for an unrecognized trigger category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trigger kind: {0}")]
pub struct UnknownTriggerKind(pub String);

impl FromStr for TriggerKind {
    type Err = UnknownTriggerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownTriggerKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_round_trip_through_str() {
        for kind in TriggerKind::ALL {
            assert_eq!(kind.as_str().parse::<TriggerKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("tuition_due".parse::<TriggerKind>().is_err());
    }

    #[test]
    fn every_kind_has_an_opening_message() {
        for kind in TriggerKind::ALL {
            assert!(!kind.opening_message().is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn payment_deadline_3days_opening_is_fixed() {
        assert_eq!(
            TriggerKind::PaymentDeadline3Days.opening_message(),
            "Hi! Your payment deadline is in 3 days. I can help you pay now or set up a payment plan. What would you like to do?"
        );
    }

    #[test]
    fn payment_triggers_share_payment_framing() {
        for kind in [
            TriggerKind::PaymentDeadline7Days,
            TriggerKind::PaymentDeadline3Days,
            TriggerKind::PaymentDeadline1Day,
        ] {
            assert!(kind.context_sentence().contains("payment"));
        }
    }

    #[test]
    fn serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&TriggerKind::PaymentDeadline3Days).unwrap(),
            "\"payment_deadline_3days\""
        );
    }
}
