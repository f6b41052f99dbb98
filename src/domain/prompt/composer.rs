//! System-prompt composition.
//!
//! The composer merges the trigger, the classified intents, and the derived
//! flow states into one instruction block. Composition is ordered and
//! additive: each matched condition appends a dedicated fragment to the
//! shared base instruction; fragments never replace each other.

use crate::domain::conversation::TriggerKind;
use crate::domain::flow::{FlowStates, FlowTag, ProfileField};
use crate::domain::intent::IntentFlags;
use crate::domain::student::{Deadline, StudentProfile};
use crate::ports::Snippet;

use super::context::assemble_context;

/// Deadlines surfaced into the prompt, most urgent first.
const MAX_DEADLINES: usize = 5;

/// Deadline descriptions are clipped to keep the context block small.
const MAX_DEADLINE_DESC: usize = 100;

/// Everything the composer needs for one turn.
#[derive(Debug)]
pub struct PromptInputs<'a> {
    pub trigger: TriggerKind,
    pub intents: IntentFlags,
    pub flows: &'a FlowStates,
    /// First contact from a student with no stored profile.
    pub needs_profile_setup: bool,
    pub profile: Option<&'a StudentProfile>,
    pub deadlines: &'a [Deadline],
    pub snippets: &'a [Snippet],
}

/// The composed instruction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// System instruction block.
    pub system: String,
    /// Context block (retrieved knowledge, profile, deadlines), if any.
    pub context: Option<String>,
    /// The flow question this turn directs the model to ask, if any.
    ///
    /// The orchestrator stamps this tag on the assistant message it appends,
    /// which is what flow reconstruction reads back on the next turn.
    pub expected_tag: Option<FlowTag>,
}

/// Builds the per-turn instruction payload for the language model.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    school: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new("the college")
    }
}

impl PromptComposer {
    /// Creates a composer for a named institution.
    pub fn new(school: impl Into<String>) -> Self {
        Self {
            school: school.into(),
        }
    }

    /// Composes the system instruction and context blocks for one turn.
    pub fn compose(&self, inputs: &PromptInputs<'_>) -> ComposedPrompt {
        let mut system = self.base_prompt();
        let mut expected_tag = None;

        self.append_profile_fragment(&mut system, &mut expected_tag, inputs);

        if inputs.intents.link_request {
            system.push_str(LINK_FRAGMENT);
        }
        if inputs.intents.policy_question {
            system.push_str(POLICY_FRAGMENT);
        }
        if inputs.intents.financial_aid {
            system.push_str(&self.financial_aid_fragment());
        }

        self.append_hold_fragment(&mut system, &mut expected_tag, inputs);
        self.append_registration_fragment(&mut system, &mut expected_tag, inputs);
        self.append_wizard_fragment(&mut system, &mut expected_tag, inputs);

        system.push_str(&self.trigger_fragment(inputs.trigger));

        ComposedPrompt {
            system,
            context: self.build_context(inputs),
            expected_tag,
        }
    }

    fn base_prompt(&self) -> String {
        format!(
            "You're a proactive SMS assistant for {school}. Help students with: \
tuition/payments, registration, financial aid, deadlines, account holds, general info.

BE PROACTIVE: Offer next steps, break down tasks (1, 2, 3...), reference previous \
context, anticipate needs, use encouraging language.

STYLE: Friendly, SMS-length (160-300 chars), numbered steps, include full URLs.

REMINDERS: Acknowledge deadline immediately, explain importance, offer specific help, \
give next steps.

Call finish() when: action completed (paid/registered), issue resolved, student done, \
or conversation ends.

Result types: paid, registered, resolved, reminder_sent, escalated, no_response, abandoned.

Use provided context. Always be proactive and helpful.",
            school = self.school
        )
    }

    fn append_profile_fragment(
        &self,
        system: &mut String,
        expected_tag: &mut Option<FlowTag>,
        inputs: &PromptInputs<'_>,
    ) {
        if !inputs.needs_profile_setup && !inputs.flows.profile.is_active() {
            return;
        }

        system.push_str(PROFILE_FRAGMENT);

        let fields = inputs.flows.profile.fields();
        if !fields.is_empty() {
            let collected: Vec<String> = fields
                .collected()
                .into_iter()
                .map(|(key, value)| format!("- {}: {}", key, value))
                .collect();
            system.push_str(&format!(
                "\n\nCOLLECTED SO FAR:\n{}\n\nContinue collecting missing information.",
                collected.join("\n")
            ));
        }

        if let Some(field) = fields.next_missing() {
            // Profile questions yield to the diagnostic flows below.
            *expected_tag = Some(FlowTag::ProfileQuestion(field));
        }
    }

    fn append_hold_fragment(
        &self,
        system: &mut String,
        expected_tag: &mut Option<FlowTag>,
        inputs: &PromptInputs<'_>,
    ) {
        let flow = &inputs.flows.hold;
        if !inputs.intents.hold && !flow.is_active() {
            return;
        }

        match flow.hold_message() {
            None => {
                system.push_str(HOLD_ASK_FRAGMENT);
                *expected_tag = Some(FlowTag::HoldMessageQuestion);
            }
            Some(hold_message) => {
                system.push_str(HOLD_GUIDE_FRAGMENT);
                system.push_str(&format!(
                    "\n\nHOLD MESSAGE FROM STUDENT: {}",
                    hold_message
                ));
            }
        }
    }

    fn append_registration_fragment(
        &self,
        system: &mut String,
        expected_tag: &mut Option<FlowTag>,
        inputs: &PromptInputs<'_>,
    ) {
        let flow = &inputs.flows.registration;
        if !inputs.intents.registration_trouble && !flow.is_active() {
            return;
        }

        match flow.error_message() {
            None => {
                system.push_str(REGISTRATION_ASK_FRAGMENT);
                *expected_tag = Some(FlowTag::RegistrationErrorQuestion);
            }
            Some(error_message) => {
                system.push_str(REGISTRATION_GUIDE_FRAGMENT);
                system.push_str(&format!(
                    "\n\nERROR MESSAGE FROM STUDENT: {}",
                    error_message
                ));
            }
        }
    }

    fn append_wizard_fragment(
        &self,
        system: &mut String,
        expected_tag: &mut Option<FlowTag>,
        inputs: &PromptInputs<'_>,
    ) {
        let wizard = &inputs.flows.wizard;
        if !inputs.intents.next_steps && !wizard.is_active() {
            return;
        }

        let answers: Vec<String> = wizard
            .answered()
            .into_iter()
            .map(|(key, value)| format!("- {}: {}", key, value))
            .collect();
        let summary = if answers.is_empty() {
            "No answers yet".to_string()
        } else {
            answers.join("\n")
        };

        match wizard.next_question() {
            Some(question) if !wizard.is_complete() => {
                system.push_str(&format!(
                    "\n\nNEXT STEPS WIZARD: You're helping the student figure out what they \
need to do next. Ask diagnostic questions one at a time.

CURRENT PROGRESS:
{summary}

NEXT QUESTION TO ASK: \"{question}\"

After they answer, ask the next question. Don't provide the checklist until all \
questions are answered.",
                    summary = summary,
                    question = question.question
                ));
                *expected_tag = Some(FlowTag::WizardQuestion(question.key));
            }
            _ => {
                system.push_str(&format!(
                    "\n\nNEXT STEPS WIZARD: All diagnostic questions answered. Generate a \
personalized checklist.

STUDENT ANSWERS:
{summary}

Based on their answers, create a numbered checklist of what they need to do next. \
For each item, include: what to do, when to do it (if there's a deadline), where to \
go/link (if applicable), and who to contact (if needed). Use the knowledge base \
context to provide accurate information and links.",
                    summary = summary
                ));
            }
        }
    }

    fn financial_aid_fragment(&self) -> String {
        format!(
            "

FINANCIAL AID EXPLANATIONS: The student is asking about financial aid. Explain in plain English:
- Use simple language (no financial jargon)
- Explain what it means, why it might be delayed, what they need to do, and who to contact
- Cover: FAFSA, verification, disbursement, refunds, SAP, Pell eligibility, dependent/independent status

Common explanations:
- FAFSA: Free application for federal student aid. Fill it out every year to get grants/loans.
- Verification: School needs to check your FAFSA info. Submit documents they request.
- Disbursement: When aid money gets sent to your school account (usually after classes start).
- SAP: You must pass classes and keep good grades to keep getting aid.
- Pell Grant: Free money from government (don't pay back) based on financial need.
- Dependent vs Independent: If you're under 24, you're usually dependent (use parents' income).

If they ask \"why didn't my aid hit?\":
1. Explain common delays (verification pending, classes not started, SAP issues)
2. Tell them what to check
3. Give them the financial aid office contact info

Always include: 'Contact the {school} Financial Aid office at [phone/email from context] if you need more help.'",
            school = self.school
        )
    }

    fn trigger_fragment(&self, trigger: TriggerKind) -> String {
        format!(
            "\nCURRENT CONVERSATION CONTEXT:\nThis conversation was initiated by a '{}' trigger. {}",
            trigger.as_str(),
            trigger.context_sentence()
        )
    }

    fn build_context(&self, inputs: &PromptInputs<'_>) -> Option<String> {
        let knowledge = assemble_context(inputs.snippets, inputs.intents.link_request);

        let mut blocks = Vec::new();
        if let Some(knowledge) = knowledge {
            blocks.push(format!(
                "Relevant information from the {} website:\n\n{}",
                self.school, knowledge
            ));
        }

        if let Some(profile) = inputs.profile {
            let mut lines = Vec::new();
            if let Some(name) = profile.name.as_deref() {
                lines.push(format!("Name: {}", name));
            }
            if let Some(program) = profile.program.as_deref() {
                lines.push(format!("Program: {}", program));
            }
            if let Some(status) = profile.enrollment_status.as_deref() {
                lines.push(format!("Enrollment Status: {}", status));
            }
            if let Some(balance) = profile.balance.as_deref() {
                lines.push(format!("Outstanding Balance: ${}", balance));
            }
            if !lines.is_empty() {
                blocks.push(format!("STUDENT PROFILE:\n{}", lines.join("\n")));
            }
        }

        if !inputs.deadlines.is_empty() {
            let lines: Vec<String> = inputs
                .deadlines
                .iter()
                .take(MAX_DEADLINES)
                .map(|d| {
                    let desc: String = d.description.chars().take(MAX_DEADLINE_DESC).collect();
                    format!("- {} days: {}", d.days_until, desc)
                })
                .collect();
            blocks.push(format!(
                "UPCOMING IMPORTANT DEADLINES:\n{}",
                lines.join("\n")
            ));
        }

        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n\n"))
        }
    }
}

const PROFILE_FRAGMENT: &str = "

PROFILE SETUP: This is a new student. Collect their basic information naturally:
1. Ask for their name first: \"Hi! To help you better, what's your name?\"
2. After they answer, ask for student ID: \"Thanks [name]! What's your student ID?\"
3. Then ask about program: \"What program are you studying?\"

Ask ONE question at a time. Wait for their answer before asking the next. Be friendly and casual.
Once you have their name, use it in your responses.";

const LINK_FRAGMENT: &str = "

LINK REQUESTS: The student is asking for a link/page. Respond quickly with:
- The exact URL they need (full URL, not shortened)
- A brief 1-sentence explanation of what the page is for
- Format: \"Here's the [page name] -> [full URL]. [Brief explanation]\"
If multiple relevant links exist, list the most important one first.";

const POLICY_FRAGMENT: &str = "

POLICY EXPLANATIONS: The student is asking about a policy. Explain it like they're 17 years old:
- Use simple, plain English (no jargon)
- Maximum 3 sentences
- Focus on what it means for them personally
- Be clear about deadlines, consequences, and what they need to do
- Cover: withdrawal policy, payment policy, refund schedule, SAP (Satisfactory Academic Progress), attendance requirements

Format: \"[Policy name] means [simple explanation]. [What they need to know]. [What to do/avoid].\"";

const HOLD_ASK_FRAGMENT: &str = "

HOLD DIAGNOSIS: The student is asking about a hold. Start by asking:
\"What hold message do you see exactly? You can type the first line or describe it.\"

Wait for their response before providing fix steps.";

const HOLD_GUIDE_FRAGMENT: &str = "

HOLD DIAGNOSIS + FIX GUIDE: The student has a hold. Provide step-by-step fix instructions:
1. What the hold means (in simple terms)
2. Who to contact (specific office/phone/email from context)
3. Documents needed (if any)
4. How long removal takes (if known)
5. Step-by-step instructions to resolve

Use the hold message and knowledge base context to identify the hold type and provide specific instructions.";

const REGISTRATION_ASK_FRAGMENT: &str = "

REGISTRATION TROUBLESHOOTING: The student can't register. Start by asking:
\"What message do you see on your screen when you try to register? Type the exact error or describe it.\"

Wait for their response before providing fix steps.";

const REGISTRATION_GUIDE_FRAGMENT: &str = "

REGISTRATION TROUBLESHOOTING: The student can't register. Common causes and fixes:
1. HOLD: Account hold blocking registration -> Fix the hold first
2. UNPAID BALANCE: Outstanding balance -> Pay balance or set up payment plan
3. PREREQUISITE: Missing prerequisite course -> Complete prerequisite or get override
4. ADVISING REQUIREMENT: Must meet with advisor -> Schedule advising appointment
5. TIME CONFLICT: Classes overlap -> Change class times
6. CLASS FULL: No seats available -> Waitlist or choose different class

Provide exact fix steps based on the error message: what the error means, why it's \
happening, a step-by-step fix (1, 2, 3...), a link to the relevant page, and who to \
contact if needed.

Use the error message and knowledge base context to identify the cause and provide specific fix instructions.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Message;
    use crate::domain::flow::WizardKey;
    use crate::domain::foundation::SenderId;
    use crate::domain::intent::IntentClassifier;

    fn composer() -> PromptComposer {
        PromptComposer::new("Lakeview Community College")
    }

    fn empty_inputs<'a>(flows: &'a FlowStates) -> PromptInputs<'a> {
        PromptInputs {
            trigger: TriggerKind::Default,
            intents: IntentFlags::default(),
            flows,
            needs_profile_setup: false,
            profile: None,
            deadlines: &[],
            snippets: &[],
        }
    }

    fn classify(text: &str) -> IntentFlags {
        IntentClassifier::new().classify(text)
    }

    #[test]
    fn base_prompt_alone_without_matches() {
        let flows = FlowStates::default();
        let prompt = composer().compose(&empty_inputs(&flows));

        assert!(prompt.system.contains("proactive SMS assistant"));
        assert!(prompt.system.contains("Lakeview Community College"));
        assert!(!prompt.system.contains("PROFILE SETUP"));
        assert!(!prompt.system.contains("LINK REQUESTS"));
        assert!(!prompt.system.contains("HOLD DIAGNOSIS"));
        assert!(prompt.expected_tag.is_none());
        assert!(prompt.context.is_none());
    }

    #[test]
    fn fragments_are_additive() {
        let flows = FlowStates::default();
        let mut inputs = empty_inputs(&flows);
        inputs.intents = classify("explain the withdrawal policy and send me the link");

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("LINK REQUESTS"));
        assert!(prompt.system.contains("POLICY EXPLANATIONS"));
        // Both fragments coexist with the base.
        assert!(prompt.system.contains("proactive SMS assistant"));
    }

    #[test]
    fn profile_setup_targets_name_first() {
        let flows = FlowStates::default();
        let mut inputs = empty_inputs(&flows);
        inputs.needs_profile_setup = true;

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("PROFILE SETUP"));
        assert!(!prompt.system.contains("COLLECTED SO FAR"));
        assert_eq!(
            prompt.expected_tag,
            Some(FlowTag::ProfileQuestion(ProfileField::Name))
        );
    }

    #[test]
    fn profile_snapshot_lists_collected_fields() {
        let messages = vec![
            Message::assistant_asking(
                "What's your name?",
                FlowTag::ProfileQuestion(ProfileField::Name),
            )
            .unwrap(),
            Message::user("Jordan Reyes").unwrap(),
        ];
        let flows = FlowStates::reconstruct(&messages);
        let inputs = empty_inputs(&flows);

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("COLLECTED SO FAR"));
        assert!(prompt.system.contains("- name: Jordan Reyes"));
        assert_eq!(
            prompt.expected_tag,
            Some(FlowTag::ProfileQuestion(ProfileField::StudentId))
        );
    }

    #[test]
    fn hold_intent_without_capture_asks_for_hold_message() {
        let flows = FlowStates::default();
        let mut inputs = empty_inputs(&flows);
        inputs.intents = classify("I think there's a hold on my account");

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("HOLD DIAGNOSIS: The student is asking about a hold"));
        assert!(prompt.system.contains("Wait for their response"));
        assert!(!prompt.system.contains("FIX GUIDE"));
        assert_eq!(prompt.expected_tag, Some(FlowTag::HoldMessageQuestion));
    }

    #[test]
    fn captured_hold_message_switches_to_fix_guide() {
        let messages = vec![
            Message::assistant_asking(
                "What hold message do you see exactly?",
                FlowTag::HoldMessageQuestion,
            )
            .unwrap(),
            Message::user("Tuition Payment Hold").unwrap(),
        ];
        let flows = FlowStates::reconstruct(&messages);
        let inputs = empty_inputs(&flows);

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("HOLD DIAGNOSIS + FIX GUIDE"));
        assert!(prompt
            .system
            .contains("HOLD MESSAGE FROM STUDENT: Tuition Payment Hold"));
        assert!(prompt.expected_tag.is_none());
    }

    #[test]
    fn registration_guide_lists_six_causes() {
        let messages = vec![
            Message::assistant_asking(
                "What message do you see when you try to register?",
                FlowTag::RegistrationErrorQuestion,
            )
            .unwrap(),
            Message::user("Prerequisite not met").unwrap(),
        ];
        let flows = FlowStates::reconstruct(&messages);
        let inputs = empty_inputs(&flows);

        let prompt = composer().compose(&inputs);
        for cause in [
            "HOLD:",
            "UNPAID BALANCE:",
            "PREREQUISITE:",
            "ADVISING REQUIREMENT:",
            "TIME CONFLICT:",
            "CLASS FULL:",
        ] {
            assert!(prompt.system.contains(cause), "missing {}", cause);
        }
        assert!(prompt
            .system
            .contains("ERROR MESSAGE FROM STUDENT: Prerequisite not met"));
    }

    #[test]
    fn wizard_asks_exactly_the_next_question() {
        let messages = vec![
            Message::assistant_asking(
                "Have you registered for classes yet? (yes/no)",
                FlowTag::WizardQuestion(WizardKey::Registered),
            )
            .unwrap(),
            Message::user("yes").unwrap(),
        ];
        let flows = FlowStates::reconstruct(&messages);
        let inputs = empty_inputs(&flows);

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("NEXT QUESTION TO ASK"));
        assert!(prompt
            .system
            .contains("Do you have any outstanding balance or payment due?"));
        assert!(prompt.system.contains("- registered: yes"));
        assert_eq!(
            prompt.expected_tag,
            Some(FlowTag::WizardQuestion(WizardKey::Payment))
        );
    }

    #[test]
    fn completed_wizard_switches_to_checklist_mode() {
        let mut messages = Vec::new();
        for (key, answer) in [
            (WizardKey::Registered, "yes"),
            (WizardKey::Payment, "about $600"),
            (WizardKey::Documents, "no"),
            (WizardKey::Holds, "not sure"),
        ] {
            messages.push(
                Message::assistant_asking(format!("{:?}?", key), FlowTag::WizardQuestion(key))
                    .unwrap(),
            );
            messages.push(Message::user(answer).unwrap());
        }
        let flows = FlowStates::reconstruct(&messages);
        let inputs = empty_inputs(&flows);

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("All diagnostic questions answered"));
        assert!(prompt.system.contains("- holds: not sure"));
        assert!(!prompt.system.contains("NEXT QUESTION TO ASK"));
        assert!(prompt.expected_tag.is_none());
    }

    #[test]
    fn diagnostic_question_outranks_profile_question() {
        let flows = FlowStates::default();
        let mut inputs = empty_inputs(&flows);
        inputs.needs_profile_setup = true;
        inputs.intents = classify("why is my account blocked");

        let prompt = composer().compose(&inputs);
        assert!(prompt.system.contains("PROFILE SETUP"));
        assert!(prompt.system.contains("HOLD DIAGNOSIS"));
        assert_eq!(prompt.expected_tag, Some(FlowTag::HoldMessageQuestion));
    }

    #[test]
    fn trigger_fragment_closes_the_prompt() {
        let flows = FlowStates::default();
        let mut inputs = empty_inputs(&flows);
        inputs.trigger = TriggerKind::PaymentDeadline3Days;

        let prompt = composer().compose(&inputs);
        assert!(prompt
            .system
            .contains("initiated by a 'payment_deadline_3days' trigger"));
        assert!(prompt.system.ends_with(TriggerKind::PaymentDeadline3Days.context_sentence()));
    }

    #[test]
    fn context_includes_knowledge_profile_and_deadlines() {
        let snippets = vec![Snippet::text_only(0.9, "Pay online with the student portal.")
            .with_url("https://college.example.edu/pay")];
        let mut profile =
            StudentProfile::empty(SenderId::new("+18475551234").unwrap());
        profile.name = Some("Jordan".into());
        profile.balance = Some("600".into());
        let deadlines = vec![Deadline::new(
            "Fall tuition payment due",
            chrono::NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            15,
        )];

        let flows = FlowStates::default();
        let mut inputs = empty_inputs(&flows);
        inputs.profile = Some(&profile);
        inputs.deadlines = &deadlines;
        inputs.snippets = &snippets;

        let context = composer().compose(&inputs).context.unwrap();
        assert!(context.contains("Relevant information from the Lakeview Community College website"));
        assert!(context.contains("Pay online with the student portal."));
        assert!(context.contains("STUDENT PROFILE:\nName: Jordan"));
        assert!(context.contains("Outstanding Balance: $600"));
        assert!(context.contains("UPCOMING IMPORTANT DEADLINES:"));
        assert!(context.contains("- 15 days: Fall tuition payment due"));
    }

    #[test]
    fn profile_and_deadlines_appear_without_knowledge() {
        let deadlines = vec![Deadline::new(
            "Drop deadline",
            chrono::NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
            28,
        )];
        let flows = FlowStates::default();
        let mut inputs = empty_inputs(&flows);
        inputs.deadlines = &deadlines;

        let context = composer().compose(&inputs).context.unwrap();
        assert!(context.contains("Drop deadline"));
        assert!(!context.contains("Relevant information"));
    }
}
