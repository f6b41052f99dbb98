//! The conversation orchestrator.
//!
//! Stateless per call: every inbound message reconstructs conversational
//! state from persisted history, classifies intents, derives flow state,
//! composes the prompt, invokes the model, and interprets the result. One
//! synchronous unit of work per message; collaborator failures degrade the
//! turn instead of failing it - the student always gets a textual reply.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::domain::completion::{CompletionInterpreter, Interpretation};
use crate::domain::conversation::{
    ActionItem, Conversation, Message, Outcome, ResultType, Role, TriggerKind,
};
use crate::domain::flow::{clean_answer, FlowStates, ProfileField};
use crate::domain::foundation::SenderId;
use crate::domain::intent::IntentClassifier;
use crate::domain::prompt::{finish_tool, ComposedPrompt, PromptComposer, PromptInputs};
use crate::domain::student::StudentProfile;
use crate::ports::{
    ChatMessage, ChatRequest, ConversationStore, KnowledgeBase, LanguageModel, Snippet,
    StoreError,
};

/// Canned closing reply after an explicit finish.
const CLOSING_REPLY: &str =
    "Great! I've logged that we've resolved this. Is there anything else I can help you with?";

/// Generic apology when the model call fails or times out.
const FALLBACK_REPLY: &str =
    "I'm sorry, I encountered an error. Please try again in a moment.";

/// Reply for input the engine cannot work with at all.
const REPHRASE_REPLY: &str = "I'm here to help! Could you rephrase your question?";

/// Prior user messages folded into the knowledge-base query.
const QUERY_HISTORY_USER_MESSAGES: usize = 4;

/// Tunable knobs for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ceiling on the model call - the latency-critical path, failing closed.
    pub model_timeout: Duration,
    /// Ceiling on the knowledge-base search.
    pub search_timeout: Duration,
    /// Snippets requested per turn.
    pub top_k: usize,
    /// Token ceiling for generated replies.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Trailing conversation turns handed to the model.
    pub history_turns: usize,
    /// Horizon for the upcoming-deadlines context block.
    pub deadline_days_ahead: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(30),
            search_timeout: Duration::from_secs(10),
            top_k: 3,
            max_tokens: 500,
            temperature: 0.7,
            history_turns: 6,
            deadline_days_ahead: 30,
        }
    }
}

/// What the caller layer should do with the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAction {
    /// Send the response text to the student.
    Continue,
    /// The conversation closed; suppress further assistant text this turn.
    Finish,
}

/// The engine's answer for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub response: String,
    pub action: EngineAction,
    pub result_type: Option<ResultType>,
}

impl EngineReply {
    fn continue_with(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            action: EngineAction::Continue,
            result_type: None,
        }
    }

    fn finished(result_type: ResultType) -> Self {
        Self {
            response: CLOSING_REPLY.to_string(),
            action: EngineAction::Finish,
            result_type: Some(result_type),
        }
    }
}

/// Top-level conversation orchestrator.
pub struct ConversationEngine {
    store: Arc<dyn ConversationStore>,
    knowledge: Arc<dyn KnowledgeBase>,
    model: Arc<dyn LanguageModel>,
    composer: PromptComposer,
    classifier: IntentClassifier,
    interpreter: CompletionInterpreter,
    config: EngineConfig,
}

impl ConversationEngine {
    /// Creates an engine over the given collaborators.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        knowledge: Arc<dyn KnowledgeBase>,
        model: Arc<dyn LanguageModel>,
        composer: PromptComposer,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            knowledge,
            model,
            composer,
            classifier: IntentClassifier::new(),
            interpreter: CompletionInterpreter::new(),
            config,
        }
    }

    /// Starts a triggered conversation, seeded with the trigger's fixed
    /// opening message.
    pub async fn start_conversation(
        &self,
        sender: &SenderId,
        trigger: TriggerKind,
    ) -> Result<Conversation, StoreError> {
        let mut conversation = self.store.create_conversation(sender, trigger).await?;

        let opening = Message::assistant(trigger.opening_message())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store
            .append_message(conversation.id(), &opening)
            .await?;
        conversation
            .append_message(opening)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        info!(
            conversation_id = %conversation.id(),
            trigger = %trigger,
            "started triggered conversation"
        );
        Ok(conversation)
    }

    /// Processes one inbound message and returns the reply.
    ///
    /// Never returns an error: every internal or collaborator failure is
    /// caught here and turned into a textual reply.
    pub async fn process_message(
        &self,
        sender: &SenderId,
        text: &str,
    ) -> EngineReply {
        let text = text.trim();
        let user_message = match Message::user(text) {
            Ok(message) => message,
            Err(_) => return EngineReply::continue_with(REPHRASE_REPLY),
        };

        // Locate or create the sender's active conversation; degrade to a
        // transient one when storage is unreachable.
        let (mut conversation, persisted) = self.locate_conversation(sender).await;

        if persisted {
            if let Err(e) = self
                .store
                .append_message(conversation.id(), &user_message)
                .await
            {
                warn!(error = %e, "failed to persist user message");
            }
        }
        if let Err(e) = conversation.append_message(user_message) {
            warn!(error = %e, "could not append user message to conversation");
            return EngineReply::continue_with(REPHRASE_REPLY);
        }

        // Intent classification runs on the raw text, independently of flow
        // state; flow state is re-derived from the full message sequence.
        let intents = self.classifier.classify(text);
        let flows = FlowStates::reconstruct(conversation.messages());

        let (profile, profile_lookup_ok) = if persisted {
            match self.store.student_profile(sender).await {
                Ok(profile) => (profile, true),
                Err(e) => {
                    warn!(error = %e, "student profile lookup failed");
                    (None, false)
                }
            }
        } else {
            (None, false)
        };
        let needs_profile_setup =
            persisted && profile_lookup_ok && conversation.is_new() && profile.is_none();

        let snippets = self.search_knowledge(&conversation, text, intents.link_request).await;
        let deadlines = if persisted {
            self.store
                .upcoming_deadlines(self.config.deadline_days_ahead)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "deadline lookup failed");
                    Vec::new()
                })
        } else {
            Vec::new()
        };

        let ComposedPrompt {
            system,
            context,
            expected_tag,
        } = self.composer.compose(&PromptInputs {
            trigger: conversation.trigger(),
            intents,
            flows: &flows,
            needs_profile_setup,
            profile: profile.as_ref(),
            deadlines: &deadlines,
            snippets: &snippets,
        });

        let mut request = ChatRequest::new()
            .with_system_prompt(system)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
            .with_tool(finish_tool());
        if let Some(context) = context {
            request = request.with_message(ChatMessage::system(context));
        }
        for message in conversation.trailing_messages(self.config.history_turns) {
            request = request.with_message(match message.role() {
                Role::User => ChatMessage::user(message.content()),
                Role::Assistant => ChatMessage::assistant(message.content()),
            });
        }

        // The model call fails closed: on error or timeout the student gets
        // a generic apology, no retry, and no assistant message is persisted
        // for the failed attempt.
        let reply = match timeout(self.config.model_timeout, self.model.respond(request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(error = %e, "model call failed");
                return EngineReply::continue_with(FALLBACK_REPLY);
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.model_timeout.as_secs(),
                    "model call timed out"
                );
                return EngineReply::continue_with(FALLBACK_REPLY);
            }
        };

        match self.interpreter.interpret(reply) {
            Interpretation::Finish {
                result_type,
                metadata,
            } => {
                if persisted {
                    let outcome = Outcome::new(
                        conversation.id(),
                        result_type,
                        Some(sender.clone()),
                        metadata,
                    );
                    if let Err(e) = self.store.complete(conversation.id(), outcome).await {
                        warn!(error = %e, "failed to record conversation outcome");
                    }
                }
                info!(
                    conversation_id = %conversation.id(),
                    result_type = %result_type,
                    "conversation finished"
                );
                EngineReply::finished(result_type)
            }
            Interpretation::Continuation { text, action_items } => {
                // Side effects are attempted independently; none of them may
                // suppress the visible reply.
                if persisted {
                    self.persist_action_items(&conversation, &action_items).await;
                    if needs_profile_setup || flows.profile.is_active() {
                        self.save_collected_profile(sender, &flows, profile).await;
                    }
                }

                let assistant_message = match expected_tag {
                    Some(tag) => Message::assistant_asking(&text, tag),
                    None => Message::assistant(&text),
                };
                match assistant_message {
                    Ok(message) => {
                        if persisted {
                            if let Err(e) = self
                                .store
                                .append_message(conversation.id(), &message)
                                .await
                            {
                                warn!(error = %e, "failed to persist assistant message");
                            }
                        }
                        if let Err(e) = conversation.append_message(message) {
                            warn!(error = %e, "could not append assistant message");
                        }
                    }
                    Err(e) => warn!(error = %e, "assistant reply failed validation"),
                }

                EngineReply::continue_with(text)
            }
        }
    }

    async fn locate_conversation(
        &self,
        sender: &SenderId,
    ) -> (Conversation, bool) {
        match self.store.find_active_by_sender(sender).await {
            Ok(Some(conversation)) => (conversation, true),
            Ok(None) => match self
                .store
                .create_conversation(sender, TriggerKind::Default)
                .await
            {
                Ok(conversation) => (conversation, true),
                Err(e) => {
                    warn!(error = %e, "conversation create failed, answering transiently");
                    (Conversation::new(sender.clone(), TriggerKind::Default), false)
                }
            },
            Err(e) => {
                warn!(error = %e, "storage lookup failed, answering transiently");
                (Conversation::new(sender.clone(), TriggerKind::Default), false)
            }
        }
    }

    async fn search_knowledge(
        &self,
        conversation: &Conversation,
        text: &str,
        link_priority: bool,
    ) -> Vec<Snippet> {
        // Query from the current message plus recent user turns for context.
        let query = conversation
            .recent_user_messages(QUERY_HISTORY_USER_MESSAGES)
            .iter()
            .map(|m| m.content())
            .collect::<Vec<_>>()
            .join(" ");
        let query = if query.is_empty() { text } else { &query };

        match timeout(
            self.config.search_timeout,
            self.knowledge.search(query, self.config.top_k, link_priority),
        )
        .await
        {
            Ok(Ok(snippets)) => snippets,
            Ok(Err(e)) => {
                warn!(error = %e, "knowledge search failed");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.search_timeout.as_secs(),
                    "knowledge search timed out"
                );
                Vec::new()
            }
        }
    }

    async fn persist_action_items(&self, conversation: &Conversation, action_items: &[String]) {
        for text in action_items {
            match ActionItem::pending(text) {
                Ok(item) => {
                    if let Err(e) = self
                        .store
                        .append_action_item(conversation.id(), &item)
                        .await
                    {
                        warn!(error = %e, "failed to persist action item");
                    }
                }
                Err(e) => warn!(error = %e, "skipping invalid action item"),
            }
        }
    }

    async fn save_collected_profile(
        &self,
        sender: &SenderId,
        flows: &FlowStates,
        existing: Option<StudentProfile>,
    ) {
        let fields = flows.profile.fields();
        let name = fields
            .get(ProfileField::Name)
            .and_then(|raw| clean_answer(ProfileField::Name, raw));
        let student_id = fields
            .get(ProfileField::StudentId)
            .and_then(|raw| clean_answer(ProfileField::StudentId, raw));
        let program = fields
            .get(ProfileField::Program)
            .and_then(|raw| clean_answer(ProfileField::Program, raw));

        if name.is_none() && student_id.is_none() && program.is_none() {
            return;
        }

        let mut profile =
            existing.unwrap_or_else(|| StudentProfile::empty(sender.clone()));
        profile.merge(name, student_id, program);

        if let Err(e) = self.store.save_student_profile(&profile).await {
            warn!(error = %e, "failed to save student profile");
        }
    }
}
