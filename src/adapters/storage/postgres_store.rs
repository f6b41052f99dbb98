//! PostgreSQL implementation of the conversation store.
//!
//! Message append is a plain INSERT (append-only, never read-modify-write),
//! and completion runs the status transition and outcome insert in one
//! transaction.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{
    ActionItem, ActionItemStatus, Conversation, ConversationStatus, Message, Outcome, ResultType,
    Role, TriggerKind,
};
use crate::domain::flow::FlowTag;
use crate::domain::foundation::{
    ActionItemId, ConversationId, MessageId, OutcomeId, SenderId, Timestamp, TriggerId,
};
use crate::domain::student::{Deadline, StudentProfile};
use crate::ports::{ConversationStore, StoreError};

/// PostgreSQL conversation store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_messages(&self, id: ConversationId) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, role, content, flow_tag, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch messages: {}", e)))?;

        rows.iter()
            .map(|row| {
                let msg_id: uuid::Uuid = row.get("id");
                let role_str: &str = row.get("role");
                let content: String = row.get("content");
                let flow_tag: Option<serde_json::Value> = row.get("flow_tag");
                let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

                let flow_tag = flow_tag
                    .map(serde_json::from_value::<FlowTag>)
                    .transpose()
                    .map_err(|e| {
                        StoreError::Serialization(format!("Invalid flow tag: {}", e))
                    })?;

                Ok(Message::reconstitute(
                    MessageId::from_uuid(msg_id),
                    str_to_role(role_str)?,
                    content,
                    flow_tag,
                    Timestamp::from_datetime(created_at),
                ))
            })
            .collect()
    }

    async fn load_action_items(
        &self,
        id: ConversationId,
    ) -> Result<Vec<ActionItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, action, status, due_date, created_at
            FROM action_items
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch action items: {}", e)))?;

        rows.iter()
            .map(|row| {
                let item_id: uuid::Uuid = row.get("id");
                let action: String = row.get("action");
                let status_str: &str = row.get("status");
                let due_date: Option<chrono::NaiveDate> = row.get("due_date");
                let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

                Ok(ActionItem::reconstitute(
                    ActionItemId::from_uuid(item_id),
                    action,
                    str_to_action_status(status_str)?,
                    due_date,
                    Timestamp::from_datetime(created_at),
                ))
            })
            .collect()
    }

    async fn load_conversation(
        &self,
        row: &sqlx::postgres::PgRow,
    ) -> Result<Conversation, StoreError> {
        let id_uuid: uuid::Uuid = row.get("id");
        let sender_str: String = row.get("sender");
        let status_str: &str = row.get("status");
        let trigger_str: &str = row.get("trigger_kind");
        let trigger_id: Option<uuid::Uuid> = row.get("trigger_id");
        let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
        let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

        let id = ConversationId::from_uuid(id_uuid);
        let sender = SenderId::new(sender_str)
            .map_err(|e| StoreError::Serialization(format!("Invalid sender: {}", e)))?;
        let trigger: TriggerKind = trigger_str
            .parse()
            .map_err(|_| StoreError::Serialization(format!("Invalid trigger: {}", trigger_str)))?;

        let messages = self.load_messages(id).await?;
        let action_items = self.load_action_items(id).await?;

        Ok(Conversation::reconstitute(
            id,
            sender,
            str_to_status(status_str)?,
            trigger,
            trigger_id.map(TriggerId::from_uuid),
            messages,
            action_items,
            Timestamp::from_datetime(created_at),
            Timestamp::from_datetime(updated_at),
        ))
    }
}

#[async_trait]
impl ConversationStore for PostgresStore {
    async fn create_conversation(
        &self,
        sender: &SenderId,
        trigger: TriggerKind,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(sender.clone(), trigger);

        sqlx::query(
            r#"
            INSERT INTO conversations (id, sender, status, trigger_kind, trigger_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(conversation.id().as_uuid())
        .bind(conversation.sender().as_str())
        .bind(status_to_str(conversation.status()))
        .bind(conversation.trigger().as_str())
        .bind(conversation.trigger_id().map(|t| *t.as_uuid()))
        .bind(conversation.created_at().as_datetime())
        .bind(conversation.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to insert conversation: {}", e)))?;

        Ok(conversation)
    }

    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, sender, status, trigger_kind, trigger_id, created_at, updated_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch conversation: {}", e)))?;

        match row {
            Some(row) => Ok(Some(self.load_conversation(&row).await?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_sender(
        &self,
        sender: &SenderId,
    ) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, sender, status, trigger_kind, trigger_id, created_at, updated_at
            FROM conversations
            WHERE sender = $1 AND status = 'active'
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(sender.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            StoreError::Database(format!("Failed to fetch conversation by sender: {}", e))
        })?;

        match row {
            Some(row) => Ok(Some(self.load_conversation(&row).await?)),
            None => Ok(None),
        }
    }

    async fn append_message(
        &self,
        id: ConversationId,
        message: &Message,
    ) -> Result<(), StoreError> {
        let flow_tag = message
            .flow_tag()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Serialization(format!("Invalid flow tag: {}", e)))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, flow_tag, created_at)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE EXISTS (SELECT 1 FROM conversations WHERE id = $2)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(id.as_uuid())
        .bind(role_to_str(message.role()))
        .bind(message.content())
        .bind(flow_tag)
        .bind(message.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to insert message: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        sqlx::query("UPDATE conversations SET updated_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StoreError::Database(format!("Failed to update conversation timestamp: {}", e))
            })?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn append_action_item(
        &self,
        id: ConversationId,
        item: &ActionItem,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO action_items (id, conversation_id, action, status, due_date, created_at)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE EXISTS (SELECT 1 FROM conversations WHERE id = $2)
            "#,
        )
        .bind(item.id().as_uuid())
        .bind(id.as_uuid())
        .bind(item.action())
        .bind(action_status_to_str(item.status()))
        .bind(item.due_date())
        .bind(item.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to insert action item: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn set_status(
        &self,
        id: ConversationId,
        status: ConversationStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations SET status = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status_to_str(status))
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to update status: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn complete(&self, id: ConversationId, outcome: Outcome) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to start transaction: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE conversations SET status = 'completed', updated_at = $2
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(id.as_uuid())
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to complete conversation: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyCompleted(id));
        }

        sqlx::query(
            r#"
            INSERT INTO outcomes (id, conversation_id, result_type, sender, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(outcome.id().as_uuid())
        .bind(outcome.conversation_id().as_uuid())
        .bind(outcome.result_type().as_str())
        .bind(outcome.sender().map(|s| s.as_str().to_string()))
        .bind(outcome.metadata().cloned())
        .bind(outcome.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to insert outcome: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn outcomes_for(&self, id: ConversationId) -> Result<Vec<Outcome>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, result_type, sender, metadata, created_at
            FROM outcomes
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch outcomes: {}", e)))?;

        rows.iter()
            .map(|row| {
                let outcome_id: uuid::Uuid = row.get("id");
                let conv_id: uuid::Uuid = row.get("conversation_id");
                let result_str: &str = row.get("result_type");
                let sender: Option<String> = row.get("sender");
                let metadata: Option<serde_json::Value> = row.get("metadata");
                let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

                let result_type: ResultType = result_str.parse().map_err(|_| {
                    StoreError::Serialization(format!("Invalid result type: {}", result_str))
                })?;
                let sender = sender
                    .map(SenderId::new)
                    .transpose()
                    .map_err(|e| StoreError::Serialization(format!("Invalid sender: {}", e)))?;

                Ok(Outcome::reconstitute(
                    OutcomeId::from_uuid(outcome_id),
                    ConversationId::from_uuid(conv_id),
                    result_type,
                    sender,
                    metadata,
                    Timestamp::from_datetime(created_at),
                ))
            })
            .collect()
    }

    async fn student_profile(
        &self,
        sender: &SenderId,
    ) -> Result<Option<StudentProfile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT sender, name, student_id, program, email, enrollment_status, balance, updated_at
            FROM students
            WHERE sender = $1
            "#,
        )
        .bind(sender.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch student: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");
        Ok(Some(StudentProfile {
            sender: sender.clone(),
            name: row.get("name"),
            student_id: row.get("student_id"),
            program: row.get("program"),
            email: row.get("email"),
            enrollment_status: row.get("enrollment_status"),
            balance: row.get("balance"),
            updated_at: Timestamp::from_datetime(updated_at),
        }))
    }

    async fn save_student_profile(&self, profile: &StudentProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO students (sender, name, student_id, program, email, enrollment_status, balance, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (sender) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, students.name),
                student_id = COALESCE(EXCLUDED.student_id, students.student_id),
                program = COALESCE(EXCLUDED.program, students.program),
                email = COALESCE(EXCLUDED.email, students.email),
                enrollment_status = COALESCE(EXCLUDED.enrollment_status, students.enrollment_status),
                balance = COALESCE(EXCLUDED.balance, students.balance),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.sender.as_str())
        .bind(profile.name.as_deref())
        .bind(profile.student_id.as_deref())
        .bind(profile.program.as_deref())
        .bind(profile.email.as_deref())
        .bind(profile.enrollment_status.as_deref())
        .bind(profile.balance.as_deref())
        .bind(profile.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to save student: {}", e)))?;

        Ok(())
    }

    async fn upcoming_deadlines(&self, days_ahead: i64) -> Result<Vec<Deadline>, StoreError> {
        let today = chrono::Utc::now().date_naive();
        let horizon = today + chrono::Duration::days(days_ahead);

        let rows = sqlx::query(
            r#"
            SELECT description, due_on
            FROM deadlines
            WHERE due_on >= $1 AND due_on <= $2
            ORDER BY due_on ASC
            "#,
        )
        .bind(today)
        .bind(horizon)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch deadlines: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| {
                let description: String = row.get("description");
                let due_on: chrono::NaiveDate = row.get("due_on");
                let days_until = (due_on - today).num_days();
                Deadline::new(description, due_on, days_until)
            })
            .collect())
    }
}

// === Helper Functions ===

fn status_to_str(status: ConversationStatus) -> &'static str {
    match status {
        ConversationStatus::Active => "active",
        ConversationStatus::Completed => "completed",
    }
}

fn str_to_status(s: &str) -> Result<ConversationStatus, StoreError> {
    match s {
        "active" => Ok(ConversationStatus::Active),
        "completed" => Ok(ConversationStatus::Completed),
        _ => Err(StoreError::Serialization(format!(
            "Invalid conversation status: {}",
            s
        ))),
    }
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn str_to_role(s: &str) -> Result<Role, StoreError> {
    match s {
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        _ => Err(StoreError::Serialization(format!("Invalid role: {}", s))),
    }
}

fn action_status_to_str(status: ActionItemStatus) -> &'static str {
    match status {
        ActionItemStatus::Pending => "pending",
        ActionItemStatus::InProgress => "in_progress",
        ActionItemStatus::Completed => "completed",
    }
}

fn str_to_action_status(s: &str) -> Result<ActionItemStatus, StoreError> {
    match s {
        "pending" => Ok(ActionItemStatus::Pending),
        "in_progress" => Ok(ActionItemStatus::InProgress),
        "completed" => Ok(ActionItemStatus::Completed),
        _ => Err(StoreError::Serialization(format!(
            "Invalid action item status: {}",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [ConversationStatus::Active, ConversationStatus::Completed] {
            assert_eq!(str_to_status(status_to_str(status)).unwrap(), status);
        }
        assert!(str_to_status("archived").is_err());
    }

    #[test]
    fn role_round_trips() {
        for role in [Role::User, Role::Assistant] {
            assert_eq!(str_to_role(role_to_str(role)).unwrap(), role);
        }
        assert!(str_to_role("system").is_err());
    }

    #[test]
    fn action_status_round_trips() {
        for status in [
            ActionItemStatus::Pending,
            ActionItemStatus::InProgress,
            ActionItemStatus::Completed,
        ] {
            assert_eq!(
                str_to_action_status(action_status_to_str(status)).unwrap(),
                status
            );
        }
    }
}
