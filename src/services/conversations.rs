//! Conversation summary updater.
//!
//! On every new message, both sides of the conversation get their
//! per-(owner, counterpart) summary upserted: the sender's unread counter
//! resets to zero, the recipient's increments by one, and both carry the
//! latest message text and timestamp.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::FunctionError;
use crate::state::AppState;
use crate::store::StoreQuery;
use crate::types::ConversationSummary;

/// A new-message event delivered by the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub sender_id: String,
    /// `"{userA}_{userB}"` — the two participant ids joined by an underscore.
    pub conversation_id: String,
    pub text: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: String,
}

/// How a summary's unread counter changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadChange {
    /// The owner just read (or sent into) the conversation.
    Reset,
    /// A message arrived the owner has not seen.
    Increment,
}

/// Counter value after applying `change` to `current`.
pub fn next_unread(current: i64, change: UnreadChange) -> i64 {
    match change {
        UnreadChange::Reset => 0,
        UnreadChange::Increment => current + 1,
    }
}

/// Resolve the recipient from the conversation id.
pub fn recipient_of(conversation_id: &str, sender_id: &str) -> Result<String, FunctionError> {
    let mut parts = conversation_id.splitn(2, '_');
    let (Some(a), Some(b)) = (parts.next(), parts.next()) else {
        return Err(FunctionError::BadRequest(format!(
            "conversationId {:?} is not of the form userA_userB",
            conversation_id
        )));
    };

    if sender_id == a {
        Ok(b.to_string())
    } else {
        Ok(a.to_string())
    }
}

/// Apply a message event to both summaries.
pub async fn update_summaries(state: &AppState, event: &MessageEvent) -> Result<(), FunctionError> {
    if event.sender_id.is_empty() || event.conversation_id.is_empty() || event.text.is_empty() {
        return Err(FunctionError::BadRequest(
            "missing senderId, conversationId, or text".into(),
        ));
    }

    let recipient_id = recipient_of(&event.conversation_id, &event.sender_id)?;

    upsert_summary(state, &event.sender_id, &recipient_id, event, UnreadChange::Reset).await?;
    upsert_summary(state, &recipient_id, &event.sender_id, event, UnreadChange::Increment).await?;

    Ok(())
}

async fn upsert_summary(
    state: &AppState,
    owner_id: &str,
    other_user_id: &str,
    event: &MessageEvent,
    change: UnreadChange,
) -> Result<(), FunctionError> {
    let collection = &state.config.conversations_collection_id;
    let queries = [
        StoreQuery::Equal("ownerId", json!(owner_id)),
        StoreQuery::Equal("otherUserId", json!(other_user_id)),
        StoreQuery::Limit(1),
    ];

    let existing = state.store.list_documents(collection, &queries).await?;

    match existing.first() {
        Some(document) => {
            let document_id = document
                .get("$id")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let current = document
                .get("unreadCount")
                .and_then(Value::as_i64)
                .unwrap_or(0);

            state
                .store
                .update_document(
                    collection,
                    document_id,
                    json!({
                        "lastMessageText": event.text,
                        "lastMessageTimestamp": event.created_at,
                        "unreadCount": next_unread(current, change),
                    }),
                )
                .await?;
        }
        None => {
            let summary = ConversationSummary {
                owner_id: owner_id.to_string(),
                other_user_id: other_user_id.to_string(),
                last_message_text: event.text.clone(),
                last_message_timestamp: event.created_at.clone(),
                unread_count: next_unread(0, change),
            };
            state
                .store
                .create_document(collection, serde_json::to_value(&summary)?, &[])
                .await?;
        }
    }

    Ok(())
}
