//! Activity logger.
//!
//! Turns document create/update events (profiles, conversations,
//! meetings) into one-line human-readable activity records, one per
//! affected user. Insertion is fire-and-forget: a failed write is logged
//! and the rest of the batch continues.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::FunctionError;
use crate::state::AppState;
use crate::store::StoreQuery;
use crate::types::Activity;

/// Hard cap on description length; longer text is cut at 97 + `...`.
const MAX_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    Create,
    Update,
}

impl DocumentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentAction::Create => "create",
            DocumentAction::Update => "update",
        }
    }
}

/// A document event delivered by the platform.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEvent {
    /// Platform event name; update events contain `documents.update`.
    #[serde(default)]
    pub event: String,
    pub payload: Value,
    #[serde(default)]
    pub old: Option<Value>,
}

impl DocumentEvent {
    pub fn action(&self) -> DocumentAction {
        if self.event.contains("documents.update") {
            DocumentAction::Update
        } else {
            DocumentAction::Create
        }
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.payload.get("$collectionId").and_then(Value::as_str)
    }
}

/// Truncate to [`MAX_DESCRIPTION_CHARS`], ellipsis included.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    format!("{}...", head)
}

fn field<'a>(payload: &'a Value, name: &str) -> &'a str {
    payload.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Activities for a meeting event: one per participant, status-transition
/// aware on updates.
pub fn meeting_activities(
    payload: &Value,
    old: Option<&Value>,
    action: DocumentAction,
    names: &HashMap<String, String>,
) -> Vec<Activity> {
    let meeting_id = payload
        .get("meetingId")
        .and_then(Value::as_str)
        .unwrap_or("a skill swap");
    let document_id = field(payload, "$id");
    let new_status = field(payload, "status");
    let old_status = old.map(|o| field(o, "status")).unwrap_or("");

    let participants: Vec<String> = payload
        .get("participants")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut activities = Vec::new();

    for user_id in &participants {
        let other_names = participants
            .iter()
            .filter(|p| *p != user_id)
            .map(|p| names.get(p).cloned().unwrap_or_else(|| "another user".into()))
            .collect::<Vec<_>>()
            .join(", ");

        let description = match action {
            DocumentAction::Create => format!(
                "You scheduled a new skill swap with {} (ID: {}).",
                other_names, meeting_id
            ),
            DocumentAction::Update => {
                if new_status == "COMPLETED" && old_status != "COMPLETED" {
                    format!("Great! Your skill swap (ID: {}) is now completed.", meeting_id)
                } else {
                    format!("Your skill swap details (ID: {}) were updated.", meeting_id)
                }
            }
        };

        activities.push(Activity {
            user_id: user_id.clone(),
            description: truncate_description(&description),
            collection: "Meeting".into(),
            document_id: document_id.to_string(),
            action: action.as_str().into(),
        });
    }

    activities
}

/// Activity for a profile event.
pub fn profile_activity(payload: &Value, action: DocumentAction) -> Option<Activity> {
    let user_id = field(payload, "userId");
    if user_id.is_empty() || user_id == "system" {
        return None;
    }

    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Your Profile");
    let description = match action {
        DocumentAction::Create => format!("Welcome! Your profile '{}' was created.", name),
        DocumentAction::Update => format!("Your profile '{}' was successfully updated.", name),
    };

    Some(Activity {
        user_id: user_id.to_string(),
        description: truncate_description(&description),
        collection: "Profile".into(),
        document_id: field(payload, "$id").to_string(),
        action: action.as_str().into(),
    })
}

/// Activity for a conversation creation. Updates are ignored upstream.
pub fn conversation_activity(payload: &Value, counterpart_name: &str) -> Option<Activity> {
    let owner_id = field(payload, "ownerId");
    if owner_id.is_empty() || owner_id == "system" {
        return None;
    }

    let description = format!(
        "You started a new skill swap conversation with {}.",
        counterpart_name
    );

    Some(Activity {
        user_id: owner_id.to_string(),
        description: truncate_description(&description),
        collection: "Conversation".into(),
        document_id: field(payload, "$id").to_string(),
        action: DocumentAction::Create.as_str().into(),
    })
}

/// Display-name lookup with a stable fallback derived from the user id.
pub async fn profile_name(state: &AppState, user_id: &str) -> String {
    let fallback = || {
        let short: String = user_id.chars().take(8).collect();
        format!("User {}", short)
    };

    if user_id.is_empty() || user_id == "system" {
        return fallback();
    }

    let queries = [
        StoreQuery::Equal("userId", json!(user_id)),
        StoreQuery::Select(vec!["name"]),
        StoreQuery::Limit(1),
    ];

    match state
        .store
        .list_documents(&state.config.profiles_collection_id, &queries)
        .await
    {
        Ok(documents) => documents
            .first()
            .and_then(|doc| doc.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(fallback),
        Err(e) => {
            log::warn!("Profile lookup failed for {}: {}", user_id, e);
            fallback()
        }
    }
}

/// Handle one document event end to end; returns how many activities were
/// inserted.
pub async fn log_document_event(
    state: &AppState,
    event: DocumentEvent,
) -> Result<usize, FunctionError> {
    let collection_id = event
        .collection_id()
        .ok_or_else(|| FunctionError::BadRequest("payload is missing $collectionId".into()))?
        .to_string();
    let action = event.action();

    let config = &state.config;
    let mut activities = Vec::new();

    if collection_id == config.meetings_collection_id {
        let participants: Vec<String> = event
            .payload
            .get("participants")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut names = HashMap::new();
        for user_id in &participants {
            names.insert(user_id.clone(), profile_name(state, user_id).await);
        }

        activities = meeting_activities(&event.payload, event.old.as_ref(), action, &names);
    } else if collection_id == config.conversations_collection_id {
        if action == DocumentAction::Update {
            log::debug!("Ignoring conversation update event");
            return Ok(0);
        }
        let other_id = field(&event.payload, "otherUserId").to_string();
        let counterpart = profile_name(state, &other_id).await;
        activities.extend(conversation_activity(&event.payload, &counterpart));
    } else if collection_id == config.profiles_collection_id {
        activities.extend(profile_activity(&event.payload, action));
    } else {
        log::debug!("No activity rule for collection {}", collection_id);
        return Ok(0);
    }

    let mut inserted = 0;
    for activity in &activities {
        match state
            .store
            .create_document(
                &config.activity_collection_id,
                serde_json::to_value(activity)?,
                &[],
            )
            .await
        {
            Ok(_) => inserted += 1,
            // Fire-and-forget: a failed insert never fails the event.
            Err(e) => log::warn!("Failed to insert activity for {}: {}", activity.user_id, e),
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_at_100_chars() {
        let short = "You scheduled a new skill swap.";
        assert_eq!(truncate_description(short), short);

        let long = "x".repeat(150);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), 100);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_meeting_create_names_counterparts() {
        let payload = json!({
            "$id": "doc-9",
            "meetingId": "room-7",
            "participants": ["alice", "bob"],
            "status": "SCHEDULED",
        });
        let names = HashMap::from([
            ("alice".to_string(), "Alice".to_string()),
            ("bob".to_string(), "Bob".to_string()),
        ]);

        let activities = meeting_activities(&payload, None, DocumentAction::Create, &names);
        assert_eq!(activities.len(), 2);
        assert!(activities[0].description.contains("with Bob"));
        assert!(activities[1].description.contains("with Alice"));
        assert_eq!(activities[0].collection, "Meeting");
    }

    #[test]
    fn test_meeting_completion_transition_wording() {
        let payload = json!({
            "$id": "doc-9",
            "meetingId": "room-7",
            "participants": ["alice", "bob"],
            "status": "COMPLETED",
        });
        let old = json!({ "status": "SCHEDULED" });

        let activities =
            meeting_activities(&payload, Some(&old), DocumentAction::Update, &HashMap::new());
        assert!(activities[0].description.contains("now completed"));

        // Already completed: plain update wording.
        let old = json!({ "status": "COMPLETED" });
        let activities =
            meeting_activities(&payload, Some(&old), DocumentAction::Update, &HashMap::new());
        assert!(activities[0].description.contains("were updated"));
    }

    #[test]
    fn test_profile_activity_skips_system_user() {
        let payload = json!({ "$id": "p1", "userId": "system", "name": "Ghost" });
        assert!(profile_activity(&payload, DocumentAction::Create).is_none());

        let payload = json!({ "$id": "p1", "userId": "u1", "name": "Dana" });
        let activity = profile_activity(&payload, DocumentAction::Create).unwrap();
        assert!(activity.description.contains("'Dana'"));
    }

    #[test]
    fn test_action_derived_from_event_name() {
        let event = DocumentEvent {
            event: "databases.main.collections.profiles.documents.p1.update".into(),
            payload: json!({}),
            old: None,
        };
        assert_eq!(event.action(), DocumentAction::Update);

        let event = DocumentEvent {
            event: "databases.main.collections.profiles.documents.p1.create".into(),
            payload: json!({}),
            old: None,
        };
        assert_eq!(event.action(), DocumentAction::Create);
    }
}
