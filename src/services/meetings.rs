//! Meeting initializer.
//!
//! Booking flow glue: create the external video room, then persist the
//! SESSIONS record (status SCHEDULED) readable and writable by both
//! participants. The record also carries the UTC-normalized start
//! time-of-day so the reminder pre-filter can range-query it.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::FunctionError;
use crate::reminder::recurrence::utc_time_mirror;
use crate::state::AppState;
use crate::types::ScheduleDetails;
use crate::video::ROOM_PERMISSIONS;

/// Booking request from the conversation flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub conversation_id: String,
    pub schedule_details: ScheduleDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingCreated {
    pub meeting_id: String,
    pub join_token: String,
}

/// Document-level permissions: both participants read and update.
pub fn participant_permissions(sender_id: &str, receiver_id: &str) -> Vec<String> {
    vec![
        format!("read(\"user:{}\")", sender_id),
        format!("read(\"user:{}\")", receiver_id),
        format!("update(\"user:{}\")", sender_id),
        format!("update(\"user:{}\")", receiver_id),
    ]
}

/// Build the SESSIONS document body for a new booking.
///
/// Validates the schedule while computing the UTC mirror, so a booking
/// with a bad date/time/timezone fails here with a 400, not later in the
/// reminder path.
pub fn session_document(
    meeting_id: &str,
    request: &CreateMeetingRequest,
) -> Result<Value, FunctionError> {
    let utc_time = utc_time_mirror(&request.schedule_details)
        .map_err(|e| FunctionError::BadRequest(format!("invalid scheduleDetails: {}", e)))?;

    let mut details = request.schedule_details.clone();
    details.utc_time = Some(utc_time.clone());

    Ok(json!({
        "meetingId": meeting_id,
        "conversationId": request.conversation_id,
        "participants": [request.sender_id, request.receiver_id],
        "scheduleDetails": serde_json::to_string(&details)?,
        "utcTime": utc_time,
        "status": "SCHEDULED",
    }))
}

/// Handle one booking end to end.
pub async fn init_meeting(
    state: &AppState,
    request: &CreateMeetingRequest,
) -> Result<MeetingCreated, FunctionError> {
    if request.sender_id.is_empty()
        || request.receiver_id.is_empty()
        || request.conversation_id.is_empty()
    {
        return Err(FunctionError::BadRequest(
            "missing senderId, receiverId, or conversationId".into(),
        ));
    }

    let meeting_id = state.video.create_room().await?;
    let document = session_document(&meeting_id, request)?;

    state
        .store
        .create_document(
            &state.config.meetings_collection_id,
            document,
            &participant_permissions(&request.sender_id, &request.receiver_id),
        )
        .await?;

    let join_token = state.video.mint_token(ROOM_PERMISSIONS, Duration::hours(2))?;

    Ok(MeetingCreated {
        meeting_id,
        join_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateMeetingRequest {
        CreateMeetingRequest {
            sender_id: "alice".into(),
            receiver_id: "bob".into(),
            conversation_id: "alice_bob".into(),
            schedule_details: ScheduleDetails {
                start_date: "2026-01-05".into(),
                time: "18:30".into(),
                utc_time: None,
                timezone: "America/New_York".into(),
                frequency: "Monday".into(),
            },
        }
    }

    #[test]
    fn test_session_document_mirrors_utc_time() {
        let document = session_document("room-1", &request()).unwrap();

        // EST: 18:30 local is 23:30 UTC, mirrored both top-level and in
        // the serialized details blob.
        assert_eq!(document["utcTime"], "23:30");
        assert_eq!(document["status"], "SCHEDULED");
        assert_eq!(document["participants"], json!(["alice", "bob"]));

        let details: ScheduleDetails =
            serde_json::from_str(document["scheduleDetails"].as_str().unwrap()).unwrap();
        assert_eq!(details.utc_time.as_deref(), Some("23:30"));
        assert_eq!(details.frequency, "Monday");
    }

    #[test]
    fn test_session_document_rejects_bad_schedule() {
        let mut bad = request();
        bad.schedule_details.timezone = "Nowhere/Void".into();

        let err = session_document("room-1", &bad).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_permissions_cover_both_participants() {
        let permissions = participant_permissions("alice", "bob");
        assert_eq!(permissions.len(), 4);
        assert!(permissions.contains(&"read(\"user:alice\")".to_string()));
        assert!(permissions.contains(&"update(\"user:bob\")".to_string()));
    }
}
