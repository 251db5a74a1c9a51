//! Store document shapes shared across functions.
//!
//! Field names follow the store's wire format (camelCase, `$`-prefixed
//! document metadata). `ScheduledMeeting` is read-only to this service
//! except at creation time in the meeting initializer.

use serde::{Deserialize, Serialize};

/// Meeting lifecycle status. Only SCHEDULED meetings are reminder candidates;
/// an external flow moves them to COMPLETED when the session finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
}

/// A SESSIONS record as returned by the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMeeting {
    #[serde(rename = "$id", default)]
    pub id: String,
    /// Opaque identifier of the externally-hosted video room.
    pub meeting_id: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub status: MeetingStatus,
    /// JSON-encoded [`ScheduleDetails`] — the store keeps it as a string column.
    pub schedule_details: String,
}

/// Parsed `scheduleDetails` payload.
///
/// The occurrence stream of a meeting is fully determined by
/// (startDate, time, timezone, frequency).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetails {
    /// First valid occurrence date, `YYYY-MM-DD`, local to `timezone`.
    pub start_date: String,
    /// Wall-clock start time-of-day, `HH:MM`, local to `timezone`.
    pub time: String,
    /// UTC-normalized equivalent of `time`, mirrored onto the document at
    /// creation so the store can range-filter candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_time: Option<String>,
    /// IANA timezone identifier, e.g. `America/New_York`.
    pub timezone: String,
    /// Recurrence rule: `daily`, `weekends only`, or a weekday name.
    #[serde(default)]
    pub frequency: String,
}

/// Per-(owner, counterpart) conversation summary record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub owner_id: String,
    pub other_user_id: String,
    pub last_message_text: String,
    pub last_message_timestamp: String,
    pub unread_count: i64,
}

/// A one-line human-readable activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub user_id: String,
    /// At most 100 characters; longer descriptions are ellipsis-truncated.
    pub description: String,
    pub collection: String,
    pub document_id: String,
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_deserializes_store_document() {
        let raw = r#"{
            "$id": "doc-1",
            "meetingId": "room-abc",
            "participants": ["user-a", "user-b"],
            "status": "SCHEDULED",
            "scheduleDetails": "{\"startDate\":\"2026-01-05\",\"time\":\"10:00\",\"timezone\":\"UTC\",\"frequency\":\"daily\"}"
        }"#;

        let meeting: ScheduledMeeting = serde_json::from_str(raw).unwrap();
        assert_eq!(meeting.id, "doc-1");
        assert_eq!(meeting.status, MeetingStatus::Scheduled);
        assert_eq!(meeting.participants.len(), 2);

        let details: ScheduleDetails = serde_json::from_str(&meeting.schedule_details).unwrap();
        assert_eq!(details.time, "10:00");
        assert_eq!(details.frequency, "daily");
        assert!(details.utc_time.is_none());
    }

    #[test]
    fn test_schedule_details_round_trips_camel_case() {
        let details = ScheduleDetails {
            start_date: "2026-03-01".into(),
            time: "18:30".into(),
            utc_time: Some("23:30".into()),
            timezone: "America/New_York".into(),
            frequency: "Friday".into(),
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["startDate"], "2026-03-01");
        assert_eq!(json["utcTime"], "23:30");
        assert!(json.get("start_date").is_none());
    }
}
