//! Reminder evaluator.
//!
//! One invocation per scheduler tick: fetch SCHEDULED meetings whose
//! stored UTC time-of-day sits near `now + 15 min`, reconstruct each
//! one's occurrence in its own zone, and dispatch a reminder for every
//! meeting whose firing window and recurrence rule both hold.
//!
//! Per-meeting outcomes are values collected into a batch report; no
//! meeting's failure aborts the batch. There is no persisted "reminder
//! sent" marker — at-most-once delivery rests entirely on the firing
//! window being narrower than the tick period.

pub mod email;
pub mod recurrence;

use chrono::{DateTime, Duration, Utc};

use crate::error::FunctionError;
use crate::mailer::Mailer;
use crate::store::ReminderSource;
use crate::types::{MeetingStatus, ScheduleDetails, ScheduledMeeting};

use recurrence::{
    in_firing_window, resolve_occurrence, Frequency, REMINDER_LEAD_MINUTES,
};

/// Half-width of the store pre-filter window around the target
/// time-of-day. The stored `utcTime` mirror is fixed on the first
/// occurrence date, so for a DST-observing zone it can sit a whole hour
/// off the live occurrence for half the year; the window must cover
/// that drift or those meetings silently drop out of the candidate
/// set. The evaluator makes the precise decision either way.
pub const QUERY_WINDOW_MINUTES: i64 = 62;

/// Why a structurally valid schedule did not fire at this instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotDue {
    /// First occurrence is still in the future.
    BeforeStartDate,
    /// Today's local weekday is not in the recurrence rule.
    DayMismatch,
    /// Now is outside the one-minute tolerance around the reminder instant.
    OutsideWindow,
}

/// Why a candidate was dropped without a firing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// A non-SCHEDULED meeting slipped through the pre-filter.
    NotScheduled,
    MalformedRecord(String),
    NoParticipants,
    DispatchFailed(String),
}

/// Per-meeting evaluation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    NotDue(NotDue),
    Skipped(Skip),
}

/// What one evaluator invocation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub candidates: usize,
    pub sent: usize,
    pub not_due: usize,
    pub skipped: usize,
}

/// Run one reminder pass at `now`.
///
/// A store query failure aborts the invocation ([`FunctionError::BatchFailure`]);
/// everything after that point is skip-and-continue.
pub async fn run_pass(
    store: &dyn ReminderSource,
    mailer: &dyn Mailer,
    url_host: &str,
    now: DateTime<Utc>,
) -> Result<BatchReport, FunctionError> {
    let target = (now + Duration::minutes(REMINDER_LEAD_MINUTES)).time();
    let candidates = store
        .scheduled_meetings_around(target, Duration::minutes(QUERY_WINDOW_MINUTES))
        .await?;

    let mut report = BatchReport {
        candidates: candidates.len(),
        ..BatchReport::default()
    };

    for meeting in &candidates {
        match evaluate_meeting(meeting, now, url_host, mailer).await {
            Outcome::Sent => {
                log::info!(
                    "Reminder sent for meeting {} ({} participant(s))",
                    meeting.meeting_id,
                    meeting.participants.len()
                );
                report.sent += 1;
            }
            Outcome::NotDue(reason) => {
                log::debug!("Meeting {} not due: {:?}", meeting.meeting_id, reason);
                report.not_due += 1;
            }
            Outcome::Skipped(reason) => {
                log::warn!("Skipping meeting {}: {:?}", meeting.id, reason);
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Evaluate a single candidate; never returns an error.
pub async fn evaluate_meeting(
    meeting: &ScheduledMeeting,
    now: DateTime<Utc>,
    url_host: &str,
    mailer: &dyn Mailer,
) -> Outcome {
    if meeting.status != MeetingStatus::Scheduled {
        return Outcome::Skipped(Skip::NotScheduled);
    }

    let details: ScheduleDetails = match serde_json::from_str(&meeting.schedule_details) {
        Ok(details) => details,
        Err(e) => return Outcome::Skipped(Skip::MalformedRecord(e.to_string())),
    };

    let occurrence = match resolve_occurrence(&details, now) {
        Ok(occurrence) => occurrence,
        Err(e) => return Outcome::Skipped(Skip::MalformedRecord(e.to_string())),
    };

    if !in_firing_window(now, &occurrence) {
        return Outcome::NotDue(NotDue::OutsideWindow);
    }

    if !occurrence.has_started() {
        return Outcome::NotDue(NotDue::BeforeStartDate);
    }

    let due_today = Frequency::parse(&details.frequency)
        .map(|rule| rule.matches(occurrence.weekday()))
        .unwrap_or(false);
    if !due_today {
        return Outcome::NotDue(NotDue::DayMismatch);
    }

    if meeting.participants.is_empty() {
        return Outcome::Skipped(Skip::NoParticipants);
    }

    let message =
        email::render_reminder(&meeting.meeting_id, &occurrence, url_host, &meeting.participants);

    match mailer.send_email(&message).await {
        Ok(()) => Outcome::Sent,
        Err(e) => Outcome::Skipped(Skip::DispatchFailed(e.to_string())),
    }
}
