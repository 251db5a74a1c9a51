//! Recurrence and occurrence math.
//!
//! A meeting's occurrence stream is fully determined by
//! (startDate, time, timezone, frequency). For a recurring meeting the
//! occurrence under evaluation uses the local date of the instant the
//! reminder targets (`now` plus the lead time) in the meeting's zone,
//! so occurrences just after local midnight resolve to the right day;
//! `startDate` is only a lower bound.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use thiserror::Error;

use crate::types::ScheduleDetails;

/// Reminders go out this many minutes before the occurrence starts.
pub const REMINDER_LEAD_MINUTES: i64 = 15;

/// Symmetric tolerance around the ideal reminder instant. Must exceed the
/// scheduler's worst-case tick jitter but stay below the tick period, or
/// an occurrence could fire twice.
pub const FIRING_TOLERANCE_SECS: i64 = 60;

/// Why a candidate's schedule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("malformed scheduleDetails: {0}")]
    MalformedDetails(String),
    #[error("invalid startDate {0:?} (expected YYYY-MM-DD)")]
    BadStartDate(String),
    #[error("invalid time {0:?} (expected HH:MM)")]
    BadTime(String),
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),
    #[error("local start time does not exist on this date (DST gap)")]
    NonexistentLocalTime,
}

/// Recurrence rule governing which calendar days produce an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    WeekendsOnly,
    Weekly(Weekday),
}

impl Frequency {
    /// Accepts `daily`, `weekends only`, or a weekday name, all
    /// case-insensitively. Anything else is not a rule and never matches.
    pub fn parse(raw: &str) -> Option<Frequency> {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "daily" => Some(Frequency::Daily),
            "weekends only" => Some(Frequency::WeekendsOnly),
            other => other.parse::<Weekday>().ok().map(Frequency::Weekly),
        }
    }

    pub fn matches(&self, day: Weekday) -> bool {
        match self {
            Frequency::Daily => true,
            Frequency::WeekendsOnly => matches!(day, Weekday::Sat | Weekday::Sun),
            Frequency::Weekly(weekday) => *weekday == day,
        }
    }
}

/// Today's concrete calendar instance of a recurring meeting.
#[derive(Debug, Clone)]
pub struct Occurrence {
    /// First valid occurrence date (local calendar).
    pub start_date: NaiveDate,
    /// Start instant of today's occurrence, in the meeting's own zone.
    pub local_start: DateTime<Tz>,
}

impl Occurrence {
    /// The occurrence is on or after the schedule's first valid date.
    pub fn has_started(&self) -> bool {
        self.local_start.date_naive() >= self.start_date
    }

    pub fn weekday(&self) -> Weekday {
        self.local_start.weekday()
    }
}

/// Resolve the occurrence of `details` under evaluation at `now`.
///
/// The occurrence date is the local date of `now + 15 min` in the
/// meeting's zone, the same day the reminder is about: at 23:50 a
/// meeting starting 00:05 resolves to tomorrow's occurrence, not a
/// long-past one earlier today. A nonexistent local time
/// (spring-forward gap) is an error; an ambiguous one (fall-back
/// overlap) maps to the earlier instant.
pub fn resolve_occurrence(
    details: &ScheduleDetails,
    now: DateTime<Utc>,
) -> Result<Occurrence, ScheduleError> {
    let tz: Tz = details
        .timezone
        .parse()
        .map_err(|_| ScheduleError::UnknownTimezone(details.timezone.clone()))?;

    let start_date = NaiveDate::parse_from_str(&details.start_date, "%Y-%m-%d")
        .map_err(|_| ScheduleError::BadStartDate(details.start_date.clone()))?;

    let time = NaiveTime::parse_from_str(&details.time, "%H:%M")
        .map_err(|_| ScheduleError::BadTime(details.time.clone()))?;

    let today = (now + Duration::minutes(REMINDER_LEAD_MINUTES))
        .with_timezone(&tz)
        .date_naive();
    let local_start = tz
        .from_local_datetime(&today.and_time(time))
        .earliest()
        .ok_or(ScheduleError::NonexistentLocalTime)?;

    Ok(Occurrence {
        start_date,
        local_start,
    })
}

/// True iff `now` falls within ±[`FIRING_TOLERANCE_SECS`] of the reminder
/// instant (occurrence start minus [`REMINDER_LEAD_MINUTES`]).
pub fn in_firing_window(now: DateTime<Utc>, occurrence: &Occurrence) -> bool {
    let reminder_instant = occurrence.local_start - Duration::minutes(REMINDER_LEAD_MINUTES);
    let now_local = now.with_timezone(&occurrence.local_start.timezone());
    (now_local - reminder_instant).num_seconds().abs() <= FIRING_TOLERANCE_SECS
}

/// UTC-normalized `HH:MM` mirror of the local start time, evaluated on the
/// first occurrence date. Stored on the document so the store can
/// range-filter reminder candidates.
pub fn utc_time_mirror(details: &ScheduleDetails) -> Result<String, ScheduleError> {
    let tz: Tz = details
        .timezone
        .parse()
        .map_err(|_| ScheduleError::UnknownTimezone(details.timezone.clone()))?;

    let start_date = NaiveDate::parse_from_str(&details.start_date, "%Y-%m-%d")
        .map_err(|_| ScheduleError::BadStartDate(details.start_date.clone()))?;

    let time = NaiveTime::parse_from_str(&details.time, "%H:%M")
        .map_err(|_| ScheduleError::BadTime(details.time.clone()))?;

    let local = tz
        .from_local_datetime(&start_date.and_time(time))
        .earliest()
        .ok_or(ScheduleError::NonexistentLocalTime)?;

    Ok(local.with_timezone(&Utc).format("%H:%M").to_string())
}
