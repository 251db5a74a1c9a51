//! Reminder email rendering.
//!
//! One batched message per meeting, addressed to every participant; the
//! body carries the join URL derived from the room id and the occurrence
//! time localized to the meeting's zone.

use crate::mailer::EmailMessage;
use crate::reminder::recurrence::Occurrence;

pub const REMINDER_SUBJECT: &str =
    "\u{23f0} The Clock Is Ticking! Join Your SkillSwap Session in 15 Minutes!";

/// Render the reminder for one occurrence.
pub fn render_reminder(
    meeting_id: &str,
    occurrence: &Occurrence,
    url_host: &str,
    participants: &[String],
) -> EmailMessage {
    let join_url = format!("{}/meetings/{}", url_host.trim_end_matches('/'), meeting_id);
    let local_time = format!(
        "{} ({})",
        occurrence.local_start.format("%H:%M"),
        occurrence.local_start.timezone().name()
    );

    let html_body = format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">",
            "<title>SkillSwap Final Countdown</title></head>",
            "<body style=\"margin:0;padding:0;background-color:#0d121c;font-family:'Arial',sans-serif;\">",
            "<center style=\"width:100%;background-color:#0d121c;\">",
            "<div style=\"max-width:600px;margin:30px auto;background-color:#10141f;border-radius:12px;border:2px solid #1a1e2b;\">",
            "<h2 style=\"padding:25px 30px;margin:0;color:#ffffff;\">",
            "<span style=\"color:#40e0d0;\">SkillSwap</span> Session</h2>",
            "<div style=\"padding:0 30px 40px 30px;text-align:center;\">",
            "<p style=\"color:#ffffff;font-size:18px;margin:0 0 5px 0;\">Starting In...</p>",
            "<h1 style=\"color:#1ed760;font-size:55px;margin:0;\">15 MINS</h1>",
            "<p style=\"color:#b0b4bf;font-size:16px;line-height:1.6;\">",
            "It's almost time to trade your skills! Don't miss this opportunity to connect ",
            "and share what you know with people all over the world.</p>",
            "<p style=\"color:#40e0d0;font-size:18px;font-weight:bold;\">",
            "Your Session Time: <span style=\"color:#ffffff;\">{time}</span></p>",
            "<a href=\"{url}\" target=\"_blank\" style=\"background-color:#40e0d0;color:#000000;",
            "text-decoration:none;padding:18px 40px;border-radius:4px;font-weight:bold;",
            "font-size:18px;display:inline-block;\">ENTER THE EXCHANGE</a>",
            "</div>",
            "<p style=\"padding:20px 30px;color:#6a748c;font-size:12px;border-top:1px solid #1a1e2b;\">",
            "Trade your skills for knowledge you want. No money, just sharing.<br>",
            "The SkillSwap Team</p>",
            "</div></center></body></html>",
        ),
        time = local_time,
        url = join_url,
    );

    EmailMessage {
        subject: REMINDER_SUBJECT.to_string(),
        html_body,
        recipients: participants.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::recurrence::resolve_occurrence;
    use crate::types::ScheduleDetails;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_includes_join_url_and_local_time() {
        let details = ScheduleDetails {
            start_date: "2026-01-01".into(),
            time: "18:30".into(),
            utc_time: None,
            timezone: "America/New_York".into(),
            frequency: "daily".into(),
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 23, 15, 0).unwrap();
        let occurrence = resolve_occurrence(&details, now).unwrap();

        let message = render_reminder(
            "room-42",
            &occurrence,
            "https://skillswap.example.com/",
            &["user-a".to_string(), "user-b".to_string()],
        );

        assert_eq!(message.subject, REMINDER_SUBJECT);
        assert_eq!(message.recipients.len(), 2);
        assert!(message
            .html_body
            .contains("https://skillswap.example.com/meetings/room-42"));
        assert!(message.html_body.contains("18:30 (America/New_York)"));
    }
}
