//! Reminder scheduler loop.
//!
//! One evaluator invocation per tick, serialized by construction (a
//! single task awaits each pass to completion before sleeping again).
//! A failed invocation is logged and dropped; the next tick is the only
//! retry mechanism.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::reminder;
use crate::state::AppState;

/// Tick period. Must stay above the firing-window tolerance
/// ([`reminder::recurrence::FIRING_TOLERANCE_SECS`]) or an occurrence
/// could fire twice.
pub const POLL_INTERVAL_SECS: u64 = 60;

pub struct ReminderScheduler {
    state: Arc<AppState>,
}

impl ReminderScheduler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run indefinitely, one reminder pass per tick.
    pub async fn run(&self) {
        log::info!(
            "Reminder scheduler started ({}s tick)",
            POLL_INTERVAL_SECS
        );

        loop {
            tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
            self.tick(Utc::now()).await;
        }
    }

    /// One evaluator invocation at `now`.
    pub async fn tick(&self, now: DateTime<Utc>) {
        let state = &self.state;
        match reminder::run_pass(&state.store, &state.mailer, &state.config.url_host, now).await {
            Ok(report) if report.candidates > 0 => {
                log::info!(
                    "Reminder pass: {} candidate(s), {} sent, {} not due, {} skipped",
                    report.candidates,
                    report.sent,
                    report.not_due,
                    report.skipped
                );
            }
            Ok(_) => log::debug!("Reminder pass: no candidates"),
            Err(e) => log::error!("Reminder pass aborted: {}", e),
        }
    }
}
