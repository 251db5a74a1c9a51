//! Error types for function invocations
//!
//! Errors are classified by blast radius:
//! - Per-meeting: malformed record or rejected dispatch — log, skip, continue
//! - Per-invocation: store query failure — abort the batch, next tick retries
//! - Startup: configuration errors — fatal before any work happens

use thiserror::Error;

/// Error type shared by all platform functions.
#[derive(Debug, Error)]
pub enum FunctionError {
    // Per-invocation: the candidate query itself failed. Nothing was
    // processed; the external tick is the retry mechanism.
    #[error("Store query failed: {0}")]
    BatchFailure(String),

    // Per-meeting: the notification provider rejected the send.
    #[error("Notification dispatch rejected: {0}")]
    DispatchFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request payload: {0}")]
    BadRequest(String),

    #[error("Video API error {status}: {message}")]
    VideoApi { status: u16, message: String },

    #[error("Store API error {status}: {message}")]
    StoreApi { status: u16, message: String },

    #[error("Token signing failed: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FunctionError {
    /// True if this error invalidates one meeting but not the batch.
    pub fn is_per_meeting(&self) -> bool {
        matches!(self, FunctionError::DispatchFailure(_))
    }

    /// True if the caller's payload was at fault (maps to HTTP 400).
    pub fn is_bad_request(&self) -> bool {
        matches!(self, FunctionError::BadRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_failure_is_per_meeting() {
        let err = FunctionError::DispatchFailure("provider said no".into());
        assert!(err.is_per_meeting());
        assert!(!err.is_bad_request());
    }

    #[test]
    fn test_batch_failure_aborts_invocation() {
        let err = FunctionError::BatchFailure("store unreachable".into());
        assert!(!err.is_per_meeting());
    }

    #[test]
    fn test_bad_request_classification() {
        let err = FunctionError::BadRequest("missing senderId".into());
        assert!(err.is_bad_request());
    }
}
