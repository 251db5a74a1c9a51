//! Client token issuer.
//!
//! Mints the short-lived full-permission credential the web client uses
//! against the video API directly.

use chrono::Duration;
use serde::Serialize;

use crate::error::FunctionError;
use crate::state::AppState;
use crate::video::CLIENT_PERMISSIONS;

/// Client tokens live for one hour.
const CLIENT_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub token: String,
}

pub fn issue_client_token(state: &AppState) -> Result<IssuedToken, FunctionError> {
    let token = state
        .video
        .mint_token(CLIENT_PERMISSIONS, Duration::hours(CLIENT_TOKEN_TTL_HOURS))?;
    Ok(IssuedToken { token })
}
