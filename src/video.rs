//! External video API client.
//!
//! Two responsibilities: minting short-lived HS256 credentials for the
//! video provider, and creating meeting rooms. Permission sets are fixed
//! per caller — the booking flow gets a narrow recording-capable token,
//! the client-facing token issuer gets the full moderation set.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::FunctionError;

/// Permissions granted to tokens minted by the booking flow.
pub const ROOM_PERMISSIONS: &[&str] = &[
    "allow_join",
    "allow_start_recording",
    "allow_end_recording",
];

/// Full permission set for client-facing tokens (1 h expiry).
pub const CLIENT_PERMISSIONS: &[&str] = &[
    "allow_join",
    "allow_mod",
    "allow_create",
    "allow_recording_read",
    "allow_recording_edit",
    "allow_streaming",
    "allow_hls",
    "allow_transcription",
    "allow_room_read",
    "allow_room_edit",
    "allow_playlist_read",
    "allow_playlist_edit",
    "allow_webhook",
    "allow_custom_events",
];

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    apikey: &'a str,
    permissions: &'a [&'a str],
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomResponse {
    room_id: String,
}

pub struct VideoApi {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    secret_key: String,
}

impl VideoApi {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.video_api_base.clone(),
            api_key: config.video_api_key.clone(),
            secret_key: config.video_secret_key.clone(),
        }
    }

    /// Mint a signed credential valid for `ttl` with the given permissions.
    pub fn mint_token(
        &self,
        permissions: &[&str],
        ttl: Duration,
    ) -> Result<String, FunctionError> {
        let now = Utc::now();
        let claims = TokenClaims {
            apikey: &self.api_key,
            permissions,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret_key.as_bytes()),
        )?;
        Ok(token)
    }

    /// Create a manually-closed meeting room; returns its opaque id.
    pub async fn create_room(&self) -> Result<String, FunctionError> {
        let token = self.mint_token(ROOM_PERMISSIONS, Duration::hours(2))?;
        let url = format!("{}/rooms", self.base.as_str().trim_end_matches('/'));

        let response = self
            .http
            .post(url)
            .header("Authorization", token)
            .json(&serde_json::json!({ "autoCloseConfig": "manual" }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FunctionError::VideoApi {
                status: status.as_u16(),
                message,
            });
        }

        let body: CreateRoomResponse = response.json().await?;
        Ok(body.room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn test_api() -> VideoApi {
        VideoApi {
            http: reqwest::Client::new(),
            base: Url::parse("https://video.example.test/v2").unwrap(),
            api_key: "test-api-key".into(),
            secret_key: "test-secret".into(),
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct DecodedClaims {
        apikey: String,
        permissions: Vec<String>,
        iat: i64,
        exp: i64,
    }

    #[test]
    fn test_token_carries_key_and_permissions() {
        let api = test_api();
        let token = api.mint_token(ROOM_PERMISSIONS, Duration::hours(2)).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let decoded = decode::<DecodedClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.claims.apikey, "test-api-key");
        assert_eq!(decoded.claims.permissions, ROOM_PERMISSIONS);
    }

    #[test]
    fn test_token_expiry_matches_ttl() {
        let api = test_api();
        let token = api.mint_token(CLIENT_PERMISSIONS, Duration::hours(1)).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let decoded = decode::<DecodedClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap();

        let ttl = decoded.claims.exp - decoded.claims.iat;
        assert_eq!(ttl, 3600);
    }
}
