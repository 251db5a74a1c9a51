//! Service configuration
//!
//! All settings come from the process environment, read once at startup
//! into an explicit struct. Missing variables are reported together by
//! name rather than surfacing one at a time deep inside a request.

use std::env;
use std::net::SocketAddr;

use url::Url;

use crate::error::FunctionError;

/// Default video API base when `VIDEO_API_BASE` is unset.
const DEFAULT_VIDEO_API_BASE: &str = "https://api.videosdk.live/v2";

/// Default bind address for the event webhook server.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store REST endpoint, e.g. `https://cloud.example.io/v1`.
    pub store_endpoint: Url,
    /// Store project identifier sent with every request.
    pub store_project: String,
    /// Store API key (server-side, full access).
    pub store_api_key: String,
    pub database_id: String,

    pub meetings_collection_id: String,
    pub conversations_collection_id: String,
    pub activity_collection_id: String,
    pub profiles_collection_id: String,

    /// Public host used to build meeting join URLs in reminder emails.
    pub url_host: String,

    pub video_api_base: Url,
    pub video_api_key: String,
    pub video_secret_key: String,

    pub bind_addr: SocketAddr,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// Every required variable is checked before returning, so the error
    /// message names all missing ones at once.
    pub fn from_env() -> Result<Config, FunctionError> {
        let mut missing = Vec::new();

        let mut required = |name: &'static str| -> String {
            match env::var(name) {
                Ok(value) if !value.trim().is_empty() => value,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let store_endpoint = required("STORE_ENDPOINT");
        let store_project = required("STORE_PROJECT_ID");
        let store_api_key = required("STORE_API_KEY");
        let database_id = required("DATABASE_ID");
        let meetings_collection_id = required("MEETINGS_COLLECTION_ID");
        let conversations_collection_id = required("CONVERSATIONS_COLLECTION_ID");
        let activity_collection_id = required("ACTIVITY_COLLECTION_ID");
        let profiles_collection_id = required("PROFILES_COLLECTION_ID");
        let url_host = required("URL_HOST");
        let video_api_key = required("VIDEO_API_KEY");
        let video_secret_key = required("VIDEO_SECRET_KEY");

        if !missing.is_empty() {
            return Err(FunctionError::Configuration(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let store_endpoint = Url::parse(&store_endpoint).map_err(|e| {
            FunctionError::Configuration(format!("STORE_ENDPOINT is not a valid URL: {}", e))
        })?;

        let video_api_base = match env::var("VIDEO_API_BASE") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => DEFAULT_VIDEO_API_BASE.to_string(),
        };
        let video_api_base = Url::parse(&video_api_base).map_err(|e| {
            FunctionError::Configuration(format!("VIDEO_API_BASE is not a valid URL: {}", e))
        })?;

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => DEFAULT_BIND_ADDR.to_string(),
        };
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|e| {
            FunctionError::Configuration(format!("BIND_ADDR is not a valid socket address: {}", e))
        })?;

        Ok(Config {
            store_endpoint,
            store_project,
            store_api_key,
            database_id,
            meetings_collection_id,
            conversations_collection_id,
            activity_collection_id,
            profiles_collection_id,
            url_host,
            video_api_base,
            video_api_key,
            video_secret_key,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_all_vars() -> Config {
        Config {
            store_endpoint: Url::parse("https://store.example.io/v1").unwrap(),
            store_project: "proj".into(),
            store_api_key: "key".into(),
            database_id: "db".into(),
            meetings_collection_id: "meetings".into(),
            conversations_collection_id: "conversations".into(),
            activity_collection_id: "activity".into(),
            profiles_collection_id: "profiles".into(),
            url_host: "https://skillswap.example.com".into(),
            video_api_base: Url::parse(DEFAULT_VIDEO_API_BASE).unwrap(),
            video_api_key: "vk".into(),
            video_secret_key: "vs".into(),
            bind_addr: DEFAULT_BIND_ADDR.parse().unwrap(),
        }
    }

    #[test]
    fn test_from_env_reports_all_missing_vars() {
        // Serialize env mutation: from_env reads the real process env, so
        // keep the slate clean and restore nothing (test process only).
        for name in [
            "STORE_ENDPOINT",
            "STORE_PROJECT_ID",
            "STORE_API_KEY",
            "DATABASE_ID",
            "MEETINGS_COLLECTION_ID",
            "CONVERSATIONS_COLLECTION_ID",
            "ACTIVITY_COLLECTION_ID",
            "PROFILES_COLLECTION_ID",
            "URL_HOST",
            "VIDEO_API_KEY",
            "VIDEO_SECRET_KEY",
        ] {
            env::remove_var(name);
        }

        let err = Config::from_env().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("STORE_ENDPOINT"), "{}", message);
        assert!(message.contains("VIDEO_SECRET_KEY"), "{}", message);
        assert!(message.contains("URL_HOST"), "{}", message);
    }

    #[test]
    fn test_defaults_applied() {
        let config = config_with_all_vars();
        assert_eq!(config.video_api_base.as_str(), "https://api.videosdk.live/v2");
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
