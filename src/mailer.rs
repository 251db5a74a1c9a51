//! Notification provider client.
//!
//! One email call per matching meeting, addressed to all participants at
//! once — the provider fans out to individual recipients. Nothing is read
//! back beyond success/failure.

use async_trait::async_trait;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::FunctionError;

/// A rendered email ready for the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
    /// Platform user ids; the provider resolves addresses.
    pub recipients: Vec<String>,
}

/// Dispatch seam for the reminder evaluator.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), FunctionError>;
}

/// REST client for the platform's messaging service.
pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: Url,
    project: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.store_endpoint.clone(),
            project: config.store_project.clone(),
            api_key: config.store_api_key.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), FunctionError> {
        let url = format!(
            "{}/messaging/messages/email",
            self.endpoint.as_str().trim_end_matches('/')
        );

        let body = json!({
            "messageId": Uuid::new_v4().to_string(),
            "subject": message.subject,
            "content": message.html_body,
            "users": message.recipients,
            "html": true,
        });

        let response = self
            .http
            .post(url)
            .header("X-Appwrite-Project", &self.project)
            .header("X-Appwrite-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FunctionError::DispatchFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FunctionError::DispatchFailure(format!(
                "provider returned {}: {}",
                status, detail
            )));
        }

        Ok(())
    }
}
