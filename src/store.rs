//! Document store client.
//!
//! Thin REST client for the platform's document store, done the same way
//! as the video API client: raw reqwest + serde response types, no retry
//! (a failed call surfaces as a skipped item or an aborted invocation;
//! the next scheduler tick is the retry).
//!
//! The candidate pre-filter for reminders is a structured range query on
//! the document's `utcTime` attribute, mirrored onto SESSIONS records at
//! creation time. It is deliberately coarse: the reminder evaluator, not
//! the store, makes the final firing decision.

use async_trait::async_trait;
use chrono::{Duration, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::FunctionError;
use crate::types::ScheduledMeeting;

/// A structured store query operator.
#[derive(Debug, Clone)]
pub enum StoreQuery {
    Equal(&'static str, Value),
    Between(&'static str, Value, Value),
    Select(Vec<&'static str>),
    Limit(u32),
}

impl StoreQuery {
    /// Wire encoding understood by the store's REST API.
    pub fn to_json(&self) -> Value {
        match self {
            StoreQuery::Equal(attribute, value) => json!({
                "method": "equal",
                "attribute": attribute,
                "values": [value],
            }),
            StoreQuery::Between(attribute, lo, hi) => json!({
                "method": "between",
                "attribute": attribute,
                "values": [lo, hi],
            }),
            StoreQuery::Select(fields) => json!({
                "method": "select",
                "values": [fields],
            }),
            StoreQuery::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Value>,
}

/// REST client for one store project/database.
pub struct DocumentStore {
    http: reqwest::Client,
    endpoint: Url,
    project: String,
    api_key: String,
    database_id: String,
    meetings_collection_id: String,
}

impl DocumentStore {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.store_endpoint.clone(),
            project: config.store_project.clone(),
            api_key: config.store_api_key.clone(),
            database_id: config.database_id.clone(),
            meetings_collection_id: config.meetings_collection_id.clone(),
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint.as_str().trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("X-Appwrite-Project", &self.project)
            .header("X-Appwrite-Key", &self.api_key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, FunctionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(FunctionError::StoreApi {
            status: status.as_u16(),
            message,
        })
    }

    /// List documents in `collection` matching all `queries`.
    pub async fn list_documents(
        &self,
        collection: &str,
        queries: &[StoreQuery],
    ) -> Result<Vec<Value>, FunctionError> {
        let params: Vec<(String, String)> = queries
            .iter()
            .map(|q| ("queries[]".to_string(), q.to_json().to_string()))
            .collect();

        let response = self
            .authed(self.http.get(self.documents_url(collection)).query(&params))
            .send()
            .await?;
        let body: ListResponse = Self::check(response).await?.json().await?;
        Ok(body.documents)
    }

    /// Create a document with a fresh unique id.
    pub async fn create_document(
        &self,
        collection: &str,
        data: Value,
        permissions: &[String],
    ) -> Result<Value, FunctionError> {
        let body = json!({
            "documentId": Uuid::new_v4().to_string(),
            "data": data,
            "permissions": permissions,
        });

        let response = self
            .authed(self.http.post(self.documents_url(collection)).json(&body))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Patch an existing document's data.
    pub async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<(), FunctionError> {
        let url = format!("{}/{}", self.documents_url(collection), document_id);
        let body = json!({ "data": data });

        let response = self.authed(self.http.patch(url).json(&body)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Candidate source for the reminder evaluator.
///
/// Seam for tests: the evaluator never talks to the REST client directly.
#[async_trait]
pub trait ReminderSource: Send + Sync {
    /// SCHEDULED meetings whose stored UTC time-of-day falls within
    /// ±`window` of `target`.
    async fn scheduled_meetings_around(
        &self,
        target: NaiveTime,
        window: Duration,
    ) -> Result<Vec<ScheduledMeeting>, FunctionError>;
}

/// Inclusive `HH:MM` range(s) covering `target ± window`.
///
/// A window that crosses midnight splits into two ranges so the store's
/// lexicographic `between` stays correct.
pub fn time_windows(target: NaiveTime, window: Duration) -> Vec<(String, String)> {
    let (lo, lo_wrapped) = target.overflowing_sub_signed(window);
    let (hi, hi_wrapped) = target.overflowing_add_signed(window);

    let fmt = |t: NaiveTime| t.format("%H:%M").to_string();

    if lo_wrapped != 0 || hi_wrapped != 0 {
        vec![
            (fmt(lo), "23:59".to_string()),
            ("00:00".to_string(), fmt(hi)),
        ]
    } else {
        vec![(fmt(lo), fmt(hi))]
    }
}

#[async_trait]
impl ReminderSource for DocumentStore {
    async fn scheduled_meetings_around(
        &self,
        target: NaiveTime,
        window: Duration,
    ) -> Result<Vec<ScheduledMeeting>, FunctionError> {
        let mut meetings = Vec::new();

        for (lo, hi) in time_windows(target, window) {
            let queries = [
                StoreQuery::Equal("status", json!("SCHEDULED")),
                StoreQuery::Between("utcTime", json!(lo), json!(hi)),
            ];

            let documents = self
                .list_documents(&self.meetings_collection_id, &queries)
                .await
                .map_err(|e| FunctionError::BatchFailure(e.to_string()))?;

            for document in documents {
                match serde_json::from_value::<ScheduledMeeting>(document) {
                    Ok(meeting) => meetings.push(meeting),
                    // Shape-level garbage never blocks the batch.
                    Err(e) => log::warn!("Dropping malformed meeting document: {}", e),
                }
            }
        }

        Ok(meetings)
    }
}
