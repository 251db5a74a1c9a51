//! Event webhook surface.
//!
//! The hosting platform delivers document and message events as JSON
//! POSTs; the booking flow and the web client call the meeting and token
//! endpoints directly. Response bodies mirror the platform's
//! `{success, ...}` contract.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use crate::error::FunctionError;
use crate::services::activity::{self, DocumentEvent};
use crate::services::conversations::{self, MessageEvent};
use crate::services::meetings::{self, CreateMeetingRequest};
use crate::services::token;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events/documents", post(handle_document_event))
        .route("/events/messages", post(handle_message_event))
        .route("/meetings", post(handle_create_meeting))
        .route("/token", post(handle_issue_token))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = state.config.bind_addr;
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening at http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutdown signal received");
        })
        .await
}

fn error_response(err: &FunctionError) -> Response {
    let status = if err.is_bad_request() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(json!({ "success": false, "error": err.to_string() })),
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn handle_document_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<DocumentEvent>,
) -> Response {
    match activity::log_document_event(&state, event).await {
        Ok(count) => Json(json!({ "success": true, "activitiesLogged": count })).into_response(),
        Err(e) => {
            log::warn!("Activity logger failed: {}", e);
            error_response(&e)
        }
    }
}

async fn handle_message_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<MessageEvent>,
) -> Response {
    match conversations::update_summaries(&state, &event).await {
        Ok(()) => Json(json!({
            "ok": true,
            "message": "Conversation summaries updated successfully."
        }))
        .into_response(),
        Err(e) => {
            log::warn!("Summary update failed: {}", e);
            error_response(&e)
        }
    }
}

async fn handle_create_meeting(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMeetingRequest>,
) -> Response {
    match meetings::init_meeting(&state, &request).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "meetingId": created.meeting_id,
                "joinToken": created.join_token,
            })),
        )
            .into_response(),
        Err(e) => {
            log::warn!("Meeting init failed: {}", e);
            error_response(&e)
        }
    }
}

async fn handle_issue_token(State(state): State<Arc<AppState>>) -> Response {
    match token::issue_client_token(&state) {
        Ok(issued) => Json(json!({ "token": issued.token })).into_response(),
        Err(e) => {
            log::warn!("Token issuance failed: {}", e);
            error_response(&e)
        }
    }
}
