//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use profrag_core::error::ProfRagError;
use profrag_core::types::Conversation;
use tracing::Instrument;

use super::relay;
use super::server::AppState;

/// A request failure that happened before any reply byte was sent.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] ProfRagError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ProfRagError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ProfRagError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ProfRagError::ApiKeyMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Chat request failed ({status}): {}", self.0);
        } else {
            tracing::warn!("Rejected chat request: {}", self.0);
        }
        let body = serde_json::json!({"ok": false, "error": self.0.to_string()});
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "profrag",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Chat endpoint: JSON conversation in, streamed plain-text reply out.
///
/// Parsing, retrieval and opening the completion all happen before the
/// response starts, so their failures come back as JSON errors. Once the
/// 200 is sent, a mid-stream failure aborts the body instead.
pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    async move {
        let conversation = Conversation::from_json_slice(&body)?;
        tracing::info!(
            "💬 Chat request: {} message(s), last {} chars",
            conversation.messages().len(),
            conversation.last().content.chars().count()
        );

        let upstream = state.pipeline.run(&conversation).await?;
        let (stream, _relay) = relay::spawn_relay(upstream);

        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(stream),
        )
            .into_response())
    }
    .instrument(span)
    .await
}
