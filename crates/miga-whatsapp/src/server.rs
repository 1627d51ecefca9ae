// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! Three routes: the Meta verification handshake (GET), the notification
//! receiver (POST), and a health check. The POST handler never blocks on
//! processing: it validates, queues the extracted text messages, and
//! acknowledges immediately. Meta retries non-200 responses, so malformed
//! payloads are still acknowledged with 200 and an error body.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use miga_config::model::ServerConfig;
use miga_core::MigaError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::payload::{InboundText, WebhookPayload};
use crate::signature::verify_signature;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Bounded queue feeding the dispatcher; full means drop and log.
    pub inbound_tx: mpsc::Sender<InboundText>,
    /// Pre-shared token for the verification handshake.
    pub verify_token: Option<String>,
    /// App secret for signature validation (None skips the check).
    pub app_secret: Option<String>,
    /// Reported by the health endpoint.
    pub service_name: String,
}

/// Builds the webhook router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/webhook", get(verify_webhook).post(receive_webhook))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves the webhook router until the token is cancelled.
pub async fn serve(
    config: &ServerConfig,
    state: ServerState,
    shutdown: CancellationToken,
) -> Result<(), MigaError> {
    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MigaError::Channel {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MigaError::Channel {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

async fn health(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.service_name,
    }))
}

/// Meta's subscription handshake: echo the challenge only when the mode is
/// `subscribe` and the token matches; anything else is 403 "Forbidden".
async fn verify_webhook(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge").cloned();

    let expected = state.verify_token.as_deref();
    if mode == Some("subscribe") && expected.is_some() && token == expected {
        if let Some(challenge) = challenge {
            info!("webhook verification succeeded");
            return (StatusCode::OK, challenge).into_response();
        }
    }

    warn!(?mode, "webhook verification failed");
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

async fn receive_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<serde_json::Value> {
    if let Some(app_secret) = &state.app_secret {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !verify_signature(app_secret, &body, signature) {
            warn!("dropping webhook delivery with invalid signature");
            return Json(serde_json::json!({
                "status": "error",
                "message": "invalid signature",
            }));
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "malformed webhook payload");
            return Json(serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            }));
        }
    };

    let messages = payload.text_messages();
    debug!(count = messages.len(), "webhook delivery parsed");
    for message in messages {
        if let Err(e) = state.inbound_tx.try_send(message) {
            warn!(error = %e, "inbound queue full, dropping message");
        }
    }

    Json(serde_json::json!({"status": "ok"}))
}
