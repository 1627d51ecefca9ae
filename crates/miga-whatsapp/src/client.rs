// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound WhatsApp Cloud API client.
//!
//! Sends text messages and read receipts through the Graph API messages
//! endpoint. Replies longer than the platform limit are split into
//! sequential chunks.

use std::time::Duration;

use miga_config::model::WhatsAppConfig;
use miga_core::MigaError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

/// Maximum characters per outbound message chunk.
const MAX_MESSAGE_CHARS: usize = 4000;

/// Graph API client for one business phone number.
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    api_base: String,
    phone_number_id: String,
}

impl WhatsAppClient {
    /// Creates a client from configuration.
    ///
    /// Requires both the access token and the business phone number id.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, MigaError> {
        let access_token = config
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MigaError::Config("whatsapp.access_token is not set".into()))?;
        let phone_number_id = config
            .phone_number_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| MigaError::Config("whatsapp.phone_number_id is not set".into()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|e| MigaError::Config(format!("invalid access token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(http::header::AUTHORIZATION, auth);
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MigaError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            phone_number_id: phone_number_id.to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_number_id)
    }

    async fn post_payload(&self, payload: serde_json::Value) -> Result<(), MigaError> {
        let response = self
            .client
            .post(self.messages_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| MigaError::Channel {
                message: format!("WhatsApp request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MigaError::Channel {
                message: format!("WhatsApp API returned {status}: {body}"),
                source: None,
            });
        }
        Ok(())
    }

    /// Sends `text` to `phone`, splitting into sequential chunks when it
    /// exceeds the platform limit. Chunks are sent in order; a failed chunk
    /// aborts the remainder.
    pub async fn send_text(&self, phone: &str, text: &str) -> Result<(), MigaError> {
        for chunk in chunk_text(text, MAX_MESSAGE_CHARS) {
            debug!(to = %phone, chars = chunk.chars().count(), "sending text message");
            self.post_payload(serde_json::json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": phone,
                "type": "text",
                "text": {"body": chunk}
            }))
            .await?;
        }
        Ok(())
    }

    /// Marks an inbound message as read. Best-effort: failures are logged
    /// at warn level and swallowed.
    pub async fn mark_as_read(&self, message_id: &str) {
        let result = self
            .post_payload(serde_json::json!({
                "messaging_product": "whatsapp",
                "status": "read",
                "message_id": message_id
            }))
            .await;
        if let Err(e) = result {
            warn!(message_id = %message_id, error = %e, "failed to mark message as read");
        }
    }
}

/// Splits `text` into chunks of at most `max_chars` characters, never
/// splitting inside a code point.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: Some("token-123".into()),
            phone_number_id: Some("42".into()),
            api_base: server.uri(),
            ..WhatsAppConfig::default()
        }
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("hola", 4000);
        assert_eq!(chunks, vec!["hola".to_string()]);
    }

    #[test]
    fn long_text_splits_on_character_boundaries() {
        // Multi-byte characters must survive chunking intact.
        let text = "ñ".repeat(9001);
        let chunks = chunk_text(&text, 4000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 4000);
        assert_eq!(chunks[2].chars().count(), 1001);
        assert_eq!(chunks.concat(), text);
    }

    #[tokio::test]
    async fn send_text_posts_cloud_api_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/42/messages"))
            .and(header("authorization", "Bearer token-123"))
            .and(body_partial_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "5215512345678",
                "type": "text",
                "text": {"body": "¡Hola!"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"messages": [{"id": "wamid.OUT"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config_for(&server)).unwrap();
        client.send_text("5215512345678", "¡Hola!").await.unwrap();
    }

    #[tokio::test]
    async fn long_reply_is_sent_as_sequential_chunks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/42/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"messages": []})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config_for(&server)).unwrap();
        let text = "a".repeat(8500);
        client.send_text("5215512345678", &text).await.unwrap();
    }

    #[tokio::test]
    async fn mark_as_read_swallows_failures() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/42/messages"))
            .and(body_partial_json(serde_json::json!({
                "status": "read",
                "message_id": "wamid.A1"
            })))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config_for(&server)).unwrap();
        // Must not propagate the 500.
        client.mark_as_read("wamid.A1").await;
    }

    #[tokio::test]
    async fn api_error_on_send_is_a_channel_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/42/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config_for(&server)).unwrap();
        let err = client.send_text("5215512345678", "hola").await.unwrap_err();
        assert!(matches!(err, MigaError::Channel { .. }));
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        let err = WhatsAppClient::new(&WhatsAppConfig::default()).unwrap_err();
        assert!(matches!(err, MigaError::Config(_)));
    }
}
