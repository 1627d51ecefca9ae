// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook payload shapes for the WhatsApp Cloud API.
//!
//! Meta delivers batched notifications: one payload can carry several
//! entries, each with several changes. Only `type == "text"` messages are
//! extracted; media, reactions, and status updates are ignored.

use serde::Deserialize;

/// A full webhook notification from Meta.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    pub value: WebhookValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messaging_product: String,
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
    #[serde(default)]
    pub statuses: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMessage {
    #[serde(rename = "from", default)]
    pub from: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

/// One inbound text message extracted from a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub from: String,
    pub message_id: String,
    pub timestamp: String,
    pub body: String,
}

impl WebhookPayload {
    /// Extracts the text messages, in delivery order.
    pub fn text_messages(&self) -> Vec<InboundText> {
        let mut out = Vec::new();
        for entry in &self.entry {
            for change in &entry.changes {
                for message in &change.value.messages {
                    if message.message_type != "text" {
                        continue;
                    }
                    let Some(text) = &message.text else {
                        continue;
                    };
                    out.push(InboundText {
                        from: message.from.clone(),
                        message_id: message.id.clone(),
                        timestamp: message.timestamp.clone(),
                        body: text.body.clone(),
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_notification() -> serde_json::Value {
        serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "12345",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {"display_phone_number": "555", "phone_number_id": "42"},
                        "contacts": [{"wa_id": "5215512345678", "profile": {"name": "Ana"}}],
                        "messages": [{
                            "from": "5215512345678",
                            "id": "wamid.A1",
                            "timestamp": "1756300000",
                            "type": "text",
                            "text": {"body": "hola, quiero pan"}
                        }]
                    }
                }]
            }]
        })
    }

    #[test]
    fn extracts_text_messages() {
        let payload: WebhookPayload = serde_json::from_value(text_notification()).unwrap();
        let messages = payload.text_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "5215512345678");
        assert_eq!(messages[0].message_id, "wamid.A1");
        assert_eq!(messages[0].body, "hola, quiero pan");
    }

    #[test]
    fn non_text_messages_are_ignored() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "12345",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "messages": [{
                            "from": "5215512345678",
                            "id": "wamid.A2",
                            "timestamp": "1756300001",
                            "type": "image",
                            "image": {"id": "media-1"}
                        }]
                    }
                }]
            }]
        }))
        .unwrap();
        assert!(payload.text_messages().is_empty());
    }

    #[test]
    fn status_updates_carry_no_messages() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "12345",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "statuses": [{"id": "wamid.A1", "status": "delivered"}]
                    }
                }]
            }]
        }))
        .unwrap();
        assert!(payload.text_messages().is_empty());
    }
}
