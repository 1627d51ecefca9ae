// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-agnostic completion protocol: the message, tool-definition, and
//! response shapes exchanged between the conversation loop and a
//! [`CompletionProvider`](crate::traits::CompletionProvider).
//!
//! The block shapes intentionally mirror the Anthropic Messages API content
//! blocks so the HTTP adapter is a direct pass-through.

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Stop reason value indicating the model requested tool execution.
pub const STOP_REASON_TOOL_USE: &str = "tool_use";

/// A tool advertised to the model: name, description, and JSON schema for
/// its input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// One content block inside a chat message or completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text segment.
    Text { text: String },
    /// A tool invocation requested by the model.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// The textual result of one tool invocation, tagged with the
    /// originating call id.
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Message body: either a bare string or structured content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One turn in the working context sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageBody,
}

impl ChatMessage {
    /// A plain-text user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageBody::Text(text.into()),
        }
    }

    /// A plain-text assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageBody::Text(text.into()),
        }
    }

    /// An assistant turn carrying the model's raw content blocks (text and
    /// tool-use requests) exactly as returned.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageBody::Blocks(blocks),
        }
    }

    /// The synthetic user turn carrying tool results back to the model.
    pub fn tool_results(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: MessageBody::Blocks(blocks),
        }
    }
}

/// A completion request: working context plus system instructions and the
/// advertised tool palette.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    /// Empty means no tools are advertised.
    pub tools: Vec<ToolDefinition>,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A completion response: ordered content blocks plus the stop reason that
/// tells the loop whether tool execution is required.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// True when the model stopped to request tool execution.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason.as_deref() == Some(STOP_REASON_TOOL_USE)
    }

    /// The first text segment in the response, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_blocks_serialize_with_type_tags() {
        let text = ContentBlock::Text {
            text: "hola".into(),
        };
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "text": "hola"}));

        let tool_use = ContentBlock::ToolUse {
            id: "toolu_01".into(),
            name: "get_catalog".into(),
            input: serde_json::json!({"category_id": "cat-1"}),
        };
        let json = serde_json::to_value(&tool_use).unwrap();
        assert_eq!(json["type"], "tool_use");
        assert_eq!(json["name"], "get_catalog");
        assert_eq!(json["input"]["category_id"], "cat-1");
    }

    #[test]
    fn tool_result_omits_is_error_when_unset() {
        let ok = ContentBlock::ToolResult {
            tool_use_id: "toolu_01".into(),
            content: "3 categorías".into(),
            is_error: None,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("is_error").is_none());

        let failed = ContentBlock::ToolResult {
            tool_use_id: "toolu_02".into(),
            content: "Error: storage error".into(),
            is_error: Some(true),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["is_error"], true);
    }

    #[test]
    fn message_body_is_untagged() {
        let plain = ChatMessage::user("quiero pan");
        let json = serde_json::to_value(&plain).unwrap();
        assert_eq!(json["content"], "quiero pan");

        let blocks = ChatMessage::tool_results(vec![ContentBlock::ToolResult {
            tool_use_id: "toolu_01".into(),
            content: "listo".into(),
            is_error: None,
        }]);
        let json = serde_json::to_value(&blocks).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json["content"].is_array());
    }

    #[test]
    fn wants_tools_only_on_tool_use_stop_reason() {
        let mut response = CompletionResponse {
            id: "msg_01".into(),
            model: "claude-sonnet-4-20250514".into(),
            content: vec![ContentBlock::Text {
                text: "¡Hola!".into(),
            }],
            stop_reason: Some("end_turn".into()),
            usage: TokenUsage::default(),
        };
        assert!(!response.wants_tools());
        assert_eq!(response.first_text(), Some("¡Hola!"));

        response.stop_reason = Some(STOP_REASON_TOOL_USE.into());
        assert!(response.wants_tools());
    }

    #[test]
    fn first_text_skips_tool_use_blocks() {
        let response = CompletionResponse {
            id: "msg_02".into(),
            model: "claude-sonnet-4-20250514".into(),
            content: vec![
                ContentBlock::ToolUse {
                    id: "toolu_01".into(),
                    name: "get_categories".into(),
                    input: serde_json::json!({}),
                },
                ContentBlock::Text {
                    text: "déjame revisar".into(),
                },
            ],
            stop_reason: Some(STOP_REASON_TOOL_USE.into()),
            usage: TokenUsage::default(),
        };
        assert_eq!(response.first_text(), Some("déjame revisar"));
    }
}
