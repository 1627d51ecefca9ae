// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted completion provider for deterministic testing.
//!
//! Responses are popped from a FIFO queue; every request is recorded so
//! tests can assert on the context the loop actually sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use miga_core::{
    CompletionProvider, CompletionRequest, CompletionResponse, ContentBlock, MigaError,
    TokenUsage,
};

/// A completion provider that replays a pre-loaded script.
///
/// When the queue is empty it either fails (default) or, in
/// `always_tool_use` mode, keeps requesting the same tool forever, which
/// is how iteration-budget tests force the fallback path.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    always_tool_use: Option<(String, serde_json::Value)>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            always_tool_use: None,
        })
    }

    /// A provider that answers every request with a `tool_use` stop for
    /// the given tool, never producing a final answer.
    pub fn always_requesting_tool(name: &str, input: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            always_tool_use: Some((name.to_string(), input)),
        })
    }

    /// Appends responses to the queue after construction. Useful when the
    /// scripted tool inputs need ids that only exist once a fixture has
    /// been seeded.
    pub fn push_responses(&self, responses: impl IntoIterator<Item = CompletionResponse>) {
        self.responses.lock().unwrap().extend(responses);
    }

    /// Number of completion requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// A copy of the nth request, panicking if it was never made.
    pub fn request(&self, index: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[index].clone()
    }

    /// Builds a plain-text final response.
    pub fn text(text: &str) -> CompletionResponse {
        CompletionResponse {
            id: "msg_scripted".into(),
            model: "scripted".into(),
            content: vec![ContentBlock::Text { text: text.into() }],
            stop_reason: Some("end_turn".into()),
            usage: TokenUsage::default(),
        }
    }

    /// Builds a single-tool-use response with the given call id.
    pub fn tool_use(call_id: &str, name: &str, input: serde_json::Value) -> CompletionResponse {
        CompletionResponse {
            id: "msg_scripted".into(),
            model: "scripted".into(),
            content: vec![ContentBlock::ToolUse {
                id: call_id.into(),
                name: name.into(),
                input,
            }],
            stop_reason: Some("tool_use".into()),
            usage: TokenUsage::default(),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, MigaError> {
        self.requests.lock().unwrap().push(request);
        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return Ok(response);
        }
        if let Some((name, input)) = &self.always_tool_use {
            return Ok(Self::tool_use("toolu_scripted", name, input.clone()));
        }
        Err(MigaError::Internal("scripted provider exhausted".into()))
    }
}
