// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tool-augmented conversation loop.
//!
//! One call to [`Agent::process_message`] is one conversation turn: persist
//! the inbound text, run bounded completion rounds with tool execution
//! between them, persist and return the final reply.

use std::sync::Arc;

use miga_config::model::MigaConfig;
use miga_core::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, ContentBlock,
    MigaError, OrderSubmitter, Role,
};
use miga_storage::Store;
use tracing::{debug, info, warn};

use crate::executor::ToolExecutor;
use crate::gate::CustomerGate;
use crate::prompts::build_system_prompt;
use crate::tools::{self, ToolCall};

/// Reply sent when the iteration budget runs out without a final answer.
pub const FALLBACK_REPLY: &str =
    "Lo siento, no pude completar tu solicitud. Por favor intenta de nuevo.";

/// Loop and palette settings, extracted from configuration once at startup.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub name: String,
    pub system_prompt: Option<String>,
    pub max_iterations: u32,
    pub context_messages: u32,
    pub history_cap: u32,
    pub ordering_enabled: bool,
    pub share_recipe_details: bool,
    pub max_tokens: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from(&MigaConfig::default())
    }
}

impl From<&MigaConfig> for AgentSettings {
    fn from(config: &MigaConfig) -> Self {
        Self {
            name: config.agent.name.clone(),
            system_prompt: config.agent.system_prompt.clone(),
            max_iterations: config.agent.max_iterations,
            context_messages: config.agent.context_messages,
            history_cap: config.agent.history_cap,
            ordering_enabled: config.agent.ordering_enabled,
            share_recipe_details: config.agent.share_recipe_details,
            max_tokens: config.anthropic.max_tokens,
        }
    }
}

/// The conversation agent: storage, completion provider, order submitter,
/// and the per-customer serialization gate.
pub struct Agent {
    store: Store,
    provider: Arc<dyn CompletionProvider>,
    submitter: Arc<dyn OrderSubmitter>,
    settings: AgentSettings,
    gate: CustomerGate,
}

impl Agent {
    pub fn new(
        store: Store,
        provider: Arc<dyn CompletionProvider>,
        submitter: Arc<dyn OrderSubmitter>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            store,
            provider,
            submitter,
            settings,
            gate: CustomerGate::new(),
        }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Runs one conversation turn and returns the reply text.
    ///
    /// The per-customer guard is held for the storage appends and the
    /// completion loop, then released before the caller delivers the reply.
    pub async fn process_message(
        &self,
        phone_number: &str,
        text: &str,
    ) -> Result<String, MigaError> {
        let customer = self.store.get_or_create_customer(phone_number).await?;
        info!(customer_id = %customer.id, "processing inbound message");

        let reply = {
            let _guard = self.gate.acquire(customer.id.as_str()).await;

            let conversation = self.store.get_or_create_conversation(&customer.id).await?;
            self.store
                .append_message(
                    &conversation.id,
                    Role::User,
                    text,
                    self.settings.history_cap,
                )
                .await?;

            let stored = self
                .store
                .recent_messages(&conversation.id, self.settings.context_messages)
                .await?;
            let mut context: Vec<ChatMessage> = stored
                .into_iter()
                .map(|message| match message.role {
                    Role::User => ChatMessage::user(message.content),
                    Role::Assistant => ChatMessage::assistant(message.content),
                })
                .collect();

            let system = build_system_prompt(self.settings.system_prompt.as_deref(), &customer);
            let tool_definitions = tools::definitions(self.settings.ordering_enabled);
            let executor =
                ToolExecutor::new(&self.store, self.submitter.as_ref(), &self.settings, &customer);

            let mut reply = None;
            for iteration in 0..self.settings.max_iterations {
                let request = CompletionRequest {
                    system: system.clone(),
                    messages: context.clone(),
                    max_tokens: self.settings.max_tokens,
                    tools: tool_definitions.clone(),
                };
                let response = self.provider.complete(request).await?;
                info!(
                    iteration,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    stop_reason = response.stop_reason.as_deref().unwrap_or(""),
                    "completion round finished"
                );

                if !response.wants_tools() {
                    reply = Some(
                        response
                            .first_text()
                            .map(str::to_string)
                            .unwrap_or_else(|| FALLBACK_REPLY.to_string()),
                    );
                    break;
                }

                let results = self.run_tool_round(&executor, &response).await;
                context.push(ChatMessage::assistant_blocks(response.content));
                context.push(ChatMessage::tool_results(results));
            }

            let reply = match reply {
                Some(text) => text,
                None => {
                    warn!(
                        customer_id = %customer.id,
                        max_iterations = self.settings.max_iterations,
                        "iteration budget exhausted, sending fallback reply"
                    );
                    FALLBACK_REPLY.to_string()
                }
            };

            self.store
                .append_message(
                    &conversation.id,
                    Role::Assistant,
                    &reply,
                    self.settings.history_cap,
                )
                .await?;
            reply
        };

        Ok(reply)
    }

    /// Executes every tool request in the response, in order of appearance.
    ///
    /// Business outcomes and parse failures are plain result strings;
    /// internal faults become error-flagged results. Either way the model
    /// sees text and the turn continues.
    async fn run_tool_round(
        &self,
        executor: &ToolExecutor<'_>,
        response: &CompletionResponse,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::new();
        for block in &response.content {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };
            debug!(tool = %name, call_id = %id, "tool requested");
            let (content, is_error) =
                match ToolCall::parse(name, input, self.settings.ordering_enabled) {
                    Ok(call) => match executor.execute(call).await {
                        Ok(text) => (text, None),
                        Err(e) => {
                            warn!(tool = %name, error = %e, "tool execution faulted");
                            (format!("Error: {e}"), Some(true))
                        }
                    },
                    Err(message) => (message, None),
                };
            results.push(ContentBlock::ToolResult {
                tool_use_id: id.clone(),
                content,
                is_error,
            });
        }
        results
    }
}
