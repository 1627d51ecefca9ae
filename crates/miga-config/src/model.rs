// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Miga bakery agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Miga configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; secrets (API tokens) have no defaults and must be provided.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MigaConfig {
    /// Agent identity and conversation-loop settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// External order-submission API settings.
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Agent identity and conversation-loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt override. Defaults to the built-in bakery prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Upper bound on completion rounds per turn before the fallback reply.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// How many recent messages are sent to the model as working context.
    #[serde(default = "default_context_messages")]
    pub context_messages: u32,

    /// How many messages a conversation retains in storage (FIFO eviction).
    #[serde(default = "default_history_cap")]
    pub history_cap: u32,

    /// Whether the order-lifecycle tools (create/confirm/cancel) are
    /// advertised. `false` yields the read-only recipe-browsing palette.
    #[serde(default = "default_ordering_enabled")]
    pub ordering_enabled: bool,

    /// Whether recipe quantities, instructions, and tips are rendered for
    /// customers. `false` restricts output to ingredient names.
    #[serde(default)]
    pub share_recipe_details: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            max_iterations: default_max_iterations(),
            context_messages: default_context_messages(),
            history_cap: default_history_cap(),
            ordering_enabled: default_ordering_enabled(),
            share_recipe_details: false,
        }
    }
}

fn default_agent_name() -> String {
    "miga".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_iterations() -> u32 {
    5
}

fn default_context_messages() -> u32 {
    10
}

fn default_history_cap() -> u32 {
    20
}

fn default_ordering_enabled() -> bool {
    true
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use for completion requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version header value.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_anthropic_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            request_timeout_secs: default_anthropic_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_anthropic_timeout_secs() -> u64 {
    120
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Graph API access token. `None` disables outbound delivery.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Business phone number id used in outbound URLs.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Pre-shared token for the webhook verification handshake.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret for `X-Hub-Signature-256` validation. `None` skips the
    /// signature check.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Graph API base URL.
    #[serde(default = "default_whatsapp_api_base")]
    pub api_base: String,

    /// Per-request timeout in seconds for outbound sends.
    #[serde(default = "default_whatsapp_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            verify_token: None,
            app_secret: None,
            api_base: default_whatsapp_api_base(),
            request_timeout_secs: default_whatsapp_timeout_secs(),
        }
    }
}

fn default_whatsapp_api_base() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}

fn default_whatsapp_timeout_secs() -> u64 {
    30
}

/// External order-submission API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FulfillmentConfig {
    /// Base URL of the orders API. `None` makes `confirm_order` report the
    /// fulfillment system as unavailable.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_fulfillment_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: default_fulfillment_timeout_secs(),
        }
    }
}

fn default_fulfillment_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("miga").join("miga.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("miga.db"))
        .to_string_lossy()
        .into_owned()
}

/// Webhook server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the webhook server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the webhook server to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}
