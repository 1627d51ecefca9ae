// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-zero loop bounds and a usable bind address.

use crate::diagnostic::ConfigError;
use crate::model::MigaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MigaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.max_iterations == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.max_iterations must be at least 1".to_string(),
        });
    }

    if config.agent.context_messages == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.context_messages must be at least 1".to_string(),
        });
    }

    if config.agent.history_cap < config.agent.context_messages {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.history_cap ({}) must be >= agent.context_messages ({}) -- \
                 storage retains at least what is sent to the model",
                config.agent.history_cap, config.agent.context_messages
            ),
        });
    }

    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "anthropic.max_tokens must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if let Some(api_base) = Some(config.whatsapp.api_base.trim())
        && !api_base.starts_with("http://")
        && !api_base.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "whatsapp.api_base `{api_base}` must start with http:// or https://"
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
