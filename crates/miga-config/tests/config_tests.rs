// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Miga configuration system.

use miga_config::diagnostic::{suggest_key, ConfigError};
use miga_config::model::MigaConfig;
use miga_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_miga_config() {
    let toml = r#"
[agent]
name = "panacea-assistant"
log_level = "debug"
max_iterations = 4
context_messages = 8
history_cap = 16
ordering_enabled = true
share_recipe_details = false

[anthropic]
api_key = "sk-ant-123"
model = "claude-sonnet-4-20250514"
max_tokens = 2048

[whatsapp]
access_token = "EAAG-token"
phone_number_id = "123456789"
verify_token = "hub-secret"
app_secret = "app-secret"

[fulfillment]
api_url = "https://orders.example.com/api/remitos"

[storage]
database_path = "/tmp/test.db"

[server]
host = "0.0.0.0"
port = 9090
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "panacea-assistant");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.max_iterations, 4);
    assert_eq!(config.agent.context_messages, 8);
    assert_eq!(config.agent.history_cap, 16);
    assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-123"));
    assert_eq!(config.anthropic.max_tokens, 2048);
    assert_eq!(config.whatsapp.access_token.as_deref(), Some("EAAG-token"));
    assert_eq!(config.whatsapp.phone_number_id.as_deref(), Some("123456789"));
    assert_eq!(config.whatsapp.verify_token.as_deref(), Some("hub-secret"));
    assert_eq!(
        config.fulfillment.api_url.as_deref(),
        Some("https://orders.example.com/api/remitos")
    );
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9090);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "miga");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.agent.max_iterations, 5);
    assert_eq!(config.agent.context_messages, 10);
    assert_eq!(config.agent.history_cap, 20);
    assert!(config.agent.ordering_enabled);
    assert!(!config.agent.share_recipe_details);
    assert!(config.anthropic.api_key.is_none());
    assert_eq!(config.anthropic.model, "claude-sonnet-4-20250514");
    assert!(config.whatsapp.access_token.is_none());
    assert_eq!(config.whatsapp.api_base, "https://graph.facebook.com/v18.0");
    assert!(config.fulfillment.api_url.is_none());
    assert!(config.storage.database_path.ends_with("miga.db"));
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
}

/// Unknown field in [agent] produces an error mentioning the bad key.
#[test]
fn unknown_field_in_agent_produces_error() {
    let toml = r#"
[agent]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err =
        load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Dot-notation overrides (what `MIGA_WHATSAPP_ACCESS_TOKEN` maps to)
/// land on the right nested field, not a spurious `whatsapp.access.token`.
#[test]
fn dotted_override_maps_to_nested_field() {
    use figment::{providers::Serialized, Figment};

    let config: MigaConfig = Figment::new()
        .merge(Serialized::defaults(MigaConfig::default()))
        .merge(("whatsapp.access_token", "from-env"))
        .merge(("agent.max_iterations", 7))
        .extract()
        .expect("dot notation should merge");

    assert_eq!(config.whatsapp.access_token.as_deref(), Some("from-env"));
    assert_eq!(config.agent.max_iterations, 7);
}

/// Missing config files are silently skipped (Figment's Toml::file behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: MigaConfig = Figment::new()
        .merge(Serialized::defaults(MigaConfig::default()))
        .merge(Toml::file("/nonexistent/path/miga.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "miga");
}

/// load_and_validate_str surfaces validation errors as diagnostics.
#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[agent]
max_iterations = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero iterations should fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_iterations"))));
}

/// Unknown keys come back as UnknownKey diagnostics with a suggestion.
#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let toml = r#"
[agent]
share_recipe_detials = true
"#;

    let errors = load_and_validate_str(toml).expect_err("typo should fail");
    match &errors[0] {
        ConfigError::UnknownKey { key, suggestion, valid_keys } => {
            assert_eq!(key, "share_recipe_detials");
            assert_eq!(suggestion.as_deref(), Some("share_recipe_details"));
            assert!(valid_keys.contains("ordering_enabled"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// The suggestion engine tolerates transposed characters.
#[test]
fn suggest_key_handles_transpositions() {
    let valid = &["api_key", "model", "max_tokens", "api_version"];
    assert_eq!(suggest_key("api_kye", valid), Some("api_key".to_string()));
    assert_eq!(suggest_key("mdoel", valid), Some("model".to_string()));
}

/// The recipe-browsing deployment is plain configuration.
#[test]
fn recipe_only_deployment_is_reachable_by_config() {
    let toml = r#"
[agent]
ordering_enabled = false
share_recipe_details = false
"#;

    let config = load_and_validate_str(toml).expect("should load");
    assert!(!config.agent.ordering_enabled);
}
