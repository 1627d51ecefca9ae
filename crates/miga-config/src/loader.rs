// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./miga.toml` > `~/.config/miga/miga.toml` >
//! `/etc/miga/miga.toml` with environment variable overrides via the
//! `MIGA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MigaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/miga/miga.toml` (system-wide)
/// 3. `~/.config/miga/miga.toml` (user XDG config)
/// 4. `./miga.toml` (local directory)
/// 5. `MIGA_*` environment variables
pub fn load_config() -> Result<MigaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MigaConfig::default()))
        .merge(Toml::file("/etc/miga/miga.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("miga/miga.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("miga.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MigaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MigaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MigaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MigaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MIGA_WHATSAPP_ACCESS_TOKEN` must map to
/// `whatsapp.access_token`, not `whatsapp.access.token`.
fn env_provider() -> Env {
    Env::prefixed("MIGA_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: MIGA_WHATSAPP_ACCESS_TOKEN -> "whatsapp_access_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("fulfillment_", "fulfillment.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("server_", "server.", 1);
        mapped.into()
    })
}
