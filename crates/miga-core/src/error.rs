// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Miga bakery agent.
//!
//! `MigaError` is the fault channel: transport and infrastructure failures
//! only. Expected business outcomes (an unknown tool name, an order that is
//! already confirmed, an empty catalog) are plain strings surfaced back to
//! the model and never travel through this enum.

use thiserror::Error;

/// The primary error type used across all Miga crates.
#[derive(Debug, Error)]
pub enum MigaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// WhatsApp transport errors (send failure, bad payload, HTTP error status).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion provider errors (API failure, timeout, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// External order-submission errors (fulfillment API failure or rejection).
    #[error("fulfillment error: {message}")]
    Fulfillment {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
