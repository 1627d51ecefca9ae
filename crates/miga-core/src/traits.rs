// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for the two external capabilities the conversation loop
//! depends on: text completion and order submission.
//!
//! Production implementations live in `miga-anthropic` and
//! `miga-fulfillment`; scripted test doubles live in `miga-test-utils`.

use async_trait::async_trait;

use crate::chat::{CompletionRequest, CompletionResponse};
use crate::error::MigaError;
use crate::types::{Customer, Order};

/// An external text-completion capability that may request tool execution
/// before producing final text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends one completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, MigaError>;
}

/// The external fulfillment system a confirmed order is forwarded to.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submits the order and returns the external reference id.
    ///
    /// Any non-success response or transport failure is a
    /// [`MigaError::Fulfillment`]; the caller turns it into a
    /// model-visible result string.
    async fn submit(&self, customer: &Customer, order: &Order) -> Result<String, MigaError>;
}
