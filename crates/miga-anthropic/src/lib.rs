// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API adapter.
//!
//! Translates the provider-agnostic completion protocol from `miga-core`
//! into Messages API requests and back. The conversation loop never sees
//! wire types; it talks to [`AnthropicProvider`] through the
//! [`CompletionProvider`](miga_core::CompletionProvider) trait.

pub mod provider;
pub mod types;

pub use provider::AnthropicProvider;
