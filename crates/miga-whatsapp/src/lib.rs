// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API boundary for the Miga bakery agent.
//!
//! Inbound: an axum webhook server that validates deliveries, extracts
//! text messages, and queues them for processing. Outbound: a Graph API
//! client for text replies and read receipts.

pub mod client;
pub mod payload;
pub mod server;
pub mod signature;

pub use client::WhatsAppClient;
pub use payload::{InboundText, WebhookPayload};
pub use server::{router, serve, ServerState};
