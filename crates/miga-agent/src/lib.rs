// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Miga conversation agent.
//!
//! Ties the completion provider, the tool palette, and storage together
//! into one bounded tool-augmented loop per inbound message. Turns for the
//! same customer are serialized by an async gate; different customers run
//! concurrently.

pub mod agent;
pub mod executor;
pub mod gate;
pub mod prompts;
pub mod shutdown;
pub mod tools;

pub use agent::{Agent, AgentSettings, FALLBACK_REPLY};
pub use executor::ToolExecutor;
pub use gate::CustomerGate;
pub use shutdown::install_signal_handler;
pub use tools::{definitions, ToolCall};
