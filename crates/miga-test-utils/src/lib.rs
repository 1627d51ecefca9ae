// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Miga integration tests.
//!
//! Deterministic stand-ins for the two external boundaries (completion
//! provider and order submitter) plus a harness that wires a full agent
//! stack over a temp database.

pub mod harness;
pub mod mock_submitter;
pub mod scripted_provider;

pub use harness::{FixtureCatalog, TestHarness, TestHarnessBuilder};
pub use mock_submitter::MockSubmitter;
pub use scripted_provider::ScriptedProvider;
