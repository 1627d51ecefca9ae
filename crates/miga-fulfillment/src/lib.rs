// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order submission to the external fulfillment API.
//!
//! Confirmed orders are POSTed to the bakery's orders endpoint, which hands
//! them to the kitchen and returns a tracking reference. When no endpoint is
//! configured, confirmation reports the system as unavailable rather than
//! failing the whole conversation.

pub mod submitter;

pub use submitter::{HttpSubmitter, UnconfiguredSubmitter};
