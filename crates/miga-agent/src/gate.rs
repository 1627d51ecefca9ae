// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-customer turn serialization.
//!
//! At most one conversation turn runs per customer; overlapping inbound
//! messages from the same phone number queue behind the active turn.
//! Different customers never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutex pool, one lock per customer id.
#[derive(Debug, Default)]
pub struct CustomerGate {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CustomerGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for one customer, waiting behind any active turn.
    ///
    /// The guard is owned so it can be held across await points without
    /// borrowing the gate.
    pub async fn acquire(&self, customer_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(customer_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
