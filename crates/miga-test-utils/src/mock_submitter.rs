// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording order submitter for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use miga_core::{Customer, MigaError, Order, OrderSubmitter};

/// Records every submission and replays scripted results.
///
/// With no script, submissions succeed with sequential `REF-n` references.
#[derive(Default)]
pub struct MockSubmitter {
    results: Mutex<VecDeque<Result<String, MigaError>>>,
    submissions: Mutex<Vec<(Customer, Order)>>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a failure for the next submission.
    pub fn push_failure(&self, message: &str) {
        self.results
            .lock()
            .unwrap()
            .push_back(Err(MigaError::Fulfillment {
                message: message.to_string(),
                source: None,
            }));
    }

    /// Queues a fixed external reference for the next submission.
    pub fn push_reference(&self, reference: &str) {
        self.results
            .lock()
            .unwrap()
            .push_back(Ok(reference.to_string()));
    }

    /// Orders submitted so far, oldest first.
    pub fn submissions(&self) -> Vec<(Customer, Order)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderSubmitter for MockSubmitter {
    async fn submit(&self, customer: &Customer, order: &Order) -> Result<String, MigaError> {
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push((customer.clone(), order.clone()));
        let count = submissions.len();
        drop(submissions);

        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("REF-{count}")))
    }
}
