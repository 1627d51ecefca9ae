// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`OrderSubmitter`] implementations.

use std::time::Duration;

use async_trait::async_trait;
use miga_config::model::FulfillmentConfig;
use miga_core::{Customer, MigaError, Order, OrderSubmitter};
use serde::Serialize;
use tracing::{debug, info};

/// Wire payload for the external orders API. Prices are decimal currency
/// units on this boundary; everything internal stays in cents.
#[derive(Debug, Serialize)]
struct SubmissionPayload {
    cliente: ClientePayload,
    items: Vec<ItemPayload>,
    total: f64,
}

#[derive(Debug, Serialize)]
struct ClientePayload {
    telefono: String,
    nombre: String,
}

#[derive(Debug, Serialize)]
struct ItemPayload {
    producto: String,
    cantidad: u32,
    precio_unitario: f64,
    subtotal: f64,
}

fn cents_to_decimal(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn build_payload(customer: &Customer, order: &Order) -> SubmissionPayload {
    SubmissionPayload {
        cliente: ClientePayload {
            telefono: customer.phone_number.clone(),
            nombre: customer
                .name
                .clone()
                .unwrap_or_else(|| "Cliente".to_string()),
        },
        items: order
            .items
            .iter()
            .map(|item| ItemPayload {
                producto: item.product_name.clone(),
                cantidad: item.quantity,
                precio_unitario: cents_to_decimal(item.unit_price_cents),
                subtotal: cents_to_decimal(item.subtotal_cents),
            })
            .collect(),
        total: cents_to_decimal(order.total_cents),
    }
}

/// Submits confirmed orders to an HTTP orders endpoint.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    api_url: String,
}

impl HttpSubmitter {
    /// Creates a submitter for the configured endpoint.
    pub fn new(api_url: String, config: &FulfillmentConfig) -> Result<Self, MigaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MigaError::Fulfillment {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, api_url })
    }
}

#[async_trait]
impl OrderSubmitter for HttpSubmitter {
    async fn submit(&self, customer: &Customer, order: &Order) -> Result<String, MigaError> {
        let payload = build_payload(customer, order);
        debug!(order_id = %order.id, "submitting order to fulfillment API");

        let response = self
            .client
            .post(&self.api_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MigaError::Fulfillment {
                message: format!("fulfillment request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| MigaError::Fulfillment {
            message: format!("failed to read fulfillment response: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(MigaError::Fulfillment {
                message: format!("fulfillment API returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| MigaError::Fulfillment {
                message: format!("fulfillment API returned invalid JSON: {e}"),
                source: Some(Box::new(e)),
            })?;

        // The orders API has returned both string and numeric ids.
        let external_ref = match parsed.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(MigaError::Fulfillment {
                    message: format!("fulfillment response has no order id: {body}"),
                    source: None,
                });
            }
        };

        info!(order_id = %order.id, external_ref = %external_ref, "order submitted");
        Ok(external_ref)
    }
}

/// Placeholder submitter used when no fulfillment endpoint is configured.
/// Every submission fails, which `confirm_order` reports to the customer as
/// the ordering system being unavailable.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredSubmitter;

#[async_trait]
impl OrderSubmitter for UnconfiguredSubmitter {
    async fn submit(&self, _customer: &Customer, order: &Order) -> Result<String, MigaError> {
        Err(MigaError::Fulfillment {
            message: format!(
                "no fulfillment endpoint configured, cannot submit order {}",
                order.id
            ),
            source: None,
        })
    }
}
