// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order ledger operations.
//!
//! Status transitions are compare-and-set: the UPDATE is conditioned on
//! `status = 'pending'`, so two racing confirms (or a confirm racing a
//! cancel) can never both apply. The loser learns the winning status from
//! the returned [`OrderTransition`].

use std::str::FromStr;

use miga_core::{CustomerId, MigaError, Order, OrderId, OrderItem, OrderStatus};
use rusqlite::params;

use crate::database::{map_tr_err, other_err, CallError, Database};

/// Outcome of a compare-and-set status transition.
#[derive(Debug, Clone)]
pub enum OrderTransition {
    /// The transition applied; carries the updated order.
    Applied(Order),
    /// No order with that id exists.
    NotFound,
    /// The order was not pending; carries the status it already has.
    Conflict(OrderStatus),
}

fn row_to_order(row: &rusqlite::Row<'_>) -> Result<Order, CallError> {
    let items_json: String = row.get(2)?;
    let items: Vec<OrderItem> = serde_json::from_str(&items_json).map_err(other_err)?;
    let status_str: String = row.get(4)?;
    let status = OrderStatus::from_str(&status_str).map_err(other_err)?;
    Ok(Order {
        id: OrderId(row.get(0)?),
        customer_id: CustomerId(row.get(1)?),
        items,
        total_cents: row.get(3)?,
        status,
        external_ref: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const ORDER_COLUMNS: &str =
    "id, customer_id, items, total_cents, status, external_ref, created_at";

/// Persist a new pending order with its snapshotted line items.
pub async fn create(
    db: &Database,
    customer_id: &CustomerId,
    items: Vec<OrderItem>,
    total_cents: i64,
) -> Result<Order, MigaError> {
    let customer_id = customer_id.0.clone();
    let items_json = serde_json::to_string(&items).map_err(|e| MigaError::Storage {
        source: Box::new(e),
    })?;
    db.connection()
        .call(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO orders (id, customer_id, items, total_cents, status, external_ref, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'pending', NULL, ?5)",
                params![id, customer_id, items_json, total_cents, now],
            )?;
            Ok(Order {
                id: OrderId(id),
                customer_id: CustomerId(customer_id),
                items,
                total_cents,
                status: OrderStatus::Pending,
                external_ref: None,
                created_at: now,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Get an order by id.
pub async fn get_by_id(db: &Database, order_id: &OrderId) -> Result<Option<Order>, MigaError> {
    let order_id = order_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
            ))?;
            match stmt.query_row(params![order_id], |row| Ok(row_to_order(row))) {
                Ok(order) => Ok(Some(order?)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a pending order to `confirmed`, storing the external
/// reference id from the fulfillment system.
pub async fn confirm(
    db: &Database,
    order_id: &OrderId,
    external_ref: &str,
) -> Result<OrderTransition, MigaError> {
    transition(db, order_id, OrderStatus::Confirmed, Some(external_ref.to_string())).await
}

/// Transition a pending order to `cancelled`.
pub async fn cancel(db: &Database, order_id: &OrderId) -> Result<OrderTransition, MigaError> {
    transition(db, order_id, OrderStatus::Cancelled, None).await
}

async fn transition(
    db: &Database,
    order_id: &OrderId,
    to: OrderStatus,
    external_ref: Option<String>,
) -> Result<OrderTransition, MigaError> {
    let order_id = order_id.0.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE orders SET status = ?1, external_ref = COALESCE(?2, external_ref)
                 WHERE id = ?3 AND status = 'pending'",
                params![to.to_string(), external_ref, order_id],
            )?;

            let outcome = if changed == 1 {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
                ))?;
                let order = stmt.query_row(params![order_id], |row| Ok(row_to_order(row)))??;
                OrderTransition::Applied(order)
            } else {
                // Distinguish a missing order from one already terminal.
                let current: Result<String, rusqlite::Error> = tx.query_row(
                    "SELECT status FROM orders WHERE id = ?1",
                    params![order_id],
                    |row| row.get(0),
                );
                match current {
                    Ok(status_str) => {
                        let status = OrderStatus::from_str(&status_str).map_err(other_err)?;
                        OrderTransition::Conflict(status)
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => OrderTransition::NotFound,
                    Err(e) => return Err(e.into()),
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(map_tr_err)
}

/// The customer's most recent orders, newest first.
pub async fn recent_for_customer(
    db: &Database,
    customer_id: &CustomerId,
    limit: u32,
) -> Result<Vec<Order>, MigaError> {
    let customer_id = customer_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders
                 WHERE customer_id = ?1
                 ORDER BY created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![customer_id, i64::from(limit)], |row| {
                Ok(row_to_order(row))
            })?;
            let mut orders = Vec::new();
            for row in rows {
                orders.push(row??);
            }
            Ok(orders)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::customers;
    use miga_core::ProductId;
    use tempfile::tempdir;

    async fn setup() -> (Database, CustomerId, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let customer = customers::get_or_create(&db, "5215551234567").await.unwrap();
        (db, customer.id, dir)
    }

    fn two_pan_frances() -> (Vec<OrderItem>, i64) {
        let items = vec![OrderItem {
            product_id: ProductId("p1".into()),
            product_name: "Pan Francés".into(),
            quantity: 2,
            unit_price_cents: 1500,
            subtotal_cents: 3000,
        }];
        (items, 3000)
    }

    #[tokio::test]
    async fn create_persists_pending_order_with_snapshot() {
        let (db, customer_id, _dir) = setup().await;
        let (items, total) = two_pan_frances();

        let order = create(&db, &customer_id, items.clone(), total).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_cents, 3000);
        assert!(order.external_ref.is_none());

        let fetched = get_by_id(&db, &order.id).await.unwrap().unwrap();
        assert_eq!(fetched.items, items);
        assert_eq!(fetched.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn confirm_sets_external_ref_only_from_pending() {
        let (db, customer_id, _dir) = setup().await;
        let (items, total) = two_pan_frances();
        let order = create(&db, &customer_id, items, total).await.unwrap();

        let confirmed = confirm(&db, &order.id, "REM-1042").await.unwrap();
        match confirmed {
            OrderTransition::Applied(order) => {
                assert_eq!(order.status, OrderStatus::Confirmed);
                assert_eq!(order.external_ref.as_deref(), Some("REM-1042"));
            }
            other => panic!("expected Applied, got {other:?}"),
        }

        // A second confirm loses the CAS and reports the current status.
        let again = confirm(&db, &order.id, "REM-9999").await.unwrap();
        assert!(matches!(again, OrderTransition::Conflict(OrderStatus::Confirmed)));

        // So does a cancel after confirm.
        let cancelled = cancel(&db, &order.id).await.unwrap();
        assert!(matches!(cancelled, OrderTransition::Conflict(OrderStatus::Confirmed)));

        // The stored external ref is the winner's.
        let stored = get_by_id(&db, &order.id).await.unwrap().unwrap();
        assert_eq!(stored.external_ref.as_deref(), Some("REM-1042"));
    }

    #[tokio::test]
    async fn cancel_is_terminal() {
        let (db, customer_id, _dir) = setup().await;
        let (items, total) = two_pan_frances();
        let order = create(&db, &customer_id, items, total).await.unwrap();

        let cancelled = cancel(&db, &order.id).await.unwrap();
        assert!(matches!(
            cancelled,
            OrderTransition::Applied(Order {
                status: OrderStatus::Cancelled,
                ..
            })
        ));

        let confirmed = confirm(&db, &order.id, "REM-1").await.unwrap();
        assert!(matches!(confirmed, OrderTransition::Conflict(OrderStatus::Cancelled)));
    }

    #[tokio::test]
    async fn transitions_on_missing_orders_report_not_found() {
        let (db, _customer_id, _dir) = setup().await;
        let id = OrderId("missing".into());
        assert!(matches!(confirm(&db, &id, "X").await.unwrap(), OrderTransition::NotFound));
        assert!(matches!(cancel(&db, &id).await.unwrap(), OrderTransition::NotFound));
    }

    #[tokio::test]
    async fn recent_orders_are_newest_first_and_limited() {
        let (db, customer_id, _dir) = setup().await;
        for _ in 0..5 {
            let (items, total) = two_pan_frances();
            create(&db, &customer_id, items, total).await.unwrap();
        }
        let recent = recent_for_customer(&db, &customer_id, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
    }
}
