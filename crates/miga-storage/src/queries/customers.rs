// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer operations: idempotent get-or-create keyed by phone number.

use miga_core::{Customer, CustomerId, MigaError};
use rusqlite::params;

use crate::database::{map_tr_err, other_err, CallError, Database};

fn row_to_customer(row: &rusqlite::Row<'_>) -> Result<Customer, CallError> {
    let preferences_json: String = row.get(3)?;
    let preferences = serde_json::from_str(&preferences_json).map_err(other_err)?;
    Ok(Customer {
        id: CustomerId(row.get(0)?),
        phone_number: row.get(1)?,
        name: row.get(2)?,
        preferences,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Get the customer for `phone_number`, creating an empty record on first
/// contact. Never fails on repeat calls for the same number.
pub async fn get_or_create(db: &Database, phone_number: &str) -> Result<Customer, MigaError> {
    let phone = phone_number.to_string();
    db.connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            // INSERT OR IGNORE keeps this race-free against a concurrent
            // first message from the same number.
            conn.execute(
                "INSERT OR IGNORE INTO customers
                     (id, phone_number, name, preferences, created_at, updated_at)
                 VALUES (?1, ?2, NULL, '{}', ?3, ?3)",
                params![uuid::Uuid::new_v4().to_string(), phone, now],
            )?;
            let mut stmt = conn.prepare(
                "SELECT id, phone_number, name, preferences, created_at, updated_at
                 FROM customers WHERE phone_number = ?1",
            )?;
            let customer = stmt.query_row(params![phone], |row| {
                Ok(row_to_customer(row))
            })??;
            Ok(customer)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a customer by id.
pub async fn get_by_id(db: &Database, id: &CustomerId) -> Result<Option<Customer>, MigaError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, phone_number, name, preferences, created_at, updated_at
                 FROM customers WHERE id = ?1",
            )?;
            match stmt.query_row(params![id], |row| Ok(row_to_customer(row))) {
                Ok(customer) => Ok(Some(customer?)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let (db, _dir) = open_db().await;

        let first = get_or_create(&db, "5215551234567").await.unwrap();
        let second = get_or_create(&db, "5215551234567").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.phone_number, "5215551234567");
        assert!(second.name.is_none());
        assert!(second.preferences.is_empty());
    }

    #[tokio::test]
    async fn distinct_numbers_get_distinct_customers() {
        let (db, _dir) = open_db().await;

        let a = get_or_create(&db, "5215551111111").await.unwrap();
        let b = get_or_create(&db, "5215552222222").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn get_by_id_roundtrip() {
        let (db, _dir) = open_db().await;

        let created = get_or_create(&db, "5215553333333").await.unwrap();
        let fetched = get_by_id(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.phone_number, created.phone_number);

        let missing = get_by_id(&db, &CustomerId("nope".into())).await.unwrap();
        assert!(missing.is_none());
    }
}
