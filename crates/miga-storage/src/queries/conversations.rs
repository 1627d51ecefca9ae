// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation operations: get-or-create per customer, capped append,
//! and the recent-messages window.
//!
//! Each append assigns the next per-conversation `seq` and trims entries
//! past the cap inside one transaction, so the history-cap invariant holds
//! even if the process dies mid-turn.

use std::str::FromStr;

use miga_core::{
    Conversation, ConversationId, CustomerId, MessageId, MigaError, Role, StoredMessage,
};
use rusqlite::params;

use crate::database::{map_tr_err, other_err, CallError, Database};

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        customer_id: CustomerId(row.get(1)?),
        summary: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<StoredMessage, CallError> {
    let role_str: String = row.get(3)?;
    let role = Role::from_str(&role_str).map_err(other_err)?;
    Ok(StoredMessage {
        id: MessageId(row.get(0)?),
        conversation_id: ConversationId(row.get(1)?),
        seq: row.get(2)?,
        role,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Get the customer's single conversation, creating an empty one if absent.
pub async fn get_or_create(
    db: &Database,
    customer_id: &CustomerId,
) -> Result<Conversation, MigaError> {
    let customer_id = customer_id.0.clone();
    db.connection()
        .call(move |conn| {
            let now = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "INSERT OR IGNORE INTO conversations
                     (id, customer_id, summary, created_at, updated_at)
                 VALUES (?1, ?2, NULL, ?3, ?3)",
                params![uuid::Uuid::new_v4().to_string(), customer_id, now],
            )?;
            let mut stmt = conn.prepare(
                "SELECT id, customer_id, summary, created_at, updated_at
                 FROM conversations WHERE customer_id = ?1",
            )?;
            let conversation = stmt.query_row(params![customer_id], row_to_conversation)?;
            Ok(conversation)
        })
        .await
        .map_err(map_tr_err)
}

/// Append one message and trim the history to `cap` entries, oldest first.
///
/// Runs in a single transaction; the stored sequence number is monotonic per
/// conversation and survives trimming (trimmed seqs are never reused).
pub async fn append_message(
    db: &Database,
    conversation_id: &ConversationId,
    role: Role,
    content: &str,
    cap: u32,
) -> Result<StoredMessage, MigaError> {
    let conversation_id = conversation_id.0.clone();
    let content = content.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let now = chrono::Utc::now().to_rfc3339();
            let id = uuid::Uuid::new_v4().to_string();

            let next_seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT INTO messages (id, conversation_id, seq, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, conversation_id, next_seq, role.to_string(), content, now],
            )?;

            // FIFO eviction past the cap.
            tx.execute(
                "DELETE FROM messages WHERE conversation_id = ?1 AND seq <= ?2 - ?3",
                params![conversation_id, next_seq, i64::from(cap)],
            )?;

            tx.execute(
                "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
                params![now, conversation_id],
            )?;

            tx.commit()?;

            Ok(StoredMessage {
                id: MessageId(id),
                conversation_id: ConversationId(conversation_id),
                seq: next_seq,
                role,
                content,
                created_at: now,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent `limit` messages in chronological (seq ascending) order.
pub async fn recent_messages(
    db: &Database,
    conversation_id: &ConversationId,
    limit: u32,
) -> Result<Vec<StoredMessage>, MigaError> {
    let conversation_id = conversation_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, seq, role, content, created_at
                 FROM (SELECT * FROM messages WHERE conversation_id = ?1
                       ORDER BY seq DESC LIMIT ?2)
                 ORDER BY seq ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id, i64::from(limit)], |row| {
                Ok(row_to_message(row))
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row??);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of messages currently stored for a conversation.
pub async fn message_count(
    db: &Database,
    conversation_id: &ConversationId,
) -> Result<u32, MigaError> {
    let conversation_id = conversation_id.0.clone();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )?;
            Ok(count as u32)
        })
        .await
        .map_err(map_tr_err)
}
