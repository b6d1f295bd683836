// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use std::str::FromStr;

use parley_core::ParleyError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Conversation, Visibility};

/// Create a new conversation.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), ParleyError> {
    let conversation = conversation.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "INSERT INTO conversations (id, owner_id, title, visibility, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conversation.id,
                    conversation.owner_id,
                    conversation.title,
                    conversation.visibility.to_string(),
                    conversation.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by ID.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Conversation>> {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, title, visibility, created_at
                 FROM conversations WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a conversation's title.
pub async fn update_title(db: &Database, id: &str, title: &str) -> Result<(), ParleyError> {
    let id = id.to_string();
    let title = title.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "UPDATE conversations SET title = ?1 WHERE id = ?2",
                params![title, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a conversation and everything hanging off it, returning the
/// deleted record if it existed.
///
/// Turns and stream sessions go with it via `ON DELETE CASCADE`; the select
/// and delete run inside one transaction.
pub async fn delete_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Conversation>> {
            let tx = conn.transaction()?;
            let existing = {
                let mut stmt = tx.prepare(
                    "SELECT id, owner_id, title, visibility, created_at
                     FROM conversations WHERE id = ?1",
                )?;
                match stmt.query_row(params![id], row_to_conversation) {
                    Ok(conversation) => Some(conversation),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e),
                }
            };
            if existing.is_some() {
                tx.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(existing)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    let visibility_raw: String = row.get(3)?;
    let visibility = Visibility::from_str(&visibility_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Conversation {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        visibility,
        created_at: row.get(4)?,
    })
}
