// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn persistence: atomic appends, chronological reads, and the rolling
//! rate-limit count.

use std::str::FromStr;

use parley_core::ParleyError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ContentPart, ConversationTurn, Role};

/// Append turns atomically: every turn commits in one transaction, or none do.
pub async fn append_turns(db: &Database, turns: &[ConversationTurn]) -> Result<(), ParleyError> {
    let turns = turns.to_vec();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            for turn in &turns {
                let parts = serde_json::to_string(&turn.parts)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                let attachments = serde_json::to_string(&turn.attachments)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                tx.execute(
                    "INSERT INTO turns (id, conversation_id, role, parts, attachments, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        turn.id,
                        turn.conversation_id,
                        turn.role.to_string(),
                        parts,
                        attachments,
                        turn.created_at,
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get all turns for a conversation in chronological order.
pub async fn get_turns_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<ConversationTurn>, ParleyError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<ConversationTurn>> {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, parts, attachments, created_at
                 FROM turns WHERE conversation_id = ?1
                 ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], row_to_turn)?;
            let mut turns = Vec::new();
            for row in rows {
                turns.push(row?);
            }
            Ok(turns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count user-role turns owned by `owner_id` created at or after `cutoff`
/// (RFC 3339 timestamp). Drives the trailing-24h rate limit.
pub async fn count_recent_user_turns(
    db: &Database,
    owner_id: &str,
    cutoff: &str,
) -> Result<i64, ParleyError> {
    let owner_id = owner_id.to_string();
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<i64> {
            let count = conn.query_row(
                "SELECT count(*)
                 FROM turns t
                 JOIN conversations c ON c.id = t.conversation_id
                 WHERE c.owner_id = ?1 AND t.role = 'user' AND t.created_at >= ?2",
                params![owner_id, cutoff],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_turn(row: &rusqlite::Row<'_>) -> Result<ConversationTurn, rusqlite::Error> {
    let role_raw: String = row.get(2)?;
    let role = Role::from_str(&role_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let parts_raw: String = row.get(3)?;
    let parts: Vec<ContentPart> = serde_json::from_str(&parts_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let attachments_raw: String = row.get(4)?;
    let attachments = serde_json::from_str(&attachments_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ConversationTurn {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role,
        parts,
        attachments,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::{create_conversation, get_conversation};
    use parley_core::types::{Conversation, Visibility};
    use tempfile::tempdir;

    async fn setup_db(owner: &str) -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("turns.db").to_str().unwrap())
            .await
            .unwrap();
        let conv = Conversation {
            id: "c1".to_string(),
            owner_id: owner.to_string(),
            title: "New conversation".to_string(),
            visibility: Visibility::Private,
            created_at: "2026-01-01T00:00:00.000+00:00".to_string(),
        };
        create_conversation(&db, &conv).await.unwrap();
        (db, dir)
    }

    fn make_turn(id: &str, role: Role, text: &str, created_at: &str) -> ConversationTurn {
        ConversationTurn {
            id: id.to_string(),
            conversation_id: "c1".to_string(),
            role,
            parts: vec![ContentPart::text(text)],
            attachments: vec![],
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn append_and_read_in_order() {
        let (db, _dir) = setup_db("alice").await;

        let t1 = make_turn("t1", Role::User, "hello", "2026-01-01T00:00:01.000+00:00");
        let t2 = make_turn("t2", Role::Assistant, "hi", "2026-01-01T00:00:02.000+00:00");
        append_turns(&db, &[t1.clone(), t2.clone()]).await.unwrap();

        let turns = get_turns_for_conversation(&db, "c1").await.unwrap();
        assert_eq!(turns, vec![t1, t2]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_is_atomic_on_conflict() {
        let (db, _dir) = setup_db("alice").await;

        let t1 = make_turn("t1", Role::User, "a", "2026-01-01T00:00:01.000+00:00");
        append_turns(&db, &[t1.clone()]).await.unwrap();

        // Second batch: a fresh turn plus a duplicate id. Whole batch must
        // roll back.
        let fresh = make_turn("t2", Role::Assistant, "b", "2026-01-01T00:00:02.000+00:00");
        let dup = make_turn("t1", Role::User, "c", "2026-01-01T00:00:03.000+00:00");
        let result = append_turns(&db, &[fresh, dup]).await;
        assert!(result.is_err());

        let turns = get_turns_for_conversation(&db, "c1").await.unwrap();
        assert_eq!(turns.len(), 1, "failed batch must leave no partial writes");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn parts_round_trip_through_json_column() {
        let (db, _dir) = setup_db("alice").await;

        let turn = ConversationTurn {
            id: "t1".to_string(),
            conversation_id: "c1".to_string(),
            role: Role::Assistant,
            parts: vec![
                ContentPart::Reasoning { text: "let me think".into() },
                ContentPart::text("42"),
                ContentPart::ToolResult {
                    id: "call-1".into(),
                    name: "get_weather".into(),
                    output: serde_json::json!({"temperature": 17.5}),
                },
            ],
            attachments: vec![],
            created_at: "2026-01-01T00:00:01.000+00:00".to_string(),
        };
        append_turns(&db, std::slice::from_ref(&turn)).await.unwrap();

        let turns = get_turns_for_conversation(&db, "c1").await.unwrap();
        assert_eq!(turns, vec![turn]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_count_respects_owner_role_and_cutoff() {
        let (db, _dir) = setup_db("alice").await;

        // Another user's conversation must not count toward alice.
        let other = Conversation {
            id: "c2".to_string(),
            owner_id: "bob".to_string(),
            title: "New conversation".to_string(),
            visibility: Visibility::Private,
            created_at: "2026-01-01T00:00:00.000+00:00".to_string(),
        };
        create_conversation(&db, &other).await.unwrap();

        let mut turns = vec![
            make_turn("t1", Role::User, "old", "2026-01-01T00:00:00.000+00:00"),
            make_turn("t2", Role::User, "new", "2026-01-02T06:00:00.000+00:00"),
            make_turn("t3", Role::Assistant, "reply", "2026-01-02T06:00:01.000+00:00"),
        ];
        let mut bobs = make_turn("t4", Role::User, "bob says", "2026-01-02T07:00:00.000+00:00");
        bobs.conversation_id = "c2".to_string();
        turns.push(bobs);
        append_turns(&db, &turns).await.unwrap();

        let count =
            count_recent_user_turns(&db, "alice", "2026-01-02T00:00:00.000+00:00")
                .await
                .unwrap();
        // Only t2: t1 is before the cutoff, t3 is assistant, t4 is bob's.
        assert_eq!(count, 1);

        assert!(get_conversation(&db, "c2").await.unwrap().is_some());
        db.close().await.unwrap();
    }
}
