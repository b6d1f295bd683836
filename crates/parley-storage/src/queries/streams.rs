// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream session records, used to find the most recent resumable stream of a
//! conversation.

use parley_core::ParleyError;
use rusqlite::params;

use crate::database::Database;
use crate::models::StreamSession;

pub async fn create_stream_session(
    db: &Database,
    session: &StreamSession,
) -> Result<(), ParleyError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "INSERT INTO stream_sessions (id, conversation_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![session.id, session.conversation_id, session.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recently created session for a conversation, if any.
pub async fn latest_stream_session(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<StreamSession>, ParleyError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<StreamSession>> {
            let result = conn.query_row(
                "SELECT id, conversation_id, created_at
                 FROM stream_sessions WHERE conversation_id = ?1
                 ORDER BY created_at DESC LIMIT 1",
                params![conversation_id],
                |row| {
                    Ok(StreamSession {
                        id: row.get(0)?,
                        conversation_id: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            );
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::create_conversation;
    use parley_core::types::{Conversation, Visibility};
    use tempfile::tempdir;

    #[tokio::test]
    async fn latest_session_wins() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("streams.db").to_str().unwrap())
            .await
            .unwrap();
        let conv = Conversation {
            id: "c1".to_string(),
            owner_id: "alice".to_string(),
            title: "New conversation".to_string(),
            visibility: Visibility::Private,
            created_at: "2026-01-01T00:00:00.000+00:00".to_string(),
        };
        create_conversation(&db, &conv).await.unwrap();

        assert!(latest_stream_session(&db, "c1").await.unwrap().is_none());

        let first = StreamSession {
            id: "s1".to_string(),
            conversation_id: "c1".to_string(),
            created_at: "2026-01-01T00:00:01.000+00:00".to_string(),
        };
        let second = StreamSession {
            id: "s2".to_string(),
            conversation_id: "c1".to_string(),
            created_at: "2026-01-01T00:00:02.000+00:00".to_string(),
        };
        create_stream_session(&db, &first).await.unwrap();
        create_stream_session(&db, &second).await.unwrap();

        let latest = latest_stream_session(&db, "c1").await.unwrap().unwrap();
        assert_eq!(latest, second);
        db.close().await.unwrap();
    }
}
