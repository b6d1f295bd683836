// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Documents created by the document tools. Upsert keyed on id so an update
//! tool call overwrites in place.

use parley_core::ParleyError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Document;

pub async fn upsert_document(db: &Database, document: &Document) -> Result<(), ParleyError> {
    let document = document.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "INSERT INTO documents (id, owner_id, title, content, kind, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     content = excluded.content,
                     kind = excluded.kind",
                params![
                    document.id,
                    document.owner_id,
                    document.title,
                    document.content,
                    document.kind,
                    document.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_document(db: &Database, id: &str) -> Result<Option<Document>, ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Document>> {
            let result = conn.query_row(
                "SELECT id, owner_id, title, content, kind, created_at
                 FROM documents WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Document {
                        id: row.get(0)?,
                        owner_id: row.get(1)?,
                        title: row.get(2)?,
                        content: row.get(3)?,
                        kind: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            );
            match result {
                Ok(document) => Ok(Some(document)),
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
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("docs.db").to_str().unwrap())
            .await
            .unwrap();

        let mut doc = Document {
            id: "d1".to_string(),
            owner_id: "alice".to_string(),
            title: "Draft".to_string(),
            content: "first pass".to_string(),
            kind: "text".to_string(),
            created_at: "2026-01-01T00:00:00.000+00:00".to_string(),
        };
        upsert_document(&db, &doc).await.unwrap();

        doc.content = "second pass".to_string();
        upsert_document(&db, &doc).await.unwrap();

        let fetched = get_document(&db, "d1").await.unwrap().unwrap();
        assert_eq!(fetched.content, "second pass");
        assert_eq!(fetched.created_at, doc.created_at);

        assert!(get_document(&db, "missing").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
