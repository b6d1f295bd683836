// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`MessageStore`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use parley_core::types::{Conversation, ConversationTurn, Document, StreamSession};
use parley_core::{MessageStore, ParleyError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed message store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`SqliteStore::initialize`].
pub struct SqliteStore {
    database_path: String,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new store for the given database path.
    ///
    /// The connection is not opened until [`initialize`](Self::initialize)
    /// is called.
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            db: OnceCell::new(),
        }
    }

    /// Open the database, applying pragmas and pending migrations.
    pub async fn initialize(&self) -> Result<(), ParleyError> {
        let db = Database::open(&self.database_path).await?;
        self.db.set(db).map_err(|_| ParleyError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<(), ParleyError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }

    fn db(&self) -> Result<&Database, ParleyError> {
        self.db.get().ok_or_else(|| ParleyError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), ParleyError> {
        queries::conversations::create_conversation(self.db()?, conversation).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, ParleyError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), ParleyError> {
        queries::conversations::update_title(self.db()?, id, title).await
    }

    async fn delete_conversation(&self, id: &str) -> Result<Option<Conversation>, ParleyError> {
        queries::conversations::delete_conversation(self.db()?, id).await
    }

    async fn get_turns(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ConversationTurn>, ParleyError> {
        queries::turns::get_turns_for_conversation(self.db()?, conversation_id).await
    }

    async fn append_turns(&self, turns: &[ConversationTurn]) -> Result<(), ParleyError> {
        queries::turns::append_turns(self.db()?, turns).await
    }

    async fn count_recent_turns(
        &self,
        owner_id: &str,
        window_hours: i64,
    ) -> Result<i64, ParleyError> {
        let cutoff = (chrono::Utc::now() - chrono::Duration::hours(window_hours))
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, false);
        queries::turns::count_recent_user_turns(self.db()?, owner_id, &cutoff).await
    }

    async fn create_stream_session(&self, session: &StreamSession) -> Result<(), ParleyError> {
        queries::streams::create_stream_session(self.db()?, session).await
    }

    async fn latest_stream_session(
        &self,
        conversation_id: &str,
    ) -> Result<Option<StreamSession>, ParleyError> {
        queries::streams::latest_stream_session(self.db()?, conversation_id).await
    }

    async fn upsert_document(&self, document: &Document) -> Result<(), ParleyError> {
        queries::documents::upsert_document(self.db()?, document).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, ParleyError> {
        queries::documents::get_document(self.db()?, id).await
    }
}
