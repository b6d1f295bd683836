// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait for durable conversation persistence.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{Conversation, ConversationTurn, Document, StreamSession};

/// Durable persistence of conversations, turns, stream sessions, and tool
/// documents.
///
/// All writes are durable on return. Turns are append-only: a
/// [`ConversationTurn`] is written atomically or not at all, and
/// `append_turns` commits every given turn in one transaction.
#[async_trait]
pub trait MessageStore: Send + Sync {
    // --- Conversations ---

    async fn create_conversation(&self, conversation: &Conversation)
        -> Result<(), ParleyError>;

    async fn get_conversation(&self, id: &str)
        -> Result<Option<Conversation>, ParleyError>;

    async fn update_title(&self, id: &str, title: &str) -> Result<(), ParleyError>;

    /// Deletes a conversation and all of its turns and stream sessions,
    /// returning the deleted record if it existed.
    async fn delete_conversation(&self, id: &str)
        -> Result<Option<Conversation>, ParleyError>;

    // --- Turns ---

    /// Returns all turns for a conversation in chronological order.
    async fn get_turns(&self, conversation_id: &str)
        -> Result<Vec<ConversationTurn>, ParleyError>;

    /// Appends turns atomically: all commit or none do.
    async fn append_turns(&self, turns: &[ConversationTurn]) -> Result<(), ParleyError>;

    /// Counts user-role turns created by `owner_id` within the trailing
    /// `window_hours`. Drives the rolling daily rate limit.
    async fn count_recent_turns(
        &self,
        owner_id: &str,
        window_hours: i64,
    ) -> Result<i64, ParleyError>;

    // --- Stream sessions ---

    async fn create_stream_session(&self, session: &StreamSession)
        -> Result<(), ParleyError>;

    /// The most recently created stream session for a conversation, if any.
    async fn latest_stream_session(
        &self,
        conversation_id: &str,
    ) -> Result<Option<StreamSession>, ParleyError>;

    // --- Documents (tool surface) ---

    async fn upsert_document(&self, document: &Document) -> Result<(), ParleyError>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>, ParleyError>;
}
