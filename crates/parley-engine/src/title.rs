// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background conversation title generation.
//!
//! Fired when a conversation is created. Failure is non-fatal: the
//! conversation keeps its placeholder title and the error goes to the logs.

use std::sync::Arc;

use parley_core::types::{BackendMessage, ContentPart, GenerationRequest, Role};
use parley_core::{MessageStore, ModelBackend};
use tracing::{debug, warn};

use crate::prompt::TITLE_PROMPT;

const MAX_TITLE_CHARS: usize = 80;

/// Spawns a task that titles `conversation_id` from the first user message.
pub fn spawn_title_generation(
    store: Arc<dyn MessageStore>,
    backend: Arc<dyn ModelBackend>,
    model: String,
    max_tokens: u32,
    conversation_id: String,
    first_message: String,
) {
    tokio::spawn(async move {
        let request = GenerationRequest {
            model,
            system: Some(TITLE_PROMPT.to_string()),
            messages: vec![BackendMessage {
                role: Role::User,
                parts: vec![ContentPart::text(first_message)],
            }],
            tools: vec![],
            max_tokens,
        };

        let title = match backend.complete(request).await {
            Ok(text) => clean_title(&text),
            Err(e) => {
                warn!(conversation_id, error = %e, "title generation failed");
                return;
            }
        };
        if title.is_empty() {
            return;
        }

        match store.update_title(&conversation_id, &title).await {
            Ok(()) => debug!(conversation_id, title, "conversation titled"),
            Err(e) => warn!(conversation_id, error = %e, "failed to store title"),
        }
    });
}

fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('"').trim();
    trimmed.chars().take(MAX_TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_core::types::Conversation;
    use parley_core::types::Visibility;
    use parley_core::{BackendEventStream, ParleyError};
    use parley_storage::SqliteStore;
    use tempfile::tempdir;

    struct FixedReply(Result<String, ()>);

    #[async_trait]
    impl ModelBackend for FixedReply {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn stream(
            &self,
            _request: GenerationRequest,
        ) -> Result<BackendEventStream, ParleyError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn complete(&self, _request: GenerationRequest) -> Result<String, ParleyError> {
            self.0.clone().map_err(|_| ParleyError::Backend {
                message: "no title".into(),
                source: None,
            })
        }
    }

    #[test]
    fn clean_title_strips_quotes_and_truncates() {
        assert_eq!(clean_title("  \"Weather in Berlin\"  "), "Weather in Berlin");
        let long = "x".repeat(200);
        assert_eq!(clean_title(&long).chars().count(), MAX_TITLE_CHARS);
    }

    async fn store_with_conversation() -> (Arc<SqliteStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(SqliteStore::new(
            dir.path().join("title.db").to_str().unwrap(),
        ));
        store.initialize().await.unwrap();
        store
            .create_conversation(&Conversation {
                id: "c1".into(),
                owner_id: "alice".into(),
                title: "New conversation".into(),
                visibility: Visibility::Private,
                created_at: "2026-01-01T00:00:00.000+00:00".into(),
            })
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn successful_generation_updates_the_title() {
        let (store, _dir) = store_with_conversation().await;
        spawn_title_generation(
            store.clone(),
            Arc::new(FixedReply(Ok("Berlin weather".into()))),
            "vendor-lite-1".into(),
            64,
            "c1".into(),
            "what's the weather in berlin?".into(),
        );

        // The task is fire-and-forget; poll until it lands.
        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            let title = store.get_conversation("c1").await.unwrap().unwrap().title;
            if title == "Berlin weather" {
                return;
            }
        }
        panic!("title was never updated");
    }

    #[tokio::test]
    async fn failed_generation_keeps_the_placeholder() {
        let (store, _dir) = store_with_conversation().await;
        spawn_title_generation(
            store.clone(),
            Arc::new(FixedReply(Err(()))),
            "vendor-lite-1".into(),
            64,
            "c1".into(),
            "hello".into(),
        );

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let title = store.get_conversation("c1").await.unwrap().unwrap().title;
        assert_eq!(title, "New conversation");
    }
}
