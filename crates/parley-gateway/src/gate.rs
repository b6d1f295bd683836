// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request gate: every check that must pass before any generation side
//! effect.
//!
//! Order is fixed: request shape, rate limit, conversation ownership. A
//! rejection here is the only place a client sees a real error message.

use serde::Deserialize;

use parley_core::error::ParleyError;
use parley_core::types::{ContentPart, Conversation, Identity, Role, UserTier, Visibility};

use crate::server::AppState;

/// Body of `POST /v1/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Client-chosen conversation id; created on first use.
    pub id: String,
    pub message: IncomingMessage,
    pub model_id: String,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

fn default_visibility() -> Visibility {
    Visibility::Private
}

/// Outcome of a passed gate.
pub struct Admitted {
    pub conversation: Conversation,
    /// True when this request created the conversation.
    pub created: bool,
}

/// Runs the full gate. Returns the resolved (or newly created) conversation
/// on success; no turn, session, or generation state exists yet either way.
pub async fn admit(
    state: &AppState,
    identity: &Identity,
    request: &ChatRequest,
) -> Result<Admitted, ParleyError> {
    state.registry.resolve_public(&request.model_id)?;

    if request.message.role != Role::User {
        return Err(ParleyError::BadRequest(
            "message role must be user".to_string(),
        ));
    }
    if request.message.parts.is_empty() {
        return Err(ParleyError::BadRequest(
            "message must contain at least one part".to_string(),
        ));
    }
    if request
        .message
        .parts
        .iter()
        .any(|part| !matches!(part, ContentPart::Text { .. } | ContentPart::Reasoning { .. }))
    {
        return Err(ParleyError::BadRequest(
            "message parts must be text or reasoning".to_string(),
        ));
    }

    let quota = match identity.tier {
        UserTier::Guest => state.limits.guest_daily_messages,
        UserTier::Regular => state.limits.regular_daily_messages,
    };
    let used = state.store.count_recent_turns(&identity.user_id, 24).await?;
    if used >= i64::from(quota) {
        return Err(ParleyError::RateLimited { limit: quota });
    }

    match state.store.get_conversation(&request.id).await? {
        Some(conversation) if conversation.owner_id != identity.user_id => Err(
            ParleyError::Forbidden("conversation belongs to another caller".to_string()),
        ),
        Some(conversation) => Ok(Admitted {
            conversation,
            created: false,
        }),
        None => {
            let conversation = Conversation {
                id: request.id.clone(),
                owner_id: identity.user_id.clone(),
                title: "New conversation".to_string(),
                visibility: request.visibility,
                created_at: crate::handlers::now_rfc3339(),
            };
            state.store.create_conversation(&conversation).await?;
            Ok(Admitted {
                conversation,
                created: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_parses_with_default_visibility() {
        let body = json!({
            "id": "conv-1",
            "message": {
                "role": "user",
                "parts": [{"type": "text", "text": "hello"}]
            },
            "model_id": "parley-chat"
        });
        let request: ChatRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.visibility, Visibility::Private);
        assert_eq!(request.message.role, Role::User);
        assert_eq!(request.message.parts.len(), 1);
    }

    #[test]
    fn unknown_role_is_rejected_at_parse_time() {
        let body = json!({
            "id": "conv-1",
            "message": {"role": "system", "parts": []},
            "model_id": "parley-chat"
        });
        assert!(serde_json::from_value::<ChatRequest>(body).is_err());
    }
}
