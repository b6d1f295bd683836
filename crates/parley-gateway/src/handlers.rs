// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for the gateway routes.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use parley_core::error::ParleyError;
use parley_core::types::{
    Conversation, ConversationTurn, Identity, OutgoingEvent, Role, StreamSession,
};
use parley_engine::{EventSink, spawn_title_generation};

use crate::error::ApiError;
use crate::gate::{self, ChatRequest};
use crate::hints::hints_from_headers;
use crate::server::AppState;

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Unauthenticated liveness probe.
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /v1/chat`: gate the request, persist the user turn and a stream
/// session, then stream generation events back as SSE.
///
/// Generation runs in a spawned task that owns persistence; with the hub
/// enabled a client disconnect leaves the stream resumable.
pub async fn post_chat(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let admitted = gate::admit(&state, &identity, &request).await?;
    let conversation = admitted.conversation;

    let turn = ConversationTurn {
        id: uuid::Uuid::new_v4().to_string(),
        conversation_id: conversation.id.clone(),
        role: Role::User,
        parts: request.message.parts.clone(),
        attachments: Vec::new(),
        created_at: now_rfc3339(),
    };
    state.store.append_turns(std::slice::from_ref(&turn)).await?;

    let session = StreamSession {
        id: uuid::Uuid::new_v4().to_string(),
        conversation_id: conversation.id.clone(),
        created_at: now_rfc3339(),
    };
    state.store.create_stream_session(&session).await?;

    if admitted.created {
        let title_spec = state.registry.title_spec();
        spawn_title_generation(
            state.store.clone(),
            title_spec.backend.clone(),
            title_spec.upstream_model.clone(),
            state.max_tokens,
            conversation.id.clone(),
            first_text(&request.message.parts),
        );
    }

    let history = state.store.get_turns(&conversation.id).await?;
    let hints = hints_from_headers(&headers);

    let (sink, rx) = match &state.hub {
        Some(hub) => {
            let publisher = hub.open(&session.id);
            let Some(rx) = hub.subscribe(&session.id) else {
                return Err(ParleyError::Internal(
                    "freshly opened stream is unknown to the hub".to_string(),
                )
                .into());
            };
            (EventSink::Hub(publisher), rx)
        }
        None => {
            debug!("stream hub disabled; serving a plain stream");
            let (tx, rx) = mpsc::unbounded_channel();
            (EventSink::Plain(tx), rx)
        }
    };

    let orchestrator = state.orchestrator.clone();
    let owner_id = identity.user_id.clone();
    let model_id = request.model_id.clone();
    let conversation_id = conversation.id.clone();
    tokio::spawn(async move {
        orchestrator
            .generate(&conversation_id, &owner_id, &model_id, &hints, history, &sink)
            .await;
    });

    Ok(sse_response(rx).into_response())
}

/// `GET /v1/chat/{id}/stream`: reattach to the most recent stream session.
///
/// 204 whenever nothing is resumable: unknown conversation, hub disabled,
/// no session on record, or the session already evicted.
pub async fn get_stream(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(conversation_id): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.get_conversation(&conversation_id).await? {
        Some(conversation) if conversation.owner_id != identity.user_id => {
            return Err(ParleyError::Forbidden(
                "conversation belongs to another caller".to_string(),
            )
            .into());
        }
        Some(_) => {}
        None => return Ok(StatusCode::NO_CONTENT.into_response()),
    }

    let Some(hub) = &state.hub else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let Some(session) = state.store.latest_stream_session(&conversation_id).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    match hub.subscribe(&session.id) {
        Some(rx) => Ok(sse_response(rx).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// `DELETE /v1/chat/{id}`: ownership-gated delete, returning the removed
/// conversation record.
pub async fn delete_chat(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    match state.store.get_conversation(&conversation_id).await? {
        None => Err(ParleyError::BadRequest(format!(
            "unknown conversation: {conversation_id}"
        ))
        .into()),
        Some(conversation) if conversation.owner_id != identity.user_id => Err(
            ParleyError::Forbidden("conversation belongs to another caller".to_string()).into(),
        ),
        Some(_) => {
            let deleted = state
                .store
                .delete_conversation(&conversation_id)
                .await?
                .ok_or_else(|| {
                    ParleyError::Internal("conversation vanished during delete".to_string())
                })?;
            Ok(Json(deleted))
        }
    }
}

fn sse_response(
    rx: mpsc::UnboundedReceiver<OutgoingEvent>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
    .map(|event| Event::default().json_data(&event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// The text the title model is asked to summarize.
fn first_text(parts: &[parley_core::types::ContentPart]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            parley_core::types::ContentPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
}
