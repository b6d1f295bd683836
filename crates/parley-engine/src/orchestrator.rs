// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream orchestrator: drives one generation end-to-end.
//!
//! The orchestrator resolves the backend, streams fragments to the event
//! sink as they arrive, runs tool round-trips for the tool-augmented model,
//! and persists the finished assistant turn. A mid-stream failure emits
//! exactly one terminal error event with a generic message and persists
//! nothing; detail goes to the operator logs.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use futures::StreamExt;
use parley_core::normalize::normalize;
use parley_core::types::{
    BackendEvent, BackendMessage, ContentPart, ConversationTurn, GenerationRequest,
    OutgoingEvent, RequestHints, Role,
};
use parley_core::{MessageStore, ParleyError, GENERIC_FAILURE_MESSAGE};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use crate::hub::EventSink;
use crate::prompt;
use crate::registry::ModelRegistry;
use crate::tools::ToolRuntime;

/// Bound on internal reasoning/tool-call steps per generation.
pub const MAX_STEPS: usize = 5;

pub struct Orchestrator {
    registry: Arc<ModelRegistry>,
    store: Arc<dyn MessageStore>,
    tools: Arc<ToolRuntime>,
    max_tokens: u32,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ModelRegistry>,
        store: Arc<dyn MessageStore>,
        tools: Arc<ToolRuntime>,
        max_tokens: u32,
    ) -> Self {
        Self {
            registry,
            store,
            tools,
            max_tokens,
        }
    }

    /// Runs one generation and always ends the sink with a terminal event.
    pub async fn generate(
        &self,
        conversation_id: &str,
        owner_id: &str,
        model_id: &str,
        hints: &RequestHints,
        history: Vec<ConversationTurn>,
        sink: &EventSink,
    ) {
        match self
            .run(conversation_id, owner_id, model_id, hints, history, sink)
            .await
        {
            Ok(()) => sink.send(OutgoingEvent::Finish),
            Err(e) => {
                error!(conversation_id, model_id, error = %e, "generation failed");
                sink.send(OutgoingEvent::Error {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                });
            }
        }
    }

    async fn run(
        &self,
        conversation_id: &str,
        owner_id: &str,
        model_id: &str,
        hints: &RequestHints,
        history: Vec<ConversationTurn>,
        sink: &EventSink,
    ) -> Result<(), ParleyError> {
        let spec = self.registry.resolve(model_id)?;
        let system = prompt::system_prompt(model_id, hints);
        let tool_defs = if spec.supports_tools {
            ToolRuntime::definitions()
        } else {
            Vec::new()
        };

        let mut messages: Vec<BackendMessage> = history
            .iter()
            .map(|turn| BackendMessage {
                role: turn.role,
                parts: turn.parts.clone(),
            })
            .collect();

        // Everything this generation produced, in streamed order.
        let mut produced: Vec<ContentPart> = Vec::new();

        for step in 0..MAX_STEPS {
            let request = GenerationRequest {
                model: spec.upstream_model.clone(),
                system: Some(system.clone()),
                messages: messages.clone(),
                tools: tool_defs.clone(),
                max_tokens: self.max_tokens,
            };

            let mut stream = spec.backend.stream(request).await?;
            let mut step_parts: Vec<ContentPart> = Vec::new();
            let mut tool_calls: Vec<(String, String, Value)> = Vec::new();

            while let Some(event) = stream.next().await {
                match event? {
                    BackendEvent::TextDelta(delta) => {
                        sink.send(OutgoingEvent::TextDelta {
                            delta: delta.clone(),
                        });
                        append_text(&mut step_parts, &delta);
                    }
                    BackendEvent::ReasoningDelta(delta) => {
                        sink.send(OutgoingEvent::ReasoningDelta {
                            delta: delta.clone(),
                        });
                        append_reasoning(&mut step_parts, &delta);
                    }
                    BackendEvent::ToolCall { id, name, input } => {
                        sink.send(OutgoingEvent::ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        });
                        step_parts.push(ContentPart::ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        });
                        tool_calls.push((id, name, input));
                    }
                    // Structural markers are kept for normalization but never
                    // forwarded to the client.
                    BackendEvent::StepStart => step_parts.push(ContentPart::StepStart),
                    BackendEvent::StepEnd => step_parts.push(ContentPart::StepEnd),
                    BackendEvent::Finished { stop_reason } => {
                        debug!(step, ?stop_reason, "generation step finished");
                        break;
                    }
                }
            }

            if tool_calls.is_empty() {
                produced.extend(step_parts);
                break;
            }

            // Tool round-trip: run every requested call, stream the results,
            // and extend the transcript for the next step.
            messages.push(BackendMessage {
                role: Role::Assistant,
                parts: step_parts.clone(),
            });
            produced.extend(step_parts);

            let mut result_parts = Vec::new();
            for (id, name, input) in tool_calls {
                let output = self.tools.execute(&name, &input, owner_id).await;
                sink.send(OutgoingEvent::ToolResult {
                    id: id.clone(),
                    name: name.clone(),
                    output: output.clone(),
                });
                result_parts.push(ContentPart::ToolResult { id, name, output });
            }
            produced.extend(result_parts.clone());
            messages.push(BackendMessage {
                role: Role::User,
                parts: result_parts,
            });
        }

        // Step markers never reach storage, normalized or not.
        let parts = if spec.needs_normalization {
            normalize(&produced)
        } else {
            produced.retain(|part| !part.is_structural());
            produced
        };

        let turn = ConversationTurn {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role: Role::Assistant,
            parts,
            attachments: vec![],
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, false),
        };
        self.store.append_turns(std::slice::from_ref(&turn)).await?;
        debug!(conversation_id, turn_id = %turn.id, "assistant turn persisted");
        Ok(())
    }
}

/// Coalesces a delta into the trailing `Text` part so the persisted parts
/// match the concatenation of what was streamed.
fn append_text(parts: &mut Vec<ContentPart>, delta: &str) {
    if let Some(ContentPart::Text { text }) = parts.last_mut() {
        text.push_str(delta);
    } else {
        parts.push(ContentPart::text(delta));
    }
}

fn append_reasoning(parts: &mut Vec<ContentPart>, delta: &str) {
    if let Some(ContentPart::Reasoning { text }) = parts.last_mut() {
        text.push_str(delta);
    } else {
        parts.push(ContentPart::Reasoning {
            text: delta.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_config::model::UpstreamConfig;
    use parley_core::types::{Conversation, Visibility};
    use parley_core::{BackendEventStream, ModelBackend};
    use parley_storage::SqliteStore;
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    use crate::registry::{CHAT_MODEL_ID, REASONING_MODEL_ID};
    use crate::tools::TOOL_REQUEST_SUGGESTIONS;

    /// Backend replaying one scripted event list per step.
    struct ScriptedBackend {
        steps: Mutex<Vec<Vec<Result<BackendEvent, ParleyError>>>>,
        utility_reply: String,
    }

    impl ScriptedBackend {
        fn new(steps: Vec<Vec<Result<BackendEvent, ParleyError>>>) -> Self {
            Self {
                steps: Mutex::new(steps),
                utility_reply: String::new(),
            }
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn stream(
            &self,
            _request: GenerationRequest,
        ) -> Result<BackendEventStream, ParleyError> {
            let mut steps = self.steps.lock().unwrap();
            let step = if steps.is_empty() {
                vec![Ok(BackendEvent::Finished { stop_reason: None })]
            } else {
                steps.remove(0)
            };
            Ok(Box::pin(futures::stream::iter(step)))
        }

        async fn complete(&self, _request: GenerationRequest) -> Result<String, ParleyError> {
            Ok(self.utility_reply.clone())
        }
    }

    struct Fixture {
        orchestrator: Orchestrator,
        store: Arc<SqliteStore>,
        _dir: tempfile::TempDir,
    }

    async fn fixture(backend: ScriptedBackend) -> Fixture {
        let dir = tempdir().unwrap();
        let store = Arc::new(SqliteStore::new(
            dir.path().join("orch.db").to_str().unwrap(),
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

        let backend: Arc<dyn ModelBackend> = Arc::new(backend);
        let registry = Arc::new(ModelRegistry::new(
            backend.clone(),
            &UpstreamConfig::default(),
        ));
        let tools = Arc::new(
            ToolRuntime::new(
                "http://unused".into(),
                store.clone(),
                backend,
                "vendor-lite-1".into(),
                256,
            )
            .unwrap(),
        );
        Fixture {
            orchestrator: Orchestrator::new(registry, store.clone(), tools, 256),
            store,
            _dir: dir,
        }
    }

    fn user_turn(text: &str) -> ConversationTurn {
        ConversationTurn {
            id: "t-user".into(),
            conversation_id: "c1".into(),
            role: Role::User,
            parts: vec![ContentPart::text(text)],
            attachments: vec![],
            created_at: "2026-01-01T00:00:01.000+00:00".into(),
        }
    }

    async fn collect(
        fixture: &Fixture,
        model_id: &str,
        history: Vec<ConversationTurn>,
    ) -> Vec<OutgoingEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::Plain(tx);
        fixture
            .orchestrator
            .generate("c1", "alice", model_id, &RequestHints::default(), history, &sink)
            .await;
        drop(sink);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn text_generation_streams_and_persists() {
        let fixture = fixture(ScriptedBackend::new(vec![vec![
            Ok(BackendEvent::TextDelta("Hel".into())),
            Ok(BackendEvent::TextDelta("lo".into())),
            Ok(BackendEvent::Finished {
                stop_reason: Some("end_turn".into()),
            }),
        ]]))
        .await;

        let events = collect(&fixture, CHAT_MODEL_ID, vec![user_turn("hi")]).await;
        assert_eq!(
            events,
            vec![
                OutgoingEvent::TextDelta { delta: "Hel".into() },
                OutgoingEvent::TextDelta { delta: "lo".into() },
                OutgoingEvent::Finish,
            ]
        );

        let turns = fixture.store.get_turns("c1").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[0].parts, vec![ContentPart::text("Hello")]);
        assert!(turns[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_mid_stream_emits_one_generic_error_and_persists_nothing() {
        let fixture = fixture(ScriptedBackend::new(vec![vec![
            Ok(BackendEvent::TextDelta("par".into())),
            Ok(BackendEvent::TextDelta("tial".into())),
            Err(ParleyError::Backend {
                message: "vendor exploded: secret detail".into(),
                source: None,
            }),
        ]]))
        .await;

        let events = collect(&fixture, CHAT_MODEL_ID, vec![user_turn("hi")]).await;
        let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminals.len(), 1);
        match terminals[0] {
            OutgoingEvent::Error { message } => {
                assert_eq!(message, GENERIC_FAILURE_MESSAGE);
                assert!(!message.contains("secret"));
            }
            other => panic!("expected Error, got {other:?}"),
        }

        assert!(fixture.store.get_turns("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reasoning_model_output_is_normalized_before_persistence() {
        let fixture = fixture(ScriptedBackend::new(vec![vec![
            Ok(BackendEvent::StepStart),
            Ok(BackendEvent::ReasoningDelta("thinking".into())),
            Ok(BackendEvent::TextDelta("four".into())),
            Ok(BackendEvent::StepEnd),
            Ok(BackendEvent::StepStart),
            Ok(BackendEvent::TextDelta("ty-two".into())),
            Ok(BackendEvent::StepEnd),
            Ok(BackendEvent::Finished { stop_reason: None }),
        ]]))
        .await;

        let events = collect(&fixture, REASONING_MODEL_ID, vec![user_turn("sum?")]).await;
        // Markers never reach the client.
        assert_eq!(
            events,
            vec![
                OutgoingEvent::ReasoningDelta { delta: "thinking".into() },
                OutgoingEvent::TextDelta { delta: "four".into() },
                OutgoingEvent::TextDelta { delta: "ty-two".into() },
                OutgoingEvent::Finish,
            ]
        );

        let turns = fixture.store.get_turns("c1").await.unwrap();
        assert_eq!(turns[0].parts, vec![ContentPart::text("fourty-two")]);
    }

    #[tokio::test]
    async fn step_markers_are_stripped_even_without_normalization() {
        // A backend may emit step markers for any model; they must never
        // land in storage, not just for the normalizing models.
        let fixture = fixture(ScriptedBackend::new(vec![vec![
            Ok(BackendEvent::StepStart),
            Ok(BackendEvent::TextDelta("hi".into())),
            Ok(BackendEvent::StepEnd),
            Ok(BackendEvent::Finished { stop_reason: None }),
        ]]))
        .await;

        let events = collect(&fixture, CHAT_MODEL_ID, vec![user_turn("hey")]).await;
        assert_eq!(
            events,
            vec![
                OutgoingEvent::TextDelta { delta: "hi".into() },
                OutgoingEvent::Finish,
            ]
        );

        let turns = fixture.store.get_turns("c1").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert!(turns[0].parts.iter().all(|p| !p.is_structural()));
        assert_eq!(turns[0].parts, vec![ContentPart::text("hi")]);
    }

    #[tokio::test]
    async fn tool_round_trip_feeds_results_back_and_persists_full_trace() {
        let call = BackendEvent::ToolCall {
            id: "call-1".into(),
            name: TOOL_REQUEST_SUGGESTIONS.into(),
            input: serde_json::json!({"context": "berlin"}),
        };
        let fixture = fixture(ScriptedBackend::new(vec![
            vec![
                Ok(call),
                Ok(BackendEvent::Finished {
                    stop_reason: Some("tool_use".into()),
                }),
            ],
            vec![
                Ok(BackendEvent::TextDelta("done".into())),
                Ok(BackendEvent::Finished {
                    stop_reason: Some("end_turn".into()),
                }),
            ],
        ]))
        .await;

        let events = collect(&fixture, CHAT_MODEL_ID, vec![user_turn("suggest")]).await;
        assert!(matches!(events[0], OutgoingEvent::ToolCall { .. }));
        assert!(matches!(events[1], OutgoingEvent::ToolResult { .. }));
        assert_eq!(events[2], OutgoingEvent::TextDelta { delta: "done".into() });
        assert_eq!(events[3], OutgoingEvent::Finish);

        let turns = fixture.store.get_turns("c1").await.unwrap();
        assert_eq!(turns.len(), 1);
        let parts = &turns[0].parts;
        assert!(matches!(parts[0], ContentPart::ToolCall { .. }));
        assert!(matches!(parts[1], ContentPart::ToolResult { .. }));
        assert_eq!(parts[2], ContentPart::text("done"));
    }

    #[tokio::test]
    async fn step_loop_stops_at_the_bound() {
        // Every step requests another tool call; the loop must stop after
        // MAX_STEPS and still persist what was produced.
        let steps = (0..MAX_STEPS + 3)
            .map(|i| {
                vec![
                    Ok(BackendEvent::ToolCall {
                        id: format!("call-{i}"),
                        name: TOOL_REQUEST_SUGGESTIONS.into(),
                        input: serde_json::json!({"context": "loop"}),
                    }),
                    Ok(BackendEvent::Finished {
                        stop_reason: Some("tool_use".into()),
                    }),
                ]
            })
            .collect();
        let fixture = fixture(ScriptedBackend::new(steps)).await;

        let events = collect(&fixture, CHAT_MODEL_ID, vec![user_turn("go")]).await;
        let calls = events
            .iter()
            .filter(|e| matches!(e, OutgoingEvent::ToolCall { .. }))
            .count();
        assert_eq!(calls, MAX_STEPS);
        assert_eq!(events.last(), Some(&OutgoingEvent::Finish));

        let turns = fixture.store.get_turns("c1").await.unwrap();
        assert_eq!(turns.len(), 1);
    }
}
