// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ModelBackend`] implementation over the vendor HTTP API.
//!
//! Translates engine-side [`GenerationRequest`]s into wire requests and folds
//! the vendor SSE protocol into flat [`BackendEvent`]s. Tool-use input arrives
//! as partial JSON deltas and is assembled here before a `ToolCall` is
//! emitted, so downstream consumers only ever see complete inputs.

use async_trait::async_trait;
use futures::stream::StreamExt;
use parley_core::types::{BackendEvent, BackendMessage, ContentPart, GenerationRequest};
use parley_core::{BackendEventStream, ModelBackend, ParleyError};

use crate::client::UpstreamClient;
use crate::sse::WireEvent;
use crate::types::{GenerateRequest, SseDelta, WireBlock, WireMessage, WireTool};

/// Vendor-backed model backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: UpstreamClient,
}

impl HttpBackend {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

/// Tool-use block under assembly from partial JSON deltas.
struct ToolAssembly {
    id: String,
    name: String,
    initial: serde_json::Value,
    partial_json: String,
}

/// Per-stream fold state.
#[derive(Default)]
struct FoldState {
    tool: Option<ToolAssembly>,
    stop_reason: Option<String>,
}

fn to_wire_request(request: &GenerationRequest) -> GenerateRequest {
    GenerateRequest {
        model: request.model.clone(),
        messages: request.messages.iter().map(to_wire_message).collect(),
        system: request.system.clone(),
        max_tokens: request.max_tokens,
        stream: false,
        tools: if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|tool| WireTool {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        input_schema: tool.input_schema.clone(),
                    })
                    .collect(),
            )
        },
    }
}

fn to_wire_message(message: &BackendMessage) -> WireMessage {
    let content = message
        .parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } => Some(WireBlock::Text { text: text.clone() }),
            ContentPart::Reasoning { text } => Some(WireBlock::Reasoning { text: text.clone() }),
            ContentPart::ToolCall { id, name, input } => Some(WireBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            ContentPart::ToolResult { id, output, .. } => Some(WireBlock::ToolResult {
                tool_use_id: id.clone(),
                content: output.clone(),
                is_error: None,
            }),
            // Structural markers never travel back upstream.
            ContentPart::StepStart | ContentPart::StepEnd => None,
        })
        .collect();
    WireMessage {
        role: message.role.to_string(),
        content,
    }
}

/// Folds one wire event into zero or more backend events.
fn fold_event(
    state: &mut FoldState,
    event: Result<WireEvent, ParleyError>,
) -> Vec<Result<BackendEvent, ParleyError>> {
    let event = match event {
        Ok(event) => event,
        Err(e) => return vec![Err(e)],
    };
    match event {
        WireEvent::BlockStart(start) => {
            if let WireBlock::ToolUse { id, name, input } = start.block {
                state.tool = Some(ToolAssembly {
                    id,
                    name,
                    initial: input,
                    partial_json: String::new(),
                });
            }
            vec![]
        }
        WireEvent::BlockDelta(delta) => match delta.delta {
            SseDelta::TextDelta { text } => vec![Ok(BackendEvent::TextDelta(text))],
            SseDelta::ReasoningDelta { text } => {
                vec![Ok(BackendEvent::ReasoningDelta(text))]
            }
            SseDelta::InputJsonDelta { partial_json } => {
                if let Some(tool) = state.tool.as_mut() {
                    tool.partial_json.push_str(&partial_json);
                }
                vec![]
            }
        },
        WireEvent::BlockStop(_) => match state.tool.take() {
            Some(tool) => {
                let input = if tool.partial_json.is_empty() {
                    Ok(tool.initial)
                } else {
                    serde_json::from_str(&tool.partial_json).map_err(|e| {
                        ParleyError::Backend {
                            message: format!("malformed tool input JSON: {e}"),
                            source: Some(Box::new(e)),
                        }
                    })
                };
                match input {
                    Ok(input) => vec![Ok(BackendEvent::ToolCall {
                        id: tool.id,
                        name: tool.name,
                        input,
                    })],
                    Err(e) => vec![Err(e)],
                }
            }
            None => vec![],
        },
        WireEvent::StepStart => vec![Ok(BackendEvent::StepStart)],
        WireEvent::StepEnd => vec![Ok(BackendEvent::StepEnd)],
        WireEvent::MessageDelta(md) => {
            state.stop_reason = md.stop_reason;
            vec![]
        }
        WireEvent::MessageStop => vec![Ok(BackendEvent::Finished {
            stop_reason: state.stop_reason.take(),
        })],
        WireEvent::Ping => vec![],
        WireEvent::Error(err) => vec![Err(ParleyError::Backend {
            message: format!(
                "vendor stream error ({}): {}",
                err.error.type_, err.error.message
            ),
            source: None,
        })],
    }
}

#[async_trait]
impl ModelBackend for HttpBackend {
    fn name(&self) -> &str {
        "vendor-http"
    }

    async fn stream(&self, request: GenerationRequest) -> Result<BackendEventStream, ParleyError> {
        let wire = to_wire_request(&request);
        let events = self.client.stream_generate(&wire).await?;

        let folded = events
            .scan(FoldState::default(), |state, event| {
                futures::future::ready(Some(fold_event(state, event)))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(folded))
    }

    async fn complete(&self, request: GenerationRequest) -> Result<String, ParleyError> {
        let wire = to_wire_request(&request);
        let response = self.client.complete_generate(&wire).await?;
        Ok(response.text())
    }
}
