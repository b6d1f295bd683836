// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE parser for vendor streaming responses.
//!
//! Converts a reqwest response byte stream into typed [`WireEvent`] variants
//! using the `eventsource-stream` crate for SSE protocol compliance.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use parley_core::ParleyError;

use crate::types::{SseBlockDelta, SseBlockStart, SseBlockStop, SseError, SseMessageDelta};

/// Typed SSE events from the vendor streaming protocol.
#[derive(Debug, Clone)]
pub enum WireEvent {
    /// A new content block begins.
    BlockStart(SseBlockStart),
    /// Incremental update to a content block.
    BlockDelta(SseBlockDelta),
    /// A content block has finished.
    BlockStop(SseBlockStop),
    /// A reasoning step begins.
    StepStart,
    /// A reasoning step ends.
    StepEnd,
    /// Message-level delta (stop reason).
    MessageDelta(SseMessageDelta),
    /// The message is complete.
    MessageStop,
    /// Keep-alive ping.
    Ping,
    /// Vendor error during streaming.
    Error(SseError),
}

fn parse_err(event: &str, e: serde_json::Error) -> ParleyError {
    ParleyError::Backend {
        message: format!("failed to parse {event}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Parses a streaming response into typed [`WireEvent`]s.
///
/// Unknown event names are silently skipped so the vendor can add event
/// types without breaking deployed relays.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<WireEvent, ParleyError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let parsed = match event.event.as_str() {
                    "block_start" => serde_json::from_str::<SseBlockStart>(&event.data)
                        .map(WireEvent::BlockStart)
                        .map_err(|e| parse_err("block_start", e)),
                    "block_delta" => serde_json::from_str::<SseBlockDelta>(&event.data)
                        .map(WireEvent::BlockDelta)
                        .map_err(|e| parse_err("block_delta", e)),
                    "block_stop" => serde_json::from_str::<SseBlockStop>(&event.data)
                        .map(WireEvent::BlockStop)
                        .map_err(|e| parse_err("block_stop", e)),
                    "step_start" => Ok(WireEvent::StepStart),
                    "step_end" => Ok(WireEvent::StepEnd),
                    "message_delta" => serde_json::from_str::<SseMessageDelta>(&event.data)
                        .map(WireEvent::MessageDelta)
                        .map_err(|e| parse_err("message_delta", e)),
                    "message_stop" => Ok(WireEvent::MessageStop),
                    "ping" => Ok(WireEvent::Ping),
                    "error" => serde_json::from_str::<SseError>(&event.data)
                        .map(WireEvent::Error)
                        .map_err(|e| parse_err("error", e)),
                    _ => return None,
                };
                Some(parsed)
            }
            Err(e) => Some(Err(ParleyError::Backend {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}
