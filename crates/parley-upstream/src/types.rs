// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the vendor generation API, request and SSE payloads.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A generation request on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Upstream model name.
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<WireMessage>,

    /// System prompt, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Whether to stream the response.
    pub stream: bool,

    /// Tool definitions available to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
}

/// A single message in the vendor conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Typed content blocks.
    pub content: Vec<WireBlock>,
}

/// A typed content block within a message or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireBlock {
    Text { text: String },
    Reasoning { text: String },
    /// Tool invocation emitted by the model.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Tool output fed back by the caller.
    ToolResult {
        tool_use_id: String,
        content: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// A tool definition on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTool {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's input.
    pub input_schema: serde_json::Value,
}

// --- Response types ---

/// A full non-streaming response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<WireBlock>,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: WireUsage,
}

impl GenerateResponse {
    /// Concatenated text of all `Text` blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                WireBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

// --- SSE event payloads ---

/// SSE event: block_start
#[derive(Debug, Clone, Deserialize)]
pub struct SseBlockStart {
    pub index: usize,
    pub block: WireBlock,
}

/// SSE event: block_delta
#[derive(Debug, Clone, Deserialize)]
pub struct SseBlockDelta {
    pub index: usize,
    pub delta: SseDelta,
}

/// A delta update within a content block.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseDelta {
    /// Appends visible text to the current block.
    TextDelta { text: String },
    /// Appends reasoning text to the current block.
    ReasoningDelta { text: String },
    /// Appends partial JSON to a tool_use block's input.
    InputJsonDelta { partial_json: String },
}

/// SSE event: block_stop
#[derive(Debug, Clone, Deserialize)]
pub struct SseBlockStop {
    pub index: usize,
}

/// SSE event: message_delta (stop reason, usage update).
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageDelta {
    pub stop_reason: Option<String>,
}

/// SSE event: error
#[derive(Debug, Clone, Deserialize)]
pub struct SseError {
    pub error: ErrorDetail,
}

/// Error body shared by SSE error events and non-streaming error responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}

/// API error response (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
}
