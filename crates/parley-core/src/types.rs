// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical message model and common types shared across the Parley workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a stream session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub String);

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Conversation visibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// One typed unit of message content.
///
/// `Text` and `Reasoning` carry payload a client renders. `StepStart` and
/// `StepEnd` are structural wrappers some backends emit around text fragments;
/// they must never reach storage or the client as visible content (the
/// normalizer strips them, see [`crate::normalize`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Reasoning { text: String },
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        id: String,
        name: String,
        output: serde_json::Value,
    },
    StepStart,
    StepEnd,
}

impl ContentPart {
    /// Convenience constructor for a text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// True for the structural step markers.
    pub fn is_structural(&self) -> bool {
        matches!(self, ContentPart::StepStart | ContentPart::StepEnd)
    }
}

/// A file attached to a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub name: String,
    pub media_type: String,
}

/// One role-attributed message within a conversation.
///
/// Immutable once persisted; a turn is written atomically or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub parts: Vec<ContentPart>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

/// A conversation record. Created lazily on the first turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub visibility: Visibility,
    pub created_at: String,
}

/// Resumability key for one generation request.
///
/// Created before generation starts; the reconnection window is bounded by
/// the stream hub's own retention, not tracked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSession {
    pub id: String,
    pub conversation_id: String,
    pub created_at: String,
}

/// A document created or edited through the tool set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub kind: String,
    pub created_at: String,
}

/// Caller tier, controlling the daily message quota.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    Guest,
    Regular,
}

/// A resolved caller identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub tier: UserTier,
}

/// Ambient locale/geo hints used only to parameterize the system prompt.
///
/// Optional collaborator output; generation never blocks on these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestHints {
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A discrete JSON-serializable event streamed to the client.
///
/// Each event is tagged with enough structure for incremental rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutgoingEvent {
    TextDelta { delta: String },
    ReasoningDelta { delta: String },
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        id: String,
        name: String,
        output: serde_json::Value,
    },
    /// Terminal marker for a successful stream.
    Finish,
    /// Terminal marker for a failed stream. The message is always generic.
    Error { message: String },
}

impl OutgoingEvent {
    /// True for the two terminal markers; a stream ends with exactly one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutgoingEvent::Finish | OutgoingEvent::Error { .. })
    }
}

/// A fragment produced by a model backend during one generation step.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    TextDelta(String),
    ReasoningDelta(String),
    /// Model requests a tool invocation with fully-assembled input.
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Structural wrappers used by backends flagged for normalization.
    StepStart,
    StepEnd,
    /// The backend finished the current step.
    Finished { stop_reason: Option<String> },
}

/// One message in the format a backend expects.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

/// A tool the model may invoke, described by a JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A generation request handed to a backend.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Upstream model name (already resolved from the public model id).
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<BackendMessage>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: u32,
}
