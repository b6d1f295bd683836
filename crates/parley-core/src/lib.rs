// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley chat relay.
//!
//! This crate provides the foundational trait definitions, error types, the
//! canonical message model, and the part normalizer used throughout the
//! Parley workspace. Storage, backend, and gateway crates implement the
//! traits defined here.

pub mod error;
pub mod normalize;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{GENERIC_FAILURE_MESSAGE, ParleyError};
pub use normalize::normalize;
pub use types::{
    Attachment, BackendEvent, BackendMessage, ContentPart, Conversation, ConversationId,
    ConversationTurn, Document, GenerationRequest, Identity, OutgoingEvent, RequestHints,
    Role, StreamId, StreamSession, ToolDefinition, UserTier, Visibility,
};

// Re-export the collaborator traits at crate root.
pub use traits::{BackendEventStream, IdentityProvider, MessageStore, ModelBackend};
