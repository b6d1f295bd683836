// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model backend trait for text-generation providers.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::ParleyError;
use crate::types::{BackendEvent, GenerationRequest};

/// A pinned, boxed stream of backend fragments.
pub type BackendEventStream =
    Pin<Box<dyn Stream<Item = Result<BackendEvent, ParleyError>> + Send>>;

/// A callable text-generation backend.
///
/// Backends expose a uniform generate capability regardless of the underlying
/// vendor; the orchestrator never inspects vendor specifics. Backend-specific
/// output conventions are reconciled downstream by the part normalizer.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Human-readable backend name, for logs.
    fn name(&self) -> &str;

    /// Runs one generation step and streams fragments as they are produced.
    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> Result<BackendEventStream, ParleyError>;

    /// Runs a non-streaming generation and returns the full text.
    ///
    /// Used for internal utility calls (title generation, suggestions).
    async fn complete(&self, request: GenerationRequest) -> Result<String, ParleyError>;
}
