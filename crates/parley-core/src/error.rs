// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley chat relay.

use thiserror::Error;

/// The primary error type used across all Parley traits and core operations.
///
/// The first four variants are request-gate classifications: they are detected
/// before generation begins and surface to the client as structured 4xx
/// responses. Everything else is a post-admission failure and must reach the
/// client only as a generic "service unavailable" message; the full chain is
/// for operator-side logs.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Malformed request shape (unknown model, bad role, empty parts, ...).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No resolvable caller identity.
    #[error("unauthorized")]
    Unauthorized,

    /// Identity present but not permitted for the target resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Caller exceeded their rolling daily message quota.
    #[error("rate limit exceeded: {limit} messages per day")]
    RateLimited { limit: u32 },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Model backend errors (API failure, stream break, malformed wire data).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// True for the gate classifications that are safe to show to the caller
    /// with their real message.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            ParleyError::BadRequest(_)
                | ParleyError::Unauthorized
                | ParleyError::Forbidden(_)
                | ParleyError::RateLimited { .. }
        )
    }

    /// The message a client is allowed to see. Post-admission failures all
    /// collapse to the same generic string; detail goes to the logs only.
    pub fn client_message(&self) -> String {
        if self.is_client_fault() {
            self.to_string()
        } else {
            GENERIC_FAILURE_MESSAGE.to_string()
        }
    }
}

/// The one user-facing string for any failure after admission.
pub const GENERIC_FAILURE_MESSAGE: &str = "something went wrong, please try again";
