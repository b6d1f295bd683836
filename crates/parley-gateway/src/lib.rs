// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Parley chat relay.
//!
//! Serves the public surface: `POST /v1/chat` (gated, SSE), stream
//! reattachment, conversation delete, and a health probe. All admission
//! checks live in [`gate`]; everything past the gate reports failures to the
//! client only as a generic terminal event.

pub mod auth;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod hints;
pub mod server;

pub use auth::StaticIdentityProvider;
pub use error::ApiError;
pub use server::{AppState, build_router, start_server};
