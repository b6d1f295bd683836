// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the Parley pipeline.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod backend;
pub mod identity;
pub mod store;

pub use backend::{BackendEventStream, ModelBackend};
pub use identity::IdentityProvider;
pub use store::MessageStore;
