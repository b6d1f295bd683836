// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vendor generation API client for Parley.
//!
//! [`UpstreamClient`] speaks the vendor's HTTP and SSE protocols;
//! [`HttpBackend`] adapts it to the [`parley_core::ModelBackend`] trait
//! consumed by the engine.

pub mod backend;
pub mod client;
pub mod sse;
pub mod types;

pub use backend::HttpBackend;
pub use client::UpstreamClient;
pub use sse::WireEvent;
