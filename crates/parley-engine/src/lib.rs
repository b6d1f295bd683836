// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation engine for Parley.
//!
//! Holds the model registry, the stream orchestrator with its bounded
//! tool-call loop, the fixed tool set, background title generation, and the
//! process-wide resumable stream hub.

pub mod hub;
pub mod orchestrator;
pub mod prompt;
pub mod registry;
pub mod title;
pub mod tools;

pub use hub::{global_hub, EventSink, StreamHub, StreamPublisher};
pub use orchestrator::{Orchestrator, MAX_STEPS};
pub use registry::{
    ModelRegistry, ModelSpec, CHAT_MODEL_ID, REASONING_MODEL_ID, TITLE_MODEL_ID,
};
pub use title::spawn_title_generation;
pub use tools::ToolRuntime;
