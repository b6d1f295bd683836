// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixed tool set offered to the tool-augmented model.
//!
//! Tool failures never abort a generation: `execute` always returns a JSON
//! value, and an `error` field inside it is the model's signal that the call
//! failed. Diagnostics go to the logs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use parley_core::types::{Document, GenerationRequest, ToolDefinition};
use parley_core::{MessageStore, ModelBackend, ParleyError};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::prompt::SUGGESTIONS_PROMPT;
use parley_core::types::{BackendMessage, ContentPart, Role};

pub const TOOL_GET_WEATHER: &str = "get_weather";
pub const TOOL_CREATE_DOCUMENT: &str = "create_document";
pub const TOOL_UPDATE_DOCUMENT: &str = "update_document";
pub const TOOL_REQUEST_SUGGESTIONS: &str = "request_suggestions";

/// Executes tool calls on behalf of the orchestrator.
pub struct ToolRuntime {
    http: reqwest::Client,
    weather_base_url: String,
    store: Arc<dyn MessageStore>,
    utility_backend: Arc<dyn ModelBackend>,
    utility_model: String,
    max_tokens: u32,
}

impl ToolRuntime {
    pub fn new(
        weather_base_url: String,
        store: Arc<dyn MessageStore>,
        utility_backend: Arc<dyn ModelBackend>,
        utility_model: String,
        max_tokens: u32,
    ) -> Result<Self, ParleyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ParleyError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            weather_base_url,
            store,
            utility_backend,
            utility_model,
            max_tokens,
        })
    }

    /// JSON Schema definitions for every tool in the set.
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: TOOL_GET_WEATHER.into(),
                description: "Get the current weather at a location.".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "latitude": {"type": "number"},
                        "longitude": {"type": "number"}
                    },
                    "required": ["latitude", "longitude"]
                }),
            },
            ToolDefinition {
                name: TOOL_CREATE_DOCUMENT.into(),
                description: "Create a document the user can keep and edit later.".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "kind": {"type": "string", "enum": ["text", "code"]},
                        "content": {"type": "string"}
                    },
                    "required": ["title", "content"]
                }),
            },
            ToolDefinition {
                name: TOOL_UPDATE_DOCUMENT.into(),
                description: "Replace the content of an existing document.".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "title": {"type": "string"},
                        "content": {"type": "string"}
                    },
                    "required": ["id", "content"]
                }),
            },
            ToolDefinition {
                name: TOOL_REQUEST_SUGGESTIONS.into(),
                description: "Produce short follow-up question suggestions for the user.".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "context": {"type": "string"}
                    },
                    "required": ["context"]
                }),
            },
        ]
    }

    /// Runs one tool call. Failures come back as `{"error": ...}` so the
    /// model can react; they are never surfaced to the client directly.
    pub async fn execute(&self, name: &str, input: &Value, owner_id: &str) -> Value {
        let result = match name {
            TOOL_GET_WEATHER => self.get_weather(input).await,
            TOOL_CREATE_DOCUMENT => self.create_document(input, owner_id).await,
            TOOL_UPDATE_DOCUMENT => self.update_document(input, owner_id).await,
            TOOL_REQUEST_SUGGESTIONS => self.request_suggestions(input).await,
            other => Err(ParleyError::Internal(format!("unknown tool: {other}"))),
        };
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                json!({"error": format!("tool {name} failed")})
            }
        }
    }

    async fn get_weather(&self, input: &Value) -> Result<Value, ParleyError> {
        let latitude = require_f64(input, "latitude")?;
        let longitude = require_f64(input, "longitude")?;

        let response = self
            .http
            .get(&self.weather_base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m,weather_code".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ParleyError::Backend {
                message: format!("weather request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(ParleyError::Backend {
                message: format!("weather service returned {}", response.status()),
                source: None,
            });
        }

        let body: Value = response.json().await.map_err(|e| ParleyError::Backend {
            message: format!("weather response was not JSON: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(latitude, longitude, "weather lookup succeeded");
        Ok(json!({
            "latitude": latitude,
            "longitude": longitude,
            "current": body.get("current").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn create_document(&self, input: &Value, owner_id: &str) -> Result<Value, ParleyError> {
        let title = require_str(input, "title")?;
        let content = require_str(input, "content")?;
        let kind = input
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or("text")
            .to_string();

        let document = Document {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            kind,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, false),
        };
        self.store.upsert_document(&document).await?;
        Ok(json!({"id": document.id, "title": document.title}))
    }

    async fn update_document(&self, input: &Value, owner_id: &str) -> Result<Value, ParleyError> {
        let id = require_str(input, "id")?;
        let content = require_str(input, "content")?;

        let mut document = self
            .store
            .get_document(id)
            .await?
            .ok_or_else(|| ParleyError::BadRequest(format!("no such document: {id}")))?;
        if document.owner_id != owner_id {
            return Err(ParleyError::Forbidden("document not owned by caller".into()));
        }

        document.content = content.to_string();
        if let Some(title) = input.get("title").and_then(Value::as_str) {
            document.title = title.to_string();
        }
        self.store.upsert_document(&document).await?;
        Ok(json!({"id": document.id, "title": document.title}))
    }

    async fn request_suggestions(&self, input: &Value) -> Result<Value, ParleyError> {
        let context = require_str(input, "context")?;
        let request = GenerationRequest {
            model: self.utility_model.clone(),
            system: Some(SUGGESTIONS_PROMPT.to_string()),
            messages: vec![BackendMessage {
                role: Role::User,
                parts: vec![ContentPart::text(context)],
            }],
            tools: vec![],
            max_tokens: self.max_tokens,
        };
        // Suggestions are decorative; a failed utility call degrades to an
        // empty list rather than an error the model has to handle.
        let suggestions = match self.utility_backend.complete(request).await {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .take(4)
                .map(str::to_string)
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!(error = %e, "suggestions call failed, returning empty list");
                Vec::new()
            }
        };
        Ok(json!({"suggestions": suggestions}))
    }
}

fn require_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ParleyError> {
    input
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ParleyError::BadRequest(format!("tool input missing field: {field}")))
}

fn require_f64(input: &Value, field: &str) -> Result<f64, ParleyError> {
    input
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| ParleyError::BadRequest(format!("tool input missing field: {field}")))
}
