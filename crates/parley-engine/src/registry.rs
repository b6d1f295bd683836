// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model registry: maps public model ids to backend specs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parley_config::model::UpstreamConfig;
use parley_core::{ModelBackend, ParleyError};

/// Public id of the tool-augmented chat model.
pub const CHAT_MODEL_ID: &str = "parley-chat";
/// Public id of the reasoning model whose output needs normalization.
pub const REASONING_MODEL_ID: &str = "parley-reasoning";
/// Internal utility model for titles and suggestions; not requestable.
pub const TITLE_MODEL_ID: &str = "parley-title";

/// How one public model id is served.
#[derive(Clone)]
pub struct ModelSpec {
    pub backend: Arc<dyn ModelBackend>,
    /// Vendor-side model name.
    pub upstream_model: String,
    /// Run the part normalizer over the finished assistant parts.
    pub needs_normalization: bool,
    /// Offer the tool set to the model.
    pub supports_tools: bool,
    /// Admissible through the request gate.
    pub public: bool,
}

impl fmt::Debug for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSpec")
            .field("backend", &self.backend.name())
            .field("upstream_model", &self.upstream_model)
            .field("needs_normalization", &self.needs_normalization)
            .field("supports_tools", &self.supports_tools)
            .field("public", &self.public)
            .finish()
    }
}

/// The shipped model catalog.
pub struct ModelRegistry {
    specs: HashMap<String, ModelSpec>,
}

impl ModelRegistry {
    /// Builds the catalog with every id served by `backend`.
    pub fn new(backend: Arc<dyn ModelBackend>, upstream: &UpstreamConfig) -> Self {
        let mut specs = HashMap::new();
        specs.insert(
            CHAT_MODEL_ID.to_string(),
            ModelSpec {
                backend: backend.clone(),
                upstream_model: upstream.chat_model.clone(),
                needs_normalization: false,
                supports_tools: true,
                public: true,
            },
        );
        specs.insert(
            REASONING_MODEL_ID.to_string(),
            ModelSpec {
                backend: backend.clone(),
                upstream_model: upstream.reasoning_model.clone(),
                needs_normalization: true,
                supports_tools: false,
                public: true,
            },
        );
        specs.insert(
            TITLE_MODEL_ID.to_string(),
            ModelSpec {
                backend,
                upstream_model: upstream.title_model.clone(),
                needs_normalization: false,
                supports_tools: false,
                public: false,
            },
        );
        Self { specs }
    }

    /// Resolves any catalog id, public or internal.
    pub fn resolve(&self, model_id: &str) -> Result<&ModelSpec, ParleyError> {
        self.specs
            .get(model_id)
            .ok_or_else(|| ParleyError::BadRequest(format!("unknown model id: {model_id}")))
    }

    /// Resolves a model id for an incoming request; internal ids are treated
    /// as unknown.
    pub fn resolve_public(&self, model_id: &str) -> Result<&ModelSpec, ParleyError> {
        let spec = self.resolve(model_id)?;
        if !spec.public {
            return Err(ParleyError::BadRequest(format!(
                "unknown model id: {model_id}"
            )));
        }
        Ok(spec)
    }

    /// The internal title/utility model spec.
    pub fn title_spec(&self) -> &ModelSpec {
        &self.specs[TITLE_MODEL_ID]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_core::types::GenerationRequest;
    use parley_core::BackendEventStream;

    struct NullBackend;

    #[async_trait]
    impl ModelBackend for NullBackend {
        fn name(&self) -> &str {
            "null"
        }

        async fn stream(
            &self,
            _request: GenerationRequest,
        ) -> Result<BackendEventStream, ParleyError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn complete(&self, _request: GenerationRequest) -> Result<String, ParleyError> {
            Ok(String::new())
        }
    }

    fn registry() -> ModelRegistry {
        ModelRegistry::new(Arc::new(NullBackend), &UpstreamConfig::default())
    }

    #[test]
    fn catalog_flags_match_model_roles() {
        let registry = registry();

        let chat = registry.resolve(CHAT_MODEL_ID).unwrap();
        assert!(chat.supports_tools);
        assert!(!chat.needs_normalization);
        assert_eq!(chat.upstream_model, "vendor-chat-1");

        let reasoning = registry.resolve(REASONING_MODEL_ID).unwrap();
        assert!(!reasoning.supports_tools);
        assert!(reasoning.needs_normalization);
    }

    #[test]
    fn unknown_model_is_bad_request() {
        let err = registry().resolve("gpt-99").unwrap_err();
        assert!(matches!(err, ParleyError::BadRequest(_)));
    }

    #[test]
    fn title_model_is_not_requestable() {
        let registry = registry();
        assert!(registry.resolve(TITLE_MODEL_ID).is_ok());
        let err = registry.resolve_public(TITLE_MODEL_ID).unwrap_err();
        assert!(matches!(err, ParleyError::BadRequest(_)));
        assert!(registry.resolve_public(CHAT_MODEL_ID).is_ok());
    }
}
