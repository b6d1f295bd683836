// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley chat relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Caller authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upstream model vendor settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Per-tier rate limit settings.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Resumable stream hub settings.
    #[serde(default)]
    pub resume: ResumeConfig,

    /// Tool execution settings.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One caller credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthUser {
    /// Bearer token presented by the caller.
    pub token: String,
    /// Stable user identifier.
    pub user_id: String,
    /// Tier: "guest" or "regular".
    #[serde(default = "default_tier")]
    pub tier: String,
}

fn default_tier() -> String {
    "guest".to_string()
}

/// Caller authentication configuration.
///
/// An empty user table rejects every request (fail-closed).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Known caller credentials.
    #[serde(default)]
    pub users: Vec<AuthUser>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "parley.db".to_string()
}

/// Upstream model vendor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// API key for the vendor. `None` requires an environment override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the vendor's streaming chat endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upstream model name backing the `parley-chat` id.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Upstream model name backing the `parley-reasoning` id.
    #[serde(default = "default_reasoning_model")]
    pub reasoning_model: String,

    /// Upstream model name backing the internal title/utility id.
    #[serde(default = "default_title_model")]
    pub title_model: String,

    /// Maximum tokens per generation step.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            reasoning_model: default_reasoning_model(),
            title_model: default_title_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.upstream.example/v1/generate".to_string()
}

fn default_chat_model() -> String {
    "vendor-chat-1".to_string()
}

fn default_reasoning_model() -> String {
    "vendor-reasoning-1".to_string()
}

fn default_title_model() -> String {
    "vendor-lite-1".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

/// Per-tier rolling daily message quotas.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Daily message quota for guest-tier callers.
    #[serde(default = "default_guest_quota")]
    pub guest_daily_messages: u32,

    /// Daily message quota for regular-tier callers.
    #[serde(default = "default_regular_quota")]
    pub regular_daily_messages: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            guest_daily_messages: default_guest_quota(),
            regular_daily_messages: default_regular_quota(),
        }
    }
}

fn default_guest_quota() -> u32 {
    20
}

fn default_regular_quota() -> u32 {
    100
}

/// Resumable stream hub configuration.
///
/// When `enabled` is false the gateway falls back to plain non-resumable
/// streams; this is a deliberate, logged fallback.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResumeConfig {
    /// Enable the process-wide stream hub.
    #[serde(default = "default_resume_enabled")]
    pub enabled: bool,

    /// Events replayed to a reattaching subscriber, per stream.
    #[serde(default = "default_replay_capacity")]
    pub replay_capacity: usize,

    /// Finished streams retained for reattachment before eviction.
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            enabled: default_resume_enabled(),
            replay_capacity: default_replay_capacity(),
            max_retained: default_max_retained(),
        }
    }
}

fn default_resume_enabled() -> bool {
    true
}

fn default_replay_capacity() -> usize {
    1024
}

fn default_max_retained() -> usize {
    64
}

/// Tool execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Base URL of the weather lookup service.
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            weather_base_url: default_weather_base_url(),
        }
    }
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = ParleyConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.guest_daily_messages, 20);
        assert_eq!(config.limits.regular_daily_messages, 100);
        assert!(config.resume.enabled);
        assert!(config.auth.users.is_empty());
    }

    #[test]
    fn auth_user_tier_defaults_to_guest() {
        let toml = r#"
            token = "abc"
            user_id = "u1"
        "#;
        let user: AuthUser = toml::from_str(toml).unwrap();
        assert_eq!(user.tier, "guest");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml = r#"
            [server]
            hsot = "0.0.0.0"
        "#;
        let result: Result<ParleyConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "typo'd key must be rejected");
    }
}
