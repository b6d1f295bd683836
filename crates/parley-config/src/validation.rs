// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values that
//! `deny_unknown_fields` cannot catch.

use parley_core::ParleyError;

use crate::model::ParleyConfig;

/// Validates cross-field constraints on a deserialized config.
pub fn validate_config(config: &ParleyConfig) -> Result<(), ParleyError> {
    if config.server.port == 0 {
        return Err(ParleyError::Config(
            "server.port must be non-zero".to_string(),
        ));
    }

    for user in &config.auth.users {
        if user.token.is_empty() {
            return Err(ParleyError::Config(format!(
                "auth.users entry for '{}' has an empty token",
                user.user_id
            )));
        }
        if !matches!(user.tier.as_str(), "guest" | "regular") {
            return Err(ParleyError::Config(format!(
                "auth.users entry for '{}' has unknown tier '{}' (expected guest or regular)",
                user.user_id, user.tier
            )));
        }
    }

    if config.resume.enabled && config.resume.replay_capacity == 0 {
        return Err(ParleyError::Config(
            "resume.replay_capacity must be non-zero when resume is enabled".to_string(),
        ));
    }

    Ok(())
}
