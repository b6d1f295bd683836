// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication for the gateway.
//!
//! Identities come from the static user table in config. An empty table
//! rejects every request (fail-closed). The resolved [`Identity`] is attached
//! to the request as an extension for downstream handlers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use parley_config::model::AuthConfig;
use parley_core::error::ParleyError;
use parley_core::traits::IdentityProvider;
use parley_core::types::{Identity, UserTier};

use crate::error::ApiError;
use crate::server::AppState;

/// Identity provider backed by the config user table.
pub struct StaticIdentityProvider {
    /// token -> identity
    users: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    pub fn from_config(auth: &AuthConfig) -> Result<Self, ParleyError> {
        let mut users = HashMap::new();
        for user in &auth.users {
            let tier = UserTier::from_str(&user.tier).map_err(|_| {
                ParleyError::Config(format!(
                    "unknown tier {:?} for user {}",
                    user.tier, user.user_id
                ))
            })?;
            users.insert(
                user.token.clone(),
                Identity {
                    user_id: user.user_id.clone(),
                    tier,
                },
            );
        }
        Ok(Self { users })
    }
}

// Tokens are credentials; keep them out of debug output.
impl fmt::Debug for StaticIdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticIdentityProvider")
            .field("users", &format!("[{} redacted]", self.users.len()))
            .finish()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, bearer: Option<&str>) -> Result<Option<Identity>, ParleyError> {
        Ok(bearer.and_then(|token| self.users.get(token).cloned()))
    }
}

/// Middleware guarding the API routes.
///
/// Resolves `Authorization: Bearer <token>` to an [`Identity`] and rejects
/// the request as unauthorized when no identity resolves.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match state.identity.resolve(bearer).await? {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        None => Err(ParleyError::Unauthorized.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::model::AuthUser;

    fn table() -> AuthConfig {
        AuthConfig {
            users: vec![
                AuthUser {
                    token: "alice-token".into(),
                    user_id: "alice".into(),
                    tier: "regular".into(),
                },
                AuthUser {
                    token: "bob-token".into(),
                    user_id: "bob".into(),
                    tier: "guest".into(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn known_token_resolves_with_tier() {
        let provider = StaticIdentityProvider::from_config(&table()).unwrap();
        let identity = provider.resolve(Some("alice-token")).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "alice");
        assert_eq!(identity.tier, UserTier::Regular);
    }

    #[tokio::test]
    async fn unknown_or_absent_token_is_anonymous() {
        let provider = StaticIdentityProvider::from_config(&table()).unwrap();
        assert!(provider.resolve(Some("wrong")).await.unwrap().is_none());
        assert!(provider.resolve(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_table_rejects_everyone() {
        let provider = StaticIdentityProvider::from_config(&AuthConfig::default()).unwrap();
        assert!(provider.resolve(Some("anything")).await.unwrap().is_none());
    }

    #[test]
    fn bad_tier_is_a_config_error() {
        let auth = AuthConfig {
            users: vec![AuthUser {
                token: "t".into(),
                user_id: "u".into(),
                tier: "platinum".into(),
            }],
        };
        let err = StaticIdentityProvider::from_config(&auth).unwrap_err();
        assert!(matches!(err, ParleyError::Config(_)));
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let provider = StaticIdentityProvider::from_config(&table()).unwrap();
        let debug = format!("{provider:?}");
        assert!(!debug.contains("alice-token"));
        assert!(debug.contains("redacted"));
    }
}
