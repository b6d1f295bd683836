// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity provider trait: supplies the caller's identity, or "absent".

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::Identity;

/// Resolves a bearer credential to a caller identity.
///
/// Returning `Ok(None)` means the caller is anonymous; the request gate
/// rejects such requests as unauthorized before any side effect.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, bearer: Option<&str>) -> Result<Option<Identity>, ParleyError>;
}
