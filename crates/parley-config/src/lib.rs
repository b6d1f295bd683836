// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Parley chat relay.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), file hierarchy lookup, and environment variable
//! overrides.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ParleyConfig;
pub use validation::validate_config;

use parley_core::ParleyError;

/// Load configuration from the file hierarchy and validate it.
pub fn load_and_validate() -> Result<ParleyConfig, ParleyError> {
    let config = loader::load_config()
        .map_err(|e| ParleyError::Config(e.to_string()))?;
    validation::validate_config(&config)?;
    Ok(config)
}
