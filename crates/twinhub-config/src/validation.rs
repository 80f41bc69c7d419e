// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TwinhubConfig;

/// Largest page size the registry accepts for twin enumeration.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TwinhubConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let iothub = &config.iothub;

    if iothub.api_version.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "iothub.api_version must not be empty".to_string(),
        });
    }

    if iothub.page_size == 0 || iothub.page_size > MAX_PAGE_SIZE {
        errors.push(ConfigError::Validation {
            message: format!(
                "iothub.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                iothub.page_size
            ),
        });
    }

    if iothub.token_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "iothub.token_ttl_secs must be positive".to_string(),
        });
    }

    if iothub.request_timeout_secs == Some(0) {
        errors.push(ConfigError::Validation {
            message: "iothub.request_timeout_secs must be positive when set".to_string(),
        });
    }

    if let Some(conn) = &iothub.connection_string
        && conn.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "iothub.connection_string must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
