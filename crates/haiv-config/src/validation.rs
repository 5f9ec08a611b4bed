// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Collects every violation instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::HaivConfig;

/// Smallest accepted Argon2id memory cost in KiB.
pub const MIN_PASSWORD_MEMORY_COST: u32 = 8192;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &HaivConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.node.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "node.log_level `{}` must be one of {}",
                config.node.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.bootstrap.key_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bootstrap.key_path must not be empty".to_string(),
        });
    }

    let env_var = config.bootstrap.key_env_var.as_str();
    if env_var.is_empty()
        || !env_var
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "bootstrap.key_env_var `{env_var}` must be a non-empty name of letters, digits, and underscores"
            ),
        });
    }

    if config.password.memory_cost < MIN_PASSWORD_MEMORY_COST {
        errors.push(ConfigError::Validation {
            message: format!(
                "password.memory_cost must be at least {MIN_PASSWORD_MEMORY_COST} (8 MiB), got {}",
                config.password.memory_cost
            ),
        });
    }

    if config.password.iterations < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "password.iterations must be at least 1, got {}",
                config.password.iterations
            ),
        });
    }

    if config.password.parallelism < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "password.parallelism must be at least 1, got {}",
                config.password.parallelism
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
