// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a misspelled key
//! stops the process at startup instead of silently using a default.

use serde::{Deserialize, Serialize};

/// Top-level Haiv configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HaivConfig {
    /// Process-level settings.
    #[serde(default)]
    pub node: NodeConfig,

    /// Credential record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Bootstrap key location.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Admin password hashing cost.
    #[serde(default)]
    pub password: PasswordConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Credential record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding credential records.
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
    ".haiv/credentials.db".to_string()
}

/// Where the node's bootstrap key lives.
///
/// The environment variable takes precedence over the file when it holds
/// well-formed hex.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Key file path, written with owner-only permissions.
    #[serde(default = "default_key_path")]
    pub key_path: String,

    /// Name of the environment variable holding the key as hex.
    #[serde(default = "default_key_env_var")]
    pub key_env_var: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
            key_env_var: default_key_env_var(),
        }
    }
}

fn default_key_path() -> String {
    ".haiv/bootstrap.key".to_string()
}

/// Default name of the bootstrap key environment variable.
pub const DEFAULT_KEY_ENV_VAR: &str = "HAIV_BOOTSTRAP_KEY";

fn default_key_env_var() -> String {
    DEFAULT_KEY_ENV_VAR.to_string()
}

/// Argon2id cost parameters for the admin password hash.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 19456 = 19 MiB).
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,

    /// Iteration count (default: 2).
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Parallelism lanes (default: 1).
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_memory_cost(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_memory_cost() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
