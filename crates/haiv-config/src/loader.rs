// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based loader.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/haiv/haiv.toml`
//! 3. `~/.config/haiv/haiv.toml`
//! 4. `./haiv.toml`
//! 5. `HAIV_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HaivConfig;

/// Config files of the standard hierarchy, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/etc/haiv/haiv.toml"),
        dirs::config_dir()
            .map(|d| d.join("haiv/haiv.toml"))
            .unwrap_or_default(),
        PathBuf::from("haiv.toml"),
    ]
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<HaivConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. Used by tests.
pub fn load_config_from_str(toml_content: &str) -> Result<HaivConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HaivConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HaivConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HaivConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The unextracted Figment for the standard hierarchy.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(HaivConfig::default()));
    for path in config_file_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Environment keys (after the `HAIV_` prefix) that map onto config fields.
const ENV_KEYS: &[&str] = &[
    "node_log_level",
    "storage_database_path",
    "bootstrap_key_path",
    "bootstrap_key_env_var",
    "password_memory_cost",
    "password_iterations",
    "password_parallelism",
];

/// `HAIV_*` environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `HAIV_STORAGE_DATABASE_PATH` into
/// `storage.database.path`, so sections are mapped by prefix instead. Only
/// keys naming a config field are read: the bootstrap key variable (under
/// any configured name) shares the prefix but holds key material.
fn env_provider() -> Env {
    Env::prefixed("HAIV_")
        .filter(|key| {
            ENV_KEYS
                .iter()
                .any(|known| key.as_str().eq_ignore_ascii_case(known))
        })
        .map(|key| {
            let key_str = key.as_str().to_ascii_lowercase();
            key_str
                .replacen("node_", "node.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("bootstrap_", "bootstrap.", 1)
                .replacen("password_", "password.", 1)
                .into()
        })
}
