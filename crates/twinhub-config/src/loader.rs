// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./twinhub.toml` > `~/.config/twinhub/twinhub.toml` > `/etc/twinhub/twinhub.toml`
//! with environment variable overrides via `TWINHUB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TwinhubConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/twinhub/twinhub.toml` (system-wide)
/// 3. `~/.config/twinhub/twinhub.toml` (user XDG config)
/// 4. `./twinhub.toml` (local directory)
/// 5. `TWINHUB_*` environment variables
pub fn load_config() -> Result<TwinhubConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TwinhubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TwinhubConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TwinhubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TwinhubConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TwinhubConfig::default()))
        .merge(Toml::file("/etc/twinhub/twinhub.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("twinhub/twinhub.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("twinhub.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `TWINHUB_IOTHUB_PAGE_SIZE`
/// must map to `iothub.page_size`, not `iothub.page.size`. Keys reach the
/// map in their original case, so they are lowercased first.
fn env_provider() -> Env {
    Env::prefixed("TWINHUB_").map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("iothub_", "iothub.", 1)
            .into()
    })
}
