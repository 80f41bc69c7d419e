// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the twinhub device-registry client.
//!
//! TOML files in the XDG hierarchy plus `TWINHUB_*` environment overrides,
//! strict key checking, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use twinhub_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("page size: {}", config.iothub.page_size);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{IotHubConfig, TwinhubConfig};

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<TwinhubConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                page_size = config.iothub.page_size,
                api_version = %config.iothub.api_version,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TwinhubConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read the TOML files that may have contributed to the config, for spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/twinhub/twinhub.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("twinhub/twinhub.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("twinhub.toml"));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
