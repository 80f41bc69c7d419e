// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the twinhub client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at load time.

use serde::{Deserialize, Serialize};

/// Top-level twinhub configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwinhubConfig {
    /// Device registry client settings.
    #[serde(default)]
    pub iothub: IotHubConfig,
}

/// Device registry client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IotHubConfig {
    /// Shared-access connection string. `None` means the caller passes one
    /// per call.
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Value of the `api-version` query parameter.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Number of twins requested per page during enumeration.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout applied by the HTTP transport. `None` disables it.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Validity window of generated SAS tokens.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Use `https` endpoints. Disable only for local gateways.
    #[serde(default = "default_require_tls")]
    pub require_tls: bool,
}

impl Default for IotHubConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            api_version: default_api_version(),
            page_size: default_page_size(),
            request_timeout_secs: None,
            token_ttl_secs: default_token_ttl_secs(),
            require_tls: default_require_tls(),
        }
    }
}

fn default_api_version() -> String {
    "2021-04-12".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_token_ttl_secs() -> u64 {
    3600
}

fn default_require_tls() -> bool {
    true
}
