// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-client configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use twinhub_config::IotHubConfig;
use twinhub_config::validation::MAX_PAGE_SIZE;
use twinhub_core::TwinhubError;

use crate::transport::HttpTransport;

/// API version sent with every request unless overridden.
pub const DEFAULT_API_VERSION: &str = "2021-04-12";

/// Twins requested per page unless overridden.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Validity of generated SAS tokens unless overridden.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Options captured once when an [`IotHubClient`](crate::client::IotHubClient)
/// is constructed.
#[derive(Clone)]
pub struct ClientOptions {
    pub(crate) transport: Option<Arc<dyn HttpTransport>>,
    pub(crate) api_version: String,
    pub(crate) page_size: u32,
    pub(crate) token_ttl: Duration,
    pub(crate) require_tls: bool,
    pub(crate) request_timeout: Option<Duration>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options taken from a loaded [`IotHubConfig`].
    pub fn from_config(config: &IotHubConfig) -> Self {
        Self {
            transport: None,
            api_version: config.api_version.clone(),
            page_size: config.page_size,
            token_ttl: Duration::from_secs(config.token_ttl_secs),
            require_tls: config.require_tls,
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Sends requests through `transport` instead of the default reqwest client.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Page size hint for twin enumeration, between 1 and
    /// [`MAX_PAGE_SIZE`]. Checked by [`IotHubClient::new`](crate::IotHubClient::new).
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// `false` addresses the endpoint over plain `http` (local gateways only).
    pub fn with_tls(mut self, require_tls: bool) -> Self {
        self.require_tls = require_tls;
        self
    }

    /// Timeout for the default transport. Ignored when a transport is injected.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rejects values the registry cannot serve; a zero page size would let
    /// an empty page with a token refetch forever.
    pub(crate) fn validate(&self) -> Result<(), TwinhubError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(TwinhubError::Config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.api_version.trim().is_empty() {
            return Err(TwinhubError::Config("api version must not be empty".into()));
        }
        Ok(())
    }

    pub(crate) fn scheme(&self) -> &'static str {
        if self.require_tls { "https" } else { "http" }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            transport: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            token_ttl: DEFAULT_TOKEN_TTL,
            require_tls: true,
            request_timeout: None,
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("transport", &self.transport.as_ref().map(|_| "custom"))
            .field("api_version", &self.api_version)
            .field("page_size", &self.page_size)
            .field("token_ttl", &self.token_ttl)
            .field("require_tls", &self.require_tls)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
