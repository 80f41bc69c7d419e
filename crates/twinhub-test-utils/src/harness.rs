// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring a client to a fake backend.
//!
//! `TestHub` assembles an [`IotHubClient`] whose transport is a
//! [`FakeTwinBackend`], together with a connection string the backend
//! accepts.

use std::sync::Arc;
use std::time::Duration;

use twinhub_core::TwinhubError;
use twinhub_iothub::{ClientOptions, ConnectionString, IotHubClient};

use crate::fake_backend::FakeTwinBackend;

/// Policy-scoped connection string used throughout the tests.
pub const ADMIN_CONNECTION_STRING: &str =
    "HostName=localhost;SharedAccessKeyName=admin;SharedAccessKey=c3VwZXIgc2VjcmV0Cg==";

/// Builder for [`TestHub`].
pub struct TestHubBuilder {
    twins: u32,
    page_size: Option<u32>,
    latency: Option<Duration>,
}

impl TestHubBuilder {
    fn new() -> Self {
        Self {
            twins: 0,
            page_size: None,
            latency: None,
        }
    }

    /// Number of twins the backend holds.
    pub fn with_twins(mut self, twins: u32) -> Self {
        self.twins = twins;
        self
    }

    /// Page size the client requests.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Delay applied to every backend response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn build(self) -> Result<TestHub, TwinhubError> {
        let mut backend = FakeTwinBackend::new(self.twins);
        if let Some(latency) = self.latency {
            backend = backend.with_latency(latency);
        }
        let backend = Arc::new(backend);

        let mut options = ClientOptions::new().with_transport(backend.clone());
        if let Some(page_size) = self.page_size {
            options = options.with_page_size(page_size);
        }
        let client = IotHubClient::new(options)?;
        let connection_string = ConnectionString::parse(ADMIN_CONNECTION_STRING)?;

        Ok(TestHub {
            client,
            backend,
            connection_string,
        })
    }
}

/// A client connected to an in-memory backend.
pub struct TestHub {
    pub client: IotHubClient,
    pub backend: Arc<FakeTwinBackend>,
    pub connection_string: ConnectionString,
}

impl TestHub {
    pub fn builder() -> TestHubBuilder {
        TestHubBuilder::new()
    }
}
