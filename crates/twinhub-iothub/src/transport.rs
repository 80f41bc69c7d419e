// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The HTTP transport seam.
//!
//! [`IotHubClient`](crate::client::IotHubClient) talks to the network only
//! through [`HttpTransport`], so tests and proxies can substitute their own
//! implementation. [`ReqwestTransport`] is the default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use twinhub_core::{BoxError, TwinhubError};

/// A fully prepared outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A response with its body read to the end.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Sends one request and returns the response, or the transport failure.
///
/// Implementations perform a single attempt; the client never retries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// [`HttpTransport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client with TLS 1.2 minimum and an optional request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TwinhubError> {
        let mut builder =
            reqwest::Client::builder().min_tls_version(reqwest::tls::Version::TLS_1_2);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TwinhubError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one configured with a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn build_transport_succeeds() {
        assert!(ReqwestTransport::new(Some(Duration::from_secs(5))).is_ok());
        assert!(ReqwestTransport::new(None).is_ok());
    }

    #[tokio::test]
    async fn send_round_trips_headers_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/devices/dev-1"))
            .and(header("x-test", "yes"))
            .and(body_string("{\"a\":1}"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-ms-continuation", "AAAAZA==")
                    .set_body_string("created"),
            )
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-test", "yes".parse().unwrap());
        let request = HttpRequest {
            method: Method::PUT,
            url: Url::parse(&format!("{}/devices/dev-1", server.uri())).unwrap(),
            headers,
            body: Some(b"{\"a\":1}".to_vec()),
        };

        let transport = ReqwestTransport::new(None).unwrap();
        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, b"created");
        assert_eq!(response.headers["x-ms-continuation"], "AAAAZA==");
    }

    #[tokio::test]
    async fn connection_failure_is_an_error() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let request = HttpRequest {
            method: Method::GET,
            url: Url::parse("http://127.0.0.1:9/devices").unwrap(),
            headers: HeaderMap::new(),
            body: None,
        };
        let transport = ReqwestTransport::new(Some(Duration::from_secs(2))).unwrap();
        assert!(transport.send(request).await.is_err());
    }
}
