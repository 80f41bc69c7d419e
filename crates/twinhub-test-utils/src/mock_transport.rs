// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closure-driven transport for deterministic testing.
//!
//! `MockTransport` answers every request with a caller-supplied function and
//! records what it was sent, so tests can assert on method, path and headers
//! without a network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use twinhub_core::BoxError;
use twinhub_iothub::{HttpRequest, HttpResponse, HttpTransport};

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync;

/// A transport whose responses come from a closure.
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Answers each request with `handler`.
    pub fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers every request with the same status and body.
    pub fn respond_with(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self::new(move |_| Ok(HttpResponse::new(status, body.clone())))
    }

    /// Fails every request at the transport level with `message`.
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_| Err(message.into()))
    }

    /// Answers with the request body as a 200 response.
    pub fn echo() -> Self {
        Self::new(|request| {
            Ok(HttpResponse::new(
                StatusCode::OK,
                request.body.clone().unwrap_or_default(),
            ))
        })
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let response = (self.handler)(&request);
        self.requests.lock().await.push(request);
        response
    }
}
