// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory twin enumeration backend.
//!
//! `FakeTwinBackend` serves `GET /devices` in pages sized by the
//! `x-ms-max-item-count` request header. Its continuation token is the
//! base64 of the next index as a big-endian `u32`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::debug;
use twinhub_core::BoxError;
use twinhub_iothub::request::{HEADER_CONTINUATION, HEADER_MAX_ITEM_COUNT};
use twinhub_iothub::{DeviceTwin, HttpRequest, HttpResponse, HttpTransport, PropertyMap};

/// Page size used when a request carries no size hint.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A paginated producer of deterministic twins.
pub struct FakeTwinBackend {
    total: u32,
    latency: Option<Duration>,
    pages_served: AtomicUsize,
}

impl FakeTwinBackend {
    /// A backend holding `total` twins.
    pub fn new(total: u32) -> Self {
        Self {
            total,
            latency: None,
            pages_served: AtomicUsize::new(0),
        }
    }

    /// Delays every response by `latency` (on the tokio clock).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Successful pages returned so far.
    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }

    /// The twin stored at `index`.
    pub fn twin(index: u32) -> DeviceTwin {
        let mut desired = PropertyMap::new();
        desired.insert("index".into(), index.into());
        DeviceTwin {
            device_id: format!("device-{index:04}"),
            etag: STANDARD.encode(index.to_be_bytes()),
            status: "enabled".into(),
            version: i64::from(index) + 1,
            properties: twinhub_iothub::TwinProperties {
                desired,
                reported: PropertyMap::new(),
            },
            ..Default::default()
        }
    }

    /// Encodes the token that resumes at `index`.
    pub fn token_for(index: u32) -> String {
        STANDARD.encode(index.to_be_bytes())
    }

    fn respond(&self, request: &HttpRequest) -> HttpResponse {
        if request.method != Method::GET || request.url.path() != "/devices" {
            return error(StatusCode::NOT_FOUND, "no such route");
        }
        let authorized = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("SharedAccessSignature "));
        if !authorized {
            return error(StatusCode::UNAUTHORIZED, "missing shared access signature");
        }

        let page_size = match request.headers.get(HEADER_MAX_ITEM_COUNT) {
            None => DEFAULT_PAGE_SIZE,
            Some(v) => match v.to_str().ok().and_then(|s| s.parse::<u32>().ok()) {
                Some(n) if n > 0 => n,
                _ => return error(StatusCode::BAD_REQUEST, "invalid max item count"),
            },
        };
        let start = match request.headers.get(HEADER_CONTINUATION) {
            None => 0,
            Some(v) => match decode_token(v) {
                Some(index) => index,
                None => return error(StatusCode::BAD_REQUEST, "invalid continuation token"),
            },
        };

        let end = start.saturating_add(page_size).min(self.total);
        let twins: Vec<DeviceTwin> = (start.min(end)..end).map(Self::twin).collect();
        let body = match serde_json::to_vec(&twins) {
            Ok(body) => body,
            Err(e) => return error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        };

        let mut response = HttpResponse::new(StatusCode::OK, body);
        if end < self.total
            && let Ok(token) = HeaderValue::from_str(&Self::token_for(end))
        {
            response.headers.insert(HEADER_CONTINUATION, token);
        }
        self.pages_served.fetch_add(1, Ordering::SeqCst);
        debug!(start, end, total = self.total, "fake backend served page");
        response
    }
}

#[async_trait]
impl HttpTransport for FakeTwinBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.respond(&request))
    }
}

fn decode_token(value: &HeaderValue) -> Option<u32> {
    let bytes = STANDARD.decode(value.as_bytes()).ok()?;
    let bytes: [u8; 4] = bytes.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

fn error(status: StatusCode, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "Message": message }).to_string();
    HttpResponse::new(status, body)
}
