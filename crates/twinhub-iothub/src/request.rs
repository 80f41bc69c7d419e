// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated request construction.
//!
//! Everything here runs before any network I/O: an invalid connection string
//! or missing parameter fails with [`TwinhubError::PrepareRequest`].

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, IF_MATCH};
use reqwest::{Method, Url};
use serde::Serialize;
use twinhub_core::TwinhubError;

use crate::connection_string::ConnectionString;
use crate::options::ClientOptions;
use crate::sas;
use crate::transport::HttpRequest;

/// Page size hint for twin enumeration.
pub const HEADER_MAX_ITEM_COUNT: &str = "x-ms-max-item-count";

/// Opaque continuation token for twin enumeration, in both directions.
pub const HEADER_CONTINUATION: &str = "x-ms-continuation";

/// Rejects an empty device id before anything is signed or sent.
pub(crate) fn require_device_id(device_id: &str) -> Result<&str, TwinhubError> {
    if device_id.is_empty() {
        return Err(TwinhubError::prepare("missing device id"));
    }
    Ok(device_id)
}

/// Builds one [`HttpRequest`] against the connection string's endpoint.
pub struct RequestBuilder<'a> {
    options: &'a ClientOptions,
    cs: &'a ConnectionString,
    method: Method,
    segments: Vec<&'a str>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl<'a> RequestBuilder<'a> {
    /// `segments` are path segments; each is percent-encoded on its own, so a
    /// device id containing `/` stays one segment.
    pub fn new(
        options: &'a ClientOptions,
        cs: &'a ConnectionString,
        method: Method,
        segments: &[&'a str],
    ) -> Self {
        Self {
            options,
            cs,
            method,
            segments: segments.to_vec(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds an `If-Match` precondition: the quoted ETag, or `*` when unknown.
    pub fn if_match(self, etag: Option<&str>) -> Result<Self, TwinhubError> {
        let value = match etag.filter(|e| !e.is_empty()) {
            Some(etag) if etag.starts_with('"') || etag == "*" => etag.to_string(),
            Some(etag) => format!("\"{etag}\""),
            None => "*".to_string(),
        };
        let value = HeaderValue::from_str(&value).map_err(|e| TwinhubError::PrepareRequest {
            message: "invalid etag".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(self.header(IF_MATCH, value))
    }

    /// Serializes `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, TwinhubError> {
        let bytes = serde_json::to_vec(body).map_err(|e| TwinhubError::PrepareRequest {
            message: "failed to encode request body".to_string(),
            source: Some(Box::new(e)),
        })?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Validates the connection string, signs, and assembles the request.
    pub fn build(self) -> Result<HttpRequest, TwinhubError> {
        self.cs
            .validate()
            .map_err(|e| TwinhubError::PrepareRequest {
                message: "invalid connection string".to_string(),
                source: Some(Box::new(e)),
            })?;

        let mut url = Url::parse(&format!(
            "{}://{}/",
            self.options.scheme(),
            self.cs.endpoint()
        ))
        .map_err(|e| TwinhubError::PrepareRequest {
            message: format!("invalid endpoint `{}`", self.cs.endpoint()),
            source: Some(Box::new(e)),
        })?;
        url.path_segments_mut()
            .map_err(|()| TwinhubError::prepare("endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend(&self.segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.options.api_version);

        let token = sas::generate(self.cs, &sas::resource_uri(self.cs), self.options.token_ttl);
        let authorization =
            HeaderValue::from_str(&token.to_string()).map_err(|e| TwinhubError::PrepareRequest {
                message: "invalid authorization header".to_string(),
                source: Some(Box::new(e)),
            })?;

        let mut headers = self.headers;
        headers.insert(AUTHORIZATION, authorization);
        if self.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body: self.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cs() -> ConnectionString {
        ConnectionString {
            host_name: "localhost".into(),
            key: b"secret".to_vec(),
            name: "gimmeAccessPls".into(),
            ..Default::default()
        }
    }

    #[test]
    fn builds_signed_request_with_api_version() {
        let options = ClientOptions::new().with_api_version("2021-04-12");
        let cs = cs();
        let request = RequestBuilder::new(&options, &cs, Method::GET, &["devices", "dev-1"])
            .build()
            .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url.as_str(),
            "https://localhost/devices/dev-1?api-version=2021-04-12"
        );
        let auth = request.headers[AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("SharedAccessSignature sr=localhost&sig="));
        assert!(auth.ends_with("&skn=gimmeAccessPls"));
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(request.body.is_none());
    }

    #[test]
    fn uses_gateway_and_plain_http_when_configured() {
        let options = ClientOptions::new().with_tls(false);
        let mut cs = cs();
        cs.gateway_host_name = Some("localhost:8080".into());
        let request = RequestBuilder::new(&options, &cs, Method::GET, &["devices"])
            .build()
            .unwrap();
        assert_eq!(request.url.scheme(), "http");
        assert_eq!(request.url.port(), Some(8080));
        assert_eq!(request.url.path(), "/devices");
    }

    #[test]
    fn device_id_is_a_single_encoded_segment() {
        let options = ClientOptions::new();
        let cs = cs();
        let request = RequestBuilder::new(&options, &cs, Method::GET, &["devices", "a/b c"])
            .build()
            .unwrap();
        assert_eq!(request.url.path(), "/devices/a%2Fb%20c");
    }

    #[test]
    fn json_body_sets_content_type() {
        let options = ClientOptions::new();
        let cs = cs();
        let request = RequestBuilder::new(&options, &cs, Method::PUT, &["devices", "d"])
            .json(&serde_json::json!({"deviceId": "d"}))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.body.as_deref(), Some(&b"{\"deviceId\":\"d\"}"[..]));
    }

    #[test]
    fn if_match_quotes_known_etag_and_defaults_to_wildcard() {
        let options = ClientOptions::new();
        let cs = cs();
        let known = RequestBuilder::new(&options, &cs, Method::DELETE, &["devices", "d"])
            .if_match(Some("qwerty"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(known.headers[IF_MATCH], "\"qwerty\"");

        let unknown = RequestBuilder::new(&options, &cs, Method::DELETE, &["devices", "d"])
            .if_match(None)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(unknown.headers[IF_MATCH], "*");

        let already_quoted = RequestBuilder::new(&options, &cs, Method::DELETE, &["devices", "d"])
            .if_match(Some("\"abc\""))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(already_quoted.headers[IF_MATCH], "\"abc\"");
    }

    #[test]
    fn empty_device_id_is_rejected() {
        let err = require_device_id("").unwrap_err();
        assert_eq!(err.to_string(), "failed to prepare request: missing device id");
        assert_eq!(require_device_id("dev-1").unwrap(), "dev-1");
    }

    #[test]
    fn invalid_connection_string_fails_before_io() {
        let options = ClientOptions::new();
        let bad = ConnectionString {
            host_name: "localhost".into(),
            ..Default::default()
        };
        let err = RequestBuilder::new(&options, &bad, Method::GET, &["devices"])
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to prepare request: invalid connection string"
        );
        assert!(matches!(err, TwinhubError::PrepareRequest { source: Some(_), .. }));
    }
}
