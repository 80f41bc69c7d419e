// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared access signature tokens.
//!
//! The signature is HMAC-SHA256 over `<urlencoded resource>\n<expiry>` keyed
//! with the decoded connection string key. Signing is a pure function of
//! resource, expiry and key, so fixtures can pin the expiry.

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::hmac;

use crate::connection_string::ConnectionString;

/// A signed, time-boxed authorization token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasToken {
    /// Resource URI the token grants access to (not encoded).
    pub resource: String,
    /// Expiry as unix epoch seconds.
    pub expiry: u64,
    /// Base64 HMAC-SHA256 signature.
    pub signature: String,
    /// Policy name; empty for device-scoped tokens.
    pub key_name: String,
}

impl fmt::Display for SasToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SharedAccessSignature sr={}&sig={}&se={}",
            url_encode(&self.resource),
            url_encode(&self.signature),
            self.expiry
        )?;
        if !self.key_name.is_empty() {
            write!(f, "&skn={}", url_encode(&self.key_name))?;
        }
        Ok(())
    }
}

/// Resource URI a connection string authorizes: the hub host for policy
/// credentials, `<host>/devices/<id>` for device credentials.
pub fn resource_uri(cs: &ConnectionString) -> String {
    match (&cs.device_id, cs.name.is_empty()) {
        (Some(device_id), true) => format!("{}/devices/{}", cs.host_name, device_id),
        _ => cs.host_name.clone(),
    }
}

/// Signs `resource` with the connection string key, valid until `expiry`.
pub fn sign(cs: &ConnectionString, resource: &str, expiry: u64) -> SasToken {
    let payload = format!("{}\n{}", url_encode(resource), expiry);
    let key = hmac::Key::new(hmac::HMAC_SHA256, &cs.key);
    let tag = hmac::sign(&key, payload.as_bytes());

    SasToken {
        resource: resource.to_string(),
        expiry,
        signature: STANDARD.encode(tag.as_ref()),
        key_name: cs.name.clone(),
    }
}

/// Signs `resource` for `validity` from now.
pub fn generate(cs: &ConnectionString, resource: &str, validity: Duration) -> SasToken {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    sign(cs, resource, now.saturating_add(validity.as_secs()))
}

fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
