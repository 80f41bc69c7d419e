// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared-access connection strings.
//!
//! A connection string is a `;`-separated list of `Key=Value` pairs, e.g.
//! `HostName=hub.example.net;SharedAccessKeyName=registryReadWrite;SharedAccessKey=<base64>`.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use twinhub_config::IotHubConfig;
use twinhub_core::TwinhubError;

const KEY_HOST_NAME: &str = "HostName";
const KEY_DEVICE_ID: &str = "DeviceId";
const KEY_POLICY_NAME: &str = "SharedAccessKeyName";
const KEY_SHARED_KEY: &str = "SharedAccessKey";
const KEY_GATEWAY: &str = "GatewayHostName";

/// Parsed credentials and endpoint of a hub.
///
/// `key` holds the decoded symmetric secret. Values built by hand should be
/// checked with [`ConnectionString::validate`]; the client does so before
/// every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    pub host_name: String,
    pub gateway_host_name: Option<String>,
    /// Shared access policy name. Empty for device-scoped strings.
    pub name: String,
    pub key: Vec<u8>,
    /// Set for device-scoped strings.
    pub device_id: Option<String>,
}

impl ConnectionString {
    /// Parses a connection string. Unrecognized keys are ignored.
    pub fn parse(input: &str) -> Result<Self, TwinhubError> {
        let mut cs = Self::default();
        let mut encoded_key = None;

        for segment in input.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                TwinhubError::InvalidConnectionString {
                    field: "segment",
                    reason: format!("expected Key=Value, got `{segment}`"),
                }
            })?;
            let value = value.trim();
            match key.trim() {
                KEY_HOST_NAME => cs.host_name = value.to_string(),
                KEY_GATEWAY => cs.gateway_host_name = non_empty(value),
                KEY_POLICY_NAME => cs.name = value.to_string(),
                KEY_DEVICE_ID => cs.device_id = non_empty(value),
                KEY_SHARED_KEY => encoded_key = Some(value),
                _ => {}
            }
        }

        if let Some(encoded) = encoded_key {
            cs.key = STANDARD
                .decode(encoded)
                .map_err(|e| TwinhubError::InvalidConnectionString {
                    field: KEY_SHARED_KEY,
                    reason: format!("invalid base64: {e}"),
                })?;
        }

        cs.validate()?;
        Ok(cs)
    }

    /// The connection string set in the `[iothub]` configuration, if any.
    pub fn from_config(config: &IotHubConfig) -> Result<Option<Self>, TwinhubError> {
        config.connection_string.as_deref().map(Self::parse).transpose()
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), TwinhubError> {
        if self.host_name.trim().is_empty() {
            return Err(missing(KEY_HOST_NAME));
        }
        if self.key.is_empty() {
            return Err(missing(KEY_SHARED_KEY));
        }
        if self.name.is_empty() && self.device_id.is_none() {
            return Err(TwinhubError::InvalidConnectionString {
                field: KEY_POLICY_NAME,
                reason: format!("one of {KEY_POLICY_NAME} or {KEY_DEVICE_ID} is required"),
            });
        }
        Ok(())
    }

    /// Host that requests are sent to: the gateway when set, else the hub.
    pub fn endpoint(&self) -> &str {
        self.gateway_host_name.as_deref().unwrap_or(&self.host_name)
    }

    /// Re-serializes into connection string form. The output contains the
    /// secret key.
    pub fn to_connection_string(&self) -> String {
        let mut parts = vec![format!("{KEY_HOST_NAME}={}", self.host_name)];
        if let Some(device_id) = &self.device_id {
            parts.push(format!("{KEY_DEVICE_ID}={device_id}"));
        }
        if !self.name.is_empty() {
            parts.push(format!("{KEY_POLICY_NAME}={}", self.name));
        }
        parts.push(format!("{KEY_SHARED_KEY}={}", STANDARD.encode(&self.key)));
        if let Some(gateway) = &self.gateway_host_name {
            parts.push(format!("{KEY_GATEWAY}={gateway}"));
        }
        parts.join(";")
    }
}

impl FromStr for ConnectionString {
    type Err = TwinhubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("host_name", &self.host_name)
            .field("gateway_host_name", &self.gateway_host_name)
            .field("name", &self.name)
            .field("key", &"[redacted]")
            .field("device_id", &self.device_id)
            .finish()
    }
}

fn missing(field: &'static str) -> TwinhubError {
    TwinhubError::InvalidConnectionString {
        field,
        reason: "missing".to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
