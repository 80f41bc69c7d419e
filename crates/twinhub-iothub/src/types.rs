// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device registry request/response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Free-form JSON document used for twin properties and tags.
pub type PropertyMap = Map<String, Value>;

// --- Device identity ---

/// Whether a device may connect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    Enabled,
    Disabled,
}

/// How a device authenticates against the hub.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AuthType {
    /// Shared symmetric keys.
    #[default]
    Sas,
    /// Self-signed X.509 certificate identified by thumbprint.
    SelfSigned,
    /// X.509 certificate signed by a registered certificate authority.
    CertificateAuthority,
    /// Authentication disabled (module identities only).
    None,
}

/// Primary and secondary symmetric keys of a device.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetricKey {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub primary_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secondary_key: String,
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("primary_key", &redacted(&self.primary_key))
            .field("secondary_key", &redacted(&self.secondary_key))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "[redacted]" }
}

/// Certificate thumbprints for X.509 authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Thumbprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_thumbprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_thumbprint: Option<String>,
}

/// Authentication mechanism of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(rename = "type", default)]
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symmetric_key: Option<SymmetricKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint: Option<X509Thumbprint>,
}

impl Auth {
    /// Symmetric-key authentication with the given keys.
    pub fn symmetric(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            auth_type: AuthType::Sas,
            symmetric_key: Some(SymmetricKey {
                primary_key: primary.into(),
                secondary_key: secondary.into(),
            }),
            x509_thumbprint: None,
        }
    }
}

/// Feature flags of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    #[serde(default)]
    pub iot_edge: bool,
}

/// A device identity record in the registry.
///
/// Empty strings and `None` mean "not set"; see [`Device::merge`] for how
/// partial records combine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generation_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,

    /// Reported by the service; ignored on upsert.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub connection_state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Auth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<DeviceCapabilities>,
}

// --- Device twin ---

/// Desired and reported property documents of a twin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinProperties {
    pub desired: PropertyMap,
    pub reported: PropertyMap,
}

/// The cloud-synchronized state document of a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceTwin {
    pub device_id: String,
    pub etag: String,
    pub device_etag: String,
    pub authentication_type: String,
    pub connection_state: String,
    pub status: String,
    pub version: i64,
    pub last_activity_time: String,
    pub cloud_to_device_message_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<DeviceCapabilities>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: PropertyMap,
    pub properties: TwinProperties,
}

/// Desired-property section of a twin patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProperties {
    pub desired: PropertyMap,
}

/// A partial twin update. Keys set to `null` are removed by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTwinUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<PropertyMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<UpdateProperties>,
    /// Expected twin ETag; sent as `If-Match`, never in the body.
    #[serde(skip)]
    pub etag: Option<String>,
}

// --- Service errors ---

/// Error body returned by the registry.
///
/// The hub uses `Message`; gateways and proxies in front of it commonly use
/// `message` or `error`. Fields are read leniently: duplicate spellings and
/// non-string values are skipped rather than failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub message: Option<String>,
    pub exception_message: Option<String>,
}

impl ApiErrorResponse {
    const MESSAGE_KEYS: [&'static str; 3] = ["Message", "message", "error"];

    /// Reads an error body, or `None` when it is not a JSON object.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let Value::Object(fields) = serde_json::from_slice::<Value>(body).ok()? else {
            return None;
        };
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Some(Self {
            message: Self::MESSAGE_KEYS.iter().find_map(|key| text(*key)),
            exception_message: text("ExceptionMessage"),
        })
    }

    /// The most specific message available.
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.exception_message)
    }
}
