// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device identity registry and device twin client.
//!
//! Requests are authenticated with shared access signatures derived from a
//! [`ConnectionString`]; every operation takes a [`Context`] that bounds it.
//!
//! ```ignore
//! let client = IotHubClient::new(ClientOptions::new())?;
//! let cs: ConnectionString = std::env::var("IOTHUB_CONNECTION_STRING")?.parse()?;
//! let ctx = Context::background().with_timeout(Duration::from_secs(30));
//!
//! let mut twins = client.get_device_twins(&ctx, &cs).await?;
//! while twins.next(&ctx).await {
//!     let twin: DeviceTwin = twins.decode()?;
//!     println!("{} v{}", twin.device_id, twin.version);
//! }
//! ```

pub mod client;
pub mod connection_string;
pub mod cursor;
pub mod merge;
pub mod options;
pub mod request;
pub mod response;
pub mod sas;
pub mod transport;
pub mod types;

pub use client::IotHubClient;
pub use connection_string::ConnectionString;
pub use cursor::DeviceTwinCursor;
pub use merge::merge_devices;
pub use options::ClientOptions;
pub use sas::SasToken;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use twinhub_core::{Context, ContextError, HttpError, TwinhubError};
pub use types::{
    Auth, AuthType, Device, DeviceCapabilities, DeviceStatus, DeviceTwin, DeviceTwinUpdate,
    PropertyMap, SymmetricKey, TwinProperties, UpdateProperties, X509Thumbprint,
};
