// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device registry client.
//!
//! Provides [`IotHubClient`], which signs each request with a SAS token
//! derived from the caller's connection string, sends it through the
//! configured [`HttpTransport`], and classifies the response.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info};
use twinhub_config::IotHubConfig;
use twinhub_core::{Context, TwinhubError};

use crate::connection_string::ConnectionString;
use crate::cursor::DeviceTwinCursor;
use crate::merge::merge_devices;
use crate::options::ClientOptions;
use crate::request::{RequestBuilder, require_device_id};
use crate::response;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::types::{Device, DeviceTwin, DeviceTwinUpdate};

/// Client for the device identity registry and device twins.
///
/// Credentials are passed per call, so one client can serve several hubs.
/// Cloning is cheap and clones share the transport.
#[derive(Clone)]
pub struct IotHubClient {
    transport: Arc<dyn HttpTransport>,
    options: ClientOptions,
}

impl IotHubClient {
    /// Creates a client. Without an injected transport a reqwest client is
    /// built from the options.
    pub fn new(options: ClientOptions) -> Result<Self, TwinhubError> {
        options.validate()?;
        let transport: Arc<dyn HttpTransport> = match &options.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(ReqwestTransport::new(options.request_timeout)?),
        };
        info!(
            api_version = %options.api_version,
            page_size = options.page_size,
            custom_transport = options.transport.is_some(),
            "iothub client initialized"
        );
        Ok(Self { transport, options })
    }

    /// Creates a client from the `[iothub]` configuration section.
    pub fn from_config(config: &IotHubConfig) -> Result<Self, TwinhubError> {
        Self::new(ClientOptions::from_config(config))
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Fetches one device identity.
    pub async fn get_device(
        &self,
        ctx: &Context,
        cs: &ConnectionString,
        device_id: &str,
    ) -> Result<Device, TwinhubError> {
        let device_id = require_device_id(device_id)?;
        let request =
            RequestBuilder::new(&self.options, cs, Method::GET, &["devices", device_id]).build()?;
        let response = self.execute(ctx, request).await?;
        response::decode(&response, "device")
    }

    /// Creates or replaces a device identity.
    ///
    /// `updates` are merged in order onto an empty device (see
    /// [`merge_devices`]) and the id is then forced to `device_id`. When the
    /// merged record carries an ETag it is sent as `If-Match`, so a stale
    /// record fails with 412 instead of overwriting a newer one.
    pub async fn upsert_device<'a, I>(
        &self,
        ctx: &Context,
        cs: &ConnectionString,
        device_id: &str,
        updates: I,
    ) -> Result<Device, TwinhubError>
    where
        I: IntoIterator,
        I::Item: Into<Option<&'a Device>>,
    {
        let device_id = require_device_id(device_id)?;
        let mut device = merge_devices(updates);
        device.device_id = device_id.to_string();

        let mut builder = RequestBuilder::new(&self.options, cs, Method::PUT, &["devices", device_id])
            .json(&device)?;
        if !device.etag.is_empty() {
            builder = builder.if_match(Some(device.etag.as_str()))?;
        }
        let response = self.execute(ctx, builder.build()?).await?;
        response::decode(&response, "updated device")
    }

    /// Removes a device identity.
    ///
    /// With `etag` the delete only succeeds if the device is unchanged;
    /// without it the delete is unconditional (`If-Match: *`).
    pub async fn delete_device(
        &self,
        ctx: &Context,
        cs: &ConnectionString,
        device_id: &str,
        etag: Option<&str>,
    ) -> Result<(), TwinhubError> {
        let device_id = require_device_id(device_id)?;
        let request = RequestBuilder::new(&self.options, cs, Method::DELETE, &["devices", device_id])
            .if_match(etag)?
            .build()?;
        let response = self.execute(ctx, request).await?;
        response::ensure_success(&response)
    }

    /// Starts enumerating device twins and fetches the first page.
    ///
    /// Fails directly when the first page cannot be fetched; later page
    /// failures are recorded on the cursor.
    pub async fn get_device_twins(
        &self,
        ctx: &Context,
        cs: &ConnectionString,
    ) -> Result<DeviceTwinCursor, TwinhubError> {
        let mut cursor = DeviceTwinCursor::new(self.clone(), cs.clone());
        cursor.fetch(ctx).await?;
        Ok(cursor)
    }

    /// Fetches the twin of one device.
    pub async fn get_device_twin(
        &self,
        ctx: &Context,
        cs: &ConnectionString,
        device_id: &str,
    ) -> Result<DeviceTwin, TwinhubError> {
        let device_id = require_device_id(device_id)?;
        let request =
            RequestBuilder::new(&self.options, cs, Method::GET, &["twins", device_id]).build()?;
        let response = self.execute(ctx, request).await?;
        response::decode(&response, "device twin")
    }

    /// Patches tags and desired properties of a twin and returns the
    /// updated twin. `update.etag` becomes the `If-Match` precondition.
    pub async fn update_device_twin(
        &self,
        ctx: &Context,
        cs: &ConnectionString,
        device_id: &str,
        update: &DeviceTwinUpdate,
    ) -> Result<DeviceTwin, TwinhubError> {
        let device_id = require_device_id(device_id)?;
        let request = RequestBuilder::new(&self.options, cs, Method::PATCH, &["twins", device_id])
            .if_match(update.etag.as_deref())?
            .json(update)?
            .build()?;
        let response = self.execute(ctx, request).await?;
        response::decode(&response, "updated device twin")
    }

    /// Sends one request, bounded by `ctx`.
    ///
    /// A context that is already done fails with [`TwinhubError::Context`]
    /// without touching the transport. One that ends while the request is in
    /// flight fails with [`TwinhubError::ExecuteRequest`] caused by the
    /// context error.
    pub(crate) async fn execute(
        &self,
        ctx: &Context,
        request: HttpRequest,
    ) -> Result<HttpResponse, TwinhubError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let method = request.method.clone();
        let path = request.url.path().to_string();
        debug!(%method, %path, "sending iothub request");

        let response = ctx
            .run(self.transport.send(request))
            .await
            .map_err(TwinhubError::execute)?
            .map_err(TwinhubError::execute)?;

        debug!(%method, %path, status = response.status.as_u16(), "iothub response received");
        Ok(response)
    }
}

impl std::fmt::Debug for IotHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IotHubClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
