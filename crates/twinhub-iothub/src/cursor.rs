// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paginated enumeration of device twins.
//!
//! The cursor holds one page of raw JSON documents and the continuation
//! token that resumes after it. Pages are fetched lazily as the buffer runs
//! dry; the first page is fetched by
//! [`IotHubClient::get_device_twins`](crate::client::IotHubClient::get_device_twins).

use std::sync::Arc;

use futures::Stream;
use futures::stream;
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use twinhub_core::{Context, TwinhubError};

use crate::client::IotHubClient;
use crate::connection_string::ConnectionString;
use crate::request::{HEADER_CONTINUATION, HEADER_MAX_ITEM_COUNT, RequestBuilder};
use crate::response;
use crate::types::DeviceTwin;

/// Forward-only iterator over the twins of a hub.
///
/// ```ignore
/// let mut cursor = client.get_device_twins(&ctx, &cs).await?;
/// while cursor.next(&ctx).await {
///     let twin: DeviceTwin = cursor.decode()?;
/// }
/// if let Some(err) = cursor.err() {
///     return Err(err.clone());
/// }
/// ```
///
/// A failed page fetch is recorded once and ends the sequence. The cursor
/// never retries and cannot be restarted.
pub struct DeviceTwinCursor {
    client: IotHubClient,
    cs: ConnectionString,
    page: Vec<Value>,
    pos: usize,
    current: Option<Value>,
    token: Option<HeaderValue>,
    last_page: bool,
    err: Option<Arc<TwinhubError>>,
}

impl DeviceTwinCursor {
    pub(crate) fn new(client: IotHubClient, cs: ConnectionString) -> Self {
        Self {
            client,
            cs,
            page: Vec::new(),
            pos: 0,
            current: None,
            token: None,
            last_page: false,
            err: None,
        }
    }

    /// Advances to the next twin, fetching a page when the buffer is empty.
    ///
    /// Returns `false` at the end of the sequence or after a failure; check
    /// [`err`](Self::err) to tell them apart.
    pub async fn next(&mut self, ctx: &Context) -> bool {
        if self.err.is_some() {
            self.current = None;
            return false;
        }
        if let Some(err) = ctx.err() {
            debug!(error = %err, "device twin enumeration canceled");
            self.current = None;
            self.err = Some(Arc::new(TwinhubError::Context(err)));
            return false;
        }

        loop {
            if let Some(item) = self.page.get_mut(self.pos) {
                self.current = Some(item.take());
                self.pos += 1;
                return true;
            }
            self.current = None;

            if self.last_page {
                return false;
            }
            if let Err(err) = self.fetch(ctx).await {
                debug!(error = %err, "device twin enumeration stopped");
                self.err = Some(Arc::new(err));
                return false;
            }
        }
    }

    /// Decodes the current twin into `T`.
    ///
    /// Without a current element this returns the recorded failure, or
    /// [`TwinhubError::EndOfSequence`].
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TwinhubError> {
        if let Some(value) = &self.current {
            return T::deserialize(value).map_err(|source| TwinhubError::Decode {
                entity: "device twin",
                source,
            });
        }
        match &self.err {
            Some(err) => Err(TwinhubError::Cursor(Arc::clone(err))),
            None => Err(TwinhubError::EndOfSequence),
        }
    }

    /// The failure that ended the sequence, if any.
    pub fn err(&self) -> Option<&TwinhubError> {
        self.err.as_deref()
    }

    /// Adapts the cursor into a stream of decoded twins.
    ///
    /// A terminal failure is yielded once as the last item.
    pub fn into_stream(self, ctx: Context) -> impl Stream<Item = Result<DeviceTwin, TwinhubError>> {
        stream::unfold(Some((self, ctx)), |state| async move {
            let (mut cursor, ctx) = state?;
            if cursor.next(&ctx).await {
                let item = cursor.decode::<DeviceTwin>();
                return Some((item, Some((cursor, ctx))));
            }
            let err = cursor.err.clone()?;
            Some((Err(TwinhubError::Cursor(err)), None))
        })
    }

    /// Requests the next page and replaces the buffer with it.
    pub(crate) async fn fetch(&mut self, ctx: &Context) -> Result<(), TwinhubError> {
        let options = self.client.options();
        let mut builder = RequestBuilder::new(options, &self.cs, Method::GET, &["devices"])
            .header(
                HeaderName::from_static(HEADER_MAX_ITEM_COUNT),
                HeaderValue::from(options.page_size()),
            );
        if let Some(token) = &self.token {
            builder = builder.header(HeaderName::from_static(HEADER_CONTINUATION), token.clone());
        }
        let request = builder.build()?;

        let response = self.client.execute(ctx, request).await?;
        let items: Vec<Value> = response::decode(&response, "device twins")?;

        self.token = response
            .headers
            .get(HEADER_CONTINUATION)
            .filter(|token| !token.is_empty())
            .cloned();
        self.last_page = self.token.is_none();
        debug!(
            items = items.len(),
            has_token = !self.last_page,
            "device twin page received"
        );

        self.page = items;
        self.pos = 0;
        Ok(())
    }
}

impl std::fmt::Debug for DeviceTwinCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTwinCursor")
            .field("buffered", &(self.page.len() - self.pos))
            .field("has_token", &self.token.is_some())
            .field("last_page", &self.last_page)
            .field("err", &self.err)
            .finish()
    }
}
