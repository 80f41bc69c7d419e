// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response decoding and error classification.

use serde::de::DeserializeOwned;
use tracing::warn;
use twinhub_core::{HttpError, TwinhubError};

use crate::transport::HttpResponse;
use crate::types::ApiErrorResponse;

/// Fails with [`TwinhubError::Http`] unless the status is 2xx.
///
/// The error message comes from the service error body when it has one;
/// the status code alone decides the classification.
pub fn ensure_success(response: &HttpResponse) -> Result<(), TwinhubError> {
    let status = response.status;
    if status.is_success() {
        return Ok(());
    }

    let message =
        ApiErrorResponse::from_body(&response.body).and_then(ApiErrorResponse::into_message);
    warn!(status = status.as_u16(), message = ?message, "iothub returned an error status");

    Err(HttpError {
        status: status.as_u16(),
        message,
    }
    .into())
}

/// Checks the status, then decodes the body as JSON `T`.
///
/// `entity` names what was expected, e.g. `"device"`, and appears in the
/// decode error as "failed to decode device".
pub fn decode<T: DeserializeOwned>(
    response: &HttpResponse,
    entity: &'static str,
) -> Result<T, TwinhubError> {
    ensure_success(response)?;
    serde_json::from_slice(&response.body).map_err(|source| TwinhubError::Decode { entity, source })
}
