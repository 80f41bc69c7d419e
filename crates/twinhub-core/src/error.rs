// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the twinhub client crates.
//!
//! Every failure carries enough structure to branch on its kind without
//! string matching: use [`TwinhubError::status`], [`TwinhubError::context_error`]
//! and [`TwinhubError::is_end_of_sequence`].

use std::sync::Arc;

use thiserror::Error;

use crate::context::ContextError;

/// Boxed error used for transport failures and wrapped causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias for results produced by twinhub operations.
pub type Result<T, E = TwinhubError> = std::result::Result<T, E>;

/// The primary error type returned by every twinhub operation.
#[derive(Debug, Error)]
pub enum TwinhubError {
    /// A connection string is malformed or inconsistent.
    #[error("invalid connection string: {field}: {reason}")]
    InvalidConnectionString { field: &'static str, reason: String },

    /// The request could not be built. Raised before any network I/O.
    #[error("failed to prepare request: {message}")]
    PrepareRequest {
        message: String,
        source: Option<BoxError>,
    },

    /// The transport failed to complete the exchange.
    #[error("failed to execute request: {source}")]
    ExecuteRequest { source: BoxError },

    /// The caller's context was canceled or its deadline passed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The service answered with a non-success status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A response body did not have the expected shape.
    #[error("failed to decode {entity}: {source}")]
    Decode {
        entity: &'static str,
        source: serde_json::Error,
    },

    /// A cursor has no more elements.
    #[error("end of sequence")]
    EndOfSequence,

    /// The terminal error of a cursor, shared so that it can be reported
    /// from every later decode.
    #[error(transparent)]
    Cursor(Arc<TwinhubError>),

    /// Client configuration errors (bad option values, transport setup).
    #[error("configuration error: {0}")]
    Config(String),
}

impl TwinhubError {
    /// Shorthand for a [`TwinhubError::PrepareRequest`] without a cause.
    pub fn prepare(message: impl Into<String>) -> Self {
        Self::PrepareRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a transport failure.
    pub fn execute(source: impl Into<BoxError>) -> Self {
        Self::ExecuteRequest {
            source: source.into(),
        }
    }

    /// HTTP status code for protocol errors, looking through cursor wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status),
            Self::Cursor(inner) => inner.status(),
            _ => None,
        }
    }

    /// The cancellation or deadline error behind this failure, if any.
    ///
    /// Finds it whether it was reported directly (context checked before a
    /// request) or as the cause of a transport failure (context expired
    /// while the request was in flight).
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            Self::Context(err) => Some(*err),
            Self::Cursor(inner) => inner.context_error(),
            Self::ExecuteRequest { source } => source.downcast_ref::<ContextError>().copied(),
            _ => None,
        }
    }

    /// True when a cursor ran out of elements without failing.
    pub fn is_end_of_sequence(&self) -> bool {
        matches!(self, Self::EndOfSequence)
    }
}

/// A non-success HTTP status returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_http_error(.status, .message))]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: u16,
    /// Service-provided error message, when the body could be decoded.
    pub message: Option<String>,
}

impl HttpError {
    /// Creates an error for `status` without a service message.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            message: None,
        }
    }
}

fn render_http_error(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(msg) => format!("http error {status}: {msg}"),
        None => format!("http error {status}"),
    }
}
