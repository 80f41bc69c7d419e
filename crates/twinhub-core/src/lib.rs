// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the twinhub device-registry client.
//!
//! This crate provides the error taxonomy and the cancellation [`Context`]
//! shared by every twinhub crate.

pub mod context;
pub mod error;

// Re-export key items at crate root for ergonomic imports.
pub use context::{Context, ContextError};
pub use error::{BoxError, HttpError, Result, TwinhubError};
