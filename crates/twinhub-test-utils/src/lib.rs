// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for twinhub integration tests.
//!
//! Provides mock transports and an in-memory backend for fast,
//! deterministic tests without a real hub.
//!
//! # Components
//!
//! - [`MockTransport`] - Closure-driven transport that records requests
//! - [`FakeTwinBackend`] - Paginated twin producer with continuation tokens
//! - [`TestHub`] - Client wired to a fake backend

pub mod fake_backend;
pub mod harness;
pub mod mock_transport;

pub use fake_backend::FakeTwinBackend;
pub use harness::{ADMIN_CONNECTION_STRING, TestHub};
pub use mock_transport::MockTransport;
