//! Blocking client for the accounts API.
//!
//! # Overview
//! Creates, fetches and deletes account records over HTTP with JSON bodies
//! wrapped in a `{"data": ...}` envelope. Every network call runs under a
//! bounded retry policy.
//!
//! # Design
//! - `AccountsClient` is immutable after construction; it holds a
//!   `ClientConfig` and an `Arc<dyn Transport>` and is safe to share across
//!   threads.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit and the
//!   transport can be swapped out in tests.
//! - Errors come in two views: the typed `ApiError` from `try_*`, and the
//!   coarse `Outcome` from `create`/`fetch`/`delete`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod retry;
pub mod types;

pub use client::AccountsClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Outcome};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use retry::{Backoff, RetryPolicy};
pub use types::{AccountApiPayload, AccountAttributes, AccountData};
