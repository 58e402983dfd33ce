//! Minimal HTTP client layer for datasources.
//!
//! # Overview
//! Turns an endpoint, method, headers, query and JSON body into one outbound
//! request, executes it through an injected `HttpExecutor`, and classifies
//! the response into raw body bytes or an `ApiError`.
//!
//! # Design
//! - `build_request` is pure: no I/O, no hidden state, deterministic output.
//! - `HttpExecutor` is the only I/O boundary, so tests swap in a fake.
//! - `HttpClient` is immutable after construction and safe to share.
//! - Decoding into domain types is left to the caller (`decode`).

pub mod builder;
pub mod classify;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
#[cfg(feature = "reqwest")]
pub mod executor;
pub mod http;

pub use builder::{build_request, decode, ApiRequest};
pub use classify::{classify, Classification};
pub use client::{HttpClient, NetworkService};
pub use config::{ClientConfig, ConfigError};
pub use endpoint::Endpoint;
pub use error::ApiError;
#[cfg(feature = "reqwest")]
pub use executor::ReqwestExecutor;
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, TransportError};
pub use tokio_util::sync::CancellationToken;
