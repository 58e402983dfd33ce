//! HTTP transport types for the injectable-executor pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! builder produces an `HttpRequest`; whatever implements `HttpExecutor`
//! performs the round-trip and hands back an `HttpResponse`. Keeping the
//! executor behind a trait lets tests substitute a fake without opening a
//! socket, and lets callers pick any HTTP stack.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled request, ready for an executor.
///
/// Built by `build_request`. Header keys are unique and compared
/// case-sensitively; `body` holds the serialized JSON bytes, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

/// An HTTP response described as plain data.
///
/// Produced by an executor and consumed once by the classifier. Headers are
/// carried along but not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Failure reported by an executor before any response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// The single I/O boundary of the crate.
///
/// Implementations perform exactly one round-trip per call and report
/// non-2xx statuses as ordinary responses, never as `Err`.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<E: HttpExecutor + ?Sized> HttpExecutor for Arc<E> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<E: HttpExecutor + ?Sized> HttpExecutor for Box<E> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_serializes_as_wire_name() {
        assert_eq!(serde_json::to_string(&HttpMethod::Delete).unwrap(), r#""DELETE""#);
        let m: HttpMethod = serde_json::from_str(r#""PUT""#).unwrap();
        assert_eq!(m, HttpMethod::Put);
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }
}
