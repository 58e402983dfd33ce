//! The network service: build, execute, classify.
//!
//! # Design
//! `HttpClient` holds only construction-time configuration (base URL,
//! default headers, classification table) and an injected `HttpExecutor`.
//! Nothing is written during a call, so one client can serve any number of
//! concurrent requests without locks. Each call is a single attempt: the
//! first error is returned to the caller as is.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::builder::{build_request, decode, ApiRequest};
use crate::classify::Classification;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpExecutor, HttpRequest, HttpResponse, TransportError};

/// What datasources depend on, so they can be tested with a fake service.
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// Perform one call and return the raw response body.
    async fn request(&self, call: ApiRequest) -> Result<Vec<u8>, ApiError>;
}

/// Asynchronous client over an injected executor.
#[derive(Debug, Clone)]
pub struct HttpClient<E> {
    base_url: String,
    default_headers: BTreeMap<String, String>,
    classification: Classification,
    executor: E,
}

impl<E: HttpExecutor> HttpClient<E> {
    pub fn new(base_url: impl Into<String>, executor: E) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: BTreeMap::new(),
            classification: Classification::default(),
            executor,
        }
    }

    pub fn from_config(config: ClientConfig, executor: E) -> Self {
        Self {
            base_url: config.base_url,
            default_headers: config.default_headers,
            classification: config.classification,
            executor,
        }
    }

    pub fn with_default_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Build the request descriptor for `call` without sending it.
    pub fn build(&self, call: &ApiRequest) -> Result<HttpRequest, ApiError> {
        let request = build_request(&self.base_url, &self.default_headers, call)?;
        debug!(method = %request.method, url = %request.url, "built request");
        trace!(
            headers = request.headers.len(),
            body_bytes = request.body.as_ref().map_or(0, Vec::len),
            "request details"
        );
        Ok(request)
    }

    /// Send `call` and return the raw body of a successful response.
    ///
    /// Construction errors are returned before the executor is touched.
    #[tracing::instrument(skip_all, fields(method = %call.method, endpoint = %call.endpoint))]
    pub async fn request(&self, call: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let request = self.build(&call)?;
        let response = self.executor.execute(request).await.map_err(transport_error)?;
        self.finish(response)
    }

    /// Like `request`, but gives up with `ApiError::Cancelled` as soon as
    /// `token` is cancelled. The in-flight executor future is dropped.
    #[tracing::instrument(skip_all, fields(method = %call.method, endpoint = %call.endpoint))]
    pub async fn request_with_cancel(
        &self,
        call: ApiRequest,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, ApiError> {
        let request = self.build(&call)?;
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("request cancelled");
                return Err(ApiError::Cancelled);
            }
            result = self.executor.execute(request) => result.map_err(transport_error)?,
        };
        self.finish(response)
    }

    /// Send `call` and decode a successful body as JSON.
    pub async fn request_json<T: DeserializeOwned>(&self, call: ApiRequest) -> Result<T, ApiError> {
        let data = self.request(call).await?;
        decode(&data)
    }

    fn finish(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        let status = response.status;
        self.classification
            .classify(status, response.body)
            .inspect(|body| debug!(status, bytes = body.len(), "request succeeded"))
            .inspect_err(|e| debug!(status, error = %e, "request unsuccessful"))
    }
}

#[async_trait]
impl<E: HttpExecutor> NetworkService for HttpClient<E> {
    async fn request(&self, call: ApiRequest) -> Result<Vec<u8>, ApiError> {
        HttpClient::request(self, call).await
    }
}

fn transport_error(e: TransportError) -> ApiError {
    match e {
        TransportError::Cancelled => ApiError::Cancelled,
        other => {
            warn!(error = %other, "transport failure");
            ApiError::RequestFailed {
                description: other.to_string(),
            }
        }
    }
}
