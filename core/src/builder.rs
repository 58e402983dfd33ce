//! Pure request construction.
//!
//! # Design
//! `build_request` turns the client's fixed configuration (base URL, default
//! headers) and a per-call `ApiRequest` into an `HttpRequest`. It performs no
//! I/O and holds no state, so identical inputs always produce equal
//! descriptors. Either a complete descriptor comes back or an `ApiError`;
//! there is no partially built request.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// One call's worth of input: endpoint, method, headers, query and body.
///
/// Everything except method and endpoint is optional and starts empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    pub fn to(method: HttpMethod, endpoint: &Endpoint) -> Self {
        Self::new(method, endpoint.path())
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    /// Sets a per-call header. Overrides a default header with the same key.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(Value::Object(body));
        self
    }

    /// Uses any serializable value as the body.
    ///
    /// The value must serialize to a JSON object; anything else is rejected
    /// with `JsonConversionFailure`, here or when the request is built.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::json(format!("Error parsing the request body: {e}")))?;
        if !value.is_object() {
            return Err(ApiError::json("Error parsing the request body: not a JSON object"));
        }
        self.body = Some(value);
        Ok(self)
    }
}

/// Assemble an `HttpRequest` from client configuration and a call.
pub fn build_request(
    base_url: &str,
    default_headers: &BTreeMap<String, String>,
    call: &ApiRequest,
) -> Result<HttpRequest, ApiError> {
    let raw = format!("{base_url}{}", call.endpoint);
    let mut url = Url::parse(&raw).map_err(|e| ApiError::WrongUrl {
        description: format!("{raw} ({e})"),
    })?;

    if !call.query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(call.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        url = materialize(url)?;
    }

    let mut headers = default_headers.clone();
    headers.extend(call.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

    let body = call.body.as_ref().map(encode_body).transpose()?;

    Ok(HttpRequest {
        method: call.method,
        url,
        headers,
        body,
    })
}

/// Re-parse the URL after query items were added. Query items only make a
/// request target on a hierarchical URL, so `mailto:`-style URLs fail here.
fn materialize(url: Url) -> Result<Url, ApiError> {
    let serialized = url.as_str();
    match Url::parse(serialized) {
        Ok(parsed) if !parsed.cannot_be_a_base() => Ok(parsed),
        Ok(_) => Err(ApiError::UrlComponentsFailure {
            description: format!("{serialized} is not a hierarchical URL"),
        }),
        Err(e) => Err(ApiError::UrlComponentsFailure {
            description: format!("{serialized} ({e})"),
        }),
    }
}

fn encode_body(body: &Value) -> Result<Vec<u8>, ApiError> {
    if !body.is_object() {
        return Err(ApiError::json("Error parsing the request body: not a JSON object"));
    }
    serde_json::to_vec(body).map_err(|e| ApiError::json(format!("Error parsing the request body: {e}")))
}

/// Decode raw response bytes into `T`.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(data).map_err(|e| ApiError::json(format!("Error parsing the data: {e}")))
}
