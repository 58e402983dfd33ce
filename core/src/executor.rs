//! `HttpExecutor` backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ClientConfig;
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, TransportError};

/// Executes requests with a shared `reqwest::Client`.
///
/// Redirects and connection reuse are whatever the wrapped client does.
#[derive(Debug, Clone, Default)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Executor honouring the config's timeout, if one is set.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        match config.timeout() {
            Some(timeout) => Self::with_timeout(timeout),
            None => Ok(Self::new()),
        }
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(method(request.method), request.url)
            .headers(header_map(&request.headers)?);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response.bytes().await.map_err(map_error)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn header_map<'a>(
    headers: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| TransportError::Other(format!("invalid header name {key:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::Other(format!("invalid value for header {key:?}: {e}")))?;
        map.append(name, value);
    }
    Ok(map)
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn builds_from_config_with_timeout() {
        let config = ClientConfig::new("http://localhost/").with_timeout(Duration::from_millis(500));
        assert!(ReqwestExecutor::from_config(&config).is_ok());
        assert!(ReqwestExecutor::from_config(&ClientConfig::new("http://localhost/")).is_ok());
    }

    #[test]
    fn header_names_are_validated() {
        let headers = BTreeMap::from([("bad header".to_string(), "x".to_string())]);
        assert!(matches!(header_map(&headers), Err(TransportError::Other(_))));
    }

    #[test]
    fn header_values_are_validated() {
        let headers = BTreeMap::from([("X-Token".to_string(), "line\nbreak".to_string())]);
        assert!(matches!(header_map(&headers), Err(TransportError::Other(_))));
    }

    #[test]
    fn keys_differing_only_by_case_both_reach_the_wire() {
        let headers = BTreeMap::from([
            ("Accept".to_string(), "application/json".to_string()),
            ("accept".to_string(), "text/plain".to_string()),
        ]);
        let map = header_map(&headers).unwrap();
        let values: Vec<_> = map.get_all("accept").iter().collect();
        assert_eq!(values, vec!["application/json", "text/plain"]);
    }

    #[test]
    fn valid_headers_are_copied() {
        let headers = BTreeMap::from([
            ("Accept".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), "Bearer abc".to_string()),
        ]);
        let map = header_map(&headers).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["authorization"], "Bearer abc");
    }
}
