//! Error types for the network service.
//!
//! # Design
//! Every failure a call can produce is one `ApiError` variant: construction
//! problems (`WrongUrl`, `UrlComponentsFailure`, `JsonConversionFailure`),
//! transport problems (`RequestFailed`, `Cancelled`) and classified HTTP
//! statuses (`ResponseUnsuccessful`, `NotAuthorized`, `ServerError`).
//! Transport internals never cross this boundary; only a description string
//! does.

use thiserror::Error;

/// Errors returned by `HttpClient::request` and the request builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Base URL plus endpoint does not parse as a URL.
    #[error("URL -> {description}")]
    WrongUrl { description: String },

    /// The URL could not be turned back into a request target once the
    /// query items were added.
    #[error("URL components -> {description}")]
    UrlComponentsFailure { description: String },

    /// A request body could not be encoded, or a response body could not be
    /// decoded into the requested type.
    #[error("JSON Conversion Failure -> {description}")]
    JsonConversionFailure { description: String },

    /// The executor failed before a response was received.
    #[error("Request Failed error -> {description}")]
    RequestFailed { description: String },

    /// The server answered with a status in the unsuccessful bucket.
    #[error("Response Unsuccessful error -> {description}")]
    ResponseUnsuccessful { status: u16, description: String },

    /// The server answered 401.
    #[error("Not authorized")]
    NotAuthorized,

    #[error("Server error")]
    ServerError { status: u16 },

    /// The call was cancelled while the executor was in flight.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    pub(crate) fn json(description: impl Into<String>) -> Self {
        ApiError::JsonConversionFailure {
            description: description.into(),
        }
    }

    /// The HTTP status behind a classified error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ResponseUnsuccessful { status, .. } | ApiError::ServerError { status } => {
                Some(*status)
            }
            ApiError::NotAuthorized => Some(401),
            _ => None,
        }
    }
}
