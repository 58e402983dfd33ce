//! Status-code driven response classification.
//!
//! # Design
//! `Classification::Legacy` reproduces the check order existing callers
//! depend on: anything outside 2xx that is not a 5xx is reported as
//! `ServerError`, while 5xx responses become `ResponseUnsuccessful` with the
//! body text attached. 401 is the one exception and is always
//! `NotAuthorized`. This inversion of the usual client/server split is
//! almost certainly accidental, so `Classification::Conventional` offers the
//! expected mapping for callers that opt in.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const SUCCESS: RangeInclusive<u16> = 200..=299;
const SERVER_FAILURE: RangeInclusive<u16> = 500..=599;
const UNAUTHORIZED: u16 = 401;

/// Which status table to apply to responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// 2xx ok, 401 unauthorized, other non-5xx `ServerError`, 5xx
    /// `ResponseUnsuccessful`.
    #[default]
    Legacy,
    /// 2xx ok, 401 unauthorized, 5xx `ServerError`, everything else
    /// `ResponseUnsuccessful`.
    Conventional,
}

impl Classification {
    /// Map a status and body to the body bytes or a classified error.
    pub fn classify(self, status: u16, body: Vec<u8>) -> Result<Vec<u8>, ApiError> {
        if SUCCESS.contains(&status) {
            return Ok(body);
        }
        if status == UNAUTHORIZED {
            return Err(ApiError::NotAuthorized);
        }
        match self {
            Classification::Legacy if !SERVER_FAILURE.contains(&status) => {
                Err(ApiError::ServerError { status })
            }
            Classification::Conventional if SERVER_FAILURE.contains(&status) => {
                Err(ApiError::ServerError { status })
            }
            _ => Err(unsuccessful(status, &body)),
        }
    }
}

/// Classify with the legacy table.
pub fn classify(status: u16, body: Vec<u8>) -> Result<Vec<u8>, ApiError> {
    Classification::Legacy.classify(status, body)
}

fn unsuccessful(status: u16, body: &[u8]) -> ApiError {
    let text = String::from_utf8_lossy(body);
    ApiError::ResponseUnsuccessful {
        status,
        description: format!("Status code: {status}, description: {text}"),
    }
}
