//! Error taxonomy for the aggregation engine.
//!
//! - `FetchError`: per-adapter, non-fatal. The cascade counts the source as
//!   failed and moves on.
//! - `NormalizeError`: a single raw record was rejected.
//! - `AggregationError`: fatal for one `get_events` call (misconfiguration or
//!   an internal failure outside adapter boundaries).

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an adapter could not produce a list of events at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Error kind without the message, for reports and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Timeout,
    Unauthorized,
    RateLimited,
    Unreachable,
    MalformedResponse,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Unauthorized(_) => FetchErrorKind::Unauthorized,
            FetchError::RateLimited(_) => FetchErrorKind::RateLimited,
            FetchError::Unreachable(_) => FetchErrorKind::Unreachable,
            FetchError::MalformedResponse(_) => FetchErrorKind::MalformedResponse,
        }
    }

    /// Map a non-success HTTP status onto a fetch error.
    pub fn from_status(status: StatusCode, context: &str) -> Self {
        let msg = format!("{} returned {}", context, status);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Unauthorized(msg),
            StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited(msg),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FetchError::Timeout(msg),
            s if s.is_server_error() => FetchError::Unreachable(msg),
            _ => FetchError::MalformedResponse(msg),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_decode() {
            FetchError::MalformedResponse(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::from_status(status, "request")
        } else {
            FetchError::Unreachable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::MalformedResponse(e.to_string())
    }
}

/// Why a raw record could not become a canonical event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("record {0} is missing a participant name")]
    BlankParticipant(String),

    #[error("record {0} lists the same participant on both sides")]
    SameParticipants(String),
}

/// Fatal failure of an aggregation call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("aggregator misconfigured: {0}")]
    Misconfigured(String),

    #[error("aggregation cycle failed: {0}")]
    CycleFailure(String),
}
