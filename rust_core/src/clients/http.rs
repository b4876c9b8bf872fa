//! Shared HTTP plumbing for provider clients.

use crate::error::FetchError;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Per-request timeout. The cascade enforces its own, shorter, budget on top.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("courtside/", env!("CARGO_PKG_VERSION"));

/// Build the reqwest client every provider client uses.
pub fn build_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a request and decode a JSON body.
///
/// Non-success statuses map through [`FetchError::from_status`]; a body that
/// is not JSON is a `MalformedResponse`. Response headers are returned for
/// callers that track quotas.
pub async fn send_json(
    request: RequestBuilder,
    context: &str,
) -> Result<(HeaderMap, serde_json::Value), FetchError> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::from_status(status, context));
    }

    let headers = resp.headers().clone();
    let body = resp.text().await?;
    let data = serde_json::from_str(&body)
        .map_err(|e| FetchError::MalformedResponse(format!("{}: {}", context, e)))?;
    Ok((headers, data))
}

/// Read a numeric header, e.g. a remaining-quota counter.
pub fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
}
