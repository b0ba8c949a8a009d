use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::models::api::ApiResponse;
use crate::services::metrics;

/// Shared HTTP client for all upstream services.
pub fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("scs-tv/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Turn a non-success status into `FetchError::Upstream`, logging status and
/// body the way every accessor reports upstream failures.
pub async fn check_status(service: &'static str, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("{} error {}: {}", service, status, body);
    Err(FetchError::Upstream {
        service,
        status,
        body,
    })
}

/// Read a success response as JSON of the expected shape.
pub async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, FetchError> {
    let response = check_status(service, response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::malformed(service, e.to_string()))
}

fn log_failure(service: &'static str, error: &FetchError) {
    match error {
        FetchError::NotConfigured(_) => tracing::debug!("{} not configured, using empty data", service),
        e => tracing::warn!("Error fetching {}: {}", service, e),
    }
}

/// Accessor boundary: record the outcome, log failures and degrade to the
/// empty value so one broken source never breaks the page.
pub fn or_default<T: Default>(service: &'static str, result: Result<T, FetchError>) -> T {
    metrics::record_fetch(service, &result);
    result.unwrap_or_else(|e| {
        log_failure(service, &e);
        T::default()
    })
}

/// Route boundary: same accounting as `or_default`, but the error message
/// travels to the client in the envelope.
pub fn envelope<T: Default>(service: &'static str, result: Result<T, FetchError>) -> ApiResponse<T> {
    metrics::record_fetch(service, &result);
    if let Err(e) = &result {
        log_failure(service, e);
    }
    ApiResponse::from_result(result)
}
