// ABOUTME: Shared HTTP client utilities with timeout configuration for model providers
// ABOUTME: Maps transport failures and non-2xx statuses onto typed provider errors

use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, error};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Create a new HTTP client with bounded request and connect timeouts
///
/// # Errors
/// Returns a configuration error if the TLS backend cannot be initialized
pub fn create_client_with_timeout(timeout: Duration, connect_timeout: Duration) -> AppResult<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| AppError::config(format!("Failed to create HTTP client: {e}")).with_source(e))
}

/// Map a `reqwest` send/read failure to a provider error
#[must_use]
pub fn map_request_error(service: &str, err: reqwest::Error) -> AppError {
    error!(service, error = %err, "Request to model provider failed");
    let app_error = if err.is_timeout() {
        AppError::external_unavailable(service, "request timed out")
    } else if err.is_connect() {
        AppError::external_unavailable(service, format!("cannot connect: {err}"))
    } else {
        AppError::external_service(service, format!("request failed: {err}"))
    };
    app_error.with_source(err)
}

/// Map a non-2xx status and extracted backend message to a provider error
#[must_use]
pub fn map_status_error(service: &str, status: StatusCode, message: &str) -> AppError {
    let code = match status.as_u16() {
        401 | 403 => ErrorCode::ExternalAuthFailed,
        429 => ErrorCode::ExternalRateLimited,
        502..=504 => ErrorCode::ExternalServiceUnavailable,
        _ => ErrorCode::ExternalServiceError,
    };
    let trimmed: String = message.chars().take(300).collect();
    AppError::new(code, format!("{service} API error ({status}): {trimmed}"))
}

/// Send a request and return the status with the full response body
///
/// # Errors
/// Returns a provider error if the request cannot be sent or the body cannot be read
pub async fn send_for_body(service: &str, request: RequestBuilder) -> AppResult<(StatusCode, String)> {
    let response = request
        .send()
        .await
        .map_err(|e| map_request_error(service, e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| map_request_error(service, e))?;
    debug!(service, status = %status, body_len = body.len(), "Received provider response");
    Ok((status, body))
}
