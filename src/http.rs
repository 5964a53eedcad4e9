//! Shared HTTP plumbing for the Google REST clients

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, USER_AGENT};
use crate::dlp_types::ErrorResponse;
use crate::error::RemoteError;

/// Build the HTTP client used for every service call
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

/// Join an endpoint and a path without doubling slashes
pub fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Attach the bearer token, if any
pub fn authorize(request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
    match access_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Send a request and decode a JSON success body
pub async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, RemoteError> {
    let response = send(request, url).await?;
    response
        .json::<T>()
        .await
        .map_err(|source| RemoteError::Decode {
            url: url.to_string(),
            source,
        })
}

/// Send a request, turning non-success statuses into [`RemoteError`]
pub async fn send(request: RequestBuilder, url: &str) -> Result<Response, RemoteError> {
    let response = request.send().await.map_err(|source| RemoteError::Transport {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(response)
}

/// Handle error response from server
async fn error_from_response(response: Response) -> RemoteError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(err) => match err.error.status {
            Some(code) if !err.error.message.is_empty() => {
                format!("{} ({})", err.error.message, code)
            }
            Some(code) => code,
            None if !err.error.message.is_empty() => err.error.message,
            None => format!("Server returned status {}", status),
        },
        Err(_) => format!("Server returned status {}", status),
    };

    tracing::debug!(%status, %message, "remote call failed");
    RemoteError::from_status(status, message)
}
