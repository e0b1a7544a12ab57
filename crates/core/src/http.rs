//! HTTP plumbing shared by provider clients and asset downloads.

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::resolve::{ApiError, ApiResult};
use crate::{Error, Result};

/// Build the HTTP client used for API calls and downloads.
///
/// # Errors
///
/// Returns [`Error::Config`] if the TLS backend cannot be initialized.
pub fn build_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))
}

/// Send a request and decode the JSON response.
///
/// `404` maps to [`ApiError::NotFound`]; any other non-success status maps
/// to [`ApiError::Status`] with the response body as message.
///
/// # Errors
///
/// Returns an [`ApiError`] classifying the failure.
pub async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    resource: &str,
    cancel: &CancellationToken,
) -> ApiResult<T> {
    let response = send(request, resource, cancel).await?;
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(cancelled(resource)),
        body = response.json::<T>() => body.map_err(|e| ApiError::Decode {
            resource: resource.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Send a request and collect the whole response body.
///
/// # Errors
///
/// Returns an [`ApiError`] classifying the failure.
pub async fn get_bytes(
    request: RequestBuilder,
    resource: &str,
    cancel: &CancellationToken,
) -> ApiResult<Bytes> {
    let response = send(request, resource, cancel).await?;
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(cancelled(resource)),
        body = response.bytes() => body.map_err(|e| ApiError::Transport {
            resource: resource.to_string(),
            message: e.to_string(),
        }),
    }
}

async fn send(
    request: RequestBuilder,
    resource: &str,
    cancel: &CancellationToken,
) -> ApiResult<reqwest::Response> {
    let response = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(cancelled(resource)),
        response = request.send() => response.map_err(|e| ApiError::Transport {
            resource: resource.to_string(),
            message: e.to_string(),
        })?,
    };

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound {
            resource: resource.to_string(),
        });
    }
    if !status.is_success() {
        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled(resource)),
            body = response.text() => body.unwrap_or_default(),
        };
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unexpected status").to_string()
        } else {
            body.trim().to_string()
        };
        return Err(ApiError::Status {
            resource: resource.to_string(),
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

fn cancelled(resource: &str) -> ApiError {
    ApiError::Cancelled {
        resource: resource.to_string(),
    }
}
