//! Shared HTTP plumbing for the remote-service tools

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{ToolError, ToolResult};

const USER_AGENT: &str = concat!("kora/", env!("CARGO_PKG_VERSION"));

/// HTTP client with the common user agent and a request timeout
pub(crate) fn client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Map a non-success status to [`ToolError::Service`]
pub(crate) async fn check(service: &str, response: Response) -> ToolResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ToolError::service(service, status.as_u16(), body))
}

/// Check the status, then decode a JSON body
pub(crate) async fn json<T: DeserializeOwned>(service: &str, response: Response) -> ToolResult<T> {
    let response = check(service, response).await?;
    Ok(response.json().await?)
}
