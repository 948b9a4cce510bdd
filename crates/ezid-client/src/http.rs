//! HTTP transport for EZID's identifier API.

use std::fmt;

use async_trait::async_trait;
use ezid_core::ServiceConfig;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{info, warn};

/// Statuses EZID uses for a completed operation. Everything else takes the
/// error path, where the response body still carries EZID's explanation.
pub const ACCEPTED_STATUSES: [StatusCode; 2] = [StatusCode::OK, StatusCode::CREATED];

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("EZID returned {status} with an empty body")]
    Status { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Put,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => f.write_str("PUT"),
            Self::Post => f.write_str("POST"),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// One call against the EZID API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EzidRequest {
    pub method: Method,
    /// Path below the endpoint, e.g. `id/doi:10.5072/FK2` or `shoulder/doi:10.5072/FK2`.
    pub path: String,
    /// Envelope produced by [`ezid_core::prepare_payload`].
    pub body: String,
    pub service: ServiceConfig,
}

/// Something that can deliver an [`EzidRequest`] and hand back EZID's
/// response text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &EzidRequest) -> Result<String, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(&self, request: &EzidRequest) -> Result<String, TransportError> {
        (**self).send(request).await
    }
}

/// reqwest-backed transport. Uses the client's default timeouts.
pub struct EzidClient {
    client: reqwest::Client,
}

impl Default for EzidClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EzidClient {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send `data` to `{endpoint_url}/{path}` with Basic Auth.
    ///
    /// A response in [`ACCEPTED_STATUSES`] returns its body. Any other status
    /// returns its body too, newline-terminated, so the caller can report
    /// EZID's error line; if that body is empty the status becomes
    /// [`TransportError::Status`].
    pub async fn send_request(
        &self,
        method: Method,
        path: &str,
        data: &str,
        service: &ServiceConfig,
    ) -> Result<String, TransportError> {
        let url = format!("{}/{}", service.endpoint_url.trim_end_matches('/'), path);

        info!(url = %url, method = %method, "sending request to EZID");
        let resp = self
            .client
            .request(method.into(), &url)
            .basic_auth(&service.username, Some(&service.password))
            .header(CONTENT_TYPE, "text/plain; charset=UTF-8")
            .body(data.as_bytes().to_vec())
            .send()
            .await?;

        let status = resp.status();
        if ACCEPTED_STATUSES.contains(&status) {
            return Ok(resp.text().await?);
        }

        let mut body = resp.text().await?;
        warn!(status = status.as_u16(), "EZID returned an error status");
        if body.is_empty() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        if !body.ends_with('\n') {
            body.push('\n');
        }
        Ok(body)
    }
}

#[async_trait]
impl Transport for EzidClient {
    async fn send(&self, request: &EzidRequest) -> Result<String, TransportError> {
        self.send_request(request.method, &request.path, &request.body, &request.service)
            .await
    }
}
