//! Transport seam between the middleware pipeline and the network.
//!
//! The pipeline only depends on [`Transport`]; production code uses
//! [`ReqwestTransport`] and tests substitute scripted transports.

use async_trait::async_trait;

use super::types::{ApiRequest, ApiResponse};
use crate::config::ClientConfig;
use crate::error::TransportError;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a fully prepared request and return whatever the server answered.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// `reqwest`-backed transport bound to one base URL.
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(ApiResponse { status, headers, body })
    }
}
