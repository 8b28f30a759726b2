//! Pipeline-driven API client.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::middleware::{Outcome, RequestMiddleware, ResponseMiddleware};
use super::transport::Transport;
use super::types::{ApiRequest, ApiResponse};
use crate::error::{ApiError, HttpError};

/// Sends per request: the first attempt plus at most one retry.
pub const MAX_ATTEMPTS: u32 = 2;

struct ClientInner {
    transport: Arc<dyn Transport>,
    request_chain: Vec<Arc<dyn RequestMiddleware>>,
    response_chain: Vec<Arc<dyn ResponseMiddleware>>,
}

/// An HTTP client whose behavior is fully defined by its middleware chains.
/// Clones share the transport and chains.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

pub struct ApiClientBuilder {
    transport: Arc<dyn Transport>,
    request_chain: Vec<Arc<dyn RequestMiddleware>>,
    response_chain: Vec<Arc<dyn ResponseMiddleware>>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn request_middleware(mut self, middleware: Arc<dyn RequestMiddleware>) -> Self {
        self.request_chain.push(middleware);
        self
    }

    #[must_use]
    pub fn response_middleware(mut self, middleware: Arc<dyn ResponseMiddleware>) -> Self {
        self.response_chain.push(middleware);
        self
    }

    #[must_use]
    pub fn build(self) -> ApiClient {
        ApiClient {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                request_chain: self.request_chain,
                response_chain: self.response_chain,
            }),
        }
    }
}

impl ApiClient {
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>) -> ApiClientBuilder {
        ApiClientBuilder { transport, request_chain: Vec::new(), response_chain: Vec::new() }
    }

    /// Run the full pipeline and return a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns the first request-middleware error, a transport error, or an
    /// [`ApiError::Http`] for any non-2xx final response.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = 0;
        loop {
            let prepared = self.prepare(request.for_attempt(attempt)).await?;
            let response = self.inner.transport.send(&prepared).await?;
            tracing::debug!(
                method = %prepared.method,
                path = %prepared.path,
                status = response.status.as_u16(),
                attempt,
                "api response"
            );

            match self.run_response_chain(&prepared, response).await {
                Outcome::Retry(_) if attempt + 1 < MAX_ATTEMPTS => {
                    attempt += 1;
                }
                Outcome::Respond(response) | Outcome::Retry(response) => return into_result(response),
            }
        }
    }

    /// Run only the request chain and transport; the status is not interpreted.
    ///
    /// # Errors
    ///
    /// Returns a request-middleware error or a transport error.
    pub async fn send_raw(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let prepared = self.prepare(request).await?;
        Ok(self.inner.transport.send(&prepared).await?)
    }

    async fn prepare(&self, mut request: ApiRequest) -> Result<ApiRequest, ApiError> {
        for middleware in &self.inner.request_chain {
            middleware.on_request(&mut request).await?;
        }
        Ok(request)
    }

    async fn run_response_chain(&self, request: &ApiRequest, mut response: ApiResponse) -> Outcome {
        for middleware in &self.inner.response_chain {
            match middleware.on_response(request, response).await {
                Outcome::Respond(next) => response = next,
                retry @ Outcome::Retry(_) => return retry,
            }
        }
        Outcome::Respond(response)
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::delete(path)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if `body` is not serializable.
    pub async fn post(&self, path: &str, body: &impl Serialize) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::post(path).with_json(body)?).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if `body` is not serializable.
    pub async fn put(&self, path: &str, body: &impl Serialize) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::put(path).with_json(body)?).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if `body` is not serializable.
    pub async fn patch(&self, path: &str, body: &impl Serialize) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::patch(path).with_json(body)?).await
    }

    /// `GET` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if the body does not decode.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Ok(self.get(path).await?.json()?)
    }

    /// `POST` a JSON body and decode the JSON answer.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if the body does not decode.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T, ApiError> {
        Ok(self.post(path, body).await?.json()?)
    }
}

fn into_result(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(HttpError::new(response.status, response.body).into())
    }
}
