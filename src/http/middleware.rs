//! Request and response middleware.
//!
//! ARCHITECTURE
//! ============
//! Request middleware runs in order before every send (including retries)
//! and may mutate the request or short-circuit with an error. Response
//! middleware runs in order on whatever the transport returned and either
//! passes the response on or asks the client to re-run the whole pipeline.
//! The client caps retries, so a middleware can never loop a request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};

use super::refresh::Refresher;
use super::types::{ApiRequest, ApiResponse};
use crate::error::ApiError;
use crate::locale::LocaleState;
use crate::session::SessionStore;

pub const X_TIMEZONE: &str = "x-timezone";

const APPLICATION_JSON: &str = "application/json";

#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError>;
}

/// What the client should do with a response after a middleware saw it.
#[derive(Debug)]
pub enum Outcome {
    /// Hand the response to the next middleware, then to the caller.
    Respond(ApiResponse),
    /// Send the request again; carries the response in case no retry is left.
    Retry(ApiResponse),
}

#[async_trait]
pub trait ResponseMiddleware: Send + Sync {
    async fn on_response(&self, request: &ApiRequest, response: ApiResponse) -> Outcome;
}

// =============================================================================
// REQUEST MIDDLEWARE
// =============================================================================

/// JSON `Content-Type` and `Accept` on every request.
pub struct DefaultHeaders;

#[async_trait]
impl RequestMiddleware for DefaultHeaders {
    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        Ok(())
    }
}

/// `Accept-Language` and `X-TimeZone` from the current UI locale.
pub struct LocaleHeaders {
    locale: LocaleState,
}

impl LocaleHeaders {
    #[must_use]
    pub fn new(locale: LocaleState) -> Self {
        Self { locale }
    }
}

#[async_trait]
impl RequestMiddleware for LocaleHeaders {
    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        let locale = self.locale.current();
        request
            .headers
            .insert(ACCEPT_LANGUAGE, HeaderValue::from_static(locale.code()));
        request
            .headers
            .insert(HeaderName::from_static(X_TIMEZONE), HeaderValue::from_str(&self.locale.timezone())?);
        Ok(())
    }
}

/// Attaches the session's bearer token, refreshing first when only a
/// refresh token is held.
pub struct BearerAuth {
    session: SessionStore,
    refresher: Arc<Refresher>,
}

impl BearerAuth {
    #[must_use]
    pub fn new(session: SessionStore, refresher: Arc<Refresher>) -> Self {
        Self { session, refresher }
    }
}

#[async_trait]
impl RequestMiddleware for BearerAuth {
    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        let token = match self.session.access_token().filter(|t| !t.is_empty()) {
            Some(token) => token,
            None if self.session.is_logged() => self.refresher.refresh().await?,
            None => return Ok(()),
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        request.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

// =============================================================================
// RESPONSE MIDDLEWARE
// =============================================================================

/// On 401: drop the access token, refresh once, and retry the request.
///
/// Only the token the failed request carried is dropped. When a concurrent
/// refresh already replaced it, the request is retried with the current
/// token without refreshing again. A failed refresh passes the original
/// 401 through; a rejected or malformed refresh has already cleared the
/// session by then.
pub struct RefreshOnUnauthorized {
    session: SessionStore,
    refresher: Arc<Refresher>,
}

impl RefreshOnUnauthorized {
    #[must_use]
    pub fn new(session: SessionStore, refresher: Arc<Refresher>) -> Self {
        Self { session, refresher }
    }
}

#[async_trait]
impl ResponseMiddleware for RefreshOnUnauthorized {
    async fn on_response(&self, request: &ApiRequest, response: ApiResponse) -> Outcome {
        if response.status != StatusCode::UNAUTHORIZED {
            return Outcome::Respond(response);
        }

        if let Some(sent) = sent_bearer(request) {
            self.session.clear_token_if(sent);
        }
        if request.attempt() > 0 {
            return Outcome::Respond(response);
        }
        if self.session.is_authenticated() {
            tracing::debug!(path = %request.path, "401 on superseded token, retrying with current token");
            return Outcome::Retry(response);
        }
        if !self.session.is_logged() {
            return Outcome::Respond(response);
        }

        match self.refresher.refresh().await {
            Ok(_) => Outcome::Retry(response),
            Err(e) => {
                tracing::warn!(error = %e, path = %request.path, "token refresh after 401 failed");
                Outcome::Respond(response)
            }
        }
    }
}

fn sent_bearer(request: &ApiRequest) -> Option<&str> {
    request
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}
