//! Access-token renewal through `POST /auth/refresh`.
//!
//! TRADE-OFFS
//! ==========
//! Refreshes are single-flight. Concurrent requests that hit a 401 queue on
//! one gate; whoever gets it after a successful refresh reuses the new
//! access token instead of spending the refresh token again. A 401 that
//! arrives after the refresh finished carries the old token, so the
//! response middleware only clears a token that still matches and retries
//! with the current one otherwise. Requests that already hold a valid
//! access token never touch the gate.

use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::Mutex;

use super::client::ApiClient;
use super::types::ApiRequest;
use crate::error::{ApiError, RefreshError};
use crate::session::{AuthToken, SessionStore};

pub const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

pub struct Refresher {
    public: ApiClient,
    session: SessionStore,
    gate: Mutex<()>,
}

impl Refresher {
    /// `public` must not carry bearer or refresh middleware itself.
    #[must_use]
    pub fn new(public: ApiClient, session: SessionStore) -> Self {
        Self { public, session, gate: Mutex::new(()) }
    }

    /// Mint a new access token and store the returned pair.
    ///
    /// Returns the access token to attach. A non-200 answer or a body that
    /// is not a token pair clears the whole session.
    ///
    /// # Errors
    ///
    /// Returns an error if no refresh token is held, the server rejects it,
    /// the answer is malformed, or the call fails in transit.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let _gate = self.gate.lock().await;

        if let Some(token) = self.session.access_token().filter(|t| !t.is_empty()) {
            tracing::debug!("access token already renewed by a concurrent request");
            return Ok(token);
        }

        let refresh_token = self
            .session
            .refresh_token()
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::NoRefreshToken)?;

        let request = ApiRequest::post(REFRESH_PATH)
            .with_json(&RefreshRequest { refresh_token: &refresh_token })
            .map_err(|e| RefreshError::Request(e.to_string()))?;
        let response = self
            .public
            .send_raw(request)
            .await
            .map_err(|e| match e {
                ApiError::Transport(e) => RefreshError::Transport(e),
                other => RefreshError::Request(other.to_string()),
            })?;

        if response.status != StatusCode::OK {
            self.session.clear_auth();
            return Err(RefreshError::Rejected { status: response.status.as_u16() });
        }

        let token: AuthToken = match response.json() {
            Ok(token) => token,
            Err(e) => {
                self.session.clear_auth();
                return Err(RefreshError::MalformedToken(e.to_string()));
            }
        };

        let access_token = token.access_token.clone();
        self.session.set_auth(token);
        tracing::info!("session refreshed");
        Ok(access_token)
    }
}
