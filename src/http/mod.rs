//! HTTP API access with session-aware middleware.
//!
//! DESIGN
//! ======
//! Two clients share one transport (base URL, timeouts) and the default
//! and locale headers:
//! - `public`: no authorization; used for login and token refresh.
//! - `authenticated`: attaches the bearer token and renews it on 401.
//!
//! Everything the clients do to a request is an explicit middleware entry,
//! so the order of header injection, refresh and retry is readable in
//! [`Api::with_transport`].

pub mod client;
pub mod middleware;
pub mod refresh;
pub mod transport;
pub mod types;

use std::sync::Arc;

pub use client::ApiClient;
pub use types::{ApiRequest, ApiResponse};

use self::middleware::{BearerAuth, DefaultHeaders, LocaleHeaders, RefreshOnUnauthorized};
use self::refresh::Refresher;
use self::transport::{ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::error::{RefreshError, TransportError};
use crate::locale::LocaleState;
use crate::session::SessionStore;

/// The public and authenticated clients plus their shared refresher.
#[derive(Clone)]
pub struct Api {
    pub public: ApiClient,
    pub authenticated: ApiClient,
    refresher: Arc<Refresher>,
}

impl Api {
    /// Build both clients over a `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionStore, locale: LocaleState) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Ok(Self::with_transport(transport, session, locale))
    }

    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, session: SessionStore, locale: LocaleState) -> Self {
        let locale_headers = Arc::new(LocaleHeaders::new(locale));

        let public = ApiClient::builder(Arc::clone(&transport))
            .request_middleware(Arc::new(DefaultHeaders))
            .request_middleware(locale_headers.clone())
            .build();

        let refresher = Arc::new(Refresher::new(public.clone(), session.clone()));

        let authenticated = ApiClient::builder(transport)
            .request_middleware(Arc::new(DefaultHeaders))
            .request_middleware(locale_headers)
            .request_middleware(Arc::new(BearerAuth::new(session.clone(), Arc::clone(&refresher))))
            .response_middleware(Arc::new(RefreshOnUnauthorized::new(session, Arc::clone(&refresher))))
            .build();

        Self { public, authenticated, refresher }
    }

    /// Renew the access token now, returning it.
    ///
    /// # Errors
    ///
    /// See [`Refresher::refresh`].
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        self.refresher.refresh().await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
