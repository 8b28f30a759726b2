//! Shared client context.
//!
//! DESIGN
//! ======
//! `AppContext` bundles the stores and the API clients built over them.
//! It is cloned into whatever needs it (pages, background tasks, the CLI);
//! every field is a shared handle, so clones observe the same session,
//! notifications and locale.

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::Api;
use crate::locale::LocaleState;
use crate::notification::NotificationStore;
use crate::router::{Guard, RouteTable};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppContext {
    pub session: SessionStore,
    pub notifications: NotificationStore,
    pub locale: LocaleState,
    pub api: Api,
    pub guard: Guard,
}

impl AppContext {
    /// Build fresh stores and the default route table from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let session = SessionStore::new();
        let locale = LocaleState::new(config.locale, config.timezone.clone());
        let api = Api::new(config, session.clone(), locale.clone())?;
        Ok(Self::from_parts(session, locale, api, RouteTable::default()))
    }

    #[must_use]
    pub fn from_parts(session: SessionStore, locale: LocaleState, api: Api, routes: RouteTable) -> Self {
        let guard = Guard::new(routes, session.clone());
        Self { session, notifications: NotificationStore::new(), locale, api, guard }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
