//! Auth session store holding the current token pair.
//!
//! ARCHITECTURE
//! ============
//! Access tokens are short-lived and attached to every authenticated
//! request; the refresh token mints new access tokens. The store is an
//! explicit handle passed to the HTTP client, navigation guard and UI code
//! instead of a global, and every operation is total over in-memory state.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Token pair as returned by the login and refresh endpoints.
///
/// `expiresIn` may be any JSON number. A missing, null or non-array
/// `authorities` reads as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: f64,
    #[serde(default, deserialize_with = "lenient_authorities")]
    pub authorities: Vec<String>,
}

fn lenient_authorities<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Current session contents. Every field may be individually absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<f64>,
    pub authorities: Vec<String>,
}

impl From<AuthToken> for AuthState {
    fn from(token: AuthToken) -> Self {
        Self {
            access_token: Some(token.access_token),
            refresh_token: Some(token.refresh_token),
            expires_in: Some(token.expires_in),
            authorities: token.authorities,
        }
    }
}

/// Shared handle to the auth session. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Option<AuthState>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an existing token pair.
    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        let store = Self::new();
        store.set_auth(token);
        store
    }

    fn read<T>(&self, f: impl FnOnce(Option<&AuthState>) -> T) -> T {
        let guard = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }

    /// A refresh token is present, so a new access token can be minted.
    #[must_use]
    pub fn is_logged(&self) -> bool {
        self.read(|s| {
            s.and_then(|s| s.refresh_token.as_deref())
                .is_some_and(|t| !t.is_empty())
        })
    }

    /// An access token is present and can be sent as a bearer.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|s| {
            s.and_then(|s| s.access_token.as_deref())
                .is_some_and(|t| !t.is_empty())
        })
    }

    /// Replace the whole session with a copy of `token`.
    pub fn set_auth(&self, token: AuthToken) {
        let authorities = token.authorities.len();
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
        tracing::debug!(authorities, "session token set");
    }

    /// Drop the entire session, refresh token included.
    pub fn clear_auth(&self) {
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!("session cleared");
    }

    /// Drop the access token only while it is still `token`.
    ///
    /// Returns whether it was cleared. A token minted in the meantime by a
    /// concurrent refresh is left in place.
    pub fn clear_token_if(&self, token: &str) -> bool {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(state) = guard.as_mut() else {
            return false;
        };
        if state.access_token.as_deref() != Some(token) {
            return false;
        }
        state.access_token = None;
        drop(guard);
        tracing::debug!("stale access token cleared");
        true
    }

    /// Drop only the access token, keeping the refresh token for renewal.
    pub fn clear_token(&self) {
        if let Some(state) = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            state.access_token = None;
        }
        tracing::debug!("access token cleared");
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(|s| s.and_then(|s| s.access_token.clone()))
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(|s| s.and_then(|s| s.refresh_token.clone()))
    }

    #[must_use]
    pub fn expires_in(&self) -> Option<f64> {
        self.read(|s| s.and_then(|s| s.expires_in))
    }

    #[must_use]
    pub fn authorities(&self) -> Vec<String> {
        self.read(|s| s.map(|s| s.authorities.clone()).unwrap_or_default())
    }

    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.read(|s| s.is_some_and(|s| s.authorities.iter().any(|a| a == authority)))
    }

    /// Copy of the whole session, `None` after [`SessionStore::clear_auth`].
    #[must_use]
    pub fn snapshot(&self) -> Option<AuthState> {
        self.read(|s| s.cloned())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
