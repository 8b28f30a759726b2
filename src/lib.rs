//! # clientdesk
//!
//! Client-side core of the client-management app: the auth session, the
//! session-aware HTTP API clients, transient notifications, the navigation
//! guard, and helpers that turn API validation errors into form state.
//!
//! Rendering, theming and string catalogs live in the UI layer; this crate
//! holds the state and the request pipeline that layer drives.

pub mod config;
pub mod debounce;
pub mod error;
pub mod handlers;
pub mod http;
pub mod locale;
pub mod notification;
pub mod problem;
pub mod router;
pub mod session;
pub mod state;
