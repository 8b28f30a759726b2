//! Error taxonomy for API calls.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures carry no response and are never interpreted. HTTP
//! failures keep the status, raw body and parsed problem payload; 422s also
//! carry the lifted validation errors. Refresh failures are their own type
//! because the request pipeline can fail before anything is sent.

use reqwest::StatusCode;

use crate::problem::{ProblemDetails, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// No connection could be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure before a response was received.
    #[error("request failed: {0}")]
    Request(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    Build(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() {
            Self::Build(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token in session")]
    NoRefreshToken,

    #[error("refresh rejected: status {status}")]
    Rejected { status: u16 },

    #[error("refresh returned a malformed token: {0}")]
    MalformedToken(String),

    #[error("refresh transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("refresh request could not be built: {0}")]
    Request(String),
}

/// Non-2xx response surfaced to callers.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub body: String,
    pub problem: Option<ProblemDetails>,
    pub validation: ValidationErrors,
}

impl HttpError {
    /// Build from a failed response, lifting validation errors for 422.
    #[must_use]
    pub fn new(status: StatusCode, body: String) -> Self {
        let problem = ProblemDetails::parse(&body);
        let validation = if status == StatusCode::UNPROCESSABLE_ENTITY {
            ValidationErrors::lift(problem.as_ref())
        } else {
            ValidationErrors::default()
        };
        Self { status, body, problem, validation }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.problem.as_ref()?.title.as_deref()
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.problem.as_ref()?.non_empty_detail()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("HTTP {}", .0.status)]
    Http(Box<HttpError>),

    #[error("session refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        Self::Http(Box::new(e))
    }
}

impl ApiError {
    /// The HTTP failure, when the server answered.
    #[must_use]
    pub fn http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.http().map(|e| e.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
