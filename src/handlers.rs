//! Terminal error handlers composed onto API calls.
//!
//! Each helper takes the error by value and returns a `Result`, so calling
//! code chains them with `or_else`:
//!
//! ```ignore
//! api.authenticated
//!     .post("/clients", &form)
//!     .await
//!     .or_else(|e| catch_field_errors(e, &mut fields, Some(&mut global_error)))
//!     .or_else(|e| notify_error(e, &notifications))?;
//! ```

use std::collections::HashMap;

use reqwest::StatusCode;

use crate::error::ApiError;
use crate::notification::NotificationStore;

/// A form input that can display a validation message.
pub trait FieldErrorSink {
    fn set_errors(&mut self, message: String);
}

impl FieldErrorSink for Option<String> {
    fn set_errors(&mut self, message: String) {
        *self = Some(message);
    }
}

/// Map a 422's per-field errors onto `fields` and its object-level errors
/// into `global`, then hand the error back.
///
/// Only fields present in `fields` with at least one message are touched.
///
/// # Errors
///
/// Always returns `Err(err)`.
pub fn catch_field_errors<T, F>(
    err: ApiError,
    fields: &mut HashMap<String, F>,
    global: Option<&mut Option<String>>,
) -> Result<T, ApiError>
where
    F: FieldErrorSink,
{
    let Some(http) = err.http() else {
        return Err(err);
    };
    let validation = &http.validation;

    for (field, messages) in &validation.field_errors {
        if messages.is_empty() {
            continue;
        }
        if let Some(sink) = fields.get_mut(field) {
            sink.set_errors(messages.join(", "));
        }
    }

    if let Some(global) = global {
        let has_object_errors = http.status == StatusCode::UNPROCESSABLE_ENTITY
            && http
                .problem
                .as_ref()
                .is_some_and(|p| p.object_errors.is_some());
        if has_object_errors {
            *global = Some(validation.object_errors.join(", "));
        }
    }

    Err(err)
}

/// Surface the server's `detail` (and `title`) as an error notification,
/// then hand the error back.
///
/// # Errors
///
/// Always returns `Err(err)`.
pub fn notify_error<T>(err: ApiError, notifications: &NotificationStore) -> Result<T, ApiError> {
    if let Some(http) = err.http() {
        if let Some(detail) = http.detail() {
            notifications.error(detail, http.title().map(str::to_owned), None);
        }
    }
    Err(err)
}

/// Swallow the error.
///
/// # Errors
///
/// Never; the signature matches the other handlers for chaining.
pub fn suppress_error<T: Default>(err: ApiError) -> Result<T, ApiError> {
    tracing::debug!(error = %err, "api error suppressed");
    Ok(T::default())
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod tests;
