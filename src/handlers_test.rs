use super::*;
use crate::error::{HttpError, TransportError};
use crate::notification::NotificationKind;
use reqwest::StatusCode;

#[derive(Default)]
struct TextField {
    errors: Vec<String>,
}

impl FieldErrorSink for TextField {
    fn set_errors(&mut self, message: String) {
        self.errors.push(message);
    }
}

fn http_error(status: StatusCode, body: &serde_json::Value) -> ApiError {
    HttpError::new(status, body.to_string()).into()
}

fn validation_error() -> ApiError {
    http_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        &serde_json::json!({
            "title": "Validation failed",
            "errors": {
                "email": ["must be an email", "already used"],
                "phone": [],
                "unknownField": ["ignored"]
            },
            "objectErrors": ["client limit reached", "try later"]
        }),
    )
}

// =============================================================
// catch_field_errors
// =============================================================

#[test]
fn field_errors_map_onto_known_fields() {
    let mut fields: HashMap<String, TextField> = HashMap::new();
    fields.insert("email".into(), TextField::default());
    fields.insert("phone".into(), TextField::default());
    let mut global = None;

    let result: Result<(), ApiError> = catch_field_errors(validation_error(), &mut fields, Some(&mut global));

    assert!(result.unwrap_err().http().is_some());
    assert_eq!(fields["email"].errors, vec!["must be an email, already used".to_owned()]);
    assert!(fields["phone"].errors.is_empty());
    assert_eq!(global.as_deref(), Some("client limit reached, try later"));
}

#[test]
fn option_string_is_a_field_sink() {
    let mut fields: HashMap<String, Option<String>> = HashMap::new();
    fields.insert("email".into(), None);

    let _: Result<(), ApiError> = catch_field_errors(validation_error(), &mut fields, None);

    assert_eq!(fields["email"].as_deref(), Some("must be an email, already used"));
}

#[test]
fn non_validation_errors_leave_fields_alone() {
    let mut fields: HashMap<String, Option<String>> = HashMap::new();
    fields.insert("email".into(), None);
    let mut global = None;
    let err = http_error(
        StatusCode::BAD_REQUEST,
        &serde_json::json!({ "errors": { "email": ["x"] }, "objectErrors": ["y"] }),
    );

    let result: Result<(), ApiError> = catch_field_errors(err, &mut fields, Some(&mut global));

    assert_eq!(result.unwrap_err().status(), Some(StatusCode::BAD_REQUEST));
    assert!(fields["email"].is_none());
    assert!(global.is_none());
}

#[test]
fn transport_errors_pass_through() {
    let mut fields: HashMap<String, Option<String>> = HashMap::new();
    let result: Result<(), ApiError> =
        catch_field_errors(TransportError::Timeout.into(), &mut fields, None);
    assert!(matches!(result, Err(ApiError::Transport(TransportError::Timeout))));
}

#[test]
fn missing_object_errors_keep_global_untouched() {
    let mut fields: HashMap<String, Option<String>> = HashMap::new();
    let mut global = Some("previous".to_owned());
    let err = http_error(StatusCode::UNPROCESSABLE_ENTITY, &serde_json::json!({ "errors": {} }));

    let _: Result<(), ApiError> = catch_field_errors(err, &mut fields, Some(&mut global));

    assert_eq!(global.as_deref(), Some("previous"));
}

// =============================================================
// notify_error
// =============================================================

#[tokio::test]
async fn notify_error_pushes_detail_and_title() {
    let notifications = NotificationStore::new();
    let err = http_error(
        StatusCode::CONFLICT,
        &serde_json::json!({ "title": "Conflict", "detail": "Client already exists" }),
    );

    let result: Result<(), ApiError> = notify_error(err, &notifications);

    assert!(result.is_err());
    let messages = notifications.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, NotificationKind::Error);
    assert_eq!(messages[0].message, "Client already exists");
    assert_eq!(messages[0].title.as_deref(), Some("Conflict"));
}

#[tokio::test]
async fn notify_error_without_detail_is_silent() {
    let notifications = NotificationStore::new();
    let err = http_error(StatusCode::INTERNAL_SERVER_ERROR, &serde_json::json!({ "title": "Oops", "detail": "" }));

    let _: Result<(), ApiError> = notify_error(err, &notifications);
    let _: Result<(), ApiError> = notify_error(TransportError::Timeout.into(), &notifications);

    assert!(notifications.messages().is_empty());
}

// =============================================================
// suppress_error
// =============================================================

#[test]
fn suppress_error_swallows() {
    let result: Result<(), ApiError> = suppress_error(TransportError::Timeout.into());
    assert!(result.is_ok());

    let failed: Result<Vec<u32>, ApiError> = Err(TransportError::Timeout.into());
    assert_eq!(failed.or_else(suppress_error).unwrap(), Vec::<u32>::new());
}
