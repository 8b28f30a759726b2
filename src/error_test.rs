use super::*;

#[test]
fn unprocessable_lifts_validation_errors() {
    let body = r#"{"title":"Invalid","errors":{"email":["taken"]},"objectErrors":["limit reached"]}"#;
    let err = HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, body.into());
    assert_eq!(err.validation.field_errors["email"], vec!["taken".to_owned()]);
    assert_eq!(err.validation.object_errors, vec!["limit reached".to_owned()]);
    assert_eq!(err.title(), Some("Invalid"));
}

#[test]
fn unprocessable_without_members_lifts_empty() {
    let err = HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, r#"{"title":"Invalid"}"#.into());
    assert!(err.validation.is_empty());
}

#[test]
fn other_statuses_do_not_lift() {
    let body = r#"{"errors":{"email":["taken"]}}"#;
    let err = HttpError::new(StatusCode::BAD_REQUEST, body.into());
    assert!(err.validation.is_empty());
    assert!(err.problem.is_some());
}

#[test]
fn non_json_body_keeps_raw_text() {
    let err = HttpError::new(StatusCode::BAD_GATEWAY, "upstream down".into());
    assert!(err.problem.is_none());
    assert_eq!(err.body, "upstream down");
    assert!(err.detail().is_none());
}

#[test]
fn api_error_status_accessors() {
    let err = ApiError::from(HttpError::new(StatusCode::UNAUTHORIZED, String::new()));
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "HTTP 401 Unauthorized");

    let err = ApiError::from(TransportError::Timeout);
    assert!(err.status().is_none());
    assert!(err.http().is_none());
}

#[test]
fn refresh_error_display() {
    let err = ApiError::from(RefreshError::Rejected { status: 401 });
    assert_eq!(err.to_string(), "session refresh failed: refresh rejected: status 401");
}
