use super::*;

#[test]
fn code_mapping() {
    let rej = ClientError::RemoteRejection { status: 400, message: "bad".into() };
    assert_eq!(rej.code_str(), "remote_rejection");
    assert_eq!(ClientError::Unauthenticated.code_str(), "unauthenticated");
    assert_eq!(ClientError::store("disk full").code_str(), "store_error");
    assert_eq!(ClientError::config("no url").code_str(), "config_error");
    let tok: ClientError = TokenDecodeError::Segments(1).into();
    assert_eq!(tok.code_str(), "token_decode_error");
}

#[test]
fn auth_failures() {
    assert!(ClientError::Unauthenticated.is_auth_failure());
    assert!(ClientError::RemoteRejection { status: 401, message: "expired".into() }.is_auth_failure());
    assert!(!ClientError::RemoteRejection { status: 404, message: "missing".into() }.is_auth_failure());
    assert!(!ClientError::store("x").is_auth_failure());
}

#[test]
fn rejection_message_is_exposed_verbatim() {
    let body = r#"{"message":"Invalid credentials"}"#;
    let http: HttpError = serde_json::from_str(body).unwrap();
    let err = ClientError::RemoteRejection { status: 400, message: http.message };
    assert_eq!(err.remote_message(), Some("Invalid credentials"));
    assert_eq!(err.to_string(), "remote rejected request (400): Invalid credentials");
}
