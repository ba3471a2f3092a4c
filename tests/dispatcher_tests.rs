//! Request dispatcher against the mock backend: headers, rejections, decode errors.

mod common;

use common::start_backend;
use pantry_client::client::NO_BODY;
use pantry_client::models::LoginModel;
use pantry_client::{ClientError, Dispatcher, HttpMethod, TokenPair};
use serde_json::Value;

fn dispatcher(base: &str) -> Dispatcher {
    Dispatcher::with_client(base, reqwest::Client::new()).expect("dispatcher")
}

#[tokio::test]
async fn rejection_carries_backend_message() {
    let backend = start_backend().await;
    let d = dispatcher(&backend.base);
    let model = LoginModel { email: Some("olena@example.com".into()), phone: None, password: "wrong".into() };

    let err = d
        .send::<_, TokenPair>(HttpMethod::Post, "/login", Some(&model), None)
        .await
        .unwrap_err();

    match err {
        ClientError::RemoteRejection { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected RemoteRejection, got {:?}", other),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let backend = start_backend().await;
    let err = dispatcher(&backend.base)
        .send::<(), Value>(HttpMethod::Get, "/plain-error", NO_BODY, None)
        .await
        .unwrap_err();
    assert_eq!(err.remote_message(), Some("upstream unavailable"));
    assert!(matches!(err, ClientError::RemoteRejection { status: 502, .. }));
}

#[tokio::test]
async fn bearer_header_only_when_token_given() {
    let backend = start_backend().await;
    let d = dispatcher(&backend.base);

    let signed: Value = d.send(HttpMethod::Get, "/echo-auth", NO_BODY, Some("abc.def.ghi")).await.unwrap();
    assert_eq!(signed["authorization"], "Bearer abc.def.ghi");

    let unsigned: Value = d.send(HttpMethod::Get, "/echo-auth", NO_BODY, None).await.unwrap();
    assert!(unsigned["authorization"].is_null());
}

#[tokio::test]
async fn mismatched_success_body_is_a_decode_error() {
    let backend = start_backend().await;
    let err = dispatcher(&backend.base)
        .send::<(), TokenPair>(HttpMethod::Get, "/malformed", NO_BODY, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode { ref path, .. } if path == "/malformed"), "got {:?}", err);
    assert_eq!(err.code_str(), "decode_error");
}

#[tokio::test]
async fn empty_success_body_needs_no_content_variant() {
    let backend = start_backend().await;
    let d = dispatcher(&backend.base);
    d.send_no_content(HttpMethod::Patch, "/recipes/r-1/cook", NO_BODY, Some("t.t.t")).await.unwrap();

    // decoding nothing into a value is reported, not papered over
    let err = d.send::<(), Value>(HttpMethod::Patch, "/recipes/r-1/cook", NO_BODY, None).await.unwrap_err();
    assert_eq!(err.code_str(), "decode_error");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let err = dispatcher(&format!("http://127.0.0.1:{}", port))
        .send::<(), Value>(HttpMethod::Get, "/users/x", NO_BODY, None)
        .await
        .unwrap_err();
    assert_eq!(err.code_str(), "transport_error");
}
