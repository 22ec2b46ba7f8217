//! Integration tests for the bearer-token exchange using wiremock.

use jamf_search::auth::obtain_session;
use jamf_search::error::JamfError;
use reqwest::header::AUTHORIZATION;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn obtain_session_returns_bearer_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .and(basic_auth("api-reader", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "jamf-token-123",
            "expires": "2026-10-19T21:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = obtain_session(&server.uri(), "api-reader", "s3cret")
        .await
        .unwrap();

    assert_eq!(session.authorization(), "Bearer jamf-token-123");
    let headers = session.header_map().unwrap();
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer jamf-token-123");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_normalized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "t" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = obtain_session(&format!("{}/", server.uri()), "u", "p").await;
    assert!(result.is_ok(), "trailing slash should not break the token path");
}

#[tokio::test]
async fn rejected_credentials_fail_with_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = obtain_session(&server.uri(), "u", "wrong").await.unwrap_err();
    match err {
        JamfError::Auth { message, .. } => {
            assert!(message.contains("401"), "message should carry the status");
            assert!(message.contains("Unauthorized"), "message should carry the body");
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn success_without_token_fails_with_no_token_obtained() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "expires": "soon" })),
        )
        .mount(&server)
        .await;

    let err = obtain_session(&server.uri(), "u", "p").await.unwrap_err();
    match err {
        JamfError::Auth { message, .. } => assert_eq!(message, "no token obtained"),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_token_is_treated_as_missing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "" })),
        )
        .mount(&server)
        .await;

    let err = obtain_session(&server.uri(), "u", "p").await.unwrap_err();
    assert!(err.to_string().contains("no token obtained"));
}

#[tokio::test]
async fn non_json_body_fails_with_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = obtain_session(&server.uri(), "u", "p").await.unwrap_err();
    assert!(matches!(err, JamfError::Auth { source: Some(_), .. }));
}
