mod common;

use std::io::{Read, Write};
use std::net::TcpListener;

use common::{Harness, UNREACHABLE_BASE_URL};
use opsdeck_core::api::error::{GENERIC_FAILURE_MESSAGE, NETWORK_FAILURE_MESSAGE};
use opsdeck_core::api::RequestBody;
use opsdeck_core::auth::TokenStore;
use opsdeck_core::ApiError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn success_passes_response_through() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());

    Mock::given(method("GET"))
        .and(path("/api/servers"))
        .respond_with(ResponseTemplate::new(202).set_body_string("raw body"))
        .mount(&server)
        .await;

    let response = h
        .api
        .request(Method::GET, "/servers", RequestBody::Empty, HeaderMap::new())
        .await
        .expect("2xx should pass through");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.text().await.unwrap(), "raw body");
    assert!(h.notifier.messages().is_empty());
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn authorization_header_follows_set_authorization() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&server)
        .await;

    h.api.set_authorization(Some("abc123"));
    assert_eq!(h.api.authorization().as_deref(), Some("Bearer abc123"));
    let health = h.api.health().await.expect("health should succeed");
    assert!(health.is_healthy());

    h.api.set_authorization(None);
    assert_eq!(h.api.authorization(), None);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn per_request_headers_override_defaults() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());

    Mock::given(method("DELETE"))
        .and(path("/api/scripts/7"))
        .and(header("authorization", "Bearer override"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    h.api.set_authorization(Some("default"));
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer override"));
    h.api
        .request(Method::DELETE, "scripts/7", RequestBody::Empty, headers)
        .await
        .expect("override should be accepted");
}

#[tokio::test]
async fn json_helpers_send_and_decode() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_json(json!({"name": "backup"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3, "name": "backup"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/3"))
        .and(body_json(json!({"name": "nightly-backup"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 3, "name": "nightly-backup"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let created: serde_json::Value = h
        .api
        .post_json("/tasks", &json!({"name": "backup"}))
        .await
        .unwrap();
    assert_eq!(created["id"], 3);
    let updated: serde_json::Value = h
        .api
        .put_json("/tasks/3", &json!({"name": "nightly-backup"}))
        .await
        .unwrap();
    assert_eq!(updated["name"], "nightly-backup");
    h.api.delete("/tasks/3").await.unwrap();
}

#[tokio::test]
async fn server_detail_is_notified_and_error_returned() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());

    Mock::given(method("GET"))
        .and(path("/api/servers/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Server not found"})))
        .mount(&server)
        .await;

    let err = h
        .api
        .get_json::<serde_json::Value>("/servers/9")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Server { status: StatusCode::NOT_FOUND, .. }));
    assert_eq!(h.notifier.messages(), vec!["Server not found".to_string()]);
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn missing_detail_uses_generic_message() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = h.api.get_json::<serde_json::Value>("/alerts").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(h.notifier.messages(), vec![GENERIC_FAILURE_MESSAGE.to_string()]);
}

#[tokio::test]
async fn unauthorized_wipes_token_and_redirects() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());
    h.storage.save("expired").unwrap();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})),
        )
        .mount(&server)
        .await;

    let err = h.api.get_json::<serde_json::Value>("/users").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(h.stored_token(), None);
    assert_eq!(h.navigator.redirects(), vec!["/login".to_string()]);
    assert_eq!(
        h.notifier.messages(),
        vec!["Could not validate credentials".to_string()]
    );
}

#[tokio::test]
async fn network_failure_notifies_connectivity_error() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(UNREACHABLE_BASE_URL, dir.path());
    h.storage.save("kept").unwrap();

    let err = h.api.get_json::<serde_json::Value>("/servers").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(!err.has_response());
    assert_eq!(h.notifier.messages(), vec![NETWORK_FAILURE_MESSAGE.to_string()]);
    // Only a 401 touches the stored token
    assert_eq!(h.stored_token().as_deref(), Some("kept"));
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn undecodable_success_body_is_not_notified() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::for_server(&server, dir.path());

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = h.api.health().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn truncated_success_body_is_a_network_failure() {
    // Promise a longer body than is sent, then hang up.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"sta",
            );
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(&format!("http://{}/api", addr), dir.path());

    let err = h.api.health().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(h.notifier.messages(), vec![NETWORK_FAILURE_MESSAGE.to_string()]);
    assert!(h.navigator.redirects().is_empty());
}
