//! Router-level tests against an in-process backend.
//!
//! Requests are driven through the full middleware stack with `oneshot`;
//! the recording backend shows exactly what would have left the gateway.

use std::sync::Arc;

use api_gateway::config::GatewayConfig;
use api_gateway::{Endpoint, ErrorEnvelope, GatewayServer, Method, ResolutionTable};
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::RecordingBackend;

fn router_with(config: GatewayConfig, backend: &RecordingBackend) -> Router {
    let table = ResolutionTable::new([
        ("login", Endpoint::new("/auth/login/", Method::Post)),
        ("uploadDocument", Endpoint::new("/documents/", Method::Post)),
    ]);
    GatewayServer::with_backend(config, table, Arc::new(backend.clone()))
        .unwrap()
        .router()
}

fn router(backend: &RecordingBackend) -> Router {
    router_with(GatewayConfig::default(), backend)
}

fn post(content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap()
}

fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let boundary = "gateway-test-boundary";
    let mut body = String::new();
    for (name, file_name, value) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: text/plain\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    post(&format!("multipart/form-data; boundary={boundary}"), body)
}

async fn envelope(response: Response) -> ErrorEnvelope {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_json_request_resolves_and_strips_operation() {
    let backend = RecordingBackend::new(json!({ "ok": true }));
    let request = post(
        "application/json",
        json!({ "apiRoute": "login", "username": "ada" }).to_string(),
    );

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let call = backend.last_call().unwrap();
    assert_eq!(call.endpoint, Endpoint::new("/auth/login/", Method::Post));
    assert_eq!(call.fields, json!({ "username": "ada" }).as_object().unwrap().clone());
    assert!(call.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_unknown_operation_is_rejected_for_every_encoding() {
    let backend = RecordingBackend::new(json!({}));
    let requests = vec![
        post("application/json", r#"{"apiRoute":"dropTables"}"#),
        post("application/x-www-form-urlencoded", "apiRoute=dropTables"),
        multipart(&[("apiRoute", None, "dropTables")]),
    ];

    for request in requests {
        let response = router(&backend).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(envelope(response).await.error, "Unknown apiRoute: dropTables");
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_operation_lookup_is_case_sensitive() {
    let backend = RecordingBackend::new(json!({}));
    let request = post("application/json", r#"{"apiRoute":"Login"}"#);

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_missing_operation() {
    let backend = RecordingBackend::new(json!({}));
    let request = post("application/json", r#"{"username":"ada"}"#);

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(envelope(response).await.error, "Missing apiRoute");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let backend = RecordingBackend::new(json!({}));
    let request = post("text/plain", "apiRoute=login");

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        envelope(response).await.error,
        "Unsupported content type: text/plain"
    );
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json() {
    let backend = RecordingBackend::new(json!({}));
    let request = post("application/json", r#"{"apiRoute": "login""#);

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(envelope(response).await.error, "Malformed request body");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    let backend = RecordingBackend::new(json!({}));

    for path in ["/", "/auth/login", "/deeply/nested/path"] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = router(&backend).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_non_post_method_is_rejected() {
    let backend = RecordingBackend::new(json!({}));
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_multipart_fields_collapse_and_files_are_staged() {
    let backend = RecordingBackend::new(json!({ "stored": true }));
    let request = multipart(&[
        ("apiRoute", None, "uploadDocument"),
        ("title", None, "Lease"),
        ("tags", None, "a"),
        ("tags", None, "b"),
        ("category", None, "legal"),
        ("document", Some("lease.txt"), "tenant: ada"),
        ("empty", Some(""), ""),
    ]);

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let call = backend.last_call().unwrap();
    assert_eq!(call.endpoint.path, "/documents/");
    assert_eq!(call.fields["title"], json!("Lease"));
    assert_eq!(call.fields["category"], json!("legal"));
    assert_eq!(call.fields["tags"], json!(["a", "b"]));
    assert!(!call.fields.contains_key("apiRoute"));

    assert_eq!(call.files.len(), 1);
    let (field, file_name, contents) = &call.files[0];
    assert_eq!(field, "document");
    assert_eq!(file_name, "lease.txt");
    assert_eq!(contents.as_slice(), b"tenant: ada");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let backend = RecordingBackend::new(json!({}));
    let mut config = GatewayConfig::default();
    config.limits.max_body_size = 1024;

    let padding = "x".repeat(4096);
    let request = post(
        "application/json",
        json!({ "apiRoute": "login", "padding": padding }).to_string(),
    );

    let response = router_with(config, &backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(envelope(response).await.error, "Request body too large");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let backend = RecordingBackend::new(json!({}));
    let mut config = GatewayConfig::default();
    config.limits.max_body_size = 1024;

    let contents = "y".repeat(8 * 1024);
    let request = multipart(&[
        ("apiRoute", None, "uploadDocument"),
        ("document", Some("scan.txt"), contents.as_str()),
    ]);

    let response = router_with(config, &backend).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(envelope(response).await.error, "Request body too large");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_credentials_are_forwarded() {
    let backend = RecordingBackend::new(json!({}));
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, "theme=dark; sessionid=s1; csrftoken=c1")
        .body(Body::from(r#"{"apiRoute":"login"}"#))
        .unwrap();

    router(&backend).oneshot(request).await.unwrap();

    let call = backend.last_call().unwrap();
    assert_eq!(call.headers["x-csrftoken"], "c1");
    assert_eq!(call.headers[COOKIE], "sessionid=s1; csrftoken=c1");
}

#[tokio::test]
async fn test_client_request_id_is_kept() {
    let backend = RecordingBackend::new(json!({}));
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from(r#"{"apiRoute":"login"}"#))
        .unwrap();

    let response = router(&backend).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(backend.last_call().unwrap().headers["x-request-id"], "req-42");
}
