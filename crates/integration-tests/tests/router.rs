//! In-process router tests via `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use recipe_accounts_integration_tests::memory_router;
use recipe_accounts_server::middleware::{REQUEST_ID_HEADER, users_rate_limiter};
use serde_json::{Value, json};
use tower::ServiceExt;

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    // What `into_make_service_with_connect_info` records for a real connection
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([203, 0, 113, 9], 50_000))));
    request
}

fn forwarded_for(mut request: Request<Body>, ip: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("x-forwarded-for", ip.parse().unwrap());
    request
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_signup_then_token() {
    let app = memory_router(None).unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "/users/create",
            &json!({"email": "Chef@Example.com", "password": "testpass123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "chef@example.com");

    let (status, body) = send(
        &app,
        json_request(
            "/users/token",
            &json!({"email": "chef@example.com", "password": "testpass123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let app = memory_router(None).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/users/token")
        .body(Body::from(r#"{"email":"a@b.c","password":"x"}"#))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = memory_router(None).unwrap();

    let request = Request::builder()
        .uri("/users/nope")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = memory_router(None).unwrap();

    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-123");
}

#[tokio::test]
async fn test_users_routes_are_rate_limited() {
    let app = memory_router(users_rate_limiter(false)).unwrap();
    let credentials = json!({"email": "nobody@example.com", "password": "testpass123"});

    // Burst of 5 is allowed, the 6th is rejected
    for _ in 0..5 {
        let (status, _) = send(&app, json_request("/users/token", &credentials)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, _) = send(&app, json_request("/users/token", &credentials)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Health checks are outside the limiter
    let request = Request::builder()
        .uri("/health")
        .header("X-Forwarded-For", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_evade_limit() {
    let app = memory_router(users_rate_limiter(false)).unwrap();
    let credentials = json!({"email": "nobody@example.com", "password": "testpass123"});

    let mut limited = 0;
    for i in 0..20 {
        let request = forwarded_for(
            json_request("/users/token", &credentials),
            &format!("198.51.100.{i}"),
        );
        let (status, _) = send(&app, request).await;
        if status == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }
    // Burst of 5, then rejected; allow for one replenish on a slow run
    assert!(limited >= 14, "{limited} of 20 requests rate limited");
}

#[tokio::test]
async fn test_trusted_proxy_headers_key_per_client() {
    let app = memory_router(users_rate_limiter(true)).unwrap();
    let credentials = json!({"email": "nobody@example.com", "password": "testpass123"});

    // One proxy peer, two clients behind it: each gets its own burst
    for ip in ["198.51.100.1", "198.51.100.2"] {
        for _ in 0..5 {
            let request = forwarded_for(json_request("/users/token", &credentials), ip);
            let (status, _) = send(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    let request = forwarded_for(json_request("/users/token", &credentials), "198.51.100.1");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
