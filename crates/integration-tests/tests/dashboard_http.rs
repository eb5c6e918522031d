//! Router tests: the full middleware stack over an unreachable backend.

#![allow(clippy::unwrap_used)]

use axum::{
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use fruit_union_integration_tests::test_app;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(request: Request<Body>) -> Response<Body> {
    test_app().oneshot(request).await.unwrap()
}

async fn get(uri: &str) -> Response<Body> {
    send(Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(uri: &str, body: &Value) -> Response<Body> {
    send(
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================================
// Health & Catalog
// ============================================================================

#[tokio::test]
async fn test_liveness() {
    let response = get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_backend() {
    let response = get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pricing_catalog() {
    let response = get("/api/plans").await;
    assert_eq!(response.status(), StatusCode::OK);

    let plans: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), 3);

    let popular: Vec<_> = plans
        .iter()
        .filter(|p| p["popular"] == json!(true))
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(popular, ["Bi-Weekly Plan"]);
}

// ============================================================================
// Request IDs
// ============================================================================

#[tokio::test]
async fn test_request_id_generated() {
    let response = get("/health").await;
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_request_id_propagated() {
    let response = send(
        Request::get("/api/plans")
            .header("x-request-id", "edge-7f3a")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.headers()["x-request-id"], "edge-7f3a");
}

// ============================================================================
// Access Control
// ============================================================================

#[tokio::test]
async fn test_dashboards_require_sign_in() {
    for uri in ["/admin", "/partner", "/admin/customers/0b7f8a4e-3c51-4f3e-8f60-5d2b9c1a7e21"] {
        assert_eq!(get(uri).await.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let toggle = send(
        Request::post("/partner/deliveries/6f1c2b1e-8d3a-4a7e-9a51-0d1f5e2c9b10/delivered")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"customer_id": "0b7f8a4e-3c51-4f3e-8f60-5d2b9c1a7e21"}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(toggle.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_without_session() {
    assert_eq!(get("/auth/me").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_is_harmless() {
    let response = send(Request::post("/auth/logout").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_login_rejects_blank_fields_before_backend() {
    let blank_login = post_json("/auth/login", &json!({"login": "", "password": "secret123"})).await;
    assert_eq!(blank_login.status(), StatusCode::BAD_REQUEST);

    let blank_password = post_json("/auth/login", &json!({"login": "jane_d", "password": ""})).await;
    assert_eq!(blank_password.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_backend_down_is_bad_gateway() {
    let response = post_json(
        "/auth/login",
        &json!({"login": "jane_d", "password": "secret123"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_text(response).await, "External service error");
}
