//! Integration tests for The Fruit Union dashboards.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (router + in-memory backend)
//! cargo test -p fruit-union-integration-tests
//!
//! # Live backend tests
//! SUPABASE_URL=... SUPABASE_ANON_KEY=... FRUIT_TEST_ADMIN_LOGIN=... \
//!     FRUIT_TEST_ADMIN_PASSWORD=... cargo test -p fruit-union-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `dashboard_http` - the router with its full middleware stack
//! - `signed_in_http` - signed-in dashboard requests through the router
//! - `admin_workflows` - admin controller against the in-memory backend
//! - `partner_workflows` - delivery partner controller against the in-memory backend
//! - `live_backend` - sign-in and reads against a real project (ignored by default)

#![allow(clippy::unwrap_used)]

pub mod auth_backend;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use chrono::NaiveDate;
use fruit_union_core::{
    CustomerId, DeliveryId, DeliveryStatus, SubscriptionPlan, SubscriptionStatus,
};
use fruit_union_dashboard::config::{DashboardConfig, SupabaseConfig};
use fruit_union_dashboard::gateway::{InMemoryGateway, RemoteGateway};
use fruit_union_dashboard::models::CurrentUser;
use fruit_union_dashboard::state::AppState;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

pub use auth_backend::AuthBackend;

/// Backend URL that refuses connections.
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9";

/// Dashboard config pointed at [`UNREACHABLE_BACKEND`].
#[must_use]
pub fn test_config() -> DashboardConfig {
    DashboardConfig::with_defaults(
        "http://localhost:3001",
        SupabaseConfig {
            url: Url::parse(UNREACHABLE_BACKEND).unwrap(),
            anon_key: SecretString::from("test-anon-key".to_string()),
        },
    )
}

/// The full application router over [`test_config`].
#[must_use]
pub fn test_app() -> Router {
    fruit_union_dashboard::app(AppState::new(test_config()))
}

/// The full application router: sign-in against `backend`, dashboard
/// commands against `gateway`.
#[must_use]
pub fn signed_in_app(backend: &AuthBackend, gateway: &Arc<InMemoryGateway>) -> Router {
    let gateway = Arc::clone(gateway);
    let state = AppState::with_gateways(backend.config(), move |_: &CurrentUser| {
        Arc::clone(&gateway) as Arc<dyn RemoteGateway>
    });
    fruit_union_dashboard::app(state)
}

/// Sends requests through a router, carrying the session cookie along.
pub struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    #[must_use]
    pub const fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let (mut parts, body) = request.into_parts();
        if let Some(cookie) = &self.cookie {
            parts.headers.insert(header::COOKIE, cookie.parse().unwrap());
        }
        let response = self
            .app
            .clone()
            .oneshot(Request::from_parts(parts, body))
            .await
            .unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_owned());
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&mut self, uri: &str, body: &Value) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Sign in through `/auth/login`, panicking unless it succeeds.
    pub async fn sign_in(&mut self, login: &str, password: &str) -> Value {
        let response = self
            .post_json(
                "/auth/login",
                &serde_json::json!({"login": login, "password": password}),
            )
            .await;
        assert!(response.status().is_success(), "sign-in as {login}: {}", response.status());
        json_body(response).await
    }
}

/// Parse a response body as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A small roster: two customers, three deliveries.
pub struct Orchard {
    pub gateway: Arc<InMemoryGateway>,
    pub asha: CustomerId,
    pub ravi: CustomerId,
    pub asha_pending: DeliveryId,
    pub asha_delivered: DeliveryId,
    pub ravi_in_transit: DeliveryId,
}

impl Orchard {
    #[must_use]
    pub fn new() -> Self {
        let gateway = InMemoryGateway::new();
        gateway.set_partner_count(2);

        let asha = gateway.add_customer(
            "Asha Menon",
            SubscriptionPlan::Premium,
            SubscriptionStatus::Active,
        );
        let ravi = gateway.add_customer(
            "Ravi Kumar",
            SubscriptionPlan::Basic,
            SubscriptionStatus::Inactive,
        );

        let asha_pending = gateway.add_delivery(
            asha,
            date(2024, 3, 11),
            "Mangoes, Guava",
            DeliveryStatus::Pending,
        );
        let asha_delivered = gateway.add_delivery(
            asha,
            date(2024, 3, 4),
            "Papaya, Bananas",
            DeliveryStatus::Delivered,
        );
        let ravi_in_transit = gateway.add_delivery(
            ravi,
            date(2024, 3, 11),
            "Apples",
            DeliveryStatus::InTransit,
        );

        Self {
            gateway: Arc::new(gateway),
            asha,
            ravi,
            asha_pending,
            asha_delivered,
            ravi_in_transit,
        }
    }
}

impl Default for Orchard {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
