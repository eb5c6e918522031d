//! HTTP route handlers for the dashboards.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (backend reachable)
//!
//! # Public
//! GET  /api/plans                           - Pricing catalog
//!
//! # Auth (password sign-in against the backend)
//! POST /auth/login                          - Sign in
//! POST /auth/logout                         - Sign out
//! GET  /auth/me                             - Current user
//!
//! # Admin dashboard (admin role)
//! GET    /admin                             - Counts + roster
//! POST   /admin/customers                   - Provision a customer account
//! GET    /admin/customers/{id}              - Open a customer's deliveries
//! POST   /admin/customers/{id}/subscription - Set subscription status
//! POST   /admin/customers/{id}/toggle       - Flip subscription status
//! DELETE /admin/selection                   - Close the open customer
//!
//! # Delivery partner dashboard (delivery_partner role)
//! GET    /partner                           - Roster
//! GET    /partner/customers/{id}            - Open a customer's deliveries
//! POST   /partner/deliveries/{id}/delivered - Mark delivered
//! POST   /partner/deliveries/{id}/pending   - Mark not delivered
//! DELETE /partner/selection                 - Close the open customer
//! ```
//!
//! Dashboard routes answer with the command [`Outcome`]: the new view plus
//! an optional notification. The last view per dashboard lives in the
//! session so follow-up commands (toggle, close) build on it.

pub mod admin;
pub mod auth;
pub mod health;
pub mod partner;
pub mod plans;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use crate::error::AppError;
use crate::services::{Failure, Outcome};
use crate::state::AppState;

/// All application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(plans::router())
        .merge(auth::router())
        .merge(admin::router())
        .merge(partner::router())
}

/// JSON response for a dispatched dashboard command.
///
/// Validation failures answer 422 and remote failures 502; the body always
/// carries the (possibly unchanged) view.
pub struct ActionResponse<V>(pub Outcome<V>);

impl<V: Serialize> IntoResponse for ActionResponse<V> {
    fn into_response(self) -> Response {
        let status = match self.0.failure {
            None => StatusCode::OK,
            Some(Failure::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(Failure::Remote) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(self.0)).into_response()
    }
}

/// Last view stored under `key`, or an empty one.
async fn load_view<V>(session: &Session, key: &str) -> Result<V, AppError>
where
    V: DeserializeOwned + Default,
{
    Ok(session.get::<V>(key).await?.unwrap_or_default())
}

async fn store_view<V: Serialize>(session: &Session, key: &str, view: &V) -> Result<(), AppError> {
    session.insert(key, view).await?;
    Ok(())
}
