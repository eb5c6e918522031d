//! Administrator dashboard routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use fruit_union_core::{CustomerId, NewCustomerForm, SubscriptionStatus};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{RequireAdmin, refresh_if_expired};
use crate::models::{AdminView, CurrentUser, session_keys};
use crate::services::{AdminCommand, AdminController};
use crate::state::AppState;

use super::{ActionResponse, load_view, store_view};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(index))
        .route("/admin/customers", post(create_customer))
        .route("/admin/customers/{id}", get(view_customer))
        .route("/admin/customers/{id}/subscription", post(set_subscription))
        .route("/admin/customers/{id}/toggle", post(toggle_subscription))
        .route("/admin/selection", delete(close_customer))
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionStatusRequest {
    pub status: SubscriptionStatus,
}

/// Dispatch against the session's last admin view and store the result.
async fn run(
    state: &AppState,
    session: &Session,
    user: CurrentUser,
    command: AdminCommand,
) -> Result<ActionResponse<AdminView>, AppError> {
    let user = refresh_if_expired(state, session, user).await?;
    let view: AdminView = load_view(session, session_keys::ADMIN_VIEW).await?;
    let gateway = state.gateway_for(&user);
    let outcome = AdminController::new(gateway.as_ref(), state.history())
        .dispatch(&view, command)
        .await;
    store_view(session, session_keys::ADMIN_VIEW, &outcome.view).await?;
    Ok(ActionResponse(outcome))
}

async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> Result<ActionResponse<AdminView>, AppError> {
    run(&state, &session, user, AdminCommand::Refresh).await
}

async fn create_customer(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Json(form): Json<NewCustomerForm>,
) -> Result<ActionResponse<AdminView>, AppError> {
    run(&state, &session, user, AdminCommand::CreateCustomer(form)).await
}

async fn view_customer(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(customer_id): Path<CustomerId>,
) -> Result<ActionResponse<AdminView>, AppError> {
    run(&state, &session, user, AdminCommand::ViewCustomer(customer_id)).await
}

async fn set_subscription(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(customer_id): Path<CustomerId>,
    Json(request): Json<SubscriptionStatusRequest>,
) -> Result<ActionResponse<AdminView>, AppError> {
    let command = AdminCommand::SetSubscriptionStatus {
        customer_id,
        status: request.status,
    };
    run(&state, &session, user, command).await
}

async fn toggle_subscription(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(customer_id): Path<CustomerId>,
) -> Result<ActionResponse<AdminView>, AppError> {
    run(&state, &session, user, AdminCommand::ToggleSubscription(customer_id)).await
}

async fn close_customer(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> Result<ActionResponse<AdminView>, AppError> {
    run(&state, &session, user, AdminCommand::CloseCustomer).await
}
