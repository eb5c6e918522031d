//! Delivery partner dashboard routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use fruit_union_core::{CustomerId, DeliveryId};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{RequireDeliveryPartner, refresh_if_expired};
use crate::models::{CurrentUser, PartnerView, session_keys};
use crate::services::{DeliveryPartnerController, PartnerCommand};
use crate::state::AppState;

use super::{ActionResponse, load_view, store_view};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/partner", get(index))
        .route("/partner/customers/{id}", get(view_customer))
        .route("/partner/deliveries/{id}/delivered", post(mark_delivered))
        .route("/partner/deliveries/{id}/pending", post(mark_pending))
        .route("/partner/selection", delete(close_customer))
}

/// Body of a delivery status change: the delivery's owning customer, whose
/// history is reloaded afterwards.
#[derive(Debug, Deserialize)]
pub struct DeliveryStatusRequest {
    pub customer_id: CustomerId,
}

async fn run(
    state: &AppState,
    session: &Session,
    user: CurrentUser,
    command: PartnerCommand,
) -> Result<ActionResponse<PartnerView>, AppError> {
    let user = refresh_if_expired(state, session, user).await?;
    let view: PartnerView = load_view(session, session_keys::PARTNER_VIEW).await?;
    let gateway = state.gateway_for(&user);
    let outcome = DeliveryPartnerController::new(gateway.as_ref(), state.history())
        .dispatch(&view, command)
        .await;
    store_view(session, session_keys::PARTNER_VIEW, &outcome.view).await?;
    Ok(ActionResponse(outcome))
}

async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireDeliveryPartner(user): RequireDeliveryPartner,
) -> Result<ActionResponse<PartnerView>, AppError> {
    run(&state, &session, user, PartnerCommand::Refresh).await
}

async fn view_customer(
    State(state): State<AppState>,
    session: Session,
    RequireDeliveryPartner(user): RequireDeliveryPartner,
    Path(customer_id): Path<CustomerId>,
) -> Result<ActionResponse<PartnerView>, AppError> {
    run(&state, &session, user, PartnerCommand::ViewCustomer(customer_id)).await
}

async fn mark_delivered(
    State(state): State<AppState>,
    session: Session,
    RequireDeliveryPartner(user): RequireDeliveryPartner,
    Path(delivery_id): Path<DeliveryId>,
    Json(request): Json<DeliveryStatusRequest>,
) -> Result<ActionResponse<PartnerView>, AppError> {
    let command = PartnerCommand::MarkDelivered {
        delivery_id,
        customer_id: request.customer_id,
    };
    run(&state, &session, user, command).await
}

async fn mark_pending(
    State(state): State<AppState>,
    session: Session,
    RequireDeliveryPartner(user): RequireDeliveryPartner,
    Path(delivery_id): Path<DeliveryId>,
    Json(request): Json<DeliveryStatusRequest>,
) -> Result<ActionResponse<PartnerView>, AppError> {
    let command = PartnerCommand::MarkPending {
        delivery_id,
        customer_id: request.customer_id,
    };
    run(&state, &session, user, command).await
}

async fn close_customer(
    State(state): State<AppState>,
    session: Session,
    RequireDeliveryPartner(user): RequireDeliveryPartner,
) -> Result<ActionResponse<PartnerView>, AppError> {
    run(&state, &session, user, PartnerCommand::CloseCustomer).await
}
