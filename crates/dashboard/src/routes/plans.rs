//! Public pricing catalog.

use axum::{Json, Router, routing::get};
use fruit_union_core::{PricingPlan, pricing_plans};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/plans", get(list_plans))
}

async fn list_plans() -> Json<Vec<PricingPlan>> {
    Json(pricing_plans())
}
