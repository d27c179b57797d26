use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    routing::{get, post},
};
use dgas_identity::Session;
use dgas_order::{Order, StaffOrder};
use dgas_shared::order::OrderStatus;

use super::AppState;
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/delivery/orders", get(orders))
        .route("/delivery/orders/{id}/delivered", post(delivered))
        .route_layer(middleware::from_fn(crate::auth::require_delivery_partner))
}

/// GET /delivery/orders - orders out for delivery.
async fn orders(State(app): State<AppState>) -> AppResult<Json<Vec<StaffOrder>>> {
    Ok(Json(app.order_query.delivery_queue().await?))
}

/// POST /delivery/orders/{id}/delivered
async fn delivered(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = app
        .order_command
        .set_status(&id, OrderStatus::Delivered.as_ref(), session.role)
        .await?;

    tracing::info!(order_id = %id, partner_id = %session.account_id, "order delivered");

    Ok(Json(order))
}
