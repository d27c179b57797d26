use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use dgas_identity::{Profile, ProfileInput, Session};
use dgas_notification::FeedItem;
use dgas_order::Order;
use dgas_shared::{
    notification::FeedKind,
    order::{OrderStatus, Payment},
};
use dgas_subscription::Ledger;
use serde::{Deserialize, Serialize};

use super::{AppState, booking};
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile).post(update_profile))
        .route("/profile/orders", get(orders))
        .route("/track", get(track))
        .route("/subscription", get(subscription))
        .route("/booking", get(booking::draft).post(booking::save_draft))
        .route("/payment", post(booking::payment))
        .route("/notifications", get(notifications))
        .route("/promotions", get(promotions))
        .route_layer(middleware::from_fn(crate::auth::require_customer))
}

#[derive(Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// GET /profile
async fn profile(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Profile>> {
    Ok(Json(app.identity.profile(&session.account_id).await?))
}

/// POST /profile
async fn update_profile(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Json(form): Json<ProfileForm>,
) -> AppResult<Json<Profile>> {
    let profile = app
        .identity
        .update_profile(
            &session.account_id,
            ProfileInput {
                full_name: form.full_name,
                address: form.address,
            },
        )
        .await?;

    Ok(Json(profile))
}

/// GET /profile/orders - order history, newest first.
async fn orders(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(app.order_query.history(&session.account_id).await?))
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct TrackStep {
    pub status: OrderStatus,
    pub label: &'static str,
    pub reached: bool,
}

#[derive(Serialize)]
pub struct TrackView {
    pub order: Option<Order>,
    pub steps: Vec<TrackStep>,
}

/// Progress along the fulfilment path. A rejected order reaches no step.
fn track_steps(order: &Order) -> Vec<TrackStep> {
    let current = order.status.step();

    [
        OrderStatus::PendingApproval,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ]
    .into_iter()
    .filter(|status| order.payment == Payment::Subscription || *status != OrderStatus::PendingApproval)
    .map(|status| TrackStep {
        status,
        label: status.label(),
        reached: matches!((status.step(), current), (Some(step), Some(current)) if step <= current),
    })
    .collect()
}

/// GET /track - the customer's most recent order.
async fn track(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<TrackView>> {
    let order = app.order_query.latest(&session.account_id).await?;
    let steps = order.as_ref().map(track_steps).unwrap_or_default();

    Ok(Json(TrackView { order, steps }))
}

/// GET /subscription
async fn subscription(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Ledger>> {
    Ok(Json(
        app.subscription_command.load(&session.account_id).await?,
    ))
}

/// GET /notifications
async fn notifications(State(app): State<AppState>) -> AppResult<Json<Vec<FeedItem>>> {
    Ok(Json(app.feed_query.list(FeedKind::Notification).await?))
}

/// GET /promotions
async fn promotions(State(app): State<AppState>) -> AppResult<Json<Vec<FeedItem>>> {
    Ok(Json(app.feed_query.list(FeedKind::Promotion).await?))
}

#[cfg(test)]
mod tests {
    use dgas_shared::order::{CylinderType, DeliverySlot};

    use super::*;

    fn order(status: OrderStatus, payment: Payment) -> Order {
        Order {
            id: "01J0ORDER".to_owned(),
            order_number: "DGAS00042".to_owned(),
            account_id: "01J0ACCOUNT".to_owned(),
            cylinder_type: CylinderType::Family,
            delivery_date: "2026-10-20".to_owned(),
            delivery_slot: DeliverySlot::Morning,
            address: "12 Lake Road".to_owned(),
            payment,
            total: 0,
            status,
            refunded: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_track_steps_follow_status() {
        let steps = track_steps(&order(OrderStatus::Processing, Payment::Subscription));
        let reached = steps.iter().filter(|s| s.reached).count();

        assert_eq!(steps.len(), 5);
        assert_eq!(reached, 3);
        assert_eq!(steps[3].label, "Out for Delivery");
    }

    #[test]
    fn test_card_orders_skip_approval_step() {
        let steps = track_steps(&order(OrderStatus::Confirmed, Payment::Card));

        assert_eq!(steps.len(), 4);
        assert!(steps[0].reached);
        assert_eq!(steps[0].status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_rejected_order_reaches_no_step() {
        let steps = track_steps(&order(OrderStatus::Rejected, Payment::Subscription));

        assert!(steps.iter().all(|s| !s.reached));
    }
}
