use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use dgas_identity::Session;
use dgas_inventory::{AdjustStockInput, SetStockInput, Stock, parse_sku};
use dgas_notification::{FeedItem, PublishInput};
use dgas_order::{Order, StaffOrder};
use dgas_shared::notification::FeedKind;
use dgas_subscription::{Ledger, RenewInput};
use serde::Deserialize;

use super::AppState;
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(orders))
        .route("/admin/orders/{id}/status", post(set_status))
        .route("/admin/inventory", get(inventory))
        .route("/admin/inventory/{sku}", post(set_stock))
        .route("/admin/inventory/{sku}/adjust", post(adjust_stock))
        .route("/admin/notifications", post(publish_notification))
        .route("/admin/promotions", post(publish_promotion))
        .route("/admin/subscriptions/{account_id}", get(subscription))
        .route(
            "/admin/subscriptions/{account_id}/renew",
            post(renew_subscription),
        )
        .route(
            "/admin/subscriptions/{account_id}/activate",
            post(activate_subscription),
        )
        .route(
            "/admin/subscriptions/{account_id}/deactivate",
            post(deactivate_subscription),
        )
        .route_layer(middleware::from_fn(crate::auth::require_admin))
}

/// GET /admin/orders
async fn orders(State(app): State<AppState>) -> AppResult<Json<Vec<StaffOrder>>> {
    Ok(Json(app.order_query.all().await?))
}

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// POST /admin/orders/{id}/status
async fn set_status(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(form): Json<StatusForm>,
) -> AppResult<Json<Order>> {
    let order = app
        .order_command
        .set_status(&id, &form.status, session.role)
        .await?;

    Ok(Json(order))
}

/// GET /admin/inventory
async fn inventory(State(app): State<AppState>) -> AppResult<Json<Vec<Stock>>> {
    Ok(Json(app.inventory_query.list().await?))
}

#[derive(Deserialize)]
pub struct AdjustForm {
    pub delta: i64,
}

/// POST /admin/inventory/{sku}/adjust
async fn adjust_stock(
    State(app): State<AppState>,
    Path(sku): Path<String>,
    Json(form): Json<AdjustForm>,
) -> AppResult<Json<Stock>> {
    let sku = parse_sku(&sku)?;

    Ok(Json(
        app.inventory_command
            .adjust_stock(sku, AdjustStockInput { delta: form.delta })
            .await?,
    ))
}

#[derive(Deserialize)]
pub struct SetStockForm {
    pub count: i64,
}

/// POST /admin/inventory/{sku}
async fn set_stock(
    State(app): State<AppState>,
    Path(sku): Path<String>,
    Json(form): Json<SetStockForm>,
) -> AppResult<Json<Stock>> {
    let sku = parse_sku(&sku)?;
    let stock = app
        .inventory_command
        .set_stock(sku, SetStockInput { count: form.count })
        .await?;

    Ok(Json(stock))
}

#[derive(Deserialize)]
pub struct FeedForm {
    pub title: String,
    pub description: String,
}

async fn publish(
    app: AppState,
    kind: FeedKind,
    form: FeedForm,
) -> AppResult<(StatusCode, Json<FeedItem>)> {
    let item = app
        .feed_command
        .publish(
            kind,
            PublishInput {
                title: form.title,
                description: form.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /admin/notifications
async fn publish_notification(
    State(app): State<AppState>,
    Json(form): Json<FeedForm>,
) -> AppResult<(StatusCode, Json<FeedItem>)> {
    publish(app, FeedKind::Notification, form).await
}

/// POST /admin/promotions
async fn publish_promotion(
    State(app): State<AppState>,
    Json(form): Json<FeedForm>,
) -> AppResult<(StatusCode, Json<FeedItem>)> {
    publish(app, FeedKind::Promotion, form).await
}

/// GET /admin/subscriptions/{account_id}
async fn subscription(
    State(app): State<AppState>,
    Path(account_id): Path<String>,
) -> AppResult<Json<Ledger>> {
    Ok(Json(app.subscription_command.load(&account_id).await?))
}

#[derive(Deserialize)]
pub struct RenewForm {
    pub barrels: u32,
    pub validity_days: u32,
}

/// POST /admin/subscriptions/{account_id}/renew
async fn renew_subscription(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Path(account_id): Path<String>,
    Json(form): Json<RenewForm>,
) -> AppResult<Json<Ledger>> {
    let ledger = app
        .subscription_command
        .renew(
            &account_id,
            RenewInput {
                barrels: form.barrels,
                validity_days: form.validity_days,
            },
        )
        .await?;

    tracing::info!(%account_id, admin_id = %session.account_id, "subscription renewed by admin");

    Ok(Json(ledger))
}

/// POST /admin/subscriptions/{account_id}/activate
async fn activate_subscription(
    State(app): State<AppState>,
    Path(account_id): Path<String>,
) -> AppResult<Json<Ledger>> {
    Ok(Json(app.subscription_command.activate(&account_id).await?))
}

/// POST /admin/subscriptions/{account_id}/deactivate
async fn deactivate_subscription(
    State(app): State<AppState>,
    Path(account_id): Path<String>,
) -> AppResult<Json<Ledger>> {
    Ok(Json(
        app.subscription_command.deactivate(&account_id).await?,
    ))
}
