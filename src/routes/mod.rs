use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::config::Config;

mod admin;
mod booking;
mod customer;
mod delivery;
mod events;
mod health;
mod login;
mod signup;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub state: dgas_shared::State,
    pub identity: dgas_identity::Command,
    pub subscription_command: dgas_subscription::Command,
    pub order_command: dgas_order::Command,
    pub order_query: dgas_order::Query,
    pub inventory_command: dgas_inventory::Command,
    pub inventory_query: dgas_inventory::Query,
    pub feed_command: dgas_notification::Command,
    pub feed_query: dgas_notification::Query,
}

impl AppState {
    pub fn new(config: Config, state: dgas_shared::State) -> Self {
        Self {
            identity: dgas_identity::Command::new(state.clone(), config.identity_policy()),
            subscription_command: dgas_subscription::Command::new(state.clone()),
            order_command: dgas_order::Command::new(state.clone()),
            order_query: dgas_order::Query(state.clone()),
            inventory_command: dgas_inventory::Command(state.clone()),
            inventory_query: dgas_inventory::Query(state.clone()),
            feed_command: dgas_notification::Command(state.clone()),
            feed_query: dgas_notification::Query(state.clone()),
            config,
            state,
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    // Role guards sit inside the session layer, so they see the session
    // it loaded.
    let authenticated = Router::new()
        .route("/logout", post(login::logout))
        .route("/session/refresh", post(login::refresh))
        .route("/events", get(events::stream))
        .merge(customer::routes())
        .merge(delivery::routes())
        .merge(admin::routes())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            crate::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/signup", post(signup::customer))
        .route("/delivery/signup", post(signup::delivery_partner))
        .route("/admin/signup", post(signup::admin))
        .route("/login", post(login::customer))
        .route("/delivery/login", post(login::delivery_partner))
        .route("/admin/login", post(login::admin))
        .merge(authenticated)
        .with_state(app_state)
}
