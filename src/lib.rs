pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod observability;
pub mod routes;

use std::time::Duration;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use config::Config;
pub use db::{create_pool, create_read_pool, create_write_pool, run_migrations};
pub use routes::AppState;

/// Full HTTP application: routes, request timeout and request tracing.
pub fn create_app(app_state: AppState) -> Router {
    let timeout = Duration::from_secs(app_state.config.server.request_timeout);

    routes::router(app_state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}
