pub mod config;
pub mod db;
pub mod logging;
pub mod response;
pub mod review;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::config::DbConfig;
use crate::db::DatabaseProxy;
use crate::review::SchedulePolicy;
use crate::state::AppState;

/// Opens the database, or returns `None` so the server can run degraded.
pub async fn connect_database(db_config: DbConfig) -> Option<Arc<DatabaseProxy>> {
    match DatabaseProxy::connect(db_config).await {
        Ok(proxy) => Some(proxy),
        Err(err) => {
            tracing::warn!(error = %err, "database proxy not initialized");
            None
        }
    }
}

/// Opens the database (if reachable) and builds the full HTTP application.
pub async fn create_app(db_config: DbConfig, policy: SchedulePolicy) -> axum::Router {
    let db_proxy = connect_database(db_config).await;
    app_with_state(AppState::new(db_proxy, policy))
}

pub fn app_with_state(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub fn app_with_proxy(proxy: Arc<DatabaseProxy>, policy: SchedulePolicy) -> axum::Router {
    app_with_state(AppState::new(Some(proxy), policy))
}
