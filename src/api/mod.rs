pub mod dto;
pub mod errors;
pub mod handlers;
pub mod request_log;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{
    commands::CommandQueue,
    config::{Config, Environment},
    sensors::ReadingStore,
};

/// Everything a handler needs, cloned into each request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: ReadingStore,
    pub commands: CommandQueue,
    pub environment: Environment,
}

impl AppState {
    pub fn from_config(pool: SqlitePool, config: &Config) -> Self {
        Self {
            store: ReadingStore::new(pool),
            commands: CommandQueue::new(config.fan_limit_unit, config.command_queue_capacity),
            environment: config.environment,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let mut api = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/api/sensors",
            get(handlers::list_readings).post(handlers::create_reading),
        )
        .route("/api/sensors/test", get(handlers::sensor_test))
        .route("/api/command", post(handlers::submit_command));

    if state.environment.allows_reset() {
        api = api.route("/api/sensors/reset", post(handlers::reset_sensors));
    }

    let (router, api) = api.with_state(state).split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(middleware::from_fn(request_log::log_request))
}
