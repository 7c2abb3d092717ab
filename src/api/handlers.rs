use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use utoipa::OpenApi;

use super::{
    dto::{
        CommandAccepted, CommandRequest, CreateReadingRequest, CreateReadingResponse,
        ErrorResponse, SensorReadingDto, StatusResponse,
    },
    errors::AppError,
    AppState,
};
use crate::sensors::{NewReading, ReadingQuery};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Kept as raw strings so a bad `limit` can fall back to the default instead
/// of failing extraction.
#[derive(Debug, Deserialize)]
pub struct ReadingQueryParams {
    pub limit: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Fetch stored readings, oldest first.
///
/// Without both `from` and `to`, only the `limit` most recent matching rows
/// are returned. With both, every row in the window is returned.
#[utoipa::path(
    get,
    path = "/api/sensors",
    params(
        ("limit" = Option<u32>,    Query, description = "Row cap, 1..=10000 (default 200); ignored when both from and to are set"),
        ("from"  = Option<String>, Query, description = "Inclusive lower bound (RFC3339 or YYYY-MM-DD[ HH:MM[:SS]])"),
        ("to"    = Option<String>, Query, description = "Inclusive upper bound (RFC3339 or YYYY-MM-DD[ HH:MM[:SS]])"),
    ),
    responses(
        (status = 200, description = "Sensor readings", body = Vec<SensorReadingDto>),
        (status = 400, description = "Invalid from/to date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "sensors"
)]
pub async fn list_readings(
    State(state): State<AppState>,
    params: Result<Query<ReadingQueryParams>, QueryRejection>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let Query(params) = params?;
    let query = ReadingQuery::parse(
        params.limit.as_deref(),
        params.from.as_deref(),
        params.to.as_deref(),
    )?;

    let rows = state.store.query(&query).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Store one reading and hand back every pending command for the device.
#[utoipa::path(
    post,
    path = "/api/sensors",
    request_body = CreateReadingRequest,
    responses(
        (status = 201, description = "Reading stored", body = CreateReadingResponse),
        (status = 400, description = "Missing or non-numeric field", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "sensors"
)]
pub async fn create_reading(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateReadingResponse>), AppError> {
    let Json(body) = body?;
    let reading = NewReading::from_json(&body)?;

    let row = state.store.insert(&reading).await?;
    let commands = state.commands.snapshot().await;

    info!(
        id = row.id,
        temperature = row.temperature,
        humidity = row.humidity,
        led_temp = row.led_temp,
        pending_commands = commands.len(),
        "Sensor reading stored"
    );

    Ok((StatusCode::CREATED, Json(CreateReadingResponse::ok(commands))))
}

/// Fixed diagnostic payload; does not touch the database.
#[utoipa::path(
    get,
    path = "/api/sensors/test",
    responses(
        (status = 200, description = "Sample reading", body = Vec<SensorReadingDto>),
    ),
    tag = "sensors"
)]
pub async fn sensor_test() -> Json<Vec<SensorReadingDto>> {
    Json(vec![SensorReadingDto {
        id: 1234,
        temperature: 22.5,
        humidity: 55.0,
        led_temp: 22.6,
        // 2025-10-01T15:00:00Z
        date: DateTime::<Utc>::from_timestamp(1_759_330_800, 0).unwrap_or_default(),
    }])
}

/// Delete every reading and empty the command queue.
/// Only routed outside production.
#[utoipa::path(
    post,
    path = "/api/sensors/reset",
    responses(
        (status = 200, description = "All state cleared", body = StatusResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "sensors"
)]
pub async fn reset_sensors(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let removed = state.store.clear().await?;
    state.commands.clear().await;
    warn!(removed_readings = removed, "Sensor readings and command queue reset");
    Ok(Json(StatusResponse::ok()))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Queue a command for the device.
///
/// A new `fan_limits` replaces any queued one; other types accumulate.
#[utoipa::path(
    post,
    path = "/api/command",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command queued", body = CommandAccepted),
        (status = 400, description = "Invalid command", body = ErrorResponse),
    ),
    tag = "commands"
)]
pub async fn submit_command(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CommandAccepted>, AppError> {
    let Json(body) = body?;
    state.commands.submit(body).await?;
    Ok(Json(CommandAccepted { ok: true }))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = StatusResponse),
    ),
    tag = "system"
)]
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(list_readings, create_reading, sensor_test, reset_sensors, submit_command, health),
    components(schemas(
        SensorReadingDto,
        CreateReadingRequest,
        CreateReadingResponse,
        CommandRequest,
        CommandAccepted,
        StatusResponse,
        ErrorResponse,
    )),
    tags(
        (name = "sensors",  description = "Sensor reading endpoints"),
        (name = "commands", description = "Device command queue"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Fan Telemetry API",
        version = "0.1.0",
        description = "Sensor ingestion and command relay for the fan controller"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
