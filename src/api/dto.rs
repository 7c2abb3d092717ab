use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::commands::Command;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    pub id: i64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// LED heatsink temperature, degrees Celsius
    pub led_temp: f64,
    pub date: DateTime<Utc>,
}

impl From<crate::db::models::SensorReading> for SensorReadingDto {
    fn from(r: crate::db::models::SensorReading) -> Self {
        Self {
            id: r.id,
            temperature: r.temperature,
            humidity: r.humidity,
            led_temp: r.led_temp,
            date: r.date.and_utc(),
        }
    }
}

/// Request body for `POST /api/sensors`.
///
/// Numeric strings are accepted too; the handler validates the raw JSON.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReadingRequest {
    pub temperature: f64,
    pub humidity: f64,
    pub led_temp: f64,
}

/// Response for `POST /api/sensors`: acknowledgement plus every pending command.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateReadingResponse {
    pub status: String,
    #[schema(value_type = Vec<Object>)]
    pub commands: Vec<Command>,
}

impl CreateReadingResponse {
    pub fn ok(commands: Vec<Command>) -> Self {
        Self { status: "ok".to_owned(), commands }
    }
}

/// Request body for `POST /api/command`.
///
/// Any other fields are stored verbatim. For `fan_limits` the bound keys
/// depend on the deployment unit (`min_temp`/`max_temp` or `min_rpm`/`max_rpm`).
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommandRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub min_temp: Option<i64>,
    pub max_temp: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommandAccepted {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_owned() }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
