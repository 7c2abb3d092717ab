use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `sensors` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: i64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// LED heatsink temperature, degrees Celsius
    pub led_temp: f64,
    /// UTC, as written by `CURRENT_TIMESTAMP`.
    pub date: NaiveDateTime,
}
