use chrono::{Duration, NaiveDateTime, Timelike};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{
    query::{ReadingQuery, SQLITE_DATETIME_FORMAT},
    validation::NewReading,
};
use crate::db::models::SensorReading;

/// Durable store of sensor readings, backed by the `sensors` table.
///
/// Cheap to clone; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct ReadingStore {
    pool: SqlitePool,
}

impl ReadingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a validated reading. `id` and `date` are assigned by SQLite.
    pub async fn insert(&self, reading: &NewReading) -> sqlx::Result<SensorReading> {
        let row = sqlx::query_as::<_, SensorReading>(
            r#"
            INSERT INTO sensors (temperature, humidity, led_temp)
            VALUES (?1, ?2, ?3)
            RETURNING id, temperature, humidity, led_temp, date
            "#,
        )
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.led_temp)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = row.id, date = %row.date, "Sensor reading inserted");
        Ok(row)
    }

    /// Returns readings matching `query`, ordered by `date ASC, id ASC`.
    ///
    /// When a row cap applies, the most recent rows are kept. SQLite treats a
    /// negative `LIMIT` as unbounded, which is how an explicit `[from, to]`
    /// window returns every match.
    pub async fn query(&self, query: &ReadingQuery) -> sqlx::Result<Vec<SensorReading>> {
        let from = query
            .from
            .map(|t| ceil_to_second(t).format(SQLITE_DATETIME_FORMAT).to_string());
        let to = query.to.map(|t| t.format(SQLITE_DATETIME_FORMAT).to_string());
        let limit = query.effective_limit().map_or(-1, i64::from);

        sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT id, temperature, humidity, led_temp, date
            FROM (
                SELECT id, temperature, humidity, led_temp, date
                FROM sensors
                WHERE (?1 IS NULL OR datetime(date) >= ?1)
                  AND (?2 IS NULL OR datetime(date) <= ?2)
                ORDER BY datetime(date) DESC, id DESC
                LIMIT ?3
            )
            ORDER BY datetime(date) ASC, id ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Deletes every reading. Returns the number of rows removed.
    pub async fn clear(&self) -> sqlx::Result<u64> {
        let removed = sqlx::query("DELETE FROM sensors")
            .execute(&self.pool)
            .await?
            .rows_affected();
        info!(removed, "Sensor readings cleared");
        Ok(removed)
    }
}

/// Stored dates have whole-second precision, so a fractional lower bound
/// must round up or rows just before it would match.
fn ceil_to_second(t: NaiveDateTime) -> NaiveDateTime {
    if t.nanosecond() == 0 {
        return t;
    }
    t.with_nanosecond(0).unwrap_or(t) + Duration::seconds(1)
}
