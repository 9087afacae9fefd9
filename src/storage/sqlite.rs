//! SQLite store over an `sqlx` pool.
//!
//! - Write-ahead log with `synchronous=NORMAL`: a crash may lose the last
//!   few committed rows, never corrupt the file.
//! - `open()` is idempotent: tables are created if absent and the settings
//!   row is seeded with `INSERT OR IGNORE`.
//! - Settings are validated on the way in and on the way out.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use log::{debug, info};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use super::{DayAverage, MONTHLY_DAYS, OFFLINE_MARKER, row_timestamp};
use crate::error::StorageError;
use crate::model::{Reading, Settings};

const CREATE_READINGS: &str = "\
CREATE TABLE IF NOT EXISTS readings (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   TEXT    NOT NULL,
    temperature REAL    NOT NULL,
    humidity    REAL    NOT NULL,
    weight      REAL    NOT NULL,
    air_quality INTEGER NOT NULL
)";

const CREATE_SETTINGS: &str = "\
CREATE TABLE IF NOT EXISTS settings (
    id             INTEGER PRIMARY KEY CHECK (id = 1),
    phone          TEXT    NOT NULL,
    limit_temp     REAL    NOT NULL,
    limit_humidity REAL    NOT NULL,
    limit_weight   REAL    NOT NULL,
    limit_air      INTEGER NOT NULL
)";

/// Singleton row as stored.
#[derive(sqlx::FromRow)]
struct SettingsRow {
    phone: String,
    limit_temp: f32,
    limit_humidity: f32,
    limit_weight: f32,
    limit_air: i32,
}

impl SettingsRow {
    fn into_settings(self) -> Result<Settings, StorageError> {
        Settings::new(
            &self.phone,
            self.limit_temp,
            self.limit_humidity,
            self.limit_weight,
            self.limit_air,
        )
        .map_err(StorageError::CorruptSettings)
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: &Path, defaults: &Settings) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        info!("STORE | opened {}", path.display());
        Self::init(pool, defaults).await
    }

    /// Private in-memory database.
    ///
    /// Pinned to one connection that never recycles: each connection to
    /// `:memory:` is its own database.
    pub async fn open_in_memory(defaults: &Settings) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .synchronous(SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::init(pool, defaults).await
    }

    async fn init(pool: SqlitePool, defaults: &Settings) -> Result<Self, StorageError> {
        sqlx::query(CREATE_READINGS).execute(&pool).await?;
        sqlx::query(CREATE_SETTINGS).execute(&pool).await?;

        let seeded = sqlx::query(
            "INSERT OR IGNORE INTO settings \
             (id, phone, limit_temp, limit_humidity, limit_weight, limit_air) \
             VALUES (1, ?, ?, ?, ?, ?)",
        )
        .bind(defaults.phone_number.as_str())
        .bind(defaults.limit_temp)
        .bind(defaults.limit_humidity)
        .bind(defaults.limit_weight)
        .bind(defaults.limit_air)
        .execute(&pool)
        .await?;
        if seeded.rows_affected() > 0 {
            info!("STORE | seeded default settings");
        }

        Ok(Self { pool })
    }

    /// Read the settings singleton.
    pub async fn load_settings(&self) -> Result<Settings, StorageError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT phone, limit_temp, limit_humidity, limit_weight, limit_air \
             FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(StorageError::MissingSettings)?.into_settings()
    }

    /// Upsert the settings singleton.
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        settings.validate().map_err(StorageError::CorruptSettings)?;
        sqlx::query(
            "INSERT INTO settings \
             (id, phone, limit_temp, limit_humidity, limit_weight, limit_air) \
             VALUES (1, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                phone = excluded.phone, \
                limit_temp = excluded.limit_temp, \
                limit_humidity = excluded.limit_humidity, \
                limit_weight = excluded.limit_weight, \
                limit_air = excluded.limit_air",
        )
        .bind(settings.phone_number.as_str())
        .bind(settings.limit_temp)
        .bind(settings.limit_humidity)
        .bind(settings.limit_weight)
        .bind(settings.limit_air)
        .execute(&self.pool)
        .await?;
        debug!("STORE | settings saved");
        Ok(())
    }

    /// Append one row.  The stored timestamp is taken now, from `wall`, or
    /// is the offline placeholder built from `uptime_ms`.
    pub async fn save_reading(
        &self,
        reading: &Reading,
        wall: Option<NaiveDateTime>,
        uptime_ms: u64,
    ) -> Result<(), StorageError> {
        let stamp = row_timestamp(wall, uptime_ms);
        sqlx::query(
            "INSERT INTO readings (timestamp, temperature, humidity, weight, air_quality) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(stamp.as_str())
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.weight)
        .bind(reading.air_quality)
        .execute(&self.pool)
        .await?;
        debug!("STORE | reading saved at {stamp}");
        Ok(())
    }

    /// The `limit` most recently inserted rows, newest first.
    pub async fn query_recent(&self, limit: u32) -> Result<Vec<Reading>, StorageError> {
        let rows = sqlx::query_as::<_, Reading>(
            "SELECT timestamp, temperature, humidity, weight, air_quality \
             FROM readings ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Per-day channel averages, newest day first, at most
    /// [`MONTHLY_DAYS`] days.  Offline rows and rows whose timestamp has no
    /// parseable date are skipped.  Averages are rounded to two decimals so
    /// `f32` samples stored as `REAL` do not surface as `36.20000076...`.
    pub async fn query_monthly_averages(&self) -> Result<Vec<DayAverage>, StorageError> {
        let rows = sqlx::query_as::<_, DayAverage>(
            "SELECT date(timestamp)              AS day, \
                    ROUND(AVG(temperature), 2)   AS avg_temp, \
                    ROUND(AVG(humidity), 2)      AS avg_hum, \
                    ROUND(AVG(weight), 2)        AS avg_weight, \
                    ROUND(AVG(air_quality), 2)   AS avg_air \
             FROM readings \
             WHERE timestamp NOT LIKE ? || '%' \
               AND date(timestamp) IS NOT NULL \
             GROUP BY date(timestamp) \
             ORDER BY day DESC \
             LIMIT ?",
        )
        .bind(OFFLINE_MARKER)
        .bind(i64::from(MONTHLY_DAYS))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
