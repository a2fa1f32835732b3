//! Database schema management for `parisar-aqi`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `aqi_readings` table served by `/api/aqi` and the
/// `fleet_summary` table maintained by the refresh task. Safe to call on
/// every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Core table, one row per city. The UNIQUE constraint on city_name is
    // what makes the gateway's ON CONFLICT upsert a single atomic write.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS aqi_readings (
            id                BIGSERIAL PRIMARY KEY,
            city_name         TEXT             NOT NULL UNIQUE,
            pincode           TEXT,
            latitude          DOUBLE PRECISION NOT NULL,
            longitude         DOUBLE PRECISION NOT NULL,
            aqi               DOUBLE PRECISION NOT NULL,
            pm25              DOUBLE PRECISION,
            pm10              DOUBLE PRECISION,
            temperature       DOUBLE PRECISION,
            humidity          DOUBLE PRECISION,
            visibility        DOUBLE PRECISION,
            weather_condition TEXT,
            no2               DOUBLE PRECISION,
            so2               DOUBLE PRECISION,
            o3                DOUBLE PRECISION,
            wind_speed        DOUBLE PRECISION,
            wind_direction    TEXT,
            pressure          DOUBLE PRECISION,
            status            TEXT,
            created_at        TIMESTAMPTZ      NOT NULL DEFAULT NOW(),
            updated_at        TIMESTAMPTZ      NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Singleton summary row replaced by the periodic refresh task
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fleet_summary (
            id            INTEGER PRIMARY KEY,
            mean_aqi      BIGINT      NOT NULL,
            reading_count BIGINT      NOT NULL,
            worst_city    TEXT,
            best_city     TEXT,
            refreshed_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // list() always orders on updated_at
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_aqi_readings_updated_at
            ON aqi_readings (updated_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
