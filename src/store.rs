//! Reading store gateway: the only component that touches the database,
//! and the only one that raises.
//!
//! Writes go through a single conditional `INSERT ... ON CONFLICT` keyed on
//! `city_name`, so concurrent writers for the same city can never leave two
//! rows behind. Reads never block writes and may observe either side of a
//! concurrent upsert.

use sqlx::PgPool;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{CityReading, RawCityReading};
use crate::stats::FleetStats;

// ---

/// Exact message for the required-field check, part of the POST contract.
const MISSING_FIELDS: &str = "Missing required fields: city_name, latitude, longitude, aqi";

/// Pull out the required fields, or fail with the contractual message.
///
/// `0` is a valid latitude/longitude/aqi; only absent or `null` values (and
/// an empty `city_name`) are rejected.
fn require_fields(raw: &RawCityReading) -> AppResult<(&str, f64, f64, f64)> {
    // ---
    match (raw.city_name.as_deref(), raw.latitude, raw.longitude, raw.aqi) {
        (Some(name), Some(lat), Some(lng), Some(aqi)) if !name.is_empty() => {
            Ok((name, lat, lng, aqi))
        }
        _ => Err(AppError::Validation(MISSING_FIELDS.to_string())),
    }
}

/// Insert or replace the reading for a city.
///
/// An existing row for the same `city_name` has every mutable field replaced
/// and `updated_at` refreshed; `created_at` and `id` are preserved. Returns
/// the stored row.
pub async fn upsert(pool: &PgPool, raw: &RawCityReading) -> AppResult<CityReading> {
    // ---
    let (city_name, latitude, longitude, aqi) = require_fields(raw)?;

    let row = sqlx::query_as::<_, CityReading>(
        r#"
        INSERT INTO aqi_readings (
            city_name, pincode, latitude, longitude, aqi, pm25, pm10,
            temperature, humidity, visibility, weather_condition,
            no2, so2, o3, wind_speed, wind_direction, pressure, status
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18
        )
        ON CONFLICT (city_name) DO UPDATE SET
            pincode           = EXCLUDED.pincode,
            latitude          = EXCLUDED.latitude,
            longitude         = EXCLUDED.longitude,
            aqi               = EXCLUDED.aqi,
            pm25              = EXCLUDED.pm25,
            pm10              = EXCLUDED.pm10,
            temperature       = EXCLUDED.temperature,
            humidity          = EXCLUDED.humidity,
            visibility        = EXCLUDED.visibility,
            weather_condition = EXCLUDED.weather_condition,
            no2               = EXCLUDED.no2,
            so2               = EXCLUDED.so2,
            o3                = EXCLUDED.o3,
            wind_speed        = EXCLUDED.wind_speed,
            wind_direction    = EXCLUDED.wind_direction,
            pressure          = EXCLUDED.pressure,
            status            = EXCLUDED.status,
            updated_at        = NOW()
        RETURNING *
        "#,
    )
    .bind(city_name)
    .bind(&raw.pincode)
    .bind(latitude)
    .bind(longitude)
    .bind(aqi)
    .bind(raw.pm25)
    .bind(raw.pm10)
    .bind(raw.temperature)
    .bind(raw.humidity)
    .bind(raw.visibility)
    .bind(&raw.weather_condition)
    .bind(raw.no2)
    .bind(raw.so2)
    .bind(raw.o3)
    .bind(raw.wind_speed)
    .bind(&raw.wind_direction)
    .bind(raw.pressure)
    .bind(&raw.status)
    .fetch_one(pool)
    .await?;

    debug!("upserted reading for {}", row.city_name);
    Ok(row)
}

/// All readings, most recently updated first, optionally filtered by a
/// case-insensitive unanchored city-name substring.
///
/// No match is an empty vec, never an error. Filter strings pass through to
/// ILIKE verbatim, `%`/`_` included.
pub async fn list(pool: &PgPool, city_filter: Option<&str>) -> AppResult<Vec<CityReading>> {
    // ---
    let rows = match city_filter {
        Some(filter) => {
            sqlx::query_as::<_, CityReading>(
                r#"
                SELECT * FROM aqi_readings
                WHERE city_name ILIKE '%' || $1 || '%'
                ORDER BY updated_at DESC
                "#,
            )
            .bind(filter)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, CityReading>(
                "SELECT * FROM aqi_readings ORDER BY updated_at DESC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// Persist the fleet summary.
///
/// Singleton row keyed on `id = 1`; refreshes replace rather than append.
pub async fn save_summary(pool: &PgPool, stats: &FleetStats) -> AppResult<()> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO fleet_summary (
            id, mean_aqi, reading_count, worst_city, best_city, refreshed_at
        ) VALUES (1, $1, $2, $3, $4, NOW())
        ON CONFLICT (id) DO UPDATE SET
            mean_aqi      = EXCLUDED.mean_aqi,
            reading_count = EXCLUDED.reading_count,
            worst_city    = EXCLUDED.worst_city,
            best_city     = EXCLUDED.best_city,
            refreshed_at  = EXCLUDED.refreshed_at
        "#,
    )
    .bind(stats.mean_aqi)
    .bind(stats.reading_count as i64)
    .bind(stats.worst.as_ref().map(|r| r.name.as_str()))
    .bind(stats.best.as_ref().map(|r| r.name.as_str()))
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn create_test_raw(
        city_name: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        aqi: Option<f64>,
    ) -> RawCityReading {
        // ---
        RawCityReading {
            city_name: city_name.map(String::from),
            pincode: None,
            latitude,
            longitude,
            aqi,
            pm25: None,
            pm10: None,
            temperature: None,
            humidity: None,
            visibility: None,
            weather_condition: None,
            no2: None,
            so2: None,
            o3: None,
            wind_speed: None,
            wind_direction: None,
            pressure: None,
            status: None,
        }
    }

    #[test]
    fn test_all_required_fields_present() {
        // ---
        let raw = create_test_raw(Some("Delhi"), Some(28.6), Some(77.2), Some(301.0));
        let (name, lat, lng, aqi) = require_fields(&raw).unwrap();

        assert_eq!(name, "Delhi");
        assert_eq!(lat, 28.6);
        assert_eq!(lng, 77.2);
        assert_eq!(aqi, 301.0);
    }

    #[test]
    fn test_missing_latitude_rejected() {
        // ---
        let raw = create_test_raw(Some("Delhi"), None, Some(77.2), Some(301.0));
        let err = require_fields(&raw).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Missing required fields: city_name, latitude, longitude, aqi"
        );
    }

    #[test]
    fn test_zero_latitude_is_defined() {
        // ---
        // 0 is falsy-looking but a legitimate coordinate
        let raw = create_test_raw(Some("Null Island"), Some(0.0), Some(0.0), Some(10.0));
        assert!(require_fields(&raw).is_ok());
    }

    #[test]
    fn test_empty_city_name_rejected() {
        // ---
        let raw = create_test_raw(Some(""), Some(28.6), Some(77.2), Some(301.0));
        assert!(require_fields(&raw).is_err());

        let raw = create_test_raw(None, Some(28.6), Some(77.2), Some(301.0));
        assert!(require_fields(&raw).is_err());
    }

    #[test]
    fn test_missing_aqi_rejected() {
        // ---
        let raw = create_test_raw(Some("Delhi"), Some(28.6), Some(77.2), None);
        assert!(require_fields(&raw).is_err());
    }
}
