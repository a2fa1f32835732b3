//! Data models for city air-quality readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{tier_for_label, Tier};

// ---

/// Incoming reading from a POST body.
///
/// The required fields (`city_name`, `latitude`, `longitude`, `aqi`) are
/// `Option` here so the store gateway owns the presence check and can report
/// it with the contractual error message instead of a deserialization error.
/// Absent and `null` both deserialize to `None`.
#[derive(Debug, Deserialize)]
pub struct RawCityReading {
    // ---
    pub city_name: Option<String>,
    pub pincode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub aqi: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub visibility: Option<f64>,
    pub weather_condition: Option<String>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub o3: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub pressure: Option<f64>,
    pub status: Option<String>,
}

/// Stored reading row, at most one per `city_name`.
///
/// Optional columns stay `Option` end to end: storage keeps NULL distinct
/// from zero. `status` is whatever label the writer supplied.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CityReading {
    // ---
    pub id: i64,
    pub city_name: String,
    pub pincode: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub aqi: f64,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub visibility: Option<f64>,
    pub weather_condition: Option<String>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub o3: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub pressure: Option<f64>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reading with nullable fields collapsed for display and aggregation:
/// numeric `NULL` becomes 0, string `NULL` becomes "", and the display tier
/// is attached from the status label.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedReading {
    // ---
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub status: String,
    pub tier: Tier,
    pub temperature: f64,
    pub humidity: f64,
    pub visibility: f64,
    pub weather_condition: String,
    pub no2: f64,
    pub so2: f64,
    pub o3: f64,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub pressure: f64,
    pub pincode: String,
    pub updated_at: DateTime<Utc>,
}

impl CityReading {
    /// Collapse nullable fields to presentation defaults.
    ///
    /// Runs on the way out of the store only, never before a write.
    pub fn to_normalized(&self) -> NormalizedReading {
        // ---
        let status = self.status.clone().unwrap_or_default();

        NormalizedReading {
            id: self.id,
            name: self.city_name.clone(),
            lat: self.latitude,
            lng: self.longitude,
            aqi: self.aqi,
            pm25: self.pm25.unwrap_or(0.0),
            pm10: self.pm10.unwrap_or(0.0),
            tier: tier_for_label(&status),
            status,
            temperature: self.temperature.unwrap_or(0.0),
            humidity: self.humidity.unwrap_or(0.0),
            visibility: self.visibility.unwrap_or(0.0),
            weather_condition: self.weather_condition.clone().unwrap_or_default(),
            no2: self.no2.unwrap_or(0.0),
            so2: self.so2.unwrap_or(0.0),
            o3: self.o3.unwrap_or(0.0),
            wind_speed: self.wind_speed.unwrap_or(0.0),
            wind_direction: self.wind_direction.clone().unwrap_or_default(),
            pressure: self.pressure.unwrap_or(0.0),
            pincode: self.pincode.clone().unwrap_or_default(),
            updated_at: self.updated_at,
        }
    }
}
