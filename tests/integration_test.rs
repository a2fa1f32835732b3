use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct CityReading {
    city_name: String,
    latitude: f64,
    longitude: f64,
    aqi: f64,
    pm25: Option<f64>,
    status: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into())
}

#[tokio::test]
async fn upsert_replaces_existing_city() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();
    let url = format!("{}/api/aqi", base);

    let first = client
        .post(&url)
        .json(&json!({
            "city_name": "Upsertpur",
            "latitude": 19.07,
            "longitude": 72.87,
            "aqi": 95,
            "pm25": 40,
            "status": "Satisfactory"
        }))
        .send()
        .await?;
    assert_eq!(first.status(), 201);
    let first_rows: Vec<CityReading> = first.json().await?;
    assert_eq!(first_rows.len(), 1);
    let first_updated = first_rows[0].updated_at;

    let second = client
        .post(&url)
        .json(&json!({
            "city_name": "Upsertpur",
            "latitude": 19.07,
            "longitude": 72.87,
            "aqi": 240,
            "status": "Very Poor"
        }))
        .send()
        .await?;
    assert_eq!(second.status(), 201);

    // Exactly one row for the city, carrying the second write's fields
    let readings: Vec<CityReading> = client
        .get(format!("{}?city=Upsertpur", url))
        .send()
        .await?
        .json()
        .await?;

    let matches: Vec<&CityReading> = readings
        .iter()
        .filter(|r| r.city_name == "Upsertpur")
        .collect();
    assert_eq!(matches.len(), 1, "upsert must not create a second row");

    let row = matches[0];
    assert_eq!(row.aqi, 240.0);
    assert_eq!(row.status.as_deref(), Some("Very Poor"));
    // pm25 was omitted from the second write; the replace clears it
    assert_eq!(row.pm25, None);
    assert!(row.updated_at >= first_updated);

    Ok(())
}

#[tokio::test]
async fn missing_required_field_is_rejected() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();
    let url = format!("{}/api/aqi", base);

    // latitude omitted entirely
    let response = client
        .post(&url)
        .json(&json!({
            "city_name": "Nowhere",
            "longitude": 77.2,
            "aqi": 120
        }))
        .send()
        .await?;

    assert_eq!(response.status(), 400);
    let body: ErrorBody = response.json().await?;
    assert_eq!(
        body.error,
        "Missing required fields: city_name, latitude, longitude, aqi"
    );

    // latitude: 0 is falsy but defined, and must be accepted
    let response = client
        .post(&url)
        .json(&json!({
            "city_name": "Null Island",
            "latitude": 0,
            "longitude": 0,
            "aqi": 10
        }))
        .send()
        .await?;

    assert_eq!(response.status(), 201);
    let rows: Vec<CityReading> = response.json().await?;
    assert_eq!(rows[0].latitude, 0.0);
    assert_eq!(rows[0].longitude, 0.0);

    Ok(())
}

#[tokio::test]
async fn city_filter_is_case_insensitive_substring() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();
    let url = format!("{}/api/aqi", base);

    for (name, aqi) in [("Delhi", 301), ("Mumbai", 142)] {
        let response = client
            .post(&url)
            .json(&json!({
                "city_name": name,
                "latitude": 20.0,
                "longitude": 75.0,
                "aqi": aqi
            }))
            .send()
            .await?;
        assert_eq!(response.status(), 201);
    }

    for filter in ["del", "DEL"] {
        let readings: Vec<CityReading> = client
            .get(format!("{}?city={}", url, filter))
            .send()
            .await?
            .json()
            .await?;

        assert!(
            readings.iter().any(|r| r.city_name == "Delhi"),
            "filter '{}' should match Delhi",
            filter
        );
        assert!(
            readings
                .iter()
                .all(|r| r.city_name.to_lowercase().contains("del")),
            "filter '{}' returned a non-matching city",
            filter
        );
    }

    Ok(())
}

#[tokio::test]
async fn readings_are_ordered_newest_first() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    let readings: Vec<CityReading> = client
        .get(format!("{}/api/aqi", base))
        .send()
        .await?
        .json()
        .await?;

    for pair in readings.windows(2) {
        assert!(
            pair[0].updated_at >= pair[1].updated_at,
            "readings out of order: {} before {}",
            pair[0].city_name,
            pair[1].city_name
        );
    }

    Ok(())
}

#[tokio::test]
async fn malformed_body_surfaces_parser_message() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    let response = client
        .post(format!("{}/api/aqi", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), 500);
    let body: ErrorBody = response.json().await?;
    assert!(!body.error.is_empty());

    Ok(())
}

#[tokio::test]
async fn cities_view_filters_and_sorts() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();
    let url = format!("{}/api/aqi", base);

    for (name, pincode, aqi) in [
        ("Sortland East", "560001", 180),
        ("Sortland West", "560002", 60),
    ] {
        let response = client
            .post(&url)
            .json(&json!({
                "city_name": name,
                "pincode": pincode,
                "latitude": 12.9,
                "longitude": 77.6,
                "aqi": aqi
            }))
            .send()
            .await?;
        assert_eq!(response.status(), 201);
    }

    // Default sort is worst AQI first
    let cities: Vec<serde_json::Value> = client
        .get(format!("{}/api/aqi/cities?q=sortland", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0]["name"], "Sortland East");
    assert_eq!(cities[1]["name"], "Sortland West");

    let ascending: Vec<serde_json::Value> = client
        .get(format!("{}/api/aqi/cities?q=sortland&sort=aqi-asc", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ascending[0]["name"], "Sortland West");

    // Pincode matches too, and nulls come back normalized
    let by_pincode: Vec<serde_json::Value> = client
        .get(format!("{}/api/aqi/cities?q=560002", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(by_pincode.len(), 1);
    assert_eq!(by_pincode[0]["name"], "Sortland West");
    assert_eq!(by_pincode[0]["pm25"], 0.0);
    assert_eq!(by_pincode[0]["weather_condition"], "");
    // No status supplied: the unknown label falls back to the good tier
    assert_eq!(by_pincode[0]["tier"], "good");

    Ok(())
}

#[tokio::test]
async fn predict_endpoint_is_deterministic() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();
    let url = format!("{}/api/aqi/predict", base);

    let input = json!({
        "temperature": 25.0,
        "humidity": 60.0,
        "wind_speed": 5.0,
        "traffic_index": 50.0,
        "industrial_score": 40.0,
        "construction_activity": 30.0,
        "green_cover": 25.0,
        "population_density": 50.0,
        "time_of_day": 12,
        "season": 1
    });

    let first: serde_json::Value = client.post(&url).json(&input).send().await?.json().await?;
    let second: serde_json::Value = client.post(&url).json(&input).send().await?.json().await?;

    assert_eq!(first["aqi"], 216);
    assert_eq!(first["category"], "Very Poor");
    assert_eq!(first["tier"], "severe");
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn stats_endpoint_reports_fleet_aggregates() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    // Seed at least one reading so worst/best are present
    let response = client
        .post(format!("{}/api/aqi", base))
        .json(&json!({
            "city_name": "Statsville",
            "latitude": 12.97,
            "longitude": 77.59,
            "aqi": 88
        }))
        .send()
        .await?;
    assert_eq!(response.status(), 201);

    let stats: serde_json::Value = client
        .get(format!("{}/api/aqi/stats", base))
        .send()
        .await?
        .json()
        .await?;

    let count = stats["reading_count"].as_u64().unwrap();
    assert!(count >= 1);
    assert!(stats["mean_aqi"].is_i64() || stats["mean_aqi"].is_u64());
    assert!(stats["worst"].is_object());
    assert!(stats["best"].is_object());

    // worst is at least as bad as best
    let worst_aqi = stats["worst"]["aqi"].as_f64().unwrap();
    let best_aqi = stats["best"]["aqi"].as_f64().unwrap();
    assert!(worst_aqi >= best_aqi);

    Ok(())
}
