//! City reading endpoints: retrieval, ingestion, the normalized city view,
//! fleet statistics, and the what-if prediction.
//!
//! Handlers stay thin: validation and persistence live in `store`, the pure
//! computations in `classify` and `stats`. Failures surface as `AppError`,
//! whose response is the `{"error": message}` object the API promises.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::classify::category_for;
use crate::error::{AppError, AppResult};
use crate::stats::{self, Playground, PredictPhase, ScoringInput, SortKey};
use crate::{store, Config, RawCityReading};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/api/aqi", get(list_readings).post(upsert_reading))
        .route("/api/aqi/cities", get(list_cities))
        .route("/api/aqi/stats", get(fleet_stats))
        .route("/api/aqi/predict", post(predict_aqi))
}

/// Query parameters for `GET /api/aqi`.
#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    /// Case-insensitive city-name substring filter.
    city: Option<String>,
}

/// Handle `GET /api/aqi`.
///
/// Returns the stored readings newest-updated first, optionally narrowed by
/// the `city` substring filter. An empty match is an empty array, not an
/// error.
async fn list_readings(
    Query(params): Query<ReadingsQuery>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> AppResult<impl IntoResponse> {
    // ---
    debug!("GET /api/aqi - city filter {:?}", params.city);

    let rows = store::list(&pool, params.city.as_deref()).await?;

    info!("returning {} readings", rows.len());
    Ok(Json(rows))
}

/// Handle `POST /api/aqi`.
///
/// Upserts the reading keyed by `city_name` and returns the stored row as a
/// one-element array with a 201 status. Missing required fields map to 400
/// via `AppError::Validation`; an unparseable body maps to
/// `AppError::Unknown` with the parser's message.
async fn upsert_reading(
    State((pool, _config)): State<(PgPool, Config)>,
    body: String,
) -> AppResult<impl IntoResponse> {
    // ---
    let raw: RawCityReading =
        serde_json::from_str(&body).map_err(|e| AppError::Unknown(e.to_string()))?;

    let row = store::upsert(&pool, &raw).await?;

    info!("stored reading for {}", row.city_name);
    Ok((StatusCode::CREATED, Json(vec![row])))
}

/// Query parameters for `GET /api/aqi/cities`.
#[derive(Debug, Deserialize)]
struct CitiesQuery {
    /// Matches city name OR pincode as a case-insensitive substring.
    q: Option<String>,
    sort: Option<SortKey>,
}

/// Handle `GET /api/aqi/cities`.
///
/// The dashboard view: every reading normalized (nulls collapsed, display
/// tier attached), filtered by `q` and sorted by `sort` (worst AQI first by
/// default).
async fn list_cities(
    Query(params): Query<CitiesQuery>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> AppResult<impl IntoResponse> {
    // ---
    let rows = store::list(&pool, None).await?;
    let normalized: Vec<_> = rows.iter().map(|r| r.to_normalized()).collect();

    let cities = stats::filter_and_sort(
        normalized,
        params.q.as_deref().unwrap_or(""),
        params.sort.unwrap_or(SortKey::AqiDesc),
    );

    info!("returning {} cities", cities.len());
    Ok(Json(cities))
}

/// Handle `GET /api/aqi/stats`.
///
/// Fleet statistics computed live over the full reading set: mean AQI plus
/// the worst and best city. `worst`/`best` are null while the store is empty.
async fn fleet_stats(
    State((pool, _config)): State<(PgPool, Config)>,
) -> AppResult<impl IntoResponse> {
    // ---
    let rows = store::list(&pool, None).await?;
    let normalized: Vec<_> = rows.iter().map(|r| r.to_normalized()).collect();

    Ok(Json(stats::aggregate(&normalized)))
}

/// Handle `POST /api/aqi/predict`.
///
/// Drives a playground run through its phases with no dwell time and returns
/// the held result with its derived category and tier. Pure computation over
/// the posted scoring input; out-of-range variables are clamped by the
/// formula, not rejected here.
async fn predict_aqi(Json(input): Json<ScoringInput>) -> impl IntoResponse {
    // ---
    let mut playground = Playground::new();
    playground.set_input(input);
    debug!("predicting for {:?}", playground.input());

    while playground.advance() != PredictPhase::Complete {}

    let aqi = playground.result().unwrap_or_default();
    let category = category_for(f64::from(aqi));

    debug!("predicted AQI {} ({})", aqi, category);

    Json(json!({
        "aqi": aqi,
        "category": category,
        "tier": category.tier(),
    }))
}
