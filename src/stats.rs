//! Fleet aggregation and the what-if scoring engine.
//!
//! Everything here is a pure, synchronous computation over its inputs:
//! no I/O, no shared state, no failure modes. Out-of-range scoring inputs
//! are clamped by [`predict`], never rejected.

use serde::{Deserialize, Serialize};

use crate::models::NormalizedReading;

// ---

/// Fleet-wide statistics over the current reading set.
///
/// `worst` and `best` are absent when the input is empty; `mean_aqi` is 0 in
/// that case. Callers must check `reading_count` before leaning on them.
#[derive(Debug, Clone, Serialize)]
pub struct FleetStats {
    // ---
    pub mean_aqi: i64,
    pub reading_count: usize,
    pub worst: Option<NormalizedReading>,
    pub best: Option<NormalizedReading>,
}

/// Compute fleet statistics over a set of readings.
///
/// `mean_aqi` is the arithmetic mean rounded to the nearest integer. On an
/// AQI tie the first reading encountered wins both the worst and best slot.
pub fn aggregate(readings: &[NormalizedReading]) -> FleetStats {
    // ---
    let mean_aqi = if readings.is_empty() {
        0
    } else {
        let sum: f64 = readings.iter().map(|r| r.aqi).sum();
        (sum / readings.len() as f64).round() as i64
    };

    let mut worst: Option<&NormalizedReading> = None;
    let mut best: Option<&NormalizedReading> = None;

    for reading in readings {
        if worst.map_or(true, |w| reading.aqi > w.aqi) {
            worst = Some(reading);
        }
        if best.map_or(true, |b| reading.aqi < b.aqi) {
            best = Some(reading);
        }
    }

    FleetStats {
        mean_aqi,
        reading_count: readings.len(),
        worst: worst.cloned(),
        best: best.cloned(),
    }
}

// ---

/// Sort order for a filtered reading list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SortKey {
    #[serde(rename = "aqi-desc")]
    AqiDesc,
    #[serde(rename = "aqi-asc")]
    AqiAsc,
    #[serde(rename = "name-asc")]
    NameAsc,
}

/// Filter readings by a search query, then sort.
///
/// A reading matches when its name OR pincode contains the query as a
/// case-insensitive substring; the empty query matches everything. Sorting
/// is stable, so AQI ties keep their input order.
pub fn filter_and_sort(
    readings: Vec<NormalizedReading>,
    query: &str,
    key: SortKey,
) -> Vec<NormalizedReading> {
    // ---
    let needle = query.to_lowercase();

    let mut result: Vec<NormalizedReading> = readings
        .into_iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle) || r.pincode.to_lowercase().contains(&needle)
        })
        .collect();

    match key {
        SortKey::AqiDesc => result.sort_by(|a, b| b.aqi.total_cmp(&a.aqi)),
        SortKey::AqiAsc => result.sort_by(|a, b| a.aqi.total_cmp(&b.aqi)),
        SortKey::NameAsc => result.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    result
}

// ---

/// Input vector for the what-if prediction.
///
/// Variable bounds (enforced by the caller's controls, not here):
/// temperature 0-45, humidity 0-100, wind_speed 0-20, traffic_index 0-100,
/// industrial_score 0-100, construction_activity 0-100, green_cover 0-100,
/// population_density 0-100, time_of_day 0-23, season 0-3.
///
/// Ephemeral: built per prediction request, discarded with the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringInput {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub traffic_index: f64,
    pub industrial_score: f64,
    pub construction_activity: f64,
    pub green_cover: f64,
    pub population_density: f64,
    pub time_of_day: u8,
    pub season: u8,
}

impl Default for ScoringInput {
    /// The playground's reset vector.
    fn default() -> Self {
        // ---
        ScoringInput {
            temperature: 25.0,
            humidity: 60.0,
            wind_speed: 5.0,
            traffic_index: 50.0,
            industrial_score: 40.0,
            construction_activity: 30.0,
            green_cover: 25.0,
            population_density: 50.0,
            time_of_day: 12,
            season: 1,
        }
    }
}

/// Predicted AQI for a synthetic set of environmental variables.
///
/// A fixed weighted linear combination over eight of the ten inputs,
/// clamped to [0, 500] and rounded. `time_of_day` and `season` are part of
/// the input contract but carry zero weight; they must stay in the
/// signature for output compatibility.
pub fn predict(input: &ScoringInput) -> u16 {
    // ---
    let base = 50.0;

    let score = base
        + (input.temperature - 25.0) * 2.0
        + (70.0 - input.humidity) * 0.5
        + (10.0 - input.wind_speed) * 3.0
        + input.traffic_index * 0.8
        + input.industrial_score * 1.2
        + input.construction_activity * 0.6
        + (50.0 - input.green_cover) * 0.8
        + input.population_density * 0.4;

    score.clamp(0.0, 500.0).round() as u16
}

// ---

/// Phases of a prediction request.
///
/// Strictly sequential; the engine never schedules time. The driving caller
/// decides how long to dwell in each transitional phase before advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictPhase {
    Idle,
    Analyzing,
    Calculating,
    Predicting,
    Complete,
}

/// What-if playground: one scoring input plus the phase of the current
/// prediction run. No cross-request state beyond this.
#[derive(Debug, Clone)]
pub struct Playground {
    // ---
    input: ScoringInput,
    phase: PredictPhase,
    result: Option<u16>,
}

impl Default for Playground {
    fn default() -> Self {
        Playground::new()
    }
}

impl Playground {
    pub fn new() -> Self {
        // ---
        Playground {
            input: ScoringInput::default(),
            phase: PredictPhase::Idle,
            result: None,
        }
    }

    pub fn input(&self) -> &ScoringInput {
        &self.input
    }

    pub fn phase(&self) -> PredictPhase {
        self.phase
    }

    /// The held result; present only in the `Complete` phase.
    pub fn result(&self) -> Option<u16> {
        self.result
    }

    /// Replace the input vector.
    ///
    /// A change while a result is showing drops the result and returns the
    /// playground to idle. Setting an identical vector is a no-op.
    pub fn set_input(&mut self, input: ScoringInput) {
        // ---
        if input != self.input && self.phase == PredictPhase::Complete {
            self.phase = PredictPhase::Idle;
            self.result = None;
        }
        self.input = input;
    }

    /// Advance one phase and return the new one.
    ///
    /// The result is computed on the `Predicting -> Complete` step. Advancing
    /// out of `Complete` starts a fresh run at `Analyzing`.
    pub fn advance(&mut self) -> PredictPhase {
        // ---
        self.phase = match self.phase {
            PredictPhase::Idle => PredictPhase::Analyzing,
            PredictPhase::Analyzing => PredictPhase::Calculating,
            PredictPhase::Calculating => PredictPhase::Predicting,
            PredictPhase::Predicting => {
                self.result = Some(predict(&self.input));
                PredictPhase::Complete
            }
            PredictPhase::Complete => {
                self.result = None;
                PredictPhase::Analyzing
            }
        };
        self.phase
    }

    /// Restore the default input vector and return to idle.
    pub fn reset(&mut self) {
        // ---
        self.input = ScoringInput::default();
        self.phase = PredictPhase::Idle;
        self.result = None;
    }
}
