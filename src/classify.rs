//! Air-quality status classification.
//!
//! Two deliberately separate contracts live here:
//! - [`Status::tier`] / [`tier_for_label`] map a caller-supplied status label
//!   to one of four display tiers. Stored readings carry whatever label the
//!   writer sent; the store never recomputes it from `aqi`.
//! - [`category_for`] derives a category from a *predicted* AQI value in the
//!   what-if playground, using fixed numeric breakpoints.
//!
//! Both are pure and total; neither can fail.

use serde::{Deserialize, Serialize};

// ---

/// The eight status labels a stored reading may carry.
///
/// Serialized spellings are the wire labels ("Moderately Polluted",
/// "Very Poor"). Only the six canonical labels are ever produced by
/// [`category_for`]; `Moderately Polluted` and `Critical` appear solely as
/// caller-supplied values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Good,
    Satisfactory,
    Moderate,
    #[serde(rename = "Moderately Polluted")]
    ModeratelyPolluted,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Critical,
    Severe,
}

/// Coarse 4-way grouping of statuses used for display coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Good,
    Moderate,
    Poor,
    Severe,
}

impl Status {
    /// Wire spelling of the label.
    pub fn label(self) -> &'static str {
        // ---
        match self {
            Status::Good => "Good",
            Status::Satisfactory => "Satisfactory",
            Status::Moderate => "Moderate",
            Status::ModeratelyPolluted => "Moderately Polluted",
            Status::Poor => "Poor",
            Status::VeryPoor => "Very Poor",
            Status::Critical => "Critical",
            Status::Severe => "Severe",
        }
    }

    /// Parse an exact wire label. Anything outside the closed set is `None`.
    pub fn parse(label: &str) -> Option<Status> {
        // ---
        match label {
            "Good" => Some(Status::Good),
            "Satisfactory" => Some(Status::Satisfactory),
            "Moderate" => Some(Status::Moderate),
            "Moderately Polluted" => Some(Status::ModeratelyPolluted),
            "Poor" => Some(Status::Poor),
            "Very Poor" => Some(Status::VeryPoor),
            "Critical" => Some(Status::Critical),
            "Severe" => Some(Status::Severe),
            _ => None,
        }
    }

    /// Display tier of this status. Total over the closed label set.
    pub fn tier(self) -> Tier {
        // ---
        match self {
            Status::Good | Status::Satisfactory => Tier::Good,
            Status::Moderate => Tier::Moderate,
            Status::ModeratelyPolluted | Status::Poor => Tier::Poor,
            Status::VeryPoor | Status::Critical | Status::Severe => Tier::Severe,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---

/// Display tier for a raw status label.
///
/// Unrecognized labels fall back to [`Tier::Good`].
/// TODO: revisit the fallback; the lowest-severity tier is a questionable
/// default for a label we could not classify.
pub fn tier_for_label(label: &str) -> Tier {
    // ---
    Status::parse(label).map(Status::tier).unwrap_or(Tier::Good)
}

/// Category for a predicted AQI value. Breakpoints are inclusive upper
/// bounds: 0-50 Good, 51-100 Satisfactory, 101-150 Moderate, 151-200 Poor,
/// 201-300 Very Poor, 301+ Severe.
pub fn category_for(aqi: f64) -> Status {
    // ---
    if aqi <= 50.0 {
        Status::Good
    } else if aqi <= 100.0 {
        Status::Satisfactory
    } else if aqi <= 150.0 {
        Status::Moderate
    } else if aqi <= 200.0 {
        Status::Poor
    } else if aqi <= 300.0 {
        Status::VeryPoor
    } else {
        Status::Severe
    }
}
