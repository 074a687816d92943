//! Weather data models
//!
//! Normalized records produced from one provider response and written by a
//! storage backend. Absent source fields stay `None`; the two
//! chance-of-precipitation percentages are the deliberate exception and
//! default to 0.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A watched location, keyed by its immutable query string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: Uuid,
    /// Query string as configured, e.g. "Rochester,NY"; unique and immutable
    pub query: String,
    /// Display name reported by the provider; refined later, never erased
    pub name: Option<String>,
}

/// Current conditions at one observation instant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentObservation {
    /// Observation instant in UTC; part of the natural key
    pub obs_time: DateTime<Utc>,
    pub temp_f: Option<Decimal>,
    pub condition_text: Option<String>,
    pub condition_code: Option<i32>,
    pub wind_mph: Option<Decimal>,
    pub gust_mph: Option<Decimal>,
    pub precip_in: Option<Decimal>,
    pub cloud: Option<i32>,
    /// Original `current` fragment, retained for forward compatibility
    pub raw: serde_json::Value,
}

/// One forecast day for a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDay {
    /// Calendar date the forecast is for; part of the natural key
    pub date: NaiveDate,
    pub maxtemp_f: Option<Decimal>,
    pub mintemp_f: Option<Decimal>,
    pub maxwind_mph: Option<Decimal>,
    pub totalprecip_in: Option<Decimal>,
    pub totalsnow_cm: Option<Decimal>,
    pub condition_text: Option<String>,
    pub condition_code: Option<i32>,
    /// Integer percentage; 0 when the provider omits it
    pub daily_chance_of_rain: i32,
    /// Integer percentage; 0 when the provider omits it
    pub daily_chance_of_snow: i32,
    /// Original `forecastday` entry, retained for forward compatibility
    pub raw: serde_json::Value,
}

/// An active weather alert
///
/// The provider exposes no stable alert identifier, so these rows are
/// append-only: every run that observes an alert stores it again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherAlert {
    pub headline: Option<String>,
    pub severity: Option<String>,
    pub areas: Option<String>,
    pub certainty: Option<String>,
    pub event: Option<String>,
    pub note: Option<String>,
    pub effective: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    /// Original alert fragment, retained for forward compatibility
    pub raw: serde_json::Value,
}
