//! Weather API client for fetching forecast data
//!
//! Integrates with WeatherAPI.com's forecast endpoint, which returns current
//! conditions, a multi-day forecast and any active alerts in one document.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::external::ForecastSource;
use shared::{CurrentObservation, ForecastDay, WeatherAlert};

/// Fixed request timeout; the caller does not retry
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Weather API client
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String, base_url: String) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl ForecastSource for WeatherClient {
    /// Fetch the forecast document for one location query
    ///
    /// Requests alerts and disables air-quality data; one network call, no
    /// retries. A non-2xx status or transport failure is `SourceUnavailable`.
    async fn fetch_forecast(&self, query: &str, days: u32) -> AppResult<ForecastDocument> {
        let url = format!("{}/forecast.json", self.base_url);
        let days = days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("days", days.as_str()),
                ("alerts", "yes"),
                ("aqi", "no"),
            ])
            .send()
            .await
            .map_err(|e| AppError::SourceUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SourceUnavailable(format!(
                "weather API error: {} - {}",
                status,
                truncate_body(&body)
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("response is not JSON: {}", e)))?;

        Ok(ForecastDocument::new(body))
    }
}

/// One parsed provider response
///
/// Keeps the raw JSON body so each writer can retain its subtree verbatim
/// alongside the normalized fields.
#[derive(Debug, Clone)]
pub struct ForecastDocument {
    body: Value,
}

impl ForecastDocument {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Display name reported by the provider's `location` section, if any
    pub fn location_name(&self) -> Option<String> {
        let section = self.body.get("location")?;
        let location: WaLocation = serde_json::from_value(section.clone()).ok()?;
        let name = location.name?;
        let qualifier = location
            .region
            .filter(|r| !r.is_empty())
            .or(location.country.filter(|c| !c.is_empty()));
        match qualifier {
            Some(qualifier) => Some(format!("{}, {}", name, qualifier)),
            None => Some(name),
        }
    }

    /// Extract the `current` subtree as one normalized observation
    ///
    /// The observation instant prefers `last_updated_epoch` (epoch seconds,
    /// UTC) and falls back to parsing the free-text `last_updated` field.
    pub fn current_observation(&self) -> AppResult<CurrentObservation> {
        let raw = self
            .body
            .get("current")
            .ok_or_else(|| AppError::MalformedResponse("missing `current` section".to_string()))?;

        let current: WaCurrent = serde_json::from_value(raw.clone())
            .map_err(|e| AppError::MalformedResponse(format!("`current` section: {}", e)))?;

        let obs_time = match current.last_updated_epoch {
            Some(epoch) => DateTime::from_timestamp(epoch, 0).ok_or_else(|| {
                AppError::MalformedResponse(format!("last_updated_epoch {} is out of range", epoch))
            })?,
            None => {
                let text = current.last_updated.as_deref().ok_or_else(|| {
                    AppError::MalformedResponse(
                        "`current` carries neither last_updated_epoch nor last_updated".to_string(),
                    )
                })?;
                // Local wall-clock without an offset; the epoch field is
                // preferred whenever the provider sends it.
                NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
                    .map_err(|e| {
                        AppError::MalformedResponse(format!(
                            "cannot parse last_updated {:?}: {}",
                            text, e
                        ))
                    })?
                    .and_utc()
            }
        };

        let condition = current.condition.unwrap_or_default();

        Ok(CurrentObservation {
            obs_time,
            temp_f: current.temp_f,
            condition_text: condition.text,
            condition_code: condition.code,
            wind_mph: current.wind_mph,
            gust_mph: current.gust_mph,
            precip_in: current.precip_in,
            cloud: current.cloud,
            raw: raw.clone(),
        })
    }

    /// Extract `forecast.forecastday[]` as normalized forecast days
    pub fn forecast_days(&self) -> AppResult<Vec<ForecastDay>> {
        let entries = self
            .body
            .pointer("/forecast/forecastday")
            .ok_or_else(|| {
                AppError::MalformedResponse("missing `forecast.forecastday` section".to_string())
            })?
            .as_array()
            .ok_or_else(|| {
                AppError::MalformedResponse("`forecast.forecastday` is not an array".to_string())
            })?;

        entries
            .iter()
            .map(|entry| {
                let parsed: WaForecastEntry = serde_json::from_value(entry.clone())
                    .map_err(|e| AppError::MalformedResponse(format!("forecast entry: {}", e)))?;

                let date = NaiveDate::parse_from_str(&parsed.date, "%Y-%m-%d").map_err(|e| {
                    AppError::MalformedResponse(format!(
                        "cannot parse forecast date {:?}: {}",
                        parsed.date, e
                    ))
                })?;

                let day = parsed.day.unwrap_or_default();
                let condition = day.condition.unwrap_or_default();

                Ok(ForecastDay {
                    date,
                    maxtemp_f: day.maxtemp_f,
                    mintemp_f: day.mintemp_f,
                    maxwind_mph: day.maxwind_mph,
                    totalprecip_in: day.totalprecip_in,
                    totalsnow_cm: day.totalsnow_cm,
                    condition_text: condition.text,
                    condition_code: condition.code,
                    daily_chance_of_rain: day.daily_chance_of_rain,
                    daily_chance_of_snow: day.daily_chance_of_snow,
                    raw: entry.clone(),
                })
            })
            .collect()
    }

    /// Extract `alerts.alert[]`; an absent or empty list is a no-op
    pub fn active_alerts(&self) -> AppResult<Vec<WeatherAlert>> {
        let list = match self.body.get("alerts").and_then(|a| a.get("alert")) {
            Some(list) => list,
            None => return Ok(Vec::new()),
        };

        let entries = list
            .as_array()
            .ok_or_else(|| AppError::MalformedResponse("`alerts.alert` is not an array".to_string()))?;

        entries
            .iter()
            .map(|entry| {
                let alert: WaAlert = serde_json::from_value(entry.clone())
                    .map_err(|e| AppError::MalformedResponse(format!("alert entry: {}", e)))?;

                Ok(WeatherAlert {
                    headline: alert.headline,
                    severity: alert.severity,
                    areas: alert.areas,
                    certainty: alert.certainty,
                    event: alert.event,
                    note: alert.note,
                    effective: parse_instant(alert.effective.as_deref()),
                    expires: parse_instant(alert.expires.as_deref()),
                    raw: entry.clone(),
                })
            })
            .collect()
    }
}

/// WeatherAPI `location` section
#[derive(Debug, Deserialize)]
struct WaLocation {
    name: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

/// WeatherAPI `current` section
#[derive(Debug, Deserialize)]
struct WaCurrent {
    last_updated_epoch: Option<i64>,
    last_updated: Option<String>,
    temp_f: Option<Decimal>,
    condition: Option<WaCondition>,
    wind_mph: Option<Decimal>,
    gust_mph: Option<Decimal>,
    precip_in: Option<Decimal>,
    cloud: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
struct WaCondition {
    text: Option<String>,
    code: Option<i32>,
}

/// One entry of `forecast.forecastday[]`
#[derive(Debug, Deserialize)]
struct WaForecastEntry {
    date: String,
    day: Option<WaDay>,
}

#[derive(Debug, Deserialize, Default)]
struct WaDay {
    maxtemp_f: Option<Decimal>,
    mintemp_f: Option<Decimal>,
    maxwind_mph: Option<Decimal>,
    totalprecip_in: Option<Decimal>,
    totalsnow_cm: Option<Decimal>,
    condition: Option<WaCondition>,
    #[serde(default, deserialize_with = "chance_percent")]
    daily_chance_of_rain: i32,
    #[serde(default, deserialize_with = "chance_percent")]
    daily_chance_of_snow: i32,
}

/// One entry of `alerts.alert[]`; all fields pass through unmodified
#[derive(Debug, Deserialize)]
struct WaAlert {
    headline: Option<String>,
    severity: Option<String>,
    areas: Option<String>,
    certainty: Option<String>,
    event: Option<String>,
    note: Option<String>,
    effective: Option<String>,
    expires: Option<String>,
}

/// Coerce a chance-of-precipitation value to an integer percentage
///
/// The provider has emitted these as JSON numbers and as strings; absent and
/// null both mean 0.
fn chance_percent<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(|f| f.round() as i32).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f.round() as i32).unwrap_or(0),
        _ => 0,
    })
}

/// Parse an alert instant; unparseable values are treated as absent
fn parse_instant(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
