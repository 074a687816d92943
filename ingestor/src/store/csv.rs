//! Flat-file CSV storage backend
//!
//! Writes three files per location (`<stem>_current.csv`,
//! `<stem>_forecast.csv`, `<stem>_alerts.csv`) in append mode, emitting the
//! header only when a file is newly created. Flat files have no natural-key
//! enforcement, so this backend is append-only on every path; convergence
//! under re-ingestion is a property of the relational backend.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::WeatherStore;
use shared::{CurrentObservation, ForecastDay, Location, WeatherAlert};

/// CSV-backed store rooted at one output directory
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// File stem for a location query, matching the export naming scheme
    fn file_stem(query: &str) -> String {
        query.replace(',', "_")
    }

    fn path_for(&self, query: &str, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", Self::file_stem(query), suffix))
    }

    /// Append serde rows, writing the header only for a brand-new file
    fn append_rows<R: Serialize>(&self, path: &Path, rows: &[R]) -> AppResult<()> {
        let exists = path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(!exists)
            .from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl WeatherStore for CsvStore {
    /// Ensure the output directory exists
    async fn init(&self) -> AppResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Mint a per-run identity; the file stem is the durable key here
    async fn resolve_location(
        &self,
        query: &str,
        display_name: Option<&str>,
    ) -> AppResult<Location> {
        Ok(Location {
            id: Uuid::new_v4(),
            query: query.to_string(),
            name: display_name.map(str::to_string),
        })
    }

    async fn upsert_current(
        &self,
        location: &Location,
        observation: &CurrentObservation,
    ) -> AppResult<()> {
        let row = CurrentRow {
            location: &location.query,
            obs_time: observation.obs_time,
            temp_f: observation.temp_f,
            condition_text: observation.condition_text.as_deref(),
            condition_code: observation.condition_code,
            wind_mph: observation.wind_mph,
            gust_mph: observation.gust_mph,
            precip_in: observation.precip_in,
            cloud: observation.cloud,
        };
        self.append_rows(&self.path_for(&location.query, "current"), &[row])
    }

    async fn upsert_forecast_days(
        &self,
        location: &Location,
        days: &[ForecastDay],
    ) -> AppResult<()> {
        if days.is_empty() {
            return Ok(());
        }

        let rows: Vec<ForecastRow<'_>> = days
            .iter()
            .map(|day| ForecastRow {
                location: &location.query,
                forecast_date: day.date,
                maxtemp_f: day.maxtemp_f,
                mintemp_f: day.mintemp_f,
                maxwind_mph: day.maxwind_mph,
                totalprecip_in: day.totalprecip_in,
                totalsnow_cm: day.totalsnow_cm,
                condition_text: day.condition_text.as_deref(),
                condition_code: day.condition_code,
                daily_chance_of_rain: day.daily_chance_of_rain,
                daily_chance_of_snow: day.daily_chance_of_snow,
            })
            .collect();
        self.append_rows(&self.path_for(&location.query, "forecast"), &rows)
    }

    async fn append_alerts(
        &self,
        location: &Location,
        alerts: &[WeatherAlert],
    ) -> AppResult<usize> {
        if alerts.is_empty() {
            return Ok(0);
        }

        let rows: Vec<AlertRow<'_>> = alerts
            .iter()
            .map(|alert| AlertRow {
                location: &location.query,
                headline: alert.headline.as_deref(),
                severity: alert.severity.as_deref(),
                areas: alert.areas.as_deref(),
                certainty: alert.certainty.as_deref(),
                event: alert.event.as_deref(),
                note: alert.note.as_deref(),
                effective: alert.effective,
                expires: alert.expires,
            })
            .collect();
        self.append_rows(&self.path_for(&location.query, "alerts"), &rows)?;
        Ok(alerts.len())
    }
}

#[derive(Serialize)]
struct CurrentRow<'a> {
    location: &'a str,
    obs_time: DateTime<Utc>,
    temp_f: Option<Decimal>,
    condition_text: Option<&'a str>,
    condition_code: Option<i32>,
    wind_mph: Option<Decimal>,
    gust_mph: Option<Decimal>,
    precip_in: Option<Decimal>,
    cloud: Option<i32>,
}

#[derive(Serialize)]
struct ForecastRow<'a> {
    location: &'a str,
    forecast_date: NaiveDate,
    maxtemp_f: Option<Decimal>,
    mintemp_f: Option<Decimal>,
    maxwind_mph: Option<Decimal>,
    totalprecip_in: Option<Decimal>,
    totalsnow_cm: Option<Decimal>,
    condition_text: Option<&'a str>,
    condition_code: Option<i32>,
    daily_chance_of_rain: i32,
    daily_chance_of_snow: i32,
}

#[derive(Serialize)]
struct AlertRow<'a> {
    location: &'a str,
    headline: Option<&'a str>,
    severity: Option<&'a str>,
    areas: Option<&'a str>,
    certainty: Option<&'a str>,
    event: Option<&'a str>,
    note: Option<&'a str>,
    effective: Option<DateTime<Utc>>,
    expires: Option<DateTime<Utc>>,
}
