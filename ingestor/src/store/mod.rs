//! Storage backends for ingested weather data

pub mod csv;
pub mod postgres;

pub use self::csv::CsvStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::AppResult;
use shared::{CurrentObservation, ForecastDay, Location, WeatherAlert};

/// A persistence backend for one ingestion run
///
/// The relational backend provides the convergence guarantees (one row per
/// natural key on the upsert paths); the flat-file backend is append-only.
#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Idempotently prepare the backing structures; safe on every run
    async fn init(&self) -> AppResult<()>;

    /// Insert-or-fetch the location for `query`, merging in a display name
    ///
    /// A known name is never overwritten with null: the stored name wins and
    /// `display_name` only fills a gap.
    async fn resolve_location(
        &self,
        query: &str,
        display_name: Option<&str>,
    ) -> AppResult<Location>;

    /// Upsert one observation keyed by (location, observation instant)
    async fn upsert_current(
        &self,
        location: &Location,
        observation: &CurrentObservation,
    ) -> AppResult<()>;

    /// Upsert forecast days keyed by (location, date), atomically per batch
    async fn upsert_forecast_days(
        &self,
        location: &Location,
        days: &[ForecastDay],
    ) -> AppResult<()>;

    /// Append alerts without conflict handling; returns the count inserted
    async fn append_alerts(
        &self,
        location: &Location,
        alerts: &[WeatherAlert],
    ) -> AppResult<usize>;
}
