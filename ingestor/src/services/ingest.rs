//! Ingestion pipeline and run orchestrator
//!
//! One location is processed to completion before the next begins:
//! fetch, resolve the location row, then the three writers (current
//! observation, forecast days, alerts). Sequential processing plus the
//! inter-request delay is how the provider's implicit rate limit is
//! respected.

use std::time::Duration;

use crate::error::AppResult;
use crate::external::ForecastSource;
use crate::store::WeatherStore;

/// Orchestrates one ingestion run over the configured watch-list
pub struct IngestService {
    source: Box<dyn ForecastSource>,
    store: Box<dyn WeatherStore>,
}

/// Outcome of one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub alerts_inserted: usize,
}

/// Per-location report, used for visibility only
#[derive(Debug, Clone)]
struct LocationReport {
    forecast_days: usize,
    alerts_inserted: usize,
}

impl IngestService {
    pub fn new(source: Box<dyn ForecastSource>, store: Box<dyn WeatherStore>) -> Self {
        Self { source, store }
    }

    /// Process every location strictly in list order
    ///
    /// A location that fails is logged and skipped; whatever earlier
    /// locations wrote stays committed. The delay is skipped when zero and
    /// never trails the final location.
    pub async fn run(&self, locations: &[String], forecast_days: u32, delay: Duration) -> RunSummary {
        let mut summary = RunSummary::default();

        for (index, query) in locations.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.ingest_location(query, forecast_days).await {
                Ok(report) => {
                    tracing::info!(
                        location = %query,
                        forecast_days = report.forecast_days,
                        alerts = report.alerts_inserted,
                        "location ingested"
                    );
                    summary.succeeded += 1;
                    summary.alerts_inserted += report.alerts_inserted;
                }
                Err(err) => {
                    tracing::error!(
                        location = %query,
                        error = %err,
                        "skipping location after ingestion failure"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Fetch one document and apply the three writers
    async fn ingest_location(&self, query: &str, forecast_days: u32) -> AppResult<LocationReport> {
        let document = self.source.fetch_forecast(query, forecast_days).await?;

        let display_name = document.location_name();
        let location = self
            .store
            .resolve_location(query, display_name.as_deref())
            .await?;

        let observation = document.current_observation()?;
        self.store.upsert_current(&location, &observation).await?;

        let days = document.forecast_days()?;
        self.store.upsert_forecast_days(&location, &days).await?;

        let alerts = document.active_alerts()?;
        let alerts_inserted = self.store.append_alerts(&location, &alerts).await?;

        Ok(LocationReport {
            forecast_days: days.len(),
            alerts_inserted,
        })
    }
}
