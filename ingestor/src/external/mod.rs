//! External API integrations

pub mod weatherapi;

pub use weatherapi::{ForecastDocument, WeatherClient};

use async_trait::async_trait;

use crate::error::AppResult;

/// A source of forecast documents
///
/// The production implementation is [`WeatherClient`]; tests drive the
/// pipeline with canned documents instead.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self, query: &str, days: u32) -> AppResult<ForecastDocument>;
}
