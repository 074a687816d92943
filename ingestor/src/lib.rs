//! Weather Watch ingestion service
//!
//! Polls WeatherAPI.com for a watch-list of locations and persists current
//! conditions, multi-day forecasts and active alerts into PostgreSQL or
//! per-location CSV files.

pub mod config;
pub mod error;
pub mod external;
pub mod services;
pub mod store;

pub use config::Config;
