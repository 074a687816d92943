//! Domain models for the Weather Watch ingestion service

mod weather;

pub use weather::*;
