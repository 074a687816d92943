//! Shared types and models for the Weather Watch ingestion service
//!
//! This crate contains the normalized weather records written by the
//! storage backends and is free of any I/O dependencies.

pub mod models;

pub use models::*;
