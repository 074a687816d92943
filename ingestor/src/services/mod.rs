//! Ingestion services for the Weather Watch pipeline

pub mod ingest;

pub use ingest::IngestService;
