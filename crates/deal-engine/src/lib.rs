pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod telemetry;
