pub mod config;
pub mod error;
pub mod prioritization;
pub mod telemetry;
