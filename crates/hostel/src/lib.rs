pub mod config;
pub mod error;
pub mod rooms;
pub mod telemetry;
