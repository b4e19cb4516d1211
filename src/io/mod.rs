pub mod csv;
pub mod json;
pub mod log;

pub use log::TelemetryLog;
