pub mod process;
pub mod simulator;

pub use process::{Process, Telemetry};
pub use simulator::{simulate, SettleConfig, SettleMetrics, StepResponse};
