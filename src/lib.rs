pub mod math_util;
pub mod motor;
pub mod gearbox;
pub mod bearing;
pub mod arm;
pub mod pid;
pub mod sim;
pub mod io;

// Flat re-exports for the commonly used types.
pub use arm::{ArmStep, ModelArm, G};
pub use bearing::Bearing;
pub use gearbox::Gearbox;
pub use io::TelemetryLog;
pub use motor::{Motor, UnknownMotor};
pub use pid::{Pid, PidOutput};
pub use sim::process::{Process, Telemetry};
pub use sim::simulator::{simulate, SettleConfig, SettleMetrics, StepResponse};
