//! DC motor torque curves.
//!
//! Every motor is reduced to the standard linear torque-speed model: torque
//! falls from stall torque at zero speed to zero at free speed, both of which
//! depend on the applied voltage. Generic motors scale both linearly through
//! their rated point; motors with published dynamometer data carry cubic fits
//! of stall torque and free speed against voltage instead.

use thiserror::Error;

use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Convert a datasheet speed in rpm to rad/s.
pub fn rpm_to_rad_per_sec(rpm: f64) -> f64 {
    rpm * 2.0 * PI / 60.0
}

// ---------------------------------------------------------------------------
// Torque model
// ---------------------------------------------------------------------------

/// How stall torque and free speed vary with applied voltage.
#[derive(Debug, Clone)]
enum TorqueModel {
    /// Datasheet stall torque (N·m) and free speed (rad/s) at rated voltage,
    /// scaled linearly with the applied voltage.
    Linear { stall: f64, free: f64 },
    /// Cubic fits against voltage, ascending coefficient order. Stall in
    /// N·m, free speed in rpm. The fits go negative at low voltage and are
    /// clamped to zero there.
    CubicFit { stall: [f64; 4], free_rpm: [f64; 4] },
}

fn poly3(c: &[f64; 4], v: f64) -> f64 {
    c[0] + c[1] * v + c[2] * v * v + c[3] * v * v * v
}

/// A DC motor characterized by its voltage-dependent torque-speed curve.
#[derive(Debug, Clone)]
pub struct Motor {
    name: String,
    rated_voltage: f64, // V
    model: TorqueModel,
}

impl Motor {
    /// Generic motor from datasheet stall torque (N·m) and free speed
    /// (rad/s) at `rated_voltage`.
    pub fn linear(
        name: impl Into<String>,
        rated_voltage: f64,
        stall_torque: f64,
        free_speed: f64,
    ) -> Self {
        Self {
            name: name.into(),
            rated_voltage,
            model: TorqueModel::Linear { stall: stall_torque, free: free_speed },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rated_voltage(&self) -> f64 {
        self.rated_voltage
    }

    /// Stall torque (N·m) at an applied voltage magnitude.
    pub fn stall_torque(&self, voltage: f64) -> f64 {
        match &self.model {
            TorqueModel::Linear { stall, .. } => stall * voltage / self.rated_voltage,
            TorqueModel::CubicFit { stall, .. } => poly3(stall, voltage).max(0.0),
        }
    }

    /// Free speed (rad/s) at an applied voltage magnitude.
    pub fn free_speed(&self, voltage: f64) -> f64 {
        match &self.model {
            TorqueModel::Linear { free, .. } => free * voltage / self.rated_voltage,
            TorqueModel::CubicFit { free_rpm, .. } => {
                rpm_to_rad_per_sec(poly3(free_rpm, voltage).max(0.0))
            }
        }
    }

    /// Shaft torque (N·m) at `velocity` (rad/s) for a normalized output
    /// command in `[-1, 1]`.
    ///
    /// Torque falls linearly from stall to zero at free speed, measured
    /// along the drive direction. The returned torque carries the sign of
    /// the applied voltage.
    pub fn torque(&self, velocity: f64, output: f64) -> f64 {
        let applied = output * self.rated_voltage;
        let stall = self.stall_torque(applied.abs());
        assert!(
            stall >= 0.0,
            "stall torque {stall} N·m at {} V must not be negative",
            applied.abs()
        );
        let free = self.free_speed(applied.abs());

        let torque = if free > 0.0 {
            stall * (1.0 - velocity * applied.signum() / free)
        } else {
            stall
        };
        torque.copysign(applied)
    }
}

// ---------------------------------------------------------------------------
// Known motors
// ---------------------------------------------------------------------------

/// Falcon 500, rated 12 V. Cubic fits of the published dynamometer data;
/// below roughly 0.85 V the fits are clamped at zero.
pub fn falcon_500() -> Motor {
    Motor {
        name: "Vex Falcon 500".into(),
        rated_voltage: 12.0,
        model: TorqueModel::CubicFit {
            stall: [-0.918, 1.15, -0.117, 5.0e-3],
            free_rpm: [-690.0, 870.0, -52.1, 2.4],
        },
    }
}

pub fn cim() -> Motor {
    Motor::linear("CIM", 12.0, 2.41, rpm_to_rad_per_sec(5330.0))
}

pub fn neo() -> Motor {
    Motor::linear("NEO", 12.0, 2.6, rpm_to_rad_per_sec(5676.0))
}

pub fn pro_775() -> Motor {
    Motor::linear("775 Pro", 12.0, 0.71, rpm_to_rad_per_sec(18730.0))
}

pub fn kraken_x60() -> Motor {
    Motor::linear("Kraken X60", 12.0, 7.09, rpm_to_rad_per_sec(6000.0))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Motor names accepted by [`lookup`], in display order.
pub const NAMES: &[&str] = &["Vex Falcon 500", "CIM", "NEO", "775 Pro", "Kraken X60"];

/// Returned by [`lookup`] for a name not in [`NAMES`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown motor \"{0}\"")]
pub struct UnknownMotor(pub String);

/// Look up a motor by its exact registry name.
pub fn lookup(name: &str) -> Result<Motor, UnknownMotor> {
    match name {
        "Vex Falcon 500" => Ok(falcon_500()),
        "CIM" => Ok(cim()),
        "NEO" => Ok(neo()),
        "775 Pro" => Ok(pro_775()),
        "Kraken X60" => Ok(kraken_x60()),
        _ => Err(UnknownMotor(name.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
