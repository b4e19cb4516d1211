//! Reduction gearbox between one or more motors and the arm joint.

use crate::motor::Motor;

// ---------------------------------------------------------------------------
// Gearbox
// ---------------------------------------------------------------------------

/// A reduction driving the output shaft from `n_motors` identical motors.
///
/// The motor side spins `ratio` times faster than the output side, so motor
/// torque is evaluated at the reflected velocity and multiplied up by the
/// same ratio on the way out. Losses fold into a single efficiency factor.
#[derive(Debug, Clone)]
pub struct Gearbox {
    motor: Motor,
    ratio: f64,      // motor revs per output rev, > 0
    n_motors: u32,   // identical motors on one shaft, >= 1
    efficiency: f64, // fraction of torque surviving the geartrain, (0, 1]
}

impl Gearbox {
    /// Single motor at full efficiency through a `ratio`:1 reduction.
    pub fn new(motor: Motor, ratio: f64) -> Self {
        Self { motor, ratio, n_motors: 1, efficiency: 1.0 }
    }

    pub fn with_n_motors(mut self, n_motors: u32) -> Self {
        self.n_motors = n_motors;
        self
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    /// Output-shaft torque (N·m) at an output velocity (rad/s) for a
    /// normalized command in `[-1, 1]`.
    pub fn torque(&self, velocity: f64, output: f64) -> f64 {
        self.motor.torque(velocity * self.ratio, output)
            * self.ratio
            * f64::from(self.n_motors)
            * self.efficiency
    }

    /// Output-side free speed (rad/s) at the motor's rated voltage.
    pub fn free_speed(&self) -> f64 {
        self.motor.free_speed(self.motor.rated_voltage()) / self.ratio
    }

    pub fn set_motor(&mut self, motor: Motor) {
        self.motor = motor;
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio;
    }

    pub fn set_n_motors(&mut self, n_motors: u32) {
        self.n_motors = n_motors;
    }

    pub fn set_efficiency(&mut self, efficiency: f64) {
        self.efficiency = efficiency;
    }

    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn n_motors(&self) -> u32 {
        self.n_motors
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
