//! Rigid single-joint arm driven through a gearbox against gravity.

use crate::bearing::Bearing;
use crate::gearbox::Gearbox;
use crate::math_util::wrap_angle;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

/// Gravitational acceleration used throughout the model, m/s^2. A round
/// model constant rather than measured gravity; gravity and friction torques
/// are both keyed to it.
pub const G: f64 = 10.0;

// ---------------------------------------------------------------------------
// Arm model
// ---------------------------------------------------------------------------

/// A uniform rod hinged at one end.
///
/// Angle 0 is horizontal, positive angles rise, and -PI/2 hangs straight
/// down. Inertia is the rod-about-its-end value `mass * length^2 / 3` with
/// the centre of mass halfway along; both are recomputed whenever mass or
/// length change.
#[derive(Debug, Clone)]
pub struct ModelArm {
    mass: f64,           // kg
    length: f64,         // m
    inertia: f64,        // kg·m^2
    centre_of_mass: f64, // m from the pivot
    gearbox: Gearbox,
    bearing: Bearing,
}

/// Outputs of one integration step. Angles in radians.
#[derive(Debug, Clone, Copy)]
pub struct ArmStep {
    pub position: f64,            // rad, wrapped to (-PI, PI]
    pub velocity: f64,            // rad/s
    pub acceleration: f64,        // rad/s^2
    pub torque: f64,              // N·m, net torque after friction
    pub motor_torque: f64,        // N·m
    pub torque_from_gravity: f64, // N·m
    pub bearing_friction: f64,    // N·m, signed
}

impl ModelArm {
    pub fn new(mass: f64, length: f64, gearbox: Gearbox, bearing: Bearing) -> Self {
        let mut arm = Self {
            mass,
            length,
            inertia: 0.0,
            centre_of_mass: 0.0,
            gearbox,
            bearing,
        };
        arm.recompute_geometry();
        arm
    }

    fn recompute_geometry(&mut self) {
        self.inertia = self.mass * self.length * self.length / 3.0;
        self.centre_of_mass = self.length / 2.0;
    }

    /// Advance one step of `dt` seconds under a normalized motor command.
    ///
    /// The arm holds no kinematic state: the caller supplies position and
    /// velocity and receives them advanced. Velocity integrates
    /// semi-implicitly and position integrates trapezoidally from the old
    /// and new velocities, then wraps to `(-PI, PI]`.
    pub fn step(&self, position: f64, velocity: f64, dt: f64, output: f64) -> ArmStep {
        let motor_torque = self.gearbox.torque(velocity, output);
        let torque_from_gravity = -G * self.mass * position.cos() * self.centre_of_mass;
        let net = motor_torque + torque_from_gravity;

        // Friction opposes the current motion, capped at the net torque
        // magnitude so it cannot flip the sign on its own. A resting arm
        // sees no friction.
        let bearing_friction = if velocity == 0.0 {
            0.0
        } else {
            -velocity.signum() * net.abs().min(self.bearing.friction(self.mass))
        };

        let torque = net + bearing_friction;
        let acceleration = torque / self.inertia;
        let new_velocity = velocity + acceleration * dt;
        let new_position = wrap_angle(position + dt * (velocity + new_velocity) / 2.0);

        ArmStep {
            position: new_position,
            velocity: new_velocity,
            acceleration,
            torque,
            motor_torque,
            torque_from_gravity,
            bearing_friction,
        }
    }

    /// Gravity-compensation feedforward: the holding output scales with the
    /// cosine of the target angle.
    pub fn feedforward(&self, f: f64, setpoint: f64) -> f64 {
        f * setpoint.cos()
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.recompute_geometry();
    }

    pub fn set_length(&mut self, length: f64) {
        self.length = length;
        self.recompute_geometry();
    }

    pub fn set_motor(&mut self, motor: crate::motor::Motor) {
        self.gearbox.set_motor(motor);
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.gearbox.set_ratio(ratio);
    }

    pub fn set_n_motors(&mut self, n_motors: u32) {
        self.gearbox.set_n_motors(n_motors);
    }

    pub fn set_cof(&mut self, cof: f64) {
        self.bearing.set_cof(cof);
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn centre_of_mass(&self) -> f64 {
        self.centre_of_mass
    }

    pub fn gearbox(&self) -> &Gearbox {
        &self.gearbox
    }

    pub fn bearing(&self) -> &Bearing {
        &self.bearing
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
