//! The closed-loop process: arm, controller, and the commanded output,
//! advanced one tick at a time.

use tracing::debug;

use crate::arm::ModelArm;
use crate::bearing::Bearing;
use crate::gearbox::Gearbox;
use crate::motor::{self, UnknownMotor};
use crate::pid::Pid;

use std::f64::consts::{FRAC_PI_2, PI};

// ---------------------------------------------------------------------------
// Telemetry row
// ---------------------------------------------------------------------------

/// Everything one tick produces. Field order matches
/// [`Telemetry::COLUMNS`]; plots, tables, and CSV exports all key on that
/// order.
#[derive(Debug, Clone, Copy)]
pub struct Telemetry {
    pub ts: f64,                  // s since the process started
    pub position: f64,            // rad
    pub velocity: f64,            // rad/s
    pub acceleration: f64,        // rad/s^2
    pub position_deg: f64,        // deg
    pub velocity_deg: f64,        // deg/s
    pub acceleration_deg: f64,    // deg/s^2
    pub torque: f64,              // N·m, net after friction
    pub motor_torque: f64,        // N·m
    pub torque_from_gravity: f64, // N·m
    pub bearing_friction: f64,    // N·m
    pub output: f64,              // unclamped controller total
    pub p_output: f64,
    pub i_output: f64,
    pub d_output: f64,
    pub err: f64,     // rad
    pub d_err: f64,   // rad/s
    pub err_acc: f64, // rad·s
    pub f_output: f64,
    pub voltage: f64, // V actually applied next tick
    pub p_voltage: f64,
    pub i_voltage: f64,
    pub d_voltage: f64,
    pub f_voltage: f64,
}

impl Telemetry {
    /// Column names in row order.
    pub const COLUMNS: [&'static str; 24] = [
        "ts",
        "position",
        "velocity",
        "acceleration",
        "position_deg",
        "velocity_deg",
        "acceleration_deg",
        "torque",
        "motor_torque",
        "torque_from_gravity",
        "bearing_friction",
        "output",
        "p_output",
        "i_output",
        "d_output",
        "err",
        "d_err",
        "err_acc",
        "f_output",
        "voltage",
        "p_voltage",
        "i_voltage",
        "d_voltage",
        "f_voltage",
    ];

    /// Row values, aligned with [`Telemetry::COLUMNS`].
    pub fn values(&self) -> [f64; 24] {
        [
            self.ts,
            self.position,
            self.velocity,
            self.acceleration,
            self.position_deg,
            self.velocity_deg,
            self.acceleration_deg,
            self.torque,
            self.motor_torque,
            self.torque_from_gravity,
            self.bearing_friction,
            self.output,
            self.p_output,
            self.i_output,
            self.d_output,
            self.err,
            self.d_err,
            self.err_acc,
            self.f_output,
            self.voltage,
            self.p_voltage,
            self.i_voltage,
            self.d_voltage,
            self.f_voltage,
        ]
    }
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

/// One simulated arm under closed-loop control.
///
/// The output computed on a tick is applied on the NEXT tick's integration,
/// giving the loop the one-cycle actuation lag real hardware has. All
/// reconfiguration goes through setters on this type; nothing outside holds
/// a mutable handle to the arm or the controller.
#[derive(Debug, Clone)]
pub struct Process {
    model: ModelArm,
    pid: Pid,
    f: f64,
    output: f64,         // last commanded output, clamped to [-1, 1]
    supply_voltage: f64, // V, scales telemetry only
    position: f64,       // rad
    velocity: f64,       // rad/s
    elapsed: f64,        // s
}

impl Process {
    /// Bench-rig defaults: a Falcon 500 through a 20:1 reduction swinging an
    /// 18 kg, 1 m arm from the hanging start, gains zeroed, izone 20
    /// degrees.
    pub fn new() -> Self {
        let gearbox = Gearbox::new(motor::falcon_500(), 20.0);
        let bearing = Bearing::new(0.4, 0.05);
        let model = ModelArm::new(18.0, 1.0, gearbox, bearing);

        let mut pid = Pid::new();
        pid.enable_continuous_input(-PI, PI);
        pid.set_izone(20f64.to_radians());

        let mut process = Self {
            model,
            pid,
            f: 0.0,
            output: 0.0,
            supply_voltage: 12.0,
            position: 0.0,
            velocity: 0.0,
            elapsed: 0.0,
        };
        process.reset(-FRAC_PI_2);
        process
    }

    /// Advance one tick of `dt` seconds and report the full telemetry row.
    pub fn update(&mut self, dt: f64) -> Telemetry {
        self.elapsed += dt;

        // Integrate under the output commanded on the previous tick.
        let step = self.model.step(self.position, self.velocity, dt, self.output);
        self.position = step.position;
        self.velocity = step.velocity;

        let pid = self.pid.calculate(self.position, Some(dt));
        let f_output = self.model.feedforward(self.f, self.pid.setpoint());
        let output = pid.output + f_output;
        self.output = output.clamp(-1.0, 1.0);

        Telemetry {
            ts: self.elapsed,
            position: step.position,
            velocity: step.velocity,
            acceleration: step.acceleration,
            position_deg: step.position.to_degrees(),
            velocity_deg: step.velocity.to_degrees(),
            acceleration_deg: step.acceleration.to_degrees(),
            torque: step.torque,
            motor_torque: step.motor_torque,
            torque_from_gravity: step.torque_from_gravity,
            bearing_friction: step.bearing_friction,
            output,
            p_output: pid.p_output,
            i_output: pid.i_output,
            d_output: pid.d_output,
            err: pid.err,
            d_err: pid.d_err,
            err_acc: pid.err_acc,
            f_output,
            // Each channel clamps on its own, so the per-term voltages need
            // not sum to the applied voltage once anything saturates.
            voltage: self.output * self.supply_voltage,
            p_voltage: pid.p_output.clamp(-1.0, 1.0) * self.supply_voltage,
            i_voltage: pid.i_output.clamp(-1.0, 1.0) * self.supply_voltage,
            d_voltage: pid.d_output.clamp(-1.0, 1.0) * self.supply_voltage,
            f_voltage: f_output.clamp(-1.0, 1.0) * self.supply_voltage,
        }
    }

    /// Put the arm at `initial_position` at rest and reseed the controller.
    ///
    /// The elapsed clock and the standing output command are left alone;
    /// this repositions the arm, it does not rebuild the process.
    pub fn reset(&mut self, initial_position: f64) {
        self.position = initial_position;
        self.velocity = 0.0;
        self.pid.reset();
        self.pid.calculate(initial_position, None);
        debug!("arm reset to {:.3} rad", initial_position);
    }

    // -----------------------------------------------------------------------
    // Live reconfiguration
    // -----------------------------------------------------------------------

    pub fn set_p(&mut self, p: f64) {
        self.pid.set_p(p);
    }

    pub fn set_i(&mut self, i: f64) {
        self.pid.set_i(i);
    }

    pub fn set_d(&mut self, d: f64) {
        self.pid.set_d(d);
    }

    pub fn set_izone(&mut self, izone: f64) {
        self.pid.set_izone(izone);
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.pid.set_setpoint(setpoint);
    }

    pub fn set_f(&mut self, f: f64) {
        self.f = f;
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.model.set_ratio(ratio);
    }

    pub fn set_n_motors(&mut self, n_motors: u32) {
        self.model.set_n_motors(n_motors);
    }

    /// Swap the drive motor by registry name.
    pub fn set_motor(&mut self, name: &str) -> Result<(), UnknownMotor> {
        let motor = motor::lookup(name)?;
        debug!("swapping drive motor to {}", name);
        self.model.set_motor(motor);
        Ok(())
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.model.set_mass(mass);
    }

    pub fn set_length(&mut self, length: f64) {
        self.model.set_length(length);
    }

    pub fn set_cof(&mut self, cof: f64) {
        self.model.set_cof(cof);
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn supply_voltage(&self) -> f64 {
        self.supply_voltage
    }

    pub fn f(&self) -> f64 {
        self.f
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn model(&self) -> &ModelArm {
        &self.model
    }
}

impl Default for Process {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_util::gain_deg_to_rad;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    const DT: f64 = 1.0 / 50.0;

    fn mean_abs_velocity(rows: &[Telemetry]) -> f64 {
        rows.iter().map(|r| r.velocity.abs()).sum::<f64>() / rows.len() as f64
    }

    #[test]
    fn defaults_match_the_bench_rig() {
        let process = Process::new();
        assert_relative_eq!(process.position(), -FRAC_PI_2);
        assert_eq!(process.velocity(), 0.0);
        assert_eq!(process.elapsed(), 0.0);
        assert_eq!(process.output(), 0.0);
        assert_relative_eq!(process.supply_voltage(), 12.0);
        assert_relative_eq!(process.model().mass(), 18.0);
        assert_relative_eq!(process.model().inertia(), 6.0);
        assert_relative_eq!(process.model().gearbox().ratio(), 20.0);
        assert_eq!(process.model().gearbox().motor().name(), "Vex Falcon 500");
        assert_relative_eq!(process.pid().izone(), 20f64.to_radians());
        assert_eq!(process.pid().setpoint(), 0.0);
    }

    #[test]
    fn columns_and_values_stay_aligned() {
        let unique: HashSet<&str> = Telemetry::COLUMNS.iter().copied().collect();
        assert_eq!(unique.len(), Telemetry::COLUMNS.len(), "duplicate column name");

        let mut process = Process::new();
        process.set_p(1.0);
        let row = process.update(DT);
        let values = row.values();
        assert_eq!(values.len(), Telemetry::COLUMNS.len());

        let index_of = |name: &str| {
            Telemetry::COLUMNS.iter().position(|c| *c == name).unwrap()
        };
        assert_eq!(values[index_of("ts")], row.ts);
        assert_eq!(values[index_of("position")], row.position);
        assert_eq!(values[index_of("err")], row.err);
        assert_eq!(values[index_of("f_voltage")], row.f_voltage);
    }

    #[test]
    fn telemetry_reports_degrees_alongside_radians() {
        let mut process = Process::new();
        process.set_p(1.0);
        let row = process.update(DT);
        assert_relative_eq!(row.position_deg, row.position.to_degrees());
        assert_relative_eq!(row.velocity_deg, row.velocity.to_degrees());
        assert_relative_eq!(row.acceleration_deg, row.acceleration.to_degrees());
    }

    #[test]
    fn first_tick_integrates_under_the_previous_output() {
        let mut process = Process::new();
        process.set_p(1.0);

        // The hanging arm starts with no standing command: the first tick
        // sees zero motor torque even though the controller now wants full
        // output.
        let first = process.update(DT);
        assert_eq!(first.motor_torque, 0.0);
        assert!(first.velocity.abs() < 1e-9);
        assert!(first.output > 1.0, "unclamped total was {}", first.output);
        assert_relative_eq!(first.voltage, 12.0);

        let second = process.update(DT);
        assert!(
            second.motor_torque > 50.0,
            "second tick should drive hard, torque was {}",
            second.motor_torque
        );
    }

    #[test]
    fn voltage_channels_clamp_independently() {
        let mut process = Process::new();
        process.set_p(10.0);
        process.set_f(0.9);

        let row = process.update(DT);
        assert_relative_eq!(row.p_voltage, 12.0);
        assert_relative_eq!(row.f_voltage, 0.9 * 12.0, epsilon = 1e-9);
        assert_relative_eq!(row.voltage, 12.0);
        // The per-term voltages overrun the applied voltage once saturated.
        assert!(row.p_voltage + row.f_voltage > row.voltage);
        assert!(row.output > 1.0);
    }

    #[test]
    fn motor_swaps_by_registry_name() {
        let mut process = Process::new();
        process.set_motor("CIM").unwrap();
        assert_eq!(process.model().gearbox().motor().name(), "CIM");

        let err = process.set_motor("Banebots 550").unwrap_err();
        assert!(err.to_string().contains("Banebots 550"));
        // A failed swap leaves the drivetrain alone.
        assert_eq!(process.model().gearbox().motor().name(), "CIM");
    }

    #[test]
    fn reset_repositions_without_rebuilding() {
        let mut process = Process::new();
        process.set_p(gain_deg_to_rad(0.05));
        for _ in 0..10 {
            process.update(DT);
        }
        let elapsed = process.elapsed();
        assert_eq!(process.output(), 1.0, "loop should still be saturated");

        process.reset(-1.0);
        assert_eq!(process.position(), -1.0);
        assert_eq!(process.velocity(), 0.0);
        assert_relative_eq!(process.elapsed(), elapsed);

        // The standing command survives a reset, so the next tick still
        // drives.
        let row = process.update(DT);
        assert!(row.motor_torque > 50.0, "motor torque was {}", row.motor_torque);
    }

    #[test]
    fn p_only_step_response_rises_and_parks_below_the_target() {
        // Heavy arm, p-only: the loop lifts the arm quickly, then gravity
        // wins where the saturated drive can no longer hold, and the arm
        // parks at the balance angle without ever crossing the setpoint.
        let mut process = Process::new();
        process.set_p(gain_deg_to_rad(0.05));
        process.set_mass(30.0);
        process.set_cof(0.6);
        process.set_setpoint(0.0);
        process.reset(-FRAC_PI_2);

        let rows: Vec<Telemetry> = (0..500).map(|_| process.update(DT)).collect();

        // Early rise is strictly upward.
        assert!(rows[5].position < rows[15].position);
        assert!(rows[15].position < rows[25].position);

        // Never reaches the setpoint, never falls below the start.
        let max = rows.iter().map(|r| r.position).fold(f64::MIN, f64::max);
        let min = rows.iter().map(|r| r.position).fold(f64::MAX, f64::min);
        assert!(max < -0.05, "arm should park short of 0, peaked at {max}");
        assert!(min > -1.60, "arm fell below its start, min {min}");

        // Parks well above the start and quiets down.
        let last = rows.last().unwrap();
        assert!(
            last.position > -1.2 && last.position < -0.6,
            "final position {} outside the balance band",
            last.position
        );
        let late = mean_abs_velocity(&rows[400..]);
        let mid = mean_abs_velocity(&rows[25..125]);
        assert!(late < 0.3, "late mean |velocity| was {late}");
        assert!(late < mid, "no settling trend: late {late} vs mid {mid}");
    }
}
