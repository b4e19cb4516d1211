//! Step-response scoring.
//!
//! Runs a configured [`Process`] from an initial angle and watches the error
//! until it either holds steady long enough to count as settled or clearly
//! never will. The scoring is tuning-oriented: everything is normalized to
//! the initial error so runs from different start angles compare directly.

use rand::Rng;
use tracing::{debug, warn};

use crate::sim::process::Process;

use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settling-analysis thresholds.
///
/// A response counts as settled once every error inside a trailing scan
/// window stays within a narrow band. The window stretches to at least the
/// time of the worst overshoot, so a slow oscillation cannot pass as steady.
#[derive(Debug, Clone)]
pub struct SettleConfig {
    pub dt: f64,            // s per tick
    pub band: f64,          // one-sided steady band, fraction of the initial error
    pub window: f64,        // base scan window, s
    pub window_factor: f64, // scan window stretch
    pub max_time: f64,      // give-up ceiling, s
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 50.0, // 50 Hz control loop
            band: 0.02,
            window: 30.0,
            window_factor: 2.0,
            max_time: 3000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Normalized scores for a settled response. Error fractions are relative
/// to the initial error magnitude.
#[derive(Debug, Clone, Copy)]
pub struct SettleMetrics {
    pub steady_state_error: f64,
    pub overshoot: f64,
    pub settling_time: f64, // s
}

/// Outcome of one step-response run.
#[derive(Debug, Clone)]
pub struct StepResponse {
    pub initial_position: f64, // rad
    pub final_time: f64,       // s of simulated time consumed
    pub metrics: Option<SettleMetrics>,
}

impl StepResponse {
    pub fn settled(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn initial_position_deg(&self) -> f64 {
        self.initial_position.to_degrees()
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Run one step response and score it.
///
/// `init` configures a fresh [`Process`] (gains, arm, drivetrain) before the
/// run. The arm starts at rest at `initial_position`, or at a uniformly
/// random angle when `None`. The run ends as settled, or as unsettled the
/// moment the error exceeds its initial magnitude, the clock passes
/// `max_time`, or the response started with zero error.
pub fn simulate<F>(config: &SettleConfig, init: F, initial_position: Option<f64>) -> StepResponse
where
    F: FnOnce(&mut Process),
{
    let mut process = Process::new();
    init(&mut process);

    let initial_position =
        initial_position.unwrap_or_else(|| rand::thread_rng().gen_range(-PI..PI));
    process.reset(initial_position);
    let initial_error = process.pid().error(initial_position);

    let dt = config.dt;
    let steady_interval = initial_error.abs() * config.band * 2.0;
    let mut scan_window = ((config.window / dt) * config.window_factor) as usize;

    let mut errors = vec![initial_error];
    let mut overshoot: f64 = 0.0;
    let mut thumb = 0_usize;
    let mut time = 0.0;
    let mut i = 0_usize;

    loop {
        i += 1;
        time += dt;
        let row = process.update(dt);
        let error = row.err;

        if error.abs() > initial_error.abs() || time > config.max_time || initial_error == 0.0 {
            warn!(
                "step response from {:.3} rad did not settle, gave up at {:.2} s",
                initial_position, time
            );
            return StepResponse { initial_position, final_time: time, metrics: None };
        }
        errors.push(error);

        // Track the worst excursion past the setpoint, and never scan a
        // window shorter than the time it took to reach it.
        let crossed = if initial_error > 0.0 { -error } else { error };
        if crossed > overshoot {
            overshoot = crossed;
            scan_window = scan_window.max(i);
        }

        if i - thumb > scan_window {
            let (settled, new_thumb) = is_settled(&errors, thumb, steady_interval);
            thumb = new_thumb;
            if settled {
                let tail = &errors[thumb..errors.len() - 1];
                let metrics = SettleMetrics {
                    steady_state_error: (mean(tail) / initial_error).abs(),
                    overshoot: (overshoot / initial_error).abs(),
                    settling_time: thumb as f64 * dt,
                };
                debug!(
                    "settled from {:.3} rad: {:.2} s to settle, {:.1}% overshoot",
                    initial_position,
                    metrics.settling_time,
                    metrics.overshoot * 100.0
                );
                return StepResponse {
                    initial_position,
                    final_time: time,
                    metrics: Some(metrics),
                };
            }
        }
    }
}

/// Scan the error history backwards from its newest value.
///
/// Settled means everything from `thumb` to the end stays inside
/// `interval`. On a violation, returns the index just past it: the earliest
/// point the steady region could start.
fn is_settled(errors: &[f64], thumb: usize, interval: f64) -> (bool, usize) {
    let mut min = errors[errors.len() - 1];
    let mut max = min;
    for j in (thumb..errors.len() - 1).rev() {
        min = min.min(errors[j]);
        max = max.max(errors[j]);
        if max - min > interval {
            return (false, j + 1);
        }
    }
    (true, thumb)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_util::gain_deg_to_rad;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn settle_scan_accepts_a_steady_tail() {
        let errors = vec![1.0, 0.8, 0.5, 0.10, 0.11, 0.09, 0.10, 0.10];
        let (settled, thumb) = is_settled(&errors, 3, 0.05);
        assert!(settled);
        assert_eq!(thumb, 3);
    }

    #[test]
    fn settle_scan_advances_past_a_disturbance() {
        let errors = vec![0.10, 0.11, 0.50, 0.10, 0.10, 0.10];
        let (settled, thumb) = is_settled(&errors, 0, 0.05);
        assert!(!settled);
        assert_eq!(thumb, 3, "steady region should start just past the spike");
    }

    #[test]
    fn zero_initial_error_never_settles() {
        let response = simulate(
            &SettleConfig::default(),
            |process| process.set_setpoint(1.0),
            Some(1.0),
        );
        assert!(!response.settled());
        assert_relative_eq!(response.initial_position, 1.0);
    }

    #[test]
    fn unpowered_arm_diverges() {
        // No gains at all: gravity pulls the arm away from the setpoint and
        // the error immediately exceeds its starting magnitude.
        let response = simulate(
            &SettleConfig::default(),
            |process| process.set_cof(0.0),
            Some(-0.8),
        );
        assert!(!response.settled());
        assert!(response.final_time < 1.0, "gave up only after {} s", response.final_time);
    }

    #[test]
    fn gravity_parked_response_settles_without_overshoot() {
        // Heavy arm under p-only control: it parks where the saturated
        // drive balances gravity, well short of the setpoint, and stays
        // there. Steady, but with a large steady-state error and no
        // crossing.
        let response = simulate(
            &SettleConfig::default(),
            |process| {
                process.set_p(gain_deg_to_rad(0.05));
                process.set_mass(30.0);
                process.set_cof(0.6);
            },
            Some(-FRAC_PI_2),
        );
        assert!(response.settled(), "expected the parked arm to count as settled");

        let metrics = response.metrics.unwrap();
        assert_eq!(metrics.overshoot, 0.0);
        assert!(metrics.settling_time < 25.0, "settling_time {}", metrics.settling_time);
        assert!(
            metrics.steady_state_error > 0.5 && metrics.steady_state_error < 0.95,
            "steady_state_error {}",
            metrics.steady_state_error
        );
    }

    #[test]
    fn damped_response_crosses_and_settles() {
        // Light arm with p and d, launched from below the hanging point:
        // it crosses the setpoint, rings down, and holds near zero error.
        let response = simulate(
            &SettleConfig::default(),
            |process| {
                process.set_p(gain_deg_to_rad(0.02));
                process.set_d(gain_deg_to_rad(0.001));
                process.set_mass(4.0);
                process.set_cof(0.1);
            },
            Some(-2.0),
        );
        assert!(response.settled());

        let metrics = response.metrics.unwrap();
        assert!(
            metrics.overshoot > 0.01 && metrics.overshoot < 0.8,
            "overshoot {}",
            metrics.overshoot
        );
        assert!(
            metrics.steady_state_error < 0.3,
            "steady_state_error {}",
            metrics.steady_state_error
        );
        assert!(metrics.settling_time < 10.0, "settling_time {}", metrics.settling_time);
    }

    #[test]
    fn scan_window_follows_the_config() {
        // A short window and a fine tick let the same parked response
        // resolve in a fraction of the default analysis time.
        let config = SettleConfig {
            dt: 0.01,
            window: 1.0,
            window_factor: 1.0,
            max_time: 30.0,
            ..SettleConfig::default()
        };
        let response = simulate(
            &config,
            |process| {
                process.set_p(gain_deg_to_rad(0.05));
                process.set_mass(30.0);
                process.set_cof(0.6);
            },
            Some(-FRAC_PI_2),
        );
        assert!(response.settled());
        assert!(response.final_time < 10.0, "final_time {}", response.final_time);
        assert!(response.metrics.unwrap().settling_time < 8.0);
    }

    #[test]
    fn random_initial_position_stays_in_range() {
        let response = simulate(&SettleConfig::default(), |_| {}, None);
        assert!(
            response.initial_position >= -PI && response.initial_position < PI,
            "initial position {}",
            response.initial_position
        );
        assert!(response.initial_position_deg().abs() <= 180.0);
    }
}
