//! PID controller with wraparound error handling and a zone-gated integrator.

use crate::math_util::input_modulus;

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Positional PID with optional continuous (wrapping) input.
///
/// The derivative term needs a previous error sample. After construction or
/// [`Pid::reset`] the next [`Pid::calculate`] must be a seed call with
/// `dt = None`, which records the error without differentiating; calling
/// with a real `dt` first is a sequencing bug and panics.
///
/// The integrator only accumulates while the error magnitude is inside
/// `izone` and the i gain is on; any tick outside the zone clears it.
/// `izone = 0` keeps the integrator off entirely.
#[derive(Debug, Clone)]
pub struct Pid {
    p: f64,
    i: f64,
    d: f64,
    izone: f64,    // rad
    setpoint: f64, // rad
    last_error: Option<f64>,
    error_accumulator: f64,   // rad·s
    error_bound: Option<f64>, // half-width of the continuous input domain
}

/// Per-term breakdown of one [`Pid::calculate`] call.
#[derive(Debug, Clone, Copy)]
pub struct PidOutput {
    pub output: f64,
    pub p_output: f64,
    pub i_output: f64,
    pub d_output: f64,
    pub err: f64,     // rad
    pub d_err: f64,   // rad/s
    pub err_acc: f64, // rad·s
}

impl Pid {
    /// All gains zero, setpoint 0, non-continuous input.
    pub fn new() -> Self {
        Self {
            p: 0.0,
            i: 0.0,
            d: 0.0,
            izone: 0.0,
            setpoint: 0.0,
            last_error: None,
            error_accumulator: 0.0,
            error_bound: None,
        }
    }

    /// Treat measurements as cyclic over `[minimum, maximum]`: errors wrap
    /// through whichever side is nearer.
    pub fn enable_continuous_input(&mut self, minimum: f64, maximum: f64) {
        self.error_bound = Some((maximum - minimum) / 2.0);
    }

    fn difference(&self, raw: f64) -> f64 {
        match self.error_bound {
            Some(bound) => input_modulus(raw, -bound, bound),
            None => raw,
        }
    }

    /// Error against `measurement` under the controller's wrap settings.
    pub fn error(&self, measurement: f64) -> f64 {
        self.difference(self.setpoint - measurement)
    }

    /// Run one controller cycle against `measurement`.
    ///
    /// `dt = None` is a seed call: it records the error for the next
    /// derivative and clears the integrator, reporting a zero d term. The
    /// output is not clamped here; the caller owns saturation.
    pub fn calculate(&mut self, measurement: f64, dt: Option<f64>) -> PidOutput {
        let err = self.difference(self.setpoint - measurement);
        let p_output = self.p * err;

        let d_err = match (dt, self.last_error) {
            (Some(dt), Some(last)) => self.difference(err - last) / dt,
            (Some(_), None) => {
                panic!("calculate with a real dt before the derivative was seeded; call calculate(measurement, None) first")
            }
            (None, _) => 0.0,
        };
        self.last_error = Some(err);
        let d_output = self.d * d_err;

        match dt {
            Some(dt) if err.abs() < self.izone && self.i > 0.0 => {
                self.error_accumulator += err * dt;
            }
            _ => self.error_accumulator = 0.0,
        }
        let i_output = self.i * self.error_accumulator;

        PidOutput {
            output: p_output + i_output + d_output,
            p_output,
            i_output,
            d_output,
            err,
            d_err,
            err_acc: self.error_accumulator,
        }
    }

    /// Change the target without the jump registering as motion.
    ///
    /// The measurement implied by the previous error is carried over, so a
    /// stationary arm produces a zero derivative on the next cycle even
    /// though its error just changed.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        if let Some(last) = self.last_error {
            let measurement = self.setpoint - last;
            self.setpoint = setpoint;
            self.last_error = Some(self.difference(setpoint - measurement));
        } else {
            self.setpoint = setpoint;
        }
    }

    /// Drop the derivative seed, e.g. after moving the arm by hand. Gains,
    /// setpoint, and continuous-input bounds survive; the next
    /// [`Pid::calculate`] must seed again.
    pub fn reset(&mut self) {
        self.last_error = None;
    }

    pub fn set_p(&mut self, p: f64) {
        self.p = p;
    }

    pub fn set_i(&mut self, i: f64) {
        self.i = i;
    }

    pub fn set_d(&mut self, d: f64) {
        self.d = d;
    }

    pub fn set_izone(&mut self, izone: f64) {
        self.izone = izone;
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn i(&self) -> f64 {
        self.i
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn izone(&self) -> f64 {
        self.izone
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }
}

impl Default for Pid {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
