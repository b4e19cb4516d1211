//! Small numeric helpers shared by the controller and the arm model.

use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// Angle wrapping
// ---------------------------------------------------------------------------

/// Wrap `value` into the half-open range `(minimum, maximum]`.
///
/// Both boundary inputs map onto `maximum`: with a `(-PI, PI)` domain,
/// `PI` and `-PI` both come back as `PI`. Used for joint angles and for
/// continuous-input error terms.
pub fn input_modulus(value: f64, minimum: f64, maximum: f64) -> f64 {
    let modulus = maximum - minimum;
    let mut value = value;

    // One truncating pass folds values past each boundary.
    value -= ((value - minimum) / modulus).trunc() * modulus;
    value -= ((value - maximum) / modulus).trunc() * modulus;
    value
}

/// Wrap an angle in radians into `(-PI, PI]`.
pub fn wrap_angle(angle: f64) -> f64 {
    input_modulus(angle, -PI, PI)
}

// ---------------------------------------------------------------------------
// Output shaping
// ---------------------------------------------------------------------------

/// Zero out inputs inside the deadband and rescale the rest so the output
/// stays continuous at the deadband edge. `deadband` is a fraction of full
/// scale, in `[0, 1)`.
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() > deadband {
        if value > 0.0 {
            (value - deadband) / (1.0 - deadband)
        } else {
            (value + deadband) / (1.0 - deadband)
        }
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Gain unit conversion
// ---------------------------------------------------------------------------

/// Convert a gain keyed to degree-valued errors into one keyed to radians.
///
/// Gains convert inversely to angles: a radian of error is ~57.3 degrees of
/// error, so the per-radian gain is larger by the same factor and the
/// resulting output is identical.
pub fn gain_deg_to_rad(gain_per_degree: f64) -> f64 {
    gain_per_degree * (180.0 / PI)
}

/// Convert a gain keyed to radian-valued errors into one keyed to degrees.
pub fn gain_rad_to_deg(gain_per_radian: f64) -> f64 {
    gain_per_radian * (PI / 180.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
