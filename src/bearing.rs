//! Coulomb friction at the joint's pivot bearing.

use crate::arm::G;

// ---------------------------------------------------------------------------
// Bearing
// ---------------------------------------------------------------------------

/// Friction torque source at the pivot.
///
/// Produces only a magnitude; the arm model orients it against the current
/// motion and caps it so friction can never flip the sign of the net torque.
#[derive(Debug, Clone, Copy)]
pub struct Bearing {
    cof: f64,    // coefficient of friction, >= 0
    radius: f64, // bearing contact radius, m
}

impl Bearing {
    pub fn new(cof: f64, radius: f64) -> Self {
        Self { cof, radius }
    }

    /// Friction torque magnitude (N·m) for a supported mass (kg).
    pub fn friction(&self, mass: f64) -> f64 {
        self.cof * self.radius * mass * G
    }

    pub fn set_cof(&mut self, cof: f64) {
        self.cof = cof;
    }

    pub fn cof(&self) -> f64 {
        self.cof
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn friction_scales_with_load_and_geometry() {
        let bearing = Bearing::new(0.4, 0.05);
        assert_relative_eq!(bearing.friction(18.0), 0.4 * 0.05 * 18.0 * G, epsilon = 1e-12);
        assert_eq!(bearing.friction(0.0), 0.0);
    }

    #[test]
    fn cof_is_adjustable_live() {
        let mut bearing = Bearing::new(0.4, 0.05);
        bearing.set_cof(0.8);
        assert_relative_eq!(bearing.friction(10.0), 0.8 * 0.05 * 10.0 * G, epsilon = 1e-12);
    }
}
