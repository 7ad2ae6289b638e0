//! Quartic and quintic polynomial trajectory primitives
//!
//! Quintic polynomials interpolate between a full start and end kinematic
//! state (position, velocity, acceleration). Quartic polynomials leave the
//! end position free and are used for velocity keeping along the
//! longitudinal axis.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

/// Quintic polynomial matching position, velocity and acceleration at both ends
#[derive(Debug, Clone)]
pub struct QuinticPolynomial {
    a0: f64,
    a1: f64,
    a2: f64,
    a3: f64,
    a4: f64,
    a5: f64,
}

impl QuinticPolynomial {
    /// Solve the boundary-value problem over `[0, time]`.
    ///
    /// `xs, vxs, axs` are the start position/velocity/acceleration and
    /// `xe, vxe, axe` the end conditions. `time` must be positive.
    pub fn new(xs: f64, vxs: f64, axs: f64, xe: f64, vxe: f64, axe: f64, time: f64) -> Self {
        let a0 = xs;
        let a1 = vxs;
        let a2 = axs / 2.0;

        let t2 = time * time;
        let t3 = t2 * time;
        let t4 = t3 * time;
        let t5 = t4 * time;

        // Solve for a3, a4, a5
        let a = Matrix3::new(
            t3, t4, t5,
            3.0 * t2, 4.0 * t3, 5.0 * t4,
            6.0 * time, 12.0 * t2, 20.0 * t3,
        );

        let b = Vector3::new(
            xe - a0 - a1 * time - a2 * t2,
            vxe - a1 - 2.0 * a2 * time,
            axe - 2.0 * a2,
        );

        let x = a.try_inverse().map(|inv| inv * b).unwrap_or(Vector3::zeros());

        QuinticPolynomial {
            a0,
            a1,
            a2,
            a3: x[0],
            a4: x[1],
            a5: x[2],
        }
    }

    pub fn calc_point(&self, t: f64) -> f64 {
        self.a0
            + self.a1 * t
            + self.a2 * t.powi(2)
            + self.a3 * t.powi(3)
            + self.a4 * t.powi(4)
            + self.a5 * t.powi(5)
    }

    pub fn calc_first_derivative(&self, t: f64) -> f64 {
        self.a1
            + 2.0 * self.a2 * t
            + 3.0 * self.a3 * t.powi(2)
            + 4.0 * self.a4 * t.powi(3)
            + 5.0 * self.a5 * t.powi(4)
    }

    pub fn calc_second_derivative(&self, t: f64) -> f64 {
        2.0 * self.a2 + 6.0 * self.a3 * t + 12.0 * self.a4 * t.powi(2) + 20.0 * self.a5 * t.powi(3)
    }

    pub fn calc_third_derivative(&self, t: f64) -> f64 {
        6.0 * self.a3 + 24.0 * self.a4 * t + 60.0 * self.a5 * t.powi(2)
    }
}

/// Quartic polynomial for velocity keeping (end position free)
#[derive(Debug, Clone)]
pub struct QuarticPolynomial {
    a0: f64,
    a1: f64,
    a2: f64,
    a3: f64,
    a4: f64,
}

impl QuarticPolynomial {
    /// Solve the boundary-value problem over `[0, time]`.
    ///
    /// `xs, vxs, axs` are the start position/velocity/acceleration and
    /// `vxe, axe` the end velocity/acceleration. `time` must be positive.
    pub fn new(xs: f64, vxs: f64, axs: f64, vxe: f64, axe: f64, time: f64) -> Self {
        let a0 = xs;
        let a1 = vxs;
        let a2 = axs / 2.0;

        let t2 = time * time;
        let t3 = t2 * time;

        // Solve for a3, a4
        let a = Matrix2::new(
            3.0 * t2, 4.0 * t3,
            6.0 * time, 12.0 * t2,
        );

        let b = Vector2::new(
            vxe - a1 - 2.0 * a2 * time,
            axe - 2.0 * a2,
        );

        let x = a.try_inverse().map(|inv| inv * b).unwrap_or(Vector2::zeros());

        QuarticPolynomial {
            a0,
            a1,
            a2,
            a3: x[0],
            a4: x[1],
        }
    }

    pub fn calc_point(&self, t: f64) -> f64 {
        self.a0 + self.a1 * t + self.a2 * t.powi(2) + self.a3 * t.powi(3) + self.a4 * t.powi(4)
    }

    pub fn calc_first_derivative(&self, t: f64) -> f64 {
        self.a1 + 2.0 * self.a2 * t + 3.0 * self.a3 * t.powi(2) + 4.0 * self.a4 * t.powi(3)
    }

    pub fn calc_second_derivative(&self, t: f64) -> f64 {
        2.0 * self.a2 + 6.0 * self.a3 * t + 12.0 * self.a4 * t.powi(2)
    }

    pub fn calc_third_derivative(&self, t: f64) -> f64 {
        6.0 * self.a3 + 24.0 * self.a4 * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quintic_boundary_conditions() {
        let time = 3.0;
        let qp = QuinticPolynomial::new(1.0, 0.5, 0.2, 4.0, -0.5, 0.1, time);

        assert!((qp.calc_point(0.0) - 1.0).abs() < 1e-9);
        assert!((qp.calc_first_derivative(0.0) - 0.5).abs() < 1e-9);
        assert!((qp.calc_second_derivative(0.0) - 0.2).abs() < 1e-9);
        assert!((qp.calc_point(time) - 4.0).abs() < 1e-9);
        assert!((qp.calc_first_derivative(time) - (-0.5)).abs() < 1e-9);
        assert!((qp.calc_second_derivative(time) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_quartic_boundary_conditions() {
        let time = 4.0;
        let qp = QuarticPolynomial::new(2.0, 5.0, 0.0, 8.0, 0.0, time);

        assert!((qp.calc_point(0.0) - 2.0).abs() < 1e-9);
        assert!((qp.calc_first_derivative(0.0) - 5.0).abs() < 1e-9);
        assert!(qp.calc_second_derivative(0.0).abs() < 1e-9);
        assert!((qp.calc_first_derivative(time) - 8.0).abs() < 1e-9);
        assert!(qp.calc_second_derivative(time).abs() < 1e-9);
    }

    #[test]
    fn test_quintic_stationary_interpolation() {
        // Same start and end state at rest: the polynomial is constant
        let qp = QuinticPolynomial::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0, 5.0);
        for i in 0..=10 {
            let t = 0.5 * i as f64;
            assert!((qp.calc_point(t) - 2.0).abs() < 1e-9);
            assert!(qp.calc_third_derivative(t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_quartic_constant_speed() {
        // Start and end at the same speed with zero accel: linear motion
        let qp = QuarticPolynomial::new(0.0, 3.0, 0.0, 3.0, 0.0, 2.0);
        assert!((qp.calc_point(2.0) - 6.0).abs() < 1e-9);
        assert!((qp.calc_first_derivative(1.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_derivative_consistency() {
        // Finite-difference check of the analytic derivatives
        let qp = QuinticPolynomial::new(0.0, 1.0, -0.3, 2.0, 0.0, 0.0, 2.0);
        let h = 1e-6;
        let t = 0.8;
        let fd = (qp.calc_point(t + h) - qp.calc_point(t - h)) / (2.0 * h);
        assert!((fd - qp.calc_first_derivative(t)).abs() < 1e-5);
        let fdd = (qp.calc_first_derivative(t + h) - qp.calc_first_derivative(t - h)) / (2.0 * h);
        assert!((fdd - qp.calc_second_derivative(t)).abs() < 1e-5);
    }
}
