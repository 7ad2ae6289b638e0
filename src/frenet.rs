//! Frenet-frame states and candidate trajectories

use std::f64::consts::{FRAC_PI_2, PI};

use crate::spline::CubicSpline2D;

/// Kinematic state in curvilinear coordinates.
///
/// `s` is arc length along the reference curve, `d` the signed lateral
/// offset (left positive). `t` is the time horizon and is only meaningful
/// for end states.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrenetState {
    pub s: f64,
    pub s_d: f64,
    pub s_dd: f64,
    pub d: f64,
    pub d_d: f64,
    pub d_dd: f64,
    pub t: f64,
}

impl FrenetState {
    pub fn new(s: f64, s_d: f64, s_dd: f64, d: f64, d_d: f64, d_dd: f64, t: f64) -> Self {
        Self { s, s_d, s_dd, d, d_d, d_dd, t }
    }
}

/// Candidate trajectory sampled at fixed time ticks.
///
/// Frenet samples are filled at generation time; the Cartesian extension
/// (`x, y, yaw, ds, c`) is filled by [`FrenetTrajectory::convert_to_global`]
/// during validation.
#[derive(Debug, Clone, Default)]
pub struct FrenetTrajectory {
    pub lane_id: i32,
    pub end_state: FrenetState,

    // Frenet samples, one per tick
    pub t: Vec<f64>,
    pub s: Vec<f64>,
    pub s_d: Vec<f64>,
    pub s_dd: Vec<f64>,
    pub s_ddd: Vec<f64>,
    pub d: Vec<f64>,
    pub d_d: Vec<f64>,
    pub d_dd: Vec<f64>,
    pub d_ddd: Vec<f64>,

    // Cartesian extension
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
    pub ds: Vec<f64>,
    pub c: Vec<f64>,

    // Costs
    pub fix_cost: f64,
    pub hur_cost: f64,
    pub dyn_cost: f64,
    pub final_cost: f64,

    // Validation flags
    pub constraint_passed: bool,
    pub collision_passed: bool,
}

impl FrenetTrajectory {
    pub fn new(lane_id: i32, end_state: FrenetState, fix_cost: f64, hur_cost: f64) -> Self {
        FrenetTrajectory {
            lane_id,
            end_state,
            fix_cost,
            hur_cost,
            ..Default::default()
        }
    }

    /// Number of Frenet samples
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Lift the Frenet samples into the global frame using the reference spline.
    ///
    /// The trajectory is truncated at the first sample whose arc length
    /// leaves the reference curve or whose position is non-finite. Yaw and
    /// segment lengths come from forward differences, with the last value
    /// replicated to keep the arrays aligned.
    pub fn convert_to_global(&mut self, spline: &CubicSpline2D) {
        let s_max = spline.s_max();
        for j in 0..self.s.len() {
            if self.s[j] > s_max {
                break;
            }
            let (rx, ry) = spline.calc_position(self.s[j]);
            let ryaw = spline.calc_yaw(self.s[j]);
            let di = self.d[j];
            let gx = rx + di * (ryaw + FRAC_PI_2).cos();
            let gy = ry + di * (ryaw + FRAC_PI_2).sin();
            if !gx.is_finite() || !gy.is_finite() {
                break;
            }
            self.x.push(gx);
            self.y.push(gy);
        }

        for j in 0..self.x.len().saturating_sub(1) {
            let dx = self.x[j + 1] - self.x[j];
            let dy = self.y[j + 1] - self.y[j];
            self.yaw.push(dy.atan2(dx));
            self.ds.push((dx * dx + dy * dy).sqrt());
        }
        if let Some(&last) = self.yaw.last() {
            self.yaw.push(last);
        }
        if let Some(&last) = self.ds.last() {
            self.ds.push(last);
        }

        for j in 0..self.yaw.len().saturating_sub(1) {
            let yaw_diff = normalize_angle(self.yaw[j + 1] - self.yaw[j]);
            self.c.push(yaw_diff / self.ds[j]);
        }
    }
}

/// Map any angle into `(-pi, pi]`
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Lane;

    fn straight_spline() -> CubicSpline2D {
        let lane = Lane::from_xy(
            &[0.0, 10.0, 20.0, 30.0, 40.0],
            &[0.0, 0.0, 0.0, 0.0, 0.0],
        );
        CubicSpline2D::new(&lane).unwrap()
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(0.0)).abs() < 1e-12);
        assert!((normalize_angle(PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-2.5 * PI) - (-0.5 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_convert_on_centerline_matches_reference() {
        // d = 0 everywhere: the global trajectory reproduces the reference
        let spline = straight_spline();
        let mut traj = FrenetTrajectory::default();
        for i in 0..10 {
            traj.s.push(i as f64 * 2.0);
            traj.d.push(0.0);
        }
        traj.convert_to_global(&spline);
        assert_eq!(traj.x.len(), 10);
        for (i, (&x, &y)) in traj.x.iter().zip(traj.y.iter()).enumerate() {
            assert!((x - i as f64 * 2.0).abs() < 1e-6);
            assert!(y.abs() < 1e-6);
        }
        assert_eq!(traj.yaw.len(), traj.x.len());
        assert_eq!(traj.ds.len(), traj.x.len());
        assert_eq!(traj.c.len(), traj.x.len() - 1);
    }

    #[test]
    fn test_convert_lateral_offset_is_left_positive() {
        let spline = straight_spline();
        let mut traj = FrenetTrajectory::default();
        for i in 0..5 {
            traj.s.push(i as f64 * 2.0);
            traj.d.push(1.5);
        }
        traj.convert_to_global(&spline);
        // reference heads along +x, so left is +y
        for &y in &traj.y {
            assert!((y - 1.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_convert_truncates_beyond_reference() {
        let spline = straight_spline();
        let mut traj = FrenetTrajectory::default();
        for i in 0..10 {
            traj.s.push(i as f64 * 10.0); // 0..90, reference ends at 40
            traj.d.push(0.0);
        }
        traj.convert_to_global(&spline);
        assert_eq!(traj.x.len(), 5);
    }
}
