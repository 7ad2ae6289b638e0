//! Natural cubic splines over 1D samples and 2D arc-length parameterized curves
//!
//! The 2D spline maps a cumulative arc-length parameter `s` to a smooth
//! curve with first and second derivatives, which is what the planner
//! needs for Frenet to Cartesian conversion.

use crate::common::error::{PlannerError, PlannerResult};
use crate::common::types::Lane;

/// Piecewise natural cubic spline over strictly increasing knots
#[derive(Debug, Clone)]
pub struct CubicSpline1D {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline1D {
    /// Build a natural spline through `(x_i, y_i)`.
    ///
    /// Requires at least 3 knots with strictly increasing `x`.
    pub fn new(x: &[f64], y: &[f64]) -> PlannerResult<Self> {
        let n = x.len();
        if n != y.len() {
            return Err(PlannerError::InvalidInput(
                "spline knots x and y must have the same length".to_string(),
            ));
        }
        if n < 3 {
            return Err(PlannerError::InvalidInput(format!(
                "spline needs at least 3 knots, got {}",
                n
            )));
        }

        let mut h = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let hi = x[i + 1] - x[i];
            if hi <= 0.0 {
                return Err(PlannerError::InvalidInput(format!(
                    "spline knots must be strictly increasing (x[{}] = {}, x[{}] = {})",
                    i,
                    x[i],
                    i + 1,
                    x[i + 1]
                )));
            }
            h.push(hi);
        }

        let a = y.to_vec();
        let c = Self::solve_second_derivatives(x, &a, &h);

        let mut b = Vec::with_capacity(n - 1);
        let mut d = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }

        Ok(CubicSpline1D { x: x.to_vec(), a, b, c, d })
    }

    /// Thomas-algorithm sweep for the natural-spline tridiagonal system.
    ///
    /// Natural boundary: `c_0 = c_{n-1} = 0`.
    fn solve_second_derivatives(x: &[f64], a: &[f64], h: &[f64]) -> Vec<f64> {
        let n = x.len();

        let mut alpha = vec![0.0; n];
        for i in 1..n - 1 {
            alpha[i] = 3.0 * (a[i + 1] - a[i]) / h[i] - 3.0 * (a[i] - a[i - 1]) / h[i - 1];
        }

        let mut l = vec![1.0; n];
        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n];
        for i in 1..n - 1 {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        let mut c = vec![0.0; n];
        for j in (0..n - 1).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
        }
        c
    }

    /// Spline value at `t`; 0 outside the knot range
    pub fn calc(&self, t: f64) -> f64 {
        if self.out_of_range(t) {
            return 0.0;
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    /// First derivative at `t`; 0 outside the knot range
    pub fn calc_d(&self, t: f64) -> f64 {
        if self.out_of_range(t) {
            return 0.0;
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    /// Second derivative at `t`; 0 outside the knot range
    pub fn calc_dd(&self, t: f64) -> f64 {
        if self.out_of_range(t) {
            return 0.0;
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }

    fn out_of_range(&self, t: f64) -> bool {
        t < self.x[0] || t > self.x[self.x.len() - 1]
    }

    /// Binary search for the segment containing `t`
    fn search_index(&self, t: f64) -> usize {
        let mut lo = 0;
        let mut hi = self.x.len() - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.x[mid] <= t {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

/// 2D reference curve as a pair of splines over cumulative arc length
#[derive(Debug, Clone)]
pub struct CubicSpline2D {
    /// Cumulative arc length at each input waypoint
    pub s: Vec<f64>,
    sx: CubicSpline1D,
    sy: CubicSpline1D,
}

impl CubicSpline2D {
    pub fn new(lane: &Lane) -> PlannerResult<Self> {
        let x = lane.x_coords();
        let y = lane.y_coords();
        let s = Self::calc_s(&x, &y)?;
        let sx = CubicSpline1D::new(&s, &x)?;
        let sy = CubicSpline1D::new(&s, &y)?;
        Ok(CubicSpline2D { s, sx, sy })
    }

    /// Cumulative Euclidean arc length along the waypoints.
    ///
    /// Duplicate consecutive waypoints produce a zero-length segment and
    /// are rejected, which keeps `s` strictly increasing.
    fn calc_s(x: &[f64], y: &[f64]) -> PlannerResult<Vec<f64>> {
        if x.len() < 3 {
            return Err(PlannerError::InvalidInput(format!(
                "reference lane needs at least 3 waypoints, got {}",
                x.len()
            )));
        }

        let mut s = Vec::with_capacity(x.len());
        s.push(0.0);
        for i in 0..x.len() - 1 {
            let ds = ((x[i + 1] - x[i]).powi(2) + (y[i + 1] - y[i]).powi(2)).sqrt();
            if ds <= 0.0 {
                return Err(PlannerError::InvalidInput(format!(
                    "duplicate waypoint at index {}",
                    i + 1
                )));
            }
            s.push(s[i] + ds);
        }
        Ok(s)
    }

    /// Total arc length of the reference curve
    pub fn s_max(&self) -> f64 {
        *self.s.last().unwrap_or(&0.0)
    }

    pub fn calc_position(&self, s: f64) -> (f64, f64) {
        (self.sx.calc(s), self.sy.calc(s))
    }

    pub fn calc_yaw(&self, s: f64) -> f64 {
        let dx = self.sx.calc_d(s);
        let dy = self.sy.calc_d(s);
        dy.atan2(dx)
    }

    /// Signed curvature of the reference curve at `s`
    pub fn calc_curvature(&self, s: f64) -> f64 {
        let dx = self.sx.calc_d(s);
        let ddx = self.sx.calc_dd(s);
        let dy = self.sy.calc_d(s);
        let ddy = self.sy.calc_dd(s);
        (ddy * dx - ddx * dy) / (dx.powi(2) + dy.powi(2)).powf(1.5)
    }
}
