//! Common types used throughout frenet_planner

use nalgebra::{UnitQuaternion, Vector2, Vector3};

/// Distance from the rear axle to the geometric center of the ego vehicle [m]
pub const REAR_AXLE_TO_CENTER: f64 = 1.25;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

/// Reference centerline as an ordered sequence of waypoints
#[derive(Debug, Clone)]
pub struct Lane {
    pub points: Vec<Point2D>,
}

impl Lane {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        assert_eq!(x.len(), y.len());
        let points = x.iter().zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

impl Default for Lane {
    fn default() -> Self {
        Self::new()
    }
}

/// Detected obstacle with pose, orientation, velocity and bounding box
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// Position of the obstacle center in the global frame [m]
    pub x: f64,
    pub y: f64,
    /// Orientation of the obstacle (roll and pitch are discarded)
    pub orientation: UnitQuaternion<f64>,
    /// Linear velocity vector [m/s]
    pub velocity: Vector3<f64>,
    /// Bounding box length [m]
    pub length: f64,
    /// Bounding box width [m]
    pub width: f64,
}

impl Obstacle {
    pub fn new(
        x: f64,
        y: f64,
        orientation: UnitQuaternion<f64>,
        velocity: Vector3<f64>,
        length: f64,
        width: f64,
    ) -> Self {
        Self { x, y, orientation, velocity, length, width }
    }

    /// Static obstacle with a yaw-only orientation
    pub fn static_at(x: f64, y: f64, yaw: f64, length: f64, width: f64) -> Self {
        Self {
            x,
            y,
            orientation: UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
            velocity: Vector3::zeros(),
            length,
            width,
        }
    }

    /// Heading extracted from the orientation quaternion
    pub fn yaw(&self) -> f64 {
        self.orientation.euler_angles().2
    }

    /// Speed as the magnitude of the velocity vector
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// Densely sampled reference curve in the global frame
#[derive(Debug, Clone, Default)]
pub struct ReferencePath {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
    pub curvature: Vec<f64>,
}

impl ReferencePath {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_lane_from_xy() {
        let lane = Lane::from_xy(&[0.0, 1.0, 2.0], &[0.0, 0.5, 1.0]);
        assert_eq!(lane.len(), 3);
        assert_eq!(lane.x_coords(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_obstacle_yaw_from_quaternion() {
        let ob = Obstacle::static_at(0.0, 0.0, 0.5, 4.0, 2.0);
        assert!((ob.yaw() - 0.5).abs() < 1e-10);
        assert!(ob.speed().abs() < 1e-10);
    }

    #[test]
    fn test_obstacle_speed_magnitude() {
        let ob = Obstacle::new(
            0.0,
            0.0,
            UnitQuaternion::identity(),
            Vector3::new(3.0, 4.0, 0.0),
            4.0,
            2.0,
        );
        assert!((ob.speed() - 5.0).abs() < 1e-10);
    }
}
