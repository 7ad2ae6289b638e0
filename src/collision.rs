//! SAT-based polygon collision checking
//!
//! Two convex polygons overlap iff no edge normal of either polygon
//! separates their projections. Touching polygons count as overlapping
//! (closed-set convention).

use nalgebra::Vector2;

use crate::common::types::{Obstacle, Point2D, REAR_AXLE_TO_CENTER};
use crate::frenet::FrenetTrajectory;
use crate::prediction::ObstaclePath;

/// Convex polygon given by its vertices in order
#[derive(Debug, Clone)]
pub struct Polygon {
    pub vertices: Vec<Point2D>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point2D>) -> Self {
        Self { vertices }
    }
}

/// Axis-aligned rectangle rotated by `yaw` around its center, inflated by
/// the given margins on each side.
pub fn construct_rectangle(
    center_x: f64,
    center_y: f64,
    yaw: f64,
    length: f64,
    width: f64,
    margin_lon: f64,
    margin_lat: f64,
) -> Polygon {
    let half_l = length / 2.0 + margin_lon;
    let half_w = width / 2.0 + margin_lat;
    let (sin_yaw, cos_yaw) = yaw.sin_cos();

    let corners = [
        (half_l, half_w),
        (-half_l, half_w),
        (-half_l, -half_w),
        (half_l, -half_w),
    ];

    let vertices = corners
        .iter()
        .map(|&(lx, ly)| {
            Point2D::new(
                center_x + lx * cos_yaw - ly * sin_yaw,
                center_y + lx * sin_yaw + ly * cos_yaw,
            )
        })
        .collect();

    Polygon::new(vertices)
}

/// True when the two convex polygons overlap (touching counts)
pub fn check_collision(a: &Polygon, b: &Polygon) -> bool {
    !(separated_on_axes_of(a, b) || separated_on_axes_of(b, a))
}

/// Check the edge normals of `a` for a separating axis
fn separated_on_axes_of(a: &Polygon, b: &Polygon) -> bool {
    let n = a.vertices.len();
    for i in 0..n {
        let p1 = a.vertices[i];
        let p2 = a.vertices[(i + 1) % n];
        let axis = Vector2::new(p2.y - p1.y, p1.x - p2.x);

        let (min_a, max_a) = project(a, &axis);
        let (min_b, max_b) = project(b, &axis);
        if max_a < min_b || max_b < min_a {
            return true;
        }
    }
    false
}

/// Projection interval of a polygon onto an axis
fn project(polygon: &Polygon, axis: &Vector2<f64>) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for v in &polygon.vertices {
        let p = v.x * axis.x + v.y * axis.y;
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

/// Check an ego trajectory against every predicted obstacle path.
///
/// The ego rectangle is centered ahead of the rear axle by the vehicle
/// geometry offset; obstacle rectangles are inflated by the safety
/// margins. Returns whether the trajectory is collision free along with
/// the number of polygon pair checks performed.
pub fn check_trajectory_collision(
    traj: &FrenetTrajectory,
    obstacle_paths: &[ObstaclePath],
    obstacles: &[Obstacle],
    vehicle_length: f64,
    vehicle_width: f64,
    margin_lon: f64,
    margin_lat: f64,
) -> (bool, usize) {
    let mut num_checks = 0;

    for (obstacle, path) in obstacles.iter().zip(obstacle_paths.iter()) {
        let num_steps = traj.x.len().min(traj.yaw.len()).min(path.len());
        for j in 0..num_steps {
            num_checks += 1;

            let center_x = traj.x[j] + REAR_AXLE_TO_CENTER * traj.yaw[j].cos();
            let center_y = traj.y[j] + REAR_AXLE_TO_CENTER * traj.yaw[j].sin();
            let ego_rect = construct_rectangle(
                center_x,
                center_y,
                traj.yaw[j],
                vehicle_length,
                vehicle_width,
                0.0,
                0.0,
            );
            let obstacle_rect = construct_rectangle(
                path.x[j],
                path.y[j],
                path.yaw[j],
                obstacle.length,
                obstacle.width,
                margin_lon,
                margin_lat,
            );

            if check_collision(&ego_rect, &obstacle_rect) {
                return (false, num_checks);
            }
        }
    }

    (true, num_checks)
}
