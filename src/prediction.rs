//! Constant-velocity obstacle prediction
//!
//! Each detected obstacle is propagated in a straight line along its
//! current heading for the duration of the planning horizon, one sample
//! per tick.

use crate::common::types::Obstacle;

/// Predicted obstacle trajectory, one sample per tick
#[derive(Debug, Clone, Default)]
pub struct ObstaclePath {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
    pub v: Vec<f64>,
}

impl ObstaclePath {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Forward-simulate every obstacle over `[0, max_t]` at `tick_t` resolution.
///
/// Yaw comes from the orientation quaternion (roll and pitch discarded),
/// speed from the magnitude of the velocity vector.
pub fn predict_trajectories(obstacles: &[Obstacle], max_t: f64, tick_t: f64) -> Vec<ObstaclePath> {
    let steps = (max_t / tick_t) as usize;
    let mut paths = Vec::with_capacity(obstacles.len());

    for obstacle in obstacles {
        let yaw = obstacle.yaw();
        let v = obstacle.speed();

        let mut path = ObstaclePath::default();
        path.x.push(obstacle.x);
        path.y.push(obstacle.y);
        path.yaw.push(yaw);
        path.v.push(v);

        for i in 0..steps {
            path.x.push(path.x[i] + v * tick_t * yaw.cos());
            path.y.push(path.y[i] + v * tick_t * yaw.sin());
            path.yaw.push(yaw);
            path.v.push(v);
        }

        paths.push(path);
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_static_obstacle_stays_put() {
        let ob = Obstacle::static_at(15.0, 0.0, 0.0, 4.0, 2.0);
        let paths = predict_trajectories(&[ob], 4.0, 0.1);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 41);
        for (&x, &y) in paths[0].x.iter().zip(paths[0].y.iter()) {
            assert!((x - 15.0).abs() < 1e-10);
            assert!(y.abs() < 1e-10);
        }
    }

    #[test]
    fn test_moving_obstacle_advances_along_heading() {
        let yaw = std::f64::consts::FRAC_PI_2; // heading +y
        let ob = Obstacle::new(
            0.0,
            0.0,
            UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
            Vector3::new(0.0, 2.0, 0.0),
            4.0,
            2.0,
        );
        let paths = predict_trajectories(&[ob], 1.0, 0.5);
        let path = &paths[0];
        assert_eq!(path.len(), 3);
        assert!(path.x.iter().all(|&x| x.abs() < 1e-9));
        assert!((path.y[1] - 1.0).abs() < 1e-9);
        assert!((path.y[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_uses_full_velocity_magnitude() {
        let ob = Obstacle::new(
            0.0,
            0.0,
            UnitQuaternion::identity(),
            Vector3::new(3.0, 0.0, 4.0),
            4.0,
            2.0,
        );
        let paths = predict_trajectories(&[ob], 1.0, 1.0);
        // speed 5 along yaw 0
        assert!((paths[0].x[1] - 5.0).abs() < 1e-9);
    }
}
