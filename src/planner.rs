//! Frenet optimal trajectory planner
//!
//! Composes obstacle prediction, end-state sampling, gradient-descent
//! search and candidate validation into a single planning call. The call
//! returns the cheapest collision-free, dynamically feasible trajectory,
//! or nothing when every candidate fails.

use std::time::Instant;

use log::{debug, warn};

use crate::collision::check_trajectory_collision;
use crate::common::error::{PlannerError, PlannerResult};
use crate::common::types::{Lane, Obstacle, ReferencePath};
use crate::frenet::{FrenetState, FrenetTrajectory};
use crate::prediction::{predict_trajectories, ObstaclePath};
use crate::sampling::sample_end_states;
use crate::search::{descend, CandidateQueue};
use crate::spline::CubicSpline2D;
use crate::telemetry::{IterationRecord, TelemetryObserver, NUM_STAGES};

/// Planner configuration: kinematic limits, vehicle geometry, sampling
/// grid shape and cost weights
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum speed [m/s]
    pub max_speed: f64,
    /// Maximum acceleration [m/s^2]
    pub max_accel: f64,
    /// Maximum deceleration [m/s^2], negative
    pub max_decel: f64,
    /// Maximum curvature [1/m]
    pub max_curvature: f64,
    /// Ego vehicle length [m]
    pub vehicle_length: f64,
    /// Ego vehicle width [m]
    pub vehicle_width: f64,
    /// Preferred lateral offset from the centerline [m]
    pub center_offset: f64,
    /// Number of lateral offset samples
    pub num_width: usize,
    /// Number of end speed samples
    pub num_speed: usize,
    /// Number of planning horizon samples
    pub num_t: usize,
    /// Lowest sampled end speed [m/s]
    pub lowest_speed: f64,
    /// Highest sampled end speed [m/s]
    pub highest_speed: f64,
    /// Shortest planning horizon [s]
    pub min_t: f64,
    /// Longest planning horizon [s]
    pub max_t: f64,
    /// Trajectory sampling tick [s]
    pub tick_t: f64,
    /// Longitudinal obstacle inflation [m]
    pub safety_margin_lon: f64,
    /// Lateral obstacle inflation [m]
    pub safety_margin_lat: f64,
    /// Jerk cost weight
    pub k_jerk: f64,
    /// Planning horizon cost weight
    pub k_time: f64,
    /// Speed and lateral offset difference cost weight
    pub k_diff: f64,
    /// Lateral overall cost weight
    pub k_lat: f64,
    /// Longitudinal overall cost weight
    pub k_lon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_speed: 50.0 / 3.6,
            max_accel: 2.0,
            max_decel: -3.0,
            max_curvature: 1.0,
            vehicle_length: 4.5,
            vehicle_width: 1.8,
            center_offset: 0.0,
            num_width: 5,
            num_speed: 5,
            num_t: 3,
            lowest_speed: 20.0 / 3.6,
            highest_speed: 30.0 / 3.6,
            min_t: 4.0,
            max_t: 5.0,
            tick_t: 0.1,
            safety_margin_lon: 0.3,
            safety_margin_lat: 0.2,
            k_jerk: 0.1,
            k_time: 0.1,
            k_diff: 1.0,
            k_lat: 1.0,
            k_lon: 1.0,
        }
    }
}

impl PlannerConfig {
    /// Reject configurations the sampling grid or constraint checker
    /// cannot work with
    pub fn validate(&self) -> PlannerResult<()> {
        if self.num_width < 2 || self.num_speed < 2 || self.num_t < 2 {
            return Err(PlannerError::InvalidConfig(format!(
                "grid sizes must be at least 2, got {}x{}x{}",
                self.num_width, self.num_speed, self.num_t
            )));
        }
        if self.tick_t <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "tick_t must be positive, got {}",
                self.tick_t
            )));
        }
        if self.min_t <= 0.0 || self.max_t < self.min_t {
            return Err(PlannerError::InvalidConfig(format!(
                "invalid horizon range [{}, {}]",
                self.min_t, self.max_t
            )));
        }
        if self.highest_speed < self.lowest_speed {
            return Err(PlannerError::InvalidConfig(format!(
                "invalid end speed range [{}, {}]",
                self.lowest_speed, self.highest_speed
            )));
        }
        if self.max_speed <= 0.0 || self.max_curvature <= 0.0 {
            return Err(PlannerError::InvalidConfig(
                "kinematic limits must be positive".to_string(),
            ));
        }
        if self.max_accel <= 0.0 || self.max_decel >= 0.0 {
            return Err(PlannerError::InvalidConfig(
                "max_accel must be positive and max_decel negative".to_string(),
            ));
        }
        if self.vehicle_length <= 0.0 || self.vehicle_width <= 0.0 {
            return Err(PlannerError::InvalidConfig(
                "vehicle dimensions must be positive".to_string(),
            ));
        }
        if self.safety_margin_lon < 0.0 || self.safety_margin_lat < 0.0 {
            return Err(PlannerError::InvalidConfig(
                "safety margins must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Frenet-frame optimal trajectory planner
pub struct FrenetPlanner {
    config: PlannerConfig,
    observer: Option<Box<dyn TelemetryObserver>>,
}

impl FrenetPlanner {
    pub fn new(config: PlannerConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(Self { config, observer: None })
    }

    pub fn with_defaults() -> Self {
        Self { config: PlannerConfig::default(), observer: None }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Replace the configuration between planning calls
    pub fn update_config(&mut self, config: PlannerConfig) -> PlannerResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Register a telemetry observer; pass statistics collection through
    /// a shared handle to keep reading it from outside
    pub fn set_observer(&mut self, observer: Box<dyn TelemetryObserver>) {
        self.observer = Some(observer);
    }

    /// Build the reference spline and sample it densely into a global
    /// frame path
    pub fn generate_reference_curve(
        &self,
        lane: &Lane,
    ) -> PlannerResult<(ReferencePath, CubicSpline2D)> {
        let spline = CubicSpline2D::new(lane)?;

        let mut ref_path = ReferencePath::default();
        let mut s = 0.0;
        while s < spline.s_max() {
            let (x, y) = spline.calc_position(s);
            ref_path.x.push(x);
            ref_path.y.push(y);
            ref_path.yaw.push(spline.calc_yaw(s));
            ref_path.curvature.push(spline.calc_curvature(s));
            s += 0.1;
        }

        Ok((ref_path, spline))
    }

    /// Run one planning call.
    ///
    /// `left_width` and `right_width` are positive magnitudes of the lane
    /// extent on each side of the centerline. Returns the best safe
    /// trajectory, or `None` when every candidate violates constraints or
    /// collides.
    pub fn plan(
        &mut self,
        lane: &Lane,
        start_state: &FrenetState,
        lane_id: i32,
        left_width: f64,
        right_width: f64,
        current_speed: f64,
        obstacles: &[Obstacle],
        check_collision: bool,
        use_async: bool,
    ) -> PlannerResult<Option<FrenetTrajectory>> {
        if left_width <= 0.0 || right_width <= 0.0 {
            return Err(PlannerError::InvalidInput(format!(
                "lane widths must be positive magnitudes, got left {} right {}",
                left_width, right_width
            )));
        }
        let spline = CubicSpline2D::new(lane)?;

        let mut counts = [0usize; NUM_STAGES];
        let mut stamps = Vec::with_capacity(NUM_STAGES + 1);
        stamps.push(Instant::now());

        let obstacle_paths =
            predict_trajectories(obstacles, self.config.max_t, self.config.tick_t);
        counts[0] = obstacle_paths.len();
        stamps.push(Instant::now());

        // left being positive, right negative in the Frenet frame
        let (mut grid, seed) = sample_end_states(
            &self.config,
            start_state,
            left_width,
            -right_width,
            current_speed,
        );
        counts[1] = grid.len();
        stamps.push(Instant::now());

        let mut queue = CandidateQueue::new();
        let outcome = descend(&mut grid, seed, &self.config, start_state, lane_id, &mut queue);
        counts[2] = outcome.num_generated;
        stamps.push(Instant::now());

        // drain candidates in cost order until one passes
        let mut num_validated = 0;
        let mut num_collision_checks = 0;
        let mut best: Option<FrenetTrajectory> = None;
        while let Some((_, idx)) = queue.pop() {
            let mut traj = match grid.cell_mut(idx).traj.take() {
                Some(traj) => traj,
                None => continue,
            };
            num_validated += 1;

            traj.convert_to_global(&spline);
            if !self.check_constraints(&mut traj) {
                continue;
            }

            let safe = if check_collision {
                self.check_collisions(
                    &mut traj,
                    &obstacle_paths,
                    obstacles,
                    use_async,
                    &mut num_collision_checks,
                )
            } else {
                debug!("collision checking skipped");
                traj.collision_passed = true;
                true
            };

            if safe {
                debug!("best trajectory found at {:?}", idx);
                best = Some(traj);
                break;
            }
        }
        counts[3] = num_validated;
        stamps.push(Instant::now());
        counts[4] = num_collision_checks;
        stamps.push(Instant::now());

        self.report(counts, &stamps);
        Ok(best)
    }

    /// Kinematic feasibility of a converted trajectory: speed, acceleration
    /// and curvature bounds. Trajectories truncated to nothing fail.
    fn check_constraints(&self, traj: &mut FrenetTrajectory) -> bool {
        let mut passed = !traj.c.is_empty();
        for i in 0..traj.c.len() {
            if !traj.x[i].is_finite() || !traj.y[i].is_finite() {
                debug!("constraint: non-finite position at tick {}", i);
                passed = false;
                break;
            } else if traj.s_d[i] > self.config.max_speed {
                debug!("constraint: speed {} over limit", traj.s_d[i]);
                passed = false;
                break;
            } else if traj.s_dd[i] > self.config.max_accel || traj.s_dd[i] < self.config.max_decel {
                debug!("constraint: acceleration {} out of bounds", traj.s_dd[i]);
                passed = false;
                break;
            } else if !(traj.c[i].abs() <= self.config.max_curvature) {
                debug!("constraint: curvature {} over limit", traj.c[i]);
                passed = false;
                break;
            }
        }

        traj.constraint_passed = passed;
        passed
    }

    /// Collision check of one candidate, either inline or on a single
    /// worker task joined before the next candidate is popped
    fn check_collisions(
        &self,
        traj: &mut FrenetTrajectory,
        obstacle_paths: &[ObstaclePath],
        obstacles: &[Obstacle],
        use_async: bool,
        num_checks: &mut usize,
    ) -> bool {
        let config = &self.config;
        let (passed, checks) = if use_async {
            let traj_ref: &FrenetTrajectory = traj;
            std::thread::scope(|scope| {
                scope
                    .spawn(move || {
                        check_trajectory_collision(
                            traj_ref,
                            obstacle_paths,
                            obstacles,
                            config.vehicle_length,
                            config.vehicle_width,
                            config.safety_margin_lon,
                            config.safety_margin_lat,
                        )
                    })
                    .join()
                    .unwrap_or_else(|_| {
                        warn!("asynchronous collision check failed, rejecting candidate");
                        (false, 0)
                    })
            })
        } else {
            check_trajectory_collision(
                traj,
                obstacle_paths,
                obstacles,
                config.vehicle_length,
                config.vehicle_width,
                config.safety_margin_lon,
                config.safety_margin_lat,
            )
        };

        traj.collision_passed = passed;
        *num_checks += checks;
        passed
    }

    fn report(&mut self, counts: [usize; NUM_STAGES], stamps: &[Instant]) {
        if let Some(observer) = self.observer.as_mut() {
            let mut record = IterationRecord { counts, ..Default::default() };
            for i in 0..NUM_STAGES {
                record.stage_time[i] = stamps[i + 1].duration_since(stamps[i]);
            }
            record.total_time = stamps[NUM_STAGES].duration_since(stamps[0]);
            observer.record(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::StatsCollector;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn narrow_lane_config() -> PlannerConfig {
        PlannerConfig {
            num_width: 3,
            num_speed: 3,
            num_t: 3,
            lowest_speed: 4.0,
            highest_speed: 6.0,
            min_t: 2.0,
            max_t: 4.0,
            tick_t: 0.1,
            max_speed: 20.0,
            max_accel: 8.0,
            max_decel: -8.0,
            max_curvature: 10.0,
            ..PlannerConfig::default()
        }
    }

    fn straight_lane() -> Lane {
        Lane::from_xy(
            &[0.0, 10.0, 20.0, 30.0, 40.0],
            &[0.0, 0.0, 0.0, 0.0, 0.0],
        )
    }

    fn start_at_speed(s_d: f64) -> FrenetState {
        FrenetState::new(0.0, s_d, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_straight_road_no_obstacles() {
        let mut planner = FrenetPlanner::new(narrow_lane_config()).unwrap();
        let result = planner
            .plan(&straight_lane(), &start_at_speed(5.0), 0, 1.0, 1.0, 5.0, &[], true, false)
            .unwrap();

        let traj = result.expect("straight road must yield a trajectory");
        assert!(traj.constraint_passed);
        assert!(traj.collision_passed);
        // stays on the centerline and speeds up towards the top sampled speed
        assert!(traj.end_state.d.abs() < 1e-9);
        assert!((traj.s_d.last().unwrap() - 6.0).abs() < 0.3);
        assert!(traj.final_cost >= traj.fix_cost);
    }

    #[test]
    fn test_obstacle_dead_ahead() {
        let mut planner = FrenetPlanner::new(narrow_lane_config()).unwrap();
        let obstacle = Obstacle::static_at(15.0, 0.0, 0.0, 4.0, 2.0);
        let result = planner
            .plan(
                &straight_lane(),
                &start_at_speed(5.0),
                0,
                1.0,
                1.0,
                5.0,
                &[obstacle],
                true,
                false,
            )
            .unwrap();

        // either no plan survives, or the survivor swerves past the
        // inflated obstacle
        if let Some(traj) = result {
            let clearance = 2.0 / 2.0 + planner.config().safety_margin_lat;
            let max_offset = traj.d.iter().fold(0.0_f64, |m, &d| m.max(d.abs()));
            assert!(max_offset >= clearance);
        }
    }

    #[test]
    fn test_curved_road_respects_curvature_limit() {
        let r = 20.0;
        let xs: Vec<f64> =
            (0..=9).map(|i| r * (i as f64 * 10.0_f64.to_radians()).cos()).collect();
        let ys: Vec<f64> =
            (0..=9).map(|i| r * (i as f64 * 10.0_f64.to_radians()).sin()).collect();
        let lane = Lane::from_xy(&xs, &ys);

        let mut config = narrow_lane_config();
        config.max_curvature = 0.2;
        let mut planner = FrenetPlanner::new(config).unwrap();

        let start = FrenetState::new(0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let result = planner
            .plan(&lane, &start, 0, 1.0, 1.0, 5.0, &[], true, false)
            .unwrap();

        let traj = result.expect("curved road must yield a trajectory");
        for &c in &traj.c {
            assert!(c.abs() <= 0.2);
        }
    }

    #[test]
    fn test_infeasible_speed_returns_empty() {
        let mut config = narrow_lane_config();
        config.max_speed = 1.0;
        let mut planner = FrenetPlanner::new(config).unwrap();

        let result = planner
            .plan(&straight_lane(), &start_at_speed(5.0), 0, 1.0, 1.0, 5.0, &[], true, false)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_degenerate_grid_terminates() {
        let mut config = narrow_lane_config();
        config.num_width = 2;
        config.num_speed = 2;
        config.num_t = 2;
        let mut planner = FrenetPlanner::new(config).unwrap();

        let stats = Rc::new(RefCell::new(StatsCollector::new()));
        planner.set_observer(Box::new(Rc::clone(&stats)));

        let result = planner
            .plan(&straight_lane(), &start_at_speed(5.0), 0, 1.0, 1.0, 5.0, &[], true, false)
            .unwrap();
        assert!(result.is_some());

        let stats = stats.borrow();
        assert_eq!(stats.count(), 1);
        assert_eq!(stats.last().counts[1], 8);
        assert!(stats.last().counts[2] <= 8);
    }

    #[test]
    fn test_duplicate_waypoints_rejected_before_grid_work() {
        let mut planner = FrenetPlanner::new(narrow_lane_config()).unwrap();
        let stats = Rc::new(RefCell::new(StatsCollector::new()));
        planner.set_observer(Box::new(Rc::clone(&stats)));

        let lane = Lane::from_xy(
            &[0.0, 10.0, 10.0, 20.0, 30.0],
            &[0.0, 0.0, 0.0, 0.0, 0.0],
        );
        let result =
            planner.plan(&lane, &start_at_speed(5.0), 0, 1.0, 1.0, 5.0, &[], true, false);

        assert!(matches!(result, Err(PlannerError::InvalidInput(_))));
        assert_eq!(stats.borrow().count(), 0);
    }

    #[test]
    fn test_async_collision_check_matches_sync() {
        let obstacle = Obstacle::static_at(15.0, 0.0, 0.0, 4.0, 2.0);
        let lane = straight_lane();

        let mut sync_planner = FrenetPlanner::new(narrow_lane_config()).unwrap();
        let sync_result = sync_planner
            .plan(&lane, &start_at_speed(5.0), 0, 1.0, 1.0, 5.0,
                  std::slice::from_ref(&obstacle), true, false)
            .unwrap();

        let mut async_planner = FrenetPlanner::new(narrow_lane_config()).unwrap();
        let async_result = async_planner
            .plan(&lane, &start_at_speed(5.0), 0, 1.0, 1.0, 5.0,
                  std::slice::from_ref(&obstacle), true, true)
            .unwrap();

        assert_eq!(sync_result.is_some(), async_result.is_some());
    }

    #[test]
    fn test_collision_check_can_be_skipped() {
        // an obstacle parked on the centerline is ignored when the
        // collision stage is disabled
        let mut planner = FrenetPlanner::new(narrow_lane_config()).unwrap();
        let obstacle = Obstacle::static_at(15.0, 0.0, 0.0, 4.0, 2.0);
        let result = planner
            .plan(
                &straight_lane(),
                &start_at_speed(5.0),
                0,
                1.0,
                1.0,
                5.0,
                &[obstacle],
                false,
                false,
            )
            .unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn test_constraint_check_is_idempotent() {
        let planner = FrenetPlanner::new(narrow_lane_config()).unwrap();
        let mut traj = FrenetTrajectory::default();
        for i in 0..10 {
            traj.x.push(i as f64);
            traj.y.push(0.0);
            traj.s_d.push(5.0);
            traj.s_dd.push(0.0);
        }
        for _ in 0..9 {
            traj.c.push(0.01);
        }

        let first = planner.check_constraints(&mut traj);
        let second = planner.check_constraints(&mut traj);
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PlannerConfig::default();
        config.num_width = 1;
        assert!(FrenetPlanner::new(config).is_err());

        let mut config = PlannerConfig::default();
        config.tick_t = 0.0;
        assert!(FrenetPlanner::new(config).is_err());

        let mut planner = FrenetPlanner::with_defaults();
        let mut config = PlannerConfig::default();
        config.min_t = -1.0;
        assert!(planner.update_config(config).is_err());
    }

    #[test]
    fn test_invalid_lane_widths_rejected() {
        let mut planner = FrenetPlanner::with_defaults();
        let result =
            planner.plan(&straight_lane(), &start_at_speed(5.0), 0, 0.0, 1.0, 5.0, &[], true, false);
        assert!(matches!(result, Err(PlannerError::InvalidInput(_))));
    }

    #[test]
    fn test_generate_reference_curve() {
        let planner = FrenetPlanner::with_defaults();
        let (ref_path, spline) = planner.generate_reference_curve(&straight_lane()).unwrap();
        assert!(!ref_path.is_empty());
        assert_eq!(ref_path.len(), ref_path.yaw.len());
        assert!((spline.s_max() - 40.0).abs() < 1e-9);
        // straight reference: flat yaw and curvature
        for (&yaw, &k) in ref_path.yaw.iter().zip(ref_path.curvature.iter()) {
            assert!(yaw.abs() < 1e-6);
            assert!(k.abs() < 1e-6);
        }
    }
}
