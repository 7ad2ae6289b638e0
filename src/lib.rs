//! Frenet-frame optimal trajectory planner
//!
//! Given a reference centerline, an ego start state in Frenet
//! coordinates, detected obstacles and a set of physical limits and cost
//! weights, the planner selects a single collision-free, dynamically
//! feasible trajectory minimizing a weighted combination of lateral
//! offset, speed tracking, planning horizon and jerk.
//!
//! # Components
//!
//! - `polynomial`: quartic/quintic boundary-value interpolators
//! - `spline`: natural cubic splines and the arc-length reference curve
//! - `frenet`: Frenet states, candidate trajectories, Cartesian conversion
//! - `sampling`: the (offset, speed, horizon) end-state grid
//! - `search`: gradient descent with on-demand trajectory generation
//! - `prediction`: constant-velocity obstacle forward simulation
//! - `collision`: SAT rectangle overlap checks
//! - `telemetry`: per-call stage counters and timings
//! - `planner`: the orchestrating [`FrenetPlanner`]
//!
//! # Example
//!
//! ```no_run
//! use frenet_planner::{FrenetPlanner, FrenetState, Lane};
//!
//! let lane = Lane::from_xy(
//!     &[0.0, 10.0, 20.0, 30.0, 40.0],
//!     &[0.0, 0.0, 0.0, 0.0, 0.0],
//! );
//! let start = FrenetState::new(0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0);
//!
//! let mut planner = FrenetPlanner::with_defaults();
//! let best = planner
//!     .plan(&lane, &start, 0, 1.5, 1.5, 5.0, &[], true, false)
//!     .unwrap();
//! if let Some(traj) = best {
//!     println!("planned {} ticks, cost {:.3}", traj.len(), traj.final_cost);
//! }
//! ```
//!
//! # References
//!
//! - Werling et al., "Optimal Trajectory Generation for Dynamic Street
//!   Scenarios in a Frenet Frame", ICRA 2010

pub mod common;
pub mod polynomial;
pub mod spline;
pub mod frenet;
pub mod sampling;
pub mod search;
pub mod prediction;
pub mod collision;
pub mod telemetry;
pub mod planner;

// Re-exports for convenience
pub use common::error::{PlannerError, PlannerResult};
pub use common::types::{Lane, Obstacle, Point2D, ReferencePath, REAR_AXLE_TO_CENTER};
pub use frenet::{FrenetState, FrenetTrajectory};
pub use planner::{FrenetPlanner, PlannerConfig};
pub use spline::{CubicSpline1D, CubicSpline2D};
pub use telemetry::{IterationRecord, StatsCollector, TelemetryObserver};
