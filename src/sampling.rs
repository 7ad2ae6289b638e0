//! End-state sampling over the (lateral offset, speed, horizon) grid
//!
//! Enumerates candidate end states and their precomputable costs without
//! materializing any trajectory. Each grid cell is a lightweight record;
//! trajectories are generated on demand during the search.

use itertools::iproduct;

use crate::frenet::{FrenetState, FrenetTrajectory};
use crate::planner::PlannerConfig;

/// Index into the 3D sampling grid: (lateral, speed, horizon)
pub type GridIndex = [usize; 3];

/// One sampled end state with its precomputed cost terms.
///
/// `final_cost` and `traj` are only valid once `is_generated` is set by
/// the search.
#[derive(Debug, Clone)]
pub struct Cell {
    pub end_state: FrenetState,
    pub fix_cost: f64,
    pub hur_cost: f64,
    pub final_cost: f64,
    pub is_used: bool,
    pub is_generated: bool,
    pub traj: Option<FrenetTrajectory>,
}

impl Cell {
    fn new(end_state: FrenetState, fix_cost: f64, hur_cost: f64) -> Self {
        Cell {
            end_state,
            fix_cost,
            hur_cost,
            final_cost: 0.0,
            is_used: false,
            is_generated: false,
            traj: None,
        }
    }

    /// Lower bound on the cost of this cell before generation
    pub fn estimated_cost(&self) -> f64 {
        self.fix_cost + self.hur_cost
    }
}

/// Dense 3D array of end-state cells
#[derive(Debug)]
pub struct SamplingGrid {
    dims: [usize; 3],
    cells: Vec<Cell>,
}

impl SamplingGrid {
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, idx: GridIndex) -> &Cell {
        &self.cells[self.flat(idx)]
    }

    pub fn cell_mut(&mut self, idx: GridIndex) -> &mut Cell {
        let flat = self.flat(idx);
        &mut self.cells[flat]
    }

    /// Iterate over all grid indices in row-major order
    pub fn indices(&self) -> impl Iterator<Item = GridIndex> {
        let [nw, nv, nt] = self.dims;
        iproduct!(0..nw, 0..nv, 0..nt).map(|(i, j, k)| [i, j, k])
    }

    fn flat(&self, idx: GridIndex) -> usize {
        (idx[0] * self.dims[1] + idx[1]) * self.dims[2] + idx[2]
    }
}

/// Sample all end states and find the seed index with the lowest
/// estimated (fixed + heuristic) cost.
///
/// `left_bound` and `right_bound` are signed lateral offsets of the lane
/// edges (left positive, right negative).
pub fn sample_end_states(
    config: &PlannerConfig,
    start: &FrenetState,
    left_bound: f64,
    right_bound: f64,
    current_speed: f64,
) -> (SamplingGrid, GridIndex) {
    let nw = config.num_width;
    let nv = config.num_speed;
    let nt = config.num_t;

    let mut cells = Vec::with_capacity(nw * nv * nt);
    let mut min_cost = f64::MAX;
    let mut seed: GridIndex = [0, 0, 0];

    // left being positive
    let delta_w = (left_bound - config.center_offset) / ((nw - 1) as f64 / 2.0);
    let lat_norm = (left_bound - config.center_offset)
        .powi(2)
        .max((right_bound - config.center_offset).powi(2));

    for i in 0..nw {
        let d = right_bound + i as f64 * delta_w;
        let lat_cost = (d - config.center_offset).powi(2) / lat_norm;

        let delta_v = (config.highest_speed - config.lowest_speed) / (nv - 1) as f64;
        for j in 0..nv {
            let v = config.lowest_speed + j as f64 * delta_v;
            let speed_cost =
                (config.highest_speed - v).powi(2) + 0.5 * (current_speed - v).powi(2);

            let delta_t = (config.max_t - config.min_t) / (nt - 1) as f64;
            for k in 0..nt {
                let end_state = FrenetState {
                    s: 0.0, // determined later by the longitudinal polynomial
                    s_d: v,
                    s_dd: 0.0,
                    d,
                    d_d: 0.0,
                    d_dd: 0.0,
                    t: config.min_t + k as f64 * delta_t,
                };

                // encourage longer planning horizons
                let time_cost = 1.0 - end_state.t / config.max_t;

                let fix_cost = config.k_lat * config.k_diff * lat_cost
                    + config.k_lon * (config.k_time * time_cost + config.k_diff * speed_cost);
                let hur_cost = config.k_lat * config.k_diff * (start.d - end_state.d).powi(2);

                let est_cost = fix_cost + hur_cost;
                if est_cost < min_cost {
                    min_cost = est_cost;
                    seed = [i, j, k];
                }

                cells.push(Cell::new(end_state, fix_cost, hur_cost));
            }
        }
    }

    (SamplingGrid { dims: [nw, nv, nt], cells }, seed)
}
