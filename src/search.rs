//! Gradient-descent selection of candidate end states
//!
//! Walks the 3D sampling grid towards lower real cost, materializing
//! trajectories on demand. Every materialized candidate is pushed into a
//! min-heap keyed by its final cost, from which the validation stage
//! drains candidates in cost order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::{debug, warn};
use ordered_float::NotNan;

use crate::frenet::{FrenetState, FrenetTrajectory};
use crate::planner::PlannerConfig;
use crate::polynomial::{QuarticPolynomial, QuinticPolynomial};
use crate::sampling::{GridIndex, SamplingGrid};

/// Min-heap of materialized candidates ordered by final cost
#[derive(Debug, Default)]
pub struct CandidateQueue {
    heap: BinaryHeap<(Reverse<NotNan<f64>>, GridIndex)>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new() }
    }

    pub fn push(&mut self, cost: f64, idx: GridIndex) {
        match NotNan::new(cost) {
            Ok(cost) => self.heap.push((Reverse(cost), idx)),
            Err(_) => warn!("discarding candidate {:?} with NaN cost", idx),
        }
    }

    /// Pop the cheapest candidate
    pub fn pop(&mut self) -> Option<(f64, GridIndex)> {
        self.heap.pop().map(|(Reverse(cost), idx)| (cost.into_inner(), idx))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Counters reported by one search run
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOutcome {
    pub iterations: usize,
    pub num_generated: usize,
}

/// Run the coordinate descent from `seed` until it revisits a used cell.
///
/// The descent terminates because every visited cell is marked used and
/// the grid is finite.
pub fn descend(
    grid: &mut SamplingGrid,
    seed: GridIndex,
    config: &PlannerConfig,
    start: &FrenetState,
    lane_id: i32,
    queue: &mut CandidateQueue,
) -> SearchOutcome {
    let mut idx = seed;
    let mut outcome = SearchOutcome::default();
    loop {
        outcome.iterations += 1;
        if descend_step(grid, &mut idx, config, start, lane_id, queue, &mut outcome.num_generated) {
            break;
        }
    }
    debug!(
        "search converged in {} iterations, {} trajectories generated",
        outcome.iterations, outcome.num_generated
    );
    outcome
}

/// One descent step; returns true once converged
fn descend_step(
    grid: &mut SamplingGrid,
    idx: &mut GridIndex,
    config: &PlannerConfig,
    start: &FrenetState,
    lane_id: i32,
    queue: &mut CandidateQueue,
    num_generated: &mut usize,
) -> bool {
    if grid.cell(*idx).is_used {
        return true;
    }
    grid.cell_mut(*idx).is_used = true;

    let gradients = find_gradients(grid, *idx, config, start, lane_id, queue, num_generated);

    let mut grad_dim = 0;
    let mut max_grad = gradients[0];
    for dim in 1..3 {
        if gradients[dim].abs() > max_grad.abs() {
            grad_dim = dim;
            max_grad = gradients[dim];
        }
    }

    // move along the steepest axis towards lower cost
    if max_grad.abs() > 0.0 {
        if max_grad > 0.0 {
            idx[grad_dim] -= 1;
        } else {
            idx[grad_dim] += 1;
        }
    }

    false
}

/// Finite-difference cost gradients along each grid axis.
///
/// Gradients that would push past a grid boundary are clamped to zero so
/// the descent cannot leave the grid.
fn find_gradients(
    grid: &mut SamplingGrid,
    idx: GridIndex,
    config: &PlannerConfig,
    start: &FrenetState,
    lane_id: i32,
    queue: &mut CandidateQueue,
    num_generated: &mut usize,
) -> [f64; 3] {
    let sizes = grid.dims();
    let directions = find_directions(sizes, idx);
    let cost_center = real_cost(grid, idx, config, start, lane_id, queue, num_generated);

    let mut gradients = [0.0; 3];
    for dim in 0..3 {
        let mut next = idx;
        if directions[dim] >= 0 {
            next[dim] += 1;
            gradients[dim] =
                real_cost(grid, next, config, start, lane_id, queue, num_generated) - cost_center;
            if gradients[dim] >= 0.0 && idx[dim] == 0 {
                gradients[dim] = 0.0;
            }
        } else {
            next[dim] -= 1;
            gradients[dim] =
                cost_center - real_cost(grid, next, config, start, lane_id, queue, num_generated);
            if gradients[dim] <= 0.0 && idx[dim] == sizes[dim] - 1 {
                gradients[dim] = 0.0;
            }
        }
    }

    gradients
}

/// Neighbor direction per axis: +1 unless already at the upper boundary
fn find_directions(sizes: [usize; 3], idx: GridIndex) -> [i32; 3] {
    let mut directions = [0; 3];
    for dim in 0..3 {
        directions[dim] = if idx[dim] >= sizes[dim] - 1 { -1 } else { 1 };
    }
    directions
}

/// Real cost of a cell, generating its trajectory on first visit.
///
/// Generation happens exactly once per cell; the candidate is pushed into
/// the queue at that moment.
fn real_cost(
    grid: &mut SamplingGrid,
    idx: GridIndex,
    config: &PlannerConfig,
    start: &FrenetState,
    lane_id: i32,
    queue: &mut CandidateQueue,
    num_generated: &mut usize,
) -> f64 {
    if grid.cell(idx).is_generated {
        return grid.cell(idx).final_cost;
    }
    *num_generated += 1;

    let cell = grid.cell_mut(idx);
    cell.is_generated = true;
    let end = cell.end_state;

    let mut traj = FrenetTrajectory::new(lane_id, end, cell.fix_cost, cell.hur_cost);

    let lat_qp = QuinticPolynomial::new(
        start.d, start.d_d, start.d_dd, end.d, end.d_d, end.d_dd, end.t,
    );
    let lon_qp = QuarticPolynomial::new(start.s, start.s_d, start.s_dd, end.s_d, end.s_dd, end.t);

    let mut jerk_d = 0.0;
    let mut jerk_s = 0.0;
    let mut t = 0.0;
    while t <= end.t {
        traj.t.push(t);

        traj.d.push(lat_qp.calc_point(t));
        traj.d_d.push(lat_qp.calc_first_derivative(t));
        traj.d_dd.push(lat_qp.calc_second_derivative(t));
        traj.d_ddd.push(lat_qp.calc_third_derivative(t));
        jerk_d += traj.d_ddd.last().unwrap_or(&0.0).powi(2);

        traj.s.push(lon_qp.calc_point(t));
        traj.s_d.push(lon_qp.calc_first_derivative(t));
        traj.s_dd.push(lon_qp.calc_second_derivative(t));
        traj.s_ddd.push(lon_qp.calc_third_derivative(t));
        jerk_s += traj.s_ddd.last().unwrap_or(&0.0).powi(2);

        t += config.tick_t;
    }

    traj.dyn_cost = config.k_jerk * (config.k_lon * jerk_s + config.k_lat * jerk_d);
    traj.final_cost = traj.fix_cost + traj.dyn_cost;

    let final_cost = traj.final_cost;
    cell.final_cost = final_cost;
    cell.traj = Some(traj);
    queue.push(final_cost, idx);

    final_cost
}
