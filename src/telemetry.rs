//! Planning telemetry
//!
//! Each planning call records counters and elapsed time at five stage
//! boundaries: obstacle prediction, end-state sampling, search,
//! validation and collision checking. Collection goes through an
//! injected observer so the planner hot path stays free of bookkeeping.

use std::fmt;
use std::time::Duration;

/// Number of instrumented pipeline stages
pub const NUM_STAGES: usize = 5;

/// Stage names, in pipeline order
pub const STAGE_LABELS: [&str; NUM_STAGES] = [
    "predicted",
    "sampled",
    "searched",
    "validated",
    "collision checked",
];

/// Counters and timings for a single planning call
#[derive(Debug, Clone, Copy, Default)]
pub struct IterationRecord {
    /// Items processed per stage (obstacles, end states, trajectories,
    /// candidates, polygon pairs)
    pub counts: [usize; NUM_STAGES],
    /// Elapsed time per stage
    pub stage_time: [Duration; NUM_STAGES],
    /// Total elapsed time of the call
    pub total_time: Duration,
}

/// Observer invoked once at the end of every planning call
pub trait TelemetryObserver {
    fn record(&mut self, record: &IterationRecord);
}

/// Shared-ownership observers, so callers can keep reading the statistics
/// while the planner owns the registered handle
impl<T: TelemetryObserver> TelemetryObserver for std::rc::Rc<std::cell::RefCell<T>> {
    fn record(&mut self, record: &IterationRecord) {
        self.borrow_mut().record(record);
    }
}

/// Aggregates per-stage min/max/average statistics across planning calls
#[derive(Debug, Clone)]
pub struct StatsCollector {
    count: usize,
    last: IterationRecord,
    min_counts: [usize; NUM_STAGES],
    max_counts: [usize; NUM_STAGES],
    total_counts: [usize; NUM_STAGES],
    min_time: [Duration; NUM_STAGES],
    max_time: [Duration; NUM_STAGES],
    total_time: [Duration; NUM_STAGES],
    min_total: Duration,
    max_total: Duration,
    sum_total: Duration,
}

impl StatsCollector {
    pub fn new() -> Self {
        StatsCollector {
            count: 0,
            last: IterationRecord::default(),
            min_counts: [usize::MAX; NUM_STAGES],
            max_counts: [0; NUM_STAGES],
            total_counts: [0; NUM_STAGES],
            min_time: [Duration::MAX; NUM_STAGES],
            max_time: [Duration::ZERO; NUM_STAGES],
            total_time: [Duration::ZERO; NUM_STAGES],
            min_total: Duration::MAX,
            max_total: Duration::ZERO,
            sum_total: Duration::ZERO,
        }
    }

    /// Number of recorded planning calls
    pub fn count(&self) -> usize {
        self.count
    }

    /// Record of the most recent planning call
    pub fn last(&self) -> &IterationRecord {
        &self.last
    }

    pub fn average_count(&self, stage: usize) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_counts[stage] as f64 / self.count as f64
    }

    pub fn average_time(&self, stage: usize) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.total_time[stage] / self.count as u32
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryObserver for StatsCollector {
    fn record(&mut self, record: &IterationRecord) {
        self.count += 1;
        self.last = *record;

        for i in 0..NUM_STAGES {
            self.min_counts[i] = self.min_counts[i].min(record.counts[i]);
            self.max_counts[i] = self.max_counts[i].max(record.counts[i]);
            self.total_counts[i] += record.counts[i];

            self.min_time[i] = self.min_time[i].min(record.stage_time[i]);
            self.max_time[i] = self.max_time[i].max(record.stage_time[i]);
            self.total_time[i] += record.stage_time[i];
        }

        self.min_total = self.min_total.min(record.total_time);
        self.max_total = self.max_total.max(record.total_time);
        self.sum_total += record.total_time;
    }
}

impl fmt::Display for StatsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "planning summary ({} iterations)", self.count)?;
        if self.count == 0 {
            return Ok(());
        }
        for i in 0..NUM_STAGES {
            writeln!(
                f,
                "  {:<18} last {:>6} | min {:>6} max {:>6} avg {:>8.1} | {:.3} ms avg",
                STAGE_LABELS[i],
                self.last.counts[i],
                self.min_counts[i],
                self.max_counts[i],
                self.average_count(i),
                self.average_time(i).as_secs_f64() * 1000.0,
            )?;
        }
        writeln!(
            f,
            "  total              last {:.3} ms | min {:.3} ms max {:.3} ms avg {:.3} ms",
            self.last.total_time.as_secs_f64() * 1000.0,
            self.min_total.as_secs_f64() * 1000.0,
            self.max_total.as_secs_f64() * 1000.0,
            (self.sum_total / self.count as u32).as_secs_f64() * 1000.0,
        )
    }
}
