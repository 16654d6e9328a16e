// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Iteration-boundary scheduling on a minute clock.
//!
//! The application calls in at every iteration boundary; checkpoint
//! decisions are only made once per elapsed minute of wall time, so
//! cadence is workload-independent. `ckpt_count` (minutes ticked, kept by
//! the caller) is the authoritative checkpoint clock, not the iteration
//! count.

use std::time::{Duration, Instant};

/// Decision granularity.
pub const MINUTE: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct SnapshotScheduler {
    granularity: Duration,
    last_decision: Instant,
    /// Timestamp of the most recent iteration boundary.
    iter_time: Instant,
    iterations: u64,
}

impl SnapshotScheduler {
    pub fn new(now: Instant) -> Self {
        Self::with_granularity(now, MINUTE)
    }

    /// Custom granularity, for tests and unusually short campaigns.
    pub fn with_granularity(now: Instant, granularity: Duration) -> Self {
        Self {
            granularity: granularity.max(Duration::from_millis(1)),
            last_decision: now,
            iter_time: now,
            iterations: 0,
        }
    }

    /// Record an iteration boundary. True when the minute granularity has
    /// elapsed since the previous decision, i.e. the caller should tick
    /// `ckpt_count` and consider a checkpoint.
    pub fn observe_iteration(&mut self, now: Instant) -> bool {
        self.iterations += 1;
        self.iter_time = now;
        if now.duration_since(self.last_decision) >= self.granularity {
            self.last_decision = now;
            true
        } else {
            false
        }
    }

    /// Iteration boundaries seen so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Timestamp of the most recent iteration boundary.
    pub fn iter_time(&self) -> Instant {
        self.iter_time
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
