// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-tier checkpoint policy and level selection.

use strata_config::Config;
use strata_core::Level;
use tracing::debug;

/// Policy for one durability tier. Intervals are minutes of the
/// `ckpt_count` clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPolicy {
    pub base_interval: u32,
    /// Effective interval; at most `base_interval`, lower while a
    /// regulation window is open.
    pub current_interval: u32,
    pub is_inline: bool,
    regulation: Option<Regulation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Regulation {
    start: u64,
    stop: u64,
}

/// The four tier policies, indexed by [`Level`].
#[derive(Debug, Clone)]
pub struct LevelTable {
    levels: [LevelPolicy; 4],
}

impl LevelTable {
    pub fn new(intervals: [u32; 4], inline: [bool; 4]) -> Self {
        let mut inline = inline;
        // The archival tier is collective and always inline.
        inline[Level::L4.index()] = true;
        let levels = std::array::from_fn(|i| {
            let interval = intervals[i].max(1);
            LevelPolicy {
                base_interval: interval,
                current_interval: interval,
                is_inline: inline[i],
                regulation: None,
            }
        });
        Self { levels }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.intervals, config.inline)
    }

    pub fn policy(&self, level: Level) -> &LevelPolicy {
        &self.levels[level.index()]
    }

    pub fn is_inline(&self, level: Level) -> bool {
        self.policy(level).is_inline
    }

    pub fn current_interval(&self, level: Level) -> u32 {
        self.policy(level).current_interval
    }

    /// The tier firing at this minute: the highest level whose interval
    /// divides `ckpt_count`, stronger tiers subsuming weaker ones when
    /// they coincide. `None` means no checkpoint this minute.
    pub fn select(&self, ckpt_count: u64) -> Option<Level> {
        let mut selected = None;
        for level in Level::ALL {
            if ckpt_count % u64::from(self.policy(level).current_interval) == 0 {
                selected = Some(level);
            }
        }
        selected
    }

    /// Open a regulation window: tighten `level`'s cadence for
    /// `duration_minutes` starting at `now_minute`. Regulation never
    /// relaxes below the base cadence, and reapplying recomputes from the
    /// base, so redundant deliveries are harmless.
    pub fn regulate(&mut self, level: Level, multiplier: u32, now_minute: u64, duration_minutes: u64) {
        let policy = &mut self.levels[level.index()];
        policy.current_interval = (policy.base_interval / multiplier.max(1)).max(1);
        policy.regulation = Some(Regulation {
            start: now_minute,
            stop: now_minute + duration_minutes,
        });
        debug!(
            %level,
            interval = policy.current_interval,
            until = now_minute + duration_minutes,
            "regulation window opened"
        );
    }

    /// Close every regulation window whose stop minute has passed.
    pub fn revert_expired(&mut self, now_minute: u64) {
        for policy in &mut self.levels {
            if let Some(regulation) = policy.regulation {
                if regulation.stop <= now_minute {
                    policy.current_interval = policy.base_interval;
                    policy.regulation = None;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
