// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint durability tiers.

use serde::{Deserialize, Serialize};

/// One of the four durability classes a checkpoint can be written at.
///
/// Higher tiers survive broader failures: L1 is node-local storage, L2 adds
/// a partner copy inside the group, L3 encodes across the group for
/// single-node-loss tolerance, and L4 is the archival copy on the parallel
/// filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    L1,
    L2,
    L3,
    L4,
}

impl Level {
    /// All tiers, weakest first.
    pub const ALL: [Level; 4] = [Level::L1, Level::L2, Level::L3, Level::L4];

    /// Parse a 1-based tier number. Returns `None` outside `1..=4`.
    pub fn from_number(n: u8) -> Option<Level> {
        match n {
            1 => Some(Level::L1),
            2 => Some(Level::L2),
            3 => Some(Level::L3),
            4 => Some(Level::L4),
            _ => None,
        }
    }

    /// 1-based tier number.
    pub fn number(self) -> u8 {
        match self {
            Level::L1 => 1,
            Level::L2 => 2,
            Level::L3 => 3,
            Level::L4 => 4,
        }
    }

    /// 0-based index for per-tier tables.
    pub fn index(self) -> usize {
        usize::from(self.number()) - 1
    }

    /// True for the archival tier staged to the parallel filesystem.
    pub fn is_archive(self) -> bool {
        matches!(self, Level::L4)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.number())
    }
}

#[cfg(test)]
#[path = "level_tests.rs"]
mod tests;
