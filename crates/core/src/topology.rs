// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-group topology view.
//!
//! Built by the external topology/communicator layer before init and
//! immutable afterwards. Split ranks number the application processes with
//! heads excluded; groups are contiguous blocks of split ranks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Rank in the world communicator, heads included.
    pub my_rank: u32,
    /// Rank among application processes only.
    pub split_rank: u32,
    /// World size, heads included.
    pub nb_proc: u32,
    /// True when this process is a dedicated head.
    pub am_i_a_head: bool,
    /// World rank of this node's head.
    pub head_rank: u32,
    pub group_id: u32,
    /// Position within the group.
    pub group_rank: u32,
    pub group_size: u32,
    /// Dedicated heads in the world; zero disables offload.
    pub nb_heads: u32,
}

impl Topology {
    /// Split rank of the process holding `split_rank`'s partner copy: the
    /// next rank around the group ring.
    pub fn partner_of(&self, split_rank: u32) -> u32 {
        let size = self.group_size.max(1);
        let base = self.group_id * size;
        let group_rank = split_rank.saturating_sub(base);
        base + (group_rank + 1) % size
    }

    /// Partner of this rank.
    pub fn partner_split_rank(&self) -> u32 {
        self.partner_of(self.split_rank)
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
