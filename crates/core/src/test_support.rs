// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders for tests in this crate and downstream crates.

use crate::topology::Topology;

impl Topology {
    /// A single application rank with no dedicated head.
    pub fn solo() -> Topology {
        Topology {
            my_rank: 0,
            split_rank: 0,
            nb_proc: 1,
            am_i_a_head: false,
            head_rank: 0,
            group_id: 0,
            group_rank: 0,
            group_size: 1,
            nb_heads: 0,
        }
    }

    /// Application rank `group_rank` inside a single group of `group_size`
    /// ranks served by one head (world rank 0).
    pub fn with_head(group_rank: u32, group_size: u32) -> Topology {
        Topology {
            my_rank: group_rank + 1,
            split_rank: group_rank,
            nb_proc: group_size + 1,
            am_i_a_head: false,
            head_rank: 0,
            group_id: 0,
            group_rank,
            group_size,
            nb_heads: 1,
        }
    }

    /// The head serving the [`Topology::with_head`] ranks.
    pub fn head_of(group_size: u32) -> Topology {
        Topology {
            my_rank: 0,
            split_rank: 0,
            nb_proc: group_size + 1,
            am_i_a_head: true,
            head_rank: 0,
            group_id: 0,
            group_rank: 0,
            group_size,
            nb_heads: 1,
        }
    }
}
