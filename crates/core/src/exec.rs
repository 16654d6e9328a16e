// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-rank execution state.

use crate::level::Level;

/// Mutable bookkeeping a rank carries between library calls.
#[derive(Debug, Clone, Default)]
pub struct ExecState {
    /// Identifier of the checkpoint currently (or most recently) taken.
    pub ckpt_id: u64,
    /// Level of that checkpoint.
    pub ckpt_level: Option<Level>,
    /// Level of the most recent checkpoint whose post-processing succeeded.
    pub last_ckpt_level: Option<Level>,
    /// True while exactly one offload message is unmatched at the head.
    pub was_last_offline: bool,
    /// Minutes ticked since init; the authoritative checkpoint clock.
    pub ckpt_count: u64,
    /// True when this run must rehydrate from existing checkpoint files
    /// before computing.
    pub reco: bool,
}
