// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Silent-data-corruption injection for resilience experiments.
//!
//! Flips one configured bit in one configured element of a protected
//! dataset, gated by rank, elapsed time since the last injection, and the
//! remaining budget. Float and double elements only. Never invoked on
//! production paths.

use std::time::{Duration, Instant};
use strata_config::InjectionConfig;
use strata_core::{Registry, Topology, TypeKind};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("dataset {0} is not registered")]
    UnknownDataset(i32),
    #[error("bit position {position} outside [0, {limit}) for {ele_size}-byte elements")]
    BitOutOfRange {
        position: u32,
        limit: u32,
        ele_size: usize,
    },
    #[error("element index {index} outside dataset of {count} elements")]
    IndexOutOfRange { index: u64, count: u64 },
    #[error("dataset {id} has {kind:?} elements; only float and double are supported")]
    UnsupportedType { id: i32, kind: TypeKind },
}

/// Injection state for one rank.
pub struct Injection {
    config: InjectionConfig,
    injected: u32,
    last: Instant,
}

impl Injection {
    pub fn new(config: InjectionConfig, now: Instant) -> Self {
        Self {
            config,
            injected: 0,
            last: now,
        }
    }

    /// Remaining injection budget.
    pub fn remaining(&self) -> u32 {
        self.config.number.saturating_sub(self.injected)
    }

    /// Flip the configured bit of the configured element of `dataset_id`.
    ///
    /// Returns `Ok(false)` when a gate (rank, budget, cool-down) filtered
    /// the call out; `Ok(true)` when a bit was flipped.
    pub fn bit_flip(
        &mut self,
        registry: &Registry,
        topo: &Topology,
        dataset_id: i32,
        now: Instant,
    ) -> Result<bool, InjectError> {
        if self.config.rank != topo.split_rank {
            return Ok(false);
        }
        if self.injected >= self.config.number {
            return Ok(false);
        }
        // The cool-down runs from init for the first injection, then from
        // each successful flip.
        if now.duration_since(self.last) < Duration::from_secs(self.config.frequency_secs) {
            return Ok(false);
        }
        let var = registry
            .get(dataset_id)
            .ok_or(InjectError::UnknownDataset(dataset_id))?;
        if !var.ty.kind.is_float() {
            return Err(InjectError::UnsupportedType {
                id: dataset_id,
                kind: var.ty.kind,
            });
        }
        let limit = (var.ele_size * 8) as u32;
        if self.config.position >= limit {
            return Err(InjectError::BitOutOfRange {
                position: self.config.position,
                limit,
                ele_size: var.ele_size,
            });
        }
        if self.config.index >= var.count {
            return Err(InjectError::IndexOutOfRange {
                index: self.config.index,
                count: var.count,
            });
        }

        let byte = self.config.index as usize * var.ele_size
            + (self.config.position / 8) as usize;
        let mask = 1u8 << (self.config.position % 8);
        {
            let mut bytes = var.region.write();
            if let Some(target) = bytes.get_mut(byte) {
                *target ^= mask;
            }
        }
        self.injected += 1;
        self.last = now;
        warn!(
            dataset = dataset_id,
            index = self.config.index,
            bit = self.config.position,
            remaining = self.remaining(),
            "bit-flip injected"
        );
        Ok(true)
    }
}

#[cfg(test)]
#[path = "inject_tests.rs"]
mod tests;
