// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery: locate the most recent surviving checkpoint and rehydrate the
//! registry from it.
//!
//! The registry must already be populated identically to the writing run;
//! the library does not persist the registry schema.

use crate::layout::{self, Layout};
use crate::StorageError;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use strata_core::{Level, Registry};
use tracing::debug;

/// A checkpoint file found during the tier scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurvivingCkpt {
    pub level: Level,
    pub ckpt_id: u64,
    pub path: std::path::PathBuf,
}

/// Scan one tier for this rank's newest checkpoint file.
pub fn locate_in(
    layout: &Layout,
    level: Level,
    group: u32,
    split_rank: u32,
) -> Option<SurvivingCkpt> {
    let dir = layout.level_dir(level, group);
    let entries = fs::read_dir(&dir).ok()?;
    let mut newest: Option<u64> = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some((rank, ckpt_id)) = layout::parse_ckpt_file_name(name) {
            if rank == split_rank {
                newest = Some(newest.map_or(ckpt_id, |n| n.max(ckpt_id)));
            }
        }
    }
    let ckpt_id = newest?;
    Some(SurvivingCkpt {
        level,
        ckpt_id,
        path: layout.ckpt_path(level, group, split_rank, ckpt_id),
    })
}

/// Scan tiers strongest-first for this rank's checkpoint. Within the
/// strongest surviving tier the highest checkpoint id wins.
pub fn locate(layout: &Layout, group: u32, split_rank: u32) -> Option<SurvivingCkpt> {
    Level::ALL
        .iter()
        .rev()
        .find_map(|&level| locate_in(layout, level, group, split_rank))
}

/// Read exactly `total_bytes` per dataset, in registration order, into the
/// registered regions.
pub fn restore(registry: &Registry, path: &Path) -> Result<(), StorageError> {
    let actual = fs::metadata(path)?.len();
    if actual != registry.ckpt_size() {
        return Err(StorageError::SizeMismatch {
            path: path.to_owned(),
            expected: registry.ckpt_size(),
            actual,
        });
    }
    let mut reader = BufReader::new(File::open(path)?);
    for var in registry.vars() {
        let mut bytes = var.region.write();
        reader.read_exact(bytes.as_mut_slice())?;
    }
    debug!(path = %path.display(), bytes = actual, "checkpoint data restored");
    Ok(())
}

#[cfg(test)]
#[path = "recover_tests.rs"]
mod tests;
