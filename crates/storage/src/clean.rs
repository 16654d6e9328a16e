// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier cleaning and reclaim.

use crate::layout::{remove_dir_if_exists, Layout};
use crate::StorageError;
use strata_core::Level;
use tracing::debug;

/// What a cleaning pass removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanScope {
    /// One tier's data and metadata for this group.
    Level(Level),
    /// The node-local tiers and the staging area, keeping the archive.
    LocalOnly,
    /// Everything, archive and staging included.
    All,
}

/// Remove checkpoint data per `scope`. Absent directories are fine.
pub fn clean(layout: &Layout, group: u32, scope: CleanScope) -> Result<(), StorageError> {
    match scope {
        CleanScope::Level(level) => clean_level(layout, group, level)?,
        CleanScope::LocalOnly => {
            for level in [Level::L1, Level::L2, Level::L3] {
                clean_level(layout, group, level)?;
            }
            remove_dir_if_exists(&layout.global_tmp_dir())?;
        }
        CleanScope::All => {
            for level in Level::ALL {
                clean_level(layout, group, level)?;
            }
            remove_dir_if_exists(&layout.global_tmp_dir())?;
        }
    }
    debug!(group, ?scope, "checkpoint tree cleaned");
    Ok(())
}

fn clean_level(layout: &Layout, group: u32, level: Level) -> Result<(), StorageError> {
    remove_dir_if_exists(&layout.level_dir(level, group))?;
    remove_dir_if_exists(&layout.meta_level_dir(level, group))?;
    Ok(())
}

#[cfg(test)]
#[path = "clean_tests.rs"]
mod tests;
