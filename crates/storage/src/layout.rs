// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of the checkpoint tree.
//!
//! Data lives at `<ckpt_dir>/l<k>/<group>/rank-<r>-ckpt-<id>`, with the
//! archival tier rooted at `<glob_dir>` instead of `<ckpt_dir>`. Metadata
//! mirrors the same shape under `<meta_dir>`. The tree is partitioned by
//! `(tier, group, rank)` so no two ranks ever write the same file.

use std::path::{Path, PathBuf};
use strata_core::Level;

#[derive(Debug, Clone)]
pub struct Layout {
    ckpt_dir: PathBuf,
    glob_dir: PathBuf,
    meta_dir: PathBuf,
}

impl Layout {
    pub fn new(
        ckpt_dir: impl Into<PathBuf>,
        glob_dir: impl Into<PathBuf>,
        meta_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ckpt_dir: ckpt_dir.into(),
            glob_dir: glob_dir.into(),
            meta_dir: meta_dir.into(),
        }
    }

    /// Root of one tier's data tree, groups below it.
    pub fn level_root(&self, level: Level) -> PathBuf {
        let root = if level.is_archive() {
            &self.glob_dir
        } else {
            &self.ckpt_dir
        };
        root.join(format!("l{}", level.number()))
    }

    /// One group's directory within a tier.
    pub fn level_dir(&self, level: Level, group: u32) -> PathBuf {
        self.level_root(level).join(group.to_string())
    }

    /// Root of one tier's metadata tree.
    pub fn meta_level_root(&self, level: Level) -> PathBuf {
        self.meta_dir.join(format!("l{}", level.number()))
    }

    pub fn meta_level_dir(&self, level: Level, group: u32) -> PathBuf {
        self.meta_level_root(level).join(group.to_string())
    }

    /// A rank's checkpoint file within a tier.
    pub fn ckpt_path(&self, level: Level, group: u32, rank: u32, ckpt_id: u64) -> PathBuf {
        self.level_dir(level, group).join(ckpt_file_name(rank, ckpt_id))
    }

    /// Staging directory for the finalize-time promotion; atomically
    /// renamed into the archival tier root once complete.
    pub fn global_tmp_dir(&self) -> PathBuf {
        self.glob_dir.join("gtmp")
    }

    /// A rank's staged file inside [`Layout::global_tmp_dir`].
    pub fn global_tmp_path(&self, group: u32, rank: u32, ckpt_id: u64) -> PathBuf {
        self.global_tmp_dir()
            .join(group.to_string())
            .join(ckpt_file_name(rank, ckpt_id))
    }
}

/// `rank-<r>-ckpt-<id>`
pub fn ckpt_file_name(rank: u32, ckpt_id: u64) -> String {
    format!("rank-{rank}-ckpt-{ckpt_id}")
}

/// Partner copy of rank `r`'s checkpoint, produced at L2.
pub fn partner_file_name(rank: u32, ckpt_id: u64) -> String {
    format!("rank-{rank}-pcof-{ckpt_id}")
}

/// Group parity file produced by the L3 encoder.
pub fn parity_file_name(ckpt_id: u64) -> String {
    format!("group-parity-{ckpt_id}")
}

/// Parse `rank-<r>-ckpt-<id>` back into `(rank, ckpt_id)`.
pub fn parse_ckpt_file_name(name: &str) -> Option<(u32, u64)> {
    let rest = name.strip_prefix("rank-")?;
    let (rank, id) = rest.split_once("-ckpt-")?;
    Some((rank.parse().ok()?, id.parse().ok()?))
}

/// Remove a directory tree, tolerating its absence.
///
/// Group siblings clean the same tree concurrently after the finalize
/// barrier; a second attempt settles entries the other rank removed
/// mid-walk.
pub(crate) fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(first) => match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(_) => Err(first),
        },
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
