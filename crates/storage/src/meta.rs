// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-rank checkpoint metadata records.
//!
//! Stored as TOML in the mirrored metadata tree; consumed by the group
//! encoders (sizes and padding) and by recovery tooling.

use crate::layout::Layout;
use crate::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use strata_core::Level;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// File name of the checkpoint this record describes.
    pub ckpt_file: String,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
    /// Split rank holding this rank's partner copy, when one exists.
    pub partner: Option<u32>,
}

fn meta_path(layout: &Layout, level: Level, group: u32, rank: u32, ckpt_id: u64) -> PathBuf {
    layout
        .meta_level_dir(level, group)
        .join(format!("rank-{rank}-ckpt-{ckpt_id}.toml"))
}

pub fn store(
    layout: &Layout,
    level: Level,
    group: u32,
    rank: u32,
    ckpt_id: u64,
    record: &MetaRecord,
) -> Result<PathBuf, StorageError> {
    let path = meta_path(layout, level, group, rank, ckpt_id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, toml::to_string_pretty(record)?)?;
    Ok(path)
}

pub fn load(
    layout: &Layout,
    level: Level,
    group: u32,
    rank: u32,
    ckpt_id: u64,
) -> Result<MetaRecord, StorageError> {
    let path = meta_path(layout, level, group, rank, ckpt_id);
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
