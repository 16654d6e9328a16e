// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint writer: one raw file per rank.
//!
//! The on-disk format is the concatenation of every protected dataset's
//! bytes in registration order, no framing, no header. Fidelity depends on
//! the registry being identical on write and on recover; that is the
//! application's contract.

use crate::StorageError;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use strata_core::Registry;
use tracing::debug;

/// Serialize the registry to `path`, fsync, and return the bytes written.
///
/// Partial files from failed writes are left in place; the controller owns
/// reclaim.
pub fn write_checkpoint(registry: &Registry, path: &Path) -> Result<u64, StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;
    for var in registry.vars() {
        let bytes = var.region.read();
        writer.write_all(&bytes)?;
        written += bytes.len() as u64;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| StorageError::Io(err.into_error()))?
        .sync_all()?;
    debug!(path = %path.display(), bytes = written, "checkpoint file written");
    Ok(written)
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
