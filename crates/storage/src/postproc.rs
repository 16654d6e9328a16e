// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-checkpoint processing by durability tier.
//!
//! L1 needs nothing beyond the local file. L2 copies the file for the
//! group-ring partner. L3 encodes across the group. L4 files are written
//! straight into the parallel-filesystem tree, so staging is already done.
//! Every successful step stores a metadata record for the encoders and
//! recovery tooling.

use crate::layout::{self, Layout};
use crate::meta::{self, MetaRecord};
use crate::StorageError;
use std::fs;
use std::path::Path;
use strata_core::{Level, Topology};
use tracing::debug;

/// Runs the per-tier post-processing step after a checkpoint file lands.
///
/// Inline tiers run this on the application rank; offload tiers run it on
/// the dedicated head, one task at a time.
pub trait Postprocessor: Send {
    fn process(&mut self, level: Level, rank: u32, ckpt_id: u64) -> Result<(), StorageError>;
}

/// Encodes a group's checkpoint files for single-node-loss tolerance.
///
/// The production Reed-Solomon encoder is an external collaborator behind
/// this trait; [`XorParityEncoder`] covers tests and single-parity setups.
pub trait GroupEncoder: Send {
    fn encode(&self, level_dir: &Path, meta_dir: &Path, ckpt_id: u64) -> Result<(), StorageError>;
}

/// XORs all of a group's checkpoint files of one id into a single parity
/// file, padding shorter files with zeros.
#[derive(Debug, Default, Clone, Copy)]
pub struct XorParityEncoder;

impl GroupEncoder for XorParityEncoder {
    fn encode(&self, level_dir: &Path, meta_dir: &Path, ckpt_id: u64) -> Result<(), StorageError> {
        let mut parity: Vec<u8> = Vec::new();
        let mut encoded = 0usize;
        for entry in fs::read_dir(level_dir)?.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            match layout::parse_ckpt_file_name(name) {
                Some((_, id)) if id == ckpt_id => {}
                _ => continue,
            }
            let bytes = fs::read(entry.path())?;
            if bytes.len() > parity.len() {
                parity.resize(bytes.len(), 0);
            }
            for (p, b) in parity.iter_mut().zip(&bytes) {
                *p ^= b;
            }
            encoded += 1;
        }
        if encoded == 0 {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no checkpoint files with id {ckpt_id} to encode"),
            )));
        }
        fs::create_dir_all(meta_dir)?;
        fs::write(meta_dir.join(layout::parity_file_name(ckpt_id)), parity)?;
        debug!(ckpt_id, encoded, "group parity written");
        Ok(())
    }
}

/// Filesystem post-processor backing all four tiers.
pub struct FsPostprocessor {
    layout: Layout,
    topo: Topology,
    encoder: Box<dyn GroupEncoder>,
}

impl FsPostprocessor {
    pub fn new(layout: Layout, topo: Topology) -> Self {
        Self::with_encoder(layout, topo, Box::new(XorParityEncoder))
    }

    pub fn with_encoder(layout: Layout, topo: Topology, encoder: Box<dyn GroupEncoder>) -> Self {
        Self {
            layout,
            topo,
            encoder,
        }
    }
}

impl Postprocessor for FsPostprocessor {
    fn process(&mut self, level: Level, rank: u32, ckpt_id: u64) -> Result<(), StorageError> {
        let group = self.topo.group_id;
        let src = self.layout.ckpt_path(level, group, rank, ckpt_id);
        if !src.is_file() {
            return Err(StorageError::PostProcess {
                level,
                rank,
                message: format!("missing checkpoint file {}", src.display()),
            });
        }
        let file_size = fs::metadata(&src)?.len();
        let mut partner = None;
        match level {
            Level::L1 => {} // the local copy is the whole tier
            Level::L2 => {
                let dst = self
                    .layout
                    .level_dir(level, group)
                    .join(layout::partner_file_name(rank, ckpt_id));
                fs::copy(&src, &dst)?;
                partner = Some(self.topo.partner_of(rank));
            }
            Level::L3 => {
                self.encoder.encode(
                    &self.layout.level_dir(level, group),
                    &self.layout.meta_level_dir(level, group),
                    ckpt_id,
                )?;
            }
            Level::L4 => {} // already staged in the parallel-filesystem tree
        }
        let record = MetaRecord {
            ckpt_file: layout::ckpt_file_name(rank, ckpt_id),
            file_size,
            created_at: chrono::Utc::now(),
            partner,
        };
        meta::store(&self.layout, level, group, rank, ckpt_id, &record)?;
        debug!(%level, rank, ckpt_id, "post-processing complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "postproc_tests.rs"]
mod tests;
