// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protected-variable registry.
//!
//! A dense sequence in registration order; lookup is a linear scan keyed by
//! `id` (registries hold at most a few hundred datasets). The checkpoint
//! image is exactly this sequence serialized front to back, so the
//! application must re-register identically before recovery.

use crate::region::MemRegion;
use crate::types::TypeDescriptor;
use thiserror::Error;
use tracing::{debug, info};

/// Upper bound on registered datasets per rank.
pub const MAX_PROTECTED: usize = 512;

/// Errors from dataset registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry full ({MAX_PROTECTED} datasets), cannot protect id {id}")]
    Full { id: i32 },
    #[error("region for dataset {id} holds {actual} bytes but {expected} were declared")]
    SizeMismatch { id: i32, expected: u64, actual: u64 },
}

/// One registered dataset: a user-chosen id bound to a memory region and
/// its element type.
#[derive(Debug, Clone)]
pub struct ProtectedVar {
    pub id: i32,
    pub region: MemRegion,
    pub count: u64,
    pub ty: TypeDescriptor,
    pub ele_size: usize,
    pub total_bytes: u64,
}

/// All datasets a rank has protected, plus the running image size.
#[derive(Debug, Default)]
pub struct Registry {
    vars: Vec<ProtectedVar>,
    ckpt_size: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`, or update it in place if already present.
    ///
    /// Re-registration overwrites pointer, count, and type, and adjusts the
    /// running image size by the delta. The region must hold exactly
    /// `count * ty.size` bytes.
    pub fn protect(
        &mut self,
        id: i32,
        region: MemRegion,
        count: u64,
        ty: TypeDescriptor,
    ) -> Result<(), RegistryError> {
        let total_bytes = ty.size as u64 * count;
        if region.len() as u64 != total_bytes {
            return Err(RegistryError::SizeMismatch {
                id,
                expected: total_bytes,
                actual: region.len() as u64,
            });
        }
        let var = ProtectedVar {
            id,
            region,
            count,
            ty,
            ele_size: ty.size,
            total_bytes,
        };
        if let Some(existing) = self.vars.iter_mut().find(|v| v.id == id) {
            let prev = existing.total_bytes;
            *existing = var;
            self.ckpt_size = self.ckpt_size - prev + total_bytes;
            debug!(id, ckpt_size = self.ckpt_size, "dataset re-registered");
        } else {
            if self.vars.len() >= MAX_PROTECTED {
                return Err(RegistryError::Full { id });
            }
            self.vars.push(var);
            self.ckpt_size += total_bytes;
            info!(
                id,
                count,
                ele_size = ty.size,
                ckpt_size = self.ckpt_size,
                "dataset protected"
            );
        }
        Ok(())
    }

    /// Datasets in registration order.
    pub fn vars(&self) -> &[ProtectedVar] {
        &self.vars
    }

    pub fn get(&self, id: i32) -> Option<&ProtectedVar> {
        self.vars.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Total bytes one checkpoint of this registry occupies.
    pub fn ckpt_size(&self) -> u64 {
        self.ckpt_size
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
