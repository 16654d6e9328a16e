// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared memory regions protected by the library.
//!
//! The application owns the data and mutates it between library calls; the
//! library reads it while writing a checkpoint and overwrites it during
//! recovery. Both happen outside the application's compute phase, so the
//! lock is uncontended in practice.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A cheaply clonable handle to a byte buffer. Clones share storage.
#[derive(Clone, Debug, Default)]
pub struct MemRegion {
    bytes: Arc<RwLock<Vec<u8>>>,
}

impl MemRegion {
    /// A region of `len` zero bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::from_vec(vec![0; len])
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(RwLock::new(bytes)),
        }
    }

    /// A region holding `values` as little-endian doubles.
    pub fn from_f64s(values: &[f64]) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        Self::from_vec(bytes)
    }

    /// A region holding `values` as little-endian floats.
    pub fn from_f32s(values: &[f32]) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        Self::from_vec(bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared read access for checkpoint serialization.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.bytes.read()
    }

    /// Exclusive access for recovery and injection.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<u8>> {
        self.bytes.write()
    }

    /// Overwrite the buffer with zeros, keeping its length.
    pub fn zero(&self) {
        self.bytes.write().fill(0);
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }

    /// Reinterpret the buffer as little-endian doubles; a trailing partial
    /// element is ignored.
    pub fn to_f64s(&self) -> Vec<f64> {
        self.bytes
            .read()
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                f64::from_le_bytes(b)
            })
            .collect()
    }

    /// Reinterpret the buffer as little-endian floats; a trailing partial
    /// element is ignored.
    pub fn to_f32s(&self) -> Vec<f32> {
        self.bytes
            .read()
            .chunks_exact(4)
            .map(|c| {
                let mut b = [0u8; 4];
                b.copy_from_slice(c);
                f32::from_le_bytes(b)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "region_tests.rs"]
mod tests;
