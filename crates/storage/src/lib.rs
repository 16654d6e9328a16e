// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! strata-storage: the on-disk side of the checkpoint library

pub mod clean;
pub mod layout;
pub mod meta;
pub mod postproc;
pub mod recover;
pub mod writer;

use std::path::PathBuf;
use strata_core::Level;
use thiserror::Error;

pub use clean::{clean, CleanScope};
pub use layout::Layout;
pub use meta::MetaRecord;
pub use postproc::{FsPostprocessor, GroupEncoder, Postprocessor, XorParityEncoder};
pub use recover::SurvivingCkpt;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata serialize error: {0}")]
    MetaEncode(#[from] toml::ser::Error),
    #[error("metadata parse error: {0}")]
    MetaDecode(#[from] toml::de::Error),
    #[error("checkpoint file {path} holds {actual} bytes, registry expects {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    #[error("post-processing {level} failed for rank {rank}: {message}")]
    PostProcess {
        level: Level,
        rank: u32,
        message: String,
    },
}
