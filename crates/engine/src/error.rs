// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the checkpoint runtime

use thiserror::Error;

/// Errors surfaced by the public operations.
#[derive(Debug, Error)]
pub enum CkptError {
    #[error("invalid checkpoint level {0}: levels are 1..=4")]
    InvalidLevel(u8),
    #[error("configuration error: {0}")]
    Config(#[from] strata_config::ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] strata_core::RegistryError),
    #[error("storage error: {0}")]
    Storage(#[from] strata_storage::StorageError),
    #[error("protocol error: {0}")]
    Protocol(#[from] strata_head::ProtocolError),
    #[error("head error: {0}")]
    Head(#[from] strata_head::HeadError),
    #[error("injection error: {0}")]
    Injection(#[from] crate::inject::InjectError),
    #[error("offload requested but no head link is attached")]
    NoHeadLink,
    #[error("no surviving checkpoint found in any tier")]
    NothingToRecover,
    #[error("head/application role mismatch between topology and link")]
    RoleMismatch,
    #[error("fault injection is not configured")]
    InjectionNotConfigured,
}
