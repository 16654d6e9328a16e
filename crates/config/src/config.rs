// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file parsing and validation.
//!
//! Key/value sections in TOML. Interval options are minutes; the archival
//! tier is always inline regardless of what the file says.

use crate::sentinel::RestartStatus;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("cannot write config {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("config serialize error: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("unknown restart sentinel {0}")]
    BadSentinel(i64),
}

/// Severity gate for the logging sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

/// Fault-injection parameters; absent in production configs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionConfig {
    /// Split rank injections target.
    pub rank: u32,
    /// Element index within the dataset.
    #[serde(default)]
    pub index: u64,
    /// Bit position within the element.
    #[serde(default)]
    pub position: u32,
    /// Injection budget.
    #[serde(default = "default_injection_number")]
    pub number: u32,
    /// Minimum seconds between injections.
    #[serde(default)]
    pub frequency_secs: u64,
}

fn default_injection_number() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    basic: RawBasic,
    checkpoint: RawCheckpoint,
    #[serde(default)]
    restart: RawRestart,
    #[serde(default)]
    injection: Option<InjectionConfig>,
}

#[derive(Debug, Deserialize)]
struct RawBasic {
    #[serde(default)]
    head: bool,
    #[serde(default = "default_one")]
    node_size: u32,
    #[serde(default = "default_one")]
    group_size: u32,
    ckpt_dir: PathBuf,
    glob_dir: PathBuf,
    meta_dir: PathBuf,
    #[serde(default = "default_noti_file")]
    noti_file: PathBuf,
    #[serde(default)]
    verbosity: Verbosity,
    #[serde(default)]
    keep_last: bool,
}

#[derive(Debug, Deserialize)]
struct RawCheckpoint {
    ckpt_l1: u32,
    ckpt_l2: u32,
    ckpt_l3: u32,
    ckpt_l4: u32,
    #[serde(default = "default_true")]
    inline_l2: bool,
    #[serde(default = "default_true")]
    inline_l3: bool,
    #[serde(default = "default_true")]
    inline_l4: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawRestart {
    #[serde(default)]
    status: i64,
}

fn default_one() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_noti_file() -> PathBuf {
    PathBuf::from("notifications.log")
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dedicated-head mode enabled.
    pub head: bool,
    pub node_size: u32,
    pub group_size: u32,
    /// Node-local checkpoint tree root (tiers 1-3).
    pub ckpt_dir: PathBuf,
    /// Parallel-filesystem root (tier 4 and staging).
    pub glob_dir: PathBuf,
    /// Metadata tree root.
    pub meta_dir: PathBuf,
    /// Notification log the reactor polls.
    pub noti_file: PathBuf,
    pub verbosity: Verbosity,
    /// Promote the last checkpoint to the archival tier at finalize.
    pub keep_last: bool,
    /// Per-tier base intervals in minutes, L1..L4.
    pub intervals: [u32; 4],
    /// Per-tier inline flags, L1..L4. L1 and L4 are always inline.
    pub inline: [bool; 4],
    pub restart: RestartStatus,
    pub injection: Option<InjectionConfig>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_raw(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let restart = RestartStatus::from_code(raw.restart.status)?;
        if !raw.checkpoint.inline_l4 {
            tracing::warn!("inline_l4 = false is ignored; the archival tier is always inline");
        }
        Ok(Self {
            head: raw.basic.head,
            node_size: raw.basic.node_size,
            group_size: raw.basic.group_size,
            ckpt_dir: raw.basic.ckpt_dir,
            glob_dir: raw.basic.glob_dir,
            meta_dir: raw.basic.meta_dir,
            noti_file: raw.basic.noti_file,
            verbosity: raw.basic.verbosity,
            keep_last: raw.basic.keep_last,
            intervals: [
                raw.checkpoint.ckpt_l1,
                raw.checkpoint.ckpt_l2,
                raw.checkpoint.ckpt_l3,
                raw.checkpoint.ckpt_l4,
            ],
            // L1 has no offload work worth shipping and L4 is collective
            // across the parallel filesystem, so both stay inline.
            inline: [true, raw.checkpoint.inline_l2, raw.checkpoint.inline_l3, true],
            restart,
            injection: raw.injection,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, interval) in self.intervals.iter().enumerate() {
            if *interval == 0 {
                return Err(ConfigError::Invalid(format!(
                    "checkpoint interval for L{} must be at least one minute",
                    i + 1
                )));
            }
        }
        if self.group_size == 0 {
            return Err(ConfigError::Invalid("group_size must be positive".into()));
        }
        if self.node_size == 0 {
            return Err(ConfigError::Invalid("node_size must be positive".into()));
        }
        if self.ckpt_dir == self.glob_dir {
            return Err(ConfigError::Invalid(
                "ckpt_dir and glob_dir must be distinct trees".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
