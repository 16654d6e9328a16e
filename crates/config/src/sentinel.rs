// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The restart sentinel.
//!
//! An integer in the config file's `[restart]` section records how the
//! previous run ended: 0 fresh, 1 in progress (a crash leaves this behind,
//! signalling recovery), 2 keep-last checkpoint available. Rank 0 rewrites
//! it at init and finalize; write-temp-then-rename keeps the update atomic
//! for concurrent readers.

use crate::config::ConfigError;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartStatus {
    /// Previous run finalized cleanly; start fresh.
    #[default]
    Fresh,
    /// A run is (or was) underway; restart must recover.
    InProgress,
    /// Previous run finalized with its last checkpoint promoted.
    KeepLast,
}

impl RestartStatus {
    pub fn from_code(code: i64) -> Result<Self, ConfigError> {
        match code {
            0 => Ok(RestartStatus::Fresh),
            1 => Ok(RestartStatus::InProgress),
            2 => Ok(RestartStatus::KeepLast),
            other => Err(ConfigError::BadSentinel(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            RestartStatus::Fresh => 0,
            RestartStatus::InProgress => 1,
            RestartStatus::KeepLast => 2,
        }
    }

    /// True when a restart must rehydrate from existing checkpoints.
    pub fn requires_recovery(self) -> bool {
        self != RestartStatus::Fresh
    }
}

/// Read the sentinel without validating the rest of the file.
pub fn read_status(path: &Path) -> Result<RestartStatus, ConfigError> {
    let doc = load_table(path)?;
    let code = doc
        .get("restart")
        .and_then(|v| v.get("status"))
        .and_then(toml::Value::as_integer)
        .unwrap_or(0);
    RestartStatus::from_code(code)
}

/// Rewrite only the sentinel, preserving every other key in the file.
pub fn update_status(path: &Path, status: RestartStatus) -> Result<(), ConfigError> {
    let mut doc = load_table(path)?;
    let restart = doc
        .entry("restart")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    match restart {
        toml::Value::Table(table) => {
            table.insert("status".into(), toml::Value::Integer(status.code()));
        }
        other => {
            let mut table = toml::Table::new();
            table.insert("status".into(), toml::Value::Integer(status.code()));
            *other = toml::Value::Table(table);
        }
    }
    let text = toml::to_string_pretty(&doc)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, text).map_err(|source| ConfigError::Write {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| ConfigError::Write {
        path: path.to_owned(),
        source,
    })?;
    debug!(status = status.code(), "restart sentinel updated");
    Ok(())
}

fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
#[path = "sentinel_tests.rs"]
mod tests;
