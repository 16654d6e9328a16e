// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rank ↔ head message protocol.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. The
//! messages are tagged variants rather than encoded integer sentinels, so
//! invalid transitions are unrepresentable on the wire.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strata_core::Level;
use thiserror::Error;

/// Message from an application rank to its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RankMessage {
    /// A checkpoint file landed; run the level post-processor.
    WriteDone { ckpt_id: u64, level: Level },
    /// The application-side write failed; nothing to post-process.
    WriteFailed { ckpt_id: u64 },
    /// This rank is finalizing.
    End,
    /// This rank reached a finalize barrier and blocks for the release.
    Barrier,
}

/// Reply from the head to an application rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HeadReply {
    /// Post-processing succeeded at this level.
    Done { ckpt_id: u64, level: Level },
    /// The requested post-processing step cannot proceed; the checkpoint
    /// counts as failed but the run continues.
    Rejected { ckpt_id: u64 },
    /// Every rank in the group reached the barrier; proceed.
    BarrierReleased,
}

/// A rank message plus its sender's split rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub rank: u32,
    pub msg: RankMessage,
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("peer disconnected")]
    Disconnected,

    #[error("protocol violation: {0}")]
    Violation(String),
}

/// Maximum message size (64 KB). Only control traffic travels this
/// channel; checkpoint payloads never do.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Encode a message to JSON bytes (without length prefix).
///
/// Use with [`crate::wire::write_message`], which handles the framing.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: json.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(json)
}

/// Decode a message from wire format.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
