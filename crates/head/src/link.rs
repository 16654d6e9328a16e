// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node links: the message stream between application ranks and their head.
//!
//! The only mutable state shared between application and head is this
//! stream. Both sides block on receive; there is no polling.

use crate::protocol::{Envelope, HeadReply, ProtocolError, RankMessage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::mpsc;

/// Application-rank side of the node link.
///
/// `Sync` so one link can back both the controller and the finalize
/// barrier of its rank.
pub trait RankLink: Send + Sync {
    fn send(&self, msg: RankMessage) -> Result<(), ProtocolError>;

    /// Blocking receive of the head's next reply to this rank.
    fn recv(&self) -> Result<HeadReply, ProtocolError>;
}

/// Head side of the node link.
pub trait HeadLink: Send {
    /// Blocking receive of the next rank message, any sender.
    fn recv(&self) -> Result<Envelope, ProtocolError>;

    fn send(&self, rank: u32, reply: HeadReply) -> Result<(), ProtocolError>;
}

/// In-process link for single-process nodes and tests: one head, N ranks,
/// plain channels.
pub struct LocalNode;

impl LocalNode {
    /// Wire up one head and the given application split ranks.
    pub fn new(ranks: &[u32]) -> (LocalHeadLink, Vec<LocalRankLink>) {
        let (to_head, from_ranks) = mpsc::channel();
        let mut peers = HashMap::new();
        let mut rank_links = Vec::with_capacity(ranks.len());
        for &rank in ranks {
            let (to_rank, from_head) = mpsc::channel();
            peers.insert(rank, to_rank);
            rank_links.push(LocalRankLink {
                rank,
                tx: Mutex::new(to_head.clone()),
                rx: Mutex::new(from_head),
            });
        }
        (
            LocalHeadLink {
                rx: from_ranks,
                peers,
            },
            rank_links,
        )
    }
}

pub struct LocalRankLink {
    rank: u32,
    tx: Mutex<mpsc::Sender<Envelope>>,
    rx: Mutex<mpsc::Receiver<HeadReply>>,
}

impl RankLink for LocalRankLink {
    fn send(&self, msg: RankMessage) -> Result<(), ProtocolError> {
        self.tx
            .lock()
            .send(Envelope {
                rank: self.rank,
                msg,
            })
            .map_err(|_| ProtocolError::Disconnected)
    }

    fn recv(&self) -> Result<HeadReply, ProtocolError> {
        self.rx.lock().recv().map_err(|_| ProtocolError::Disconnected)
    }
}

pub struct LocalHeadLink {
    rx: mpsc::Receiver<Envelope>,
    peers: HashMap<u32, mpsc::Sender<HeadReply>>,
}

impl HeadLink for LocalHeadLink {
    fn recv(&self) -> Result<Envelope, ProtocolError> {
        self.rx.recv().map_err(|_| ProtocolError::Disconnected)
    }

    fn send(&self, rank: u32, reply: HeadReply) -> Result<(), ProtocolError> {
        self.peers
            .get(&rank)
            .ok_or(ProtocolError::Disconnected)?
            .send(reply)
            .map_err(|_| ProtocolError::Disconnected)
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
