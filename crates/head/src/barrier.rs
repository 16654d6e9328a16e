// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier synchronization among a group's application ranks.
//!
//! Finalize has two synchronization points: every rank must have staged
//! its last checkpoint before rank 0 swaps the staging tree into the
//! archive, and no rank may clean until the swap has landed and the head
//! has drained all post-processing. The head coordinates both over the
//! node link: a rank announces arrival with [`RankMessage::Barrier`] and
//! blocks until the listen loop releases the round once the whole group
//! has arrived.

use crate::link::RankLink;
use crate::protocol::{HeadReply, ProtocolError, RankMessage};
use std::sync::Arc;

/// A synchronization point among the application ranks of a group.
pub trait Barrier: Send {
    /// Block until every participant has arrived.
    fn wait(&self) -> Result<(), ProtocolError>;
}

/// Rank-side barrier over the node link, in-process or socket alike.
///
/// Shares the rank's link with the controller; the drain discipline
/// guarantees no checkpoint reply is outstanding when a barrier runs, so
/// the next reply on the link is always the release.
pub struct LinkBarrier {
    link: Arc<dyn RankLink>,
}

impl LinkBarrier {
    pub fn new(link: Arc<dyn RankLink>) -> Self {
        Self { link }
    }
}

impl Barrier for LinkBarrier {
    fn wait(&self) -> Result<(), ProtocolError> {
        self.link.send(RankMessage::Barrier)?;
        match self.link.recv()? {
            HeadReply::BarrierReleased => Ok(()),
            reply => Err(ProtocolError::Violation(format!(
                "expected barrier release, got {reply:?}"
            ))),
        }
    }
}

/// Stand-in for deployments without a dedicated head, where collective
/// synchronization belongs to the external communicator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBarrier;

impl Barrier for NullBarrier {
    fn wait(&self) -> Result<(), ProtocolError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "barrier_tests.rs"]
mod tests;
