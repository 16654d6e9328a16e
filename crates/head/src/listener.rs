// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The head's listen loop.
//!
//! A single-threaded cooperative dispatcher driven by a blocking receive:
//! at most one post-processing task runs at a time per group, and replies
//! go out in the order work arrives. The loop runs until every
//! application rank in the group has sent `End` and every finalize
//! barrier round has been released — the head participates in the final
//! barrier by refusing to exit before it, so the process cannot tear down
//! under ranks that are still finalizing. If an application rank never
//! finalizes, the head never exits.

use crate::link::HeadLink;
use crate::protocol::{Envelope, HeadReply, RankMessage};
use strata_storage::Postprocessor;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end the listen loop early.
#[derive(Debug, Error)]
pub enum HeadError {
    #[error("protocol error: {0}")]
    Protocol(#[from] crate::protocol::ProtocolError),
}

/// Counters from a completed listen loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenSummary {
    /// Post-processing tasks that succeeded.
    pub processed: u64,
    /// Tasks rejected, either by a failed write upstream or a failed
    /// post-processing step here.
    pub rejected: u64,
}

/// Serve one group until all `live_ranks` application ranks have ended
/// and `barrier_rounds` finalize barriers have been released.
///
/// A barrier round releases once every rank in the group has announced
/// arrival; each rank's announcement follows its earlier messages on the
/// link, so a released round implies all post-processing requested before
/// it is done.
pub fn listen<L>(
    link: &L,
    post: &mut dyn Postprocessor,
    live_ranks: usize,
    barrier_rounds: usize,
) -> Result<ListenSummary, HeadError>
where
    L: HeadLink + ?Sized,
{
    let mut live = live_ranks;
    let mut rounds = barrier_rounds;
    let mut arrived: Vec<u32> = Vec::with_capacity(live_ranks);
    let mut summary = ListenSummary::default();
    info!(live_ranks, barrier_rounds, "head listening");
    while live > 0 || rounds > 0 {
        let Envelope { rank, msg } = link.recv()?;
        match msg {
            RankMessage::End => {
                live -= 1;
                debug!(rank, live, "rank finalized");
            }
            RankMessage::Barrier => {
                arrived.push(rank);
                if arrived.len() == live_ranks {
                    for rank in arrived.drain(..) {
                        link.send(rank, HeadReply::BarrierReleased)?;
                    }
                    rounds = rounds.saturating_sub(1);
                    debug!(remaining = rounds, "barrier round released");
                }
            }
            RankMessage::WriteDone { ckpt_id, level } => {
                match post.process(level, rank, ckpt_id) {
                    Ok(()) => {
                        summary.processed += 1;
                        info!(rank, ckpt_id, %level, "post-processing done");
                        link.send(rank, HeadReply::Done { ckpt_id, level })?;
                    }
                    Err(err) => {
                        summary.rejected += 1;
                        warn!(rank, ckpt_id, %level, %err, "post-processing failed");
                        link.send(rank, HeadReply::Rejected { ckpt_id })?;
                    }
                }
            }
            RankMessage::WriteFailed { ckpt_id } => {
                summary.rejected += 1;
                warn!(rank, ckpt_id, "rank write failed; nothing to post-process");
                link.send(rank, HeadReply::Rejected { ckpt_id })?;
            }
        }
    }
    info!(
        processed = summary.processed,
        rejected = summary.rejected,
        "head stopped listening"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
