// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The multi-level checkpoint state machine.
//!
//! Idle → Writing → { PostProc | Offloaded } → Idle. Draining the previous
//! offload reply at entry bounds offload latency to one checkpoint period
//! and guarantees at most one in-flight post-processing task per rank; it
//! also means the head observes `(ckpt_id, level)` strictly in call order.
//! A failed checkpoint never advances `last_ckpt_level`.

use crate::error::CkptError;
use crate::policy::LevelTable;
use std::sync::Arc;
use std::time::Instant;
use strata_core::{ExecState, Level, Registry, Topology};
use strata_head::{HeadReply, RankLink, RankMessage};
use strata_storage::{writer, Layout, Postprocessor};
use tracing::{debug, error, info, warn};

pub struct Controller {
    layout: Layout,
    post: Box<dyn Postprocessor>,
    /// Shared with the rank's finalize barrier.
    link: Option<Arc<dyn RankLink>>,
}

impl Controller {
    pub fn new(
        layout: Layout,
        post: Box<dyn Postprocessor>,
        link: Option<Arc<dyn RankLink>>,
    ) -> Self {
        Self { layout, post, link }
    }

    pub fn has_link(&self) -> bool {
        self.link.is_some()
    }

    /// Block until the previous offload's reply arrives and adopt the
    /// head's acknowledged level. No-op when nothing is in flight.
    pub fn drain(&mut self, exec: &mut ExecState) -> Result<(), CkptError> {
        if !exec.was_last_offline {
            return Ok(());
        }
        let link = self.link.as_ref().ok_or(CkptError::NoHeadLink)?;
        let started = Instant::now();
        let reply = link.recv()?;
        exec.was_last_offline = false;
        match reply {
            HeadReply::Done { ckpt_id, level } => {
                exec.last_ckpt_level = Some(level);
                debug!(
                    ckpt_id,
                    %level,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "offload reply drained"
                );
            }
            HeadReply::Rejected { ckpt_id } => {
                warn!(ckpt_id, "head rejected previous checkpoint");
            }
            HeadReply::BarrierReleased => {
                return Err(strata_head::ProtocolError::Violation(
                    "expected checkpoint reply, got barrier release".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Take one checkpoint at `level`; see the state table above.
    pub fn checkpoint(
        &mut self,
        exec: &mut ExecState,
        levels: &LevelTable,
        registry: &Registry,
        topo: &Topology,
        ckpt_id: u64,
        level: Level,
    ) -> Result<(), CkptError> {
        self.drain(exec)?;
        exec.ckpt_id = ckpt_id;
        exec.ckpt_level = Some(level);
        let rank = topo.split_rank;
        let path = self.layout.ckpt_path(level, topo.group_id, rank, ckpt_id);

        let write_started = Instant::now();
        let write_result = writer::write_checkpoint(registry, &path);
        match &write_result {
            Ok(bytes) => info!(
                ckpt_id,
                %level,
                rank,
                bytes,
                elapsed_ms = write_started.elapsed().as_millis() as u64,
                "checkpoint written"
            ),
            Err(err) => error!(ckpt_id, %level, rank, %err, "checkpoint write failed"),
        }

        if !levels.is_inline(level) {
            let link = self.link.as_ref().ok_or(CkptError::NoHeadLink)?;
            let msg = match &write_result {
                Ok(_) => RankMessage::WriteDone { ckpt_id, level },
                Err(_) => RankMessage::WriteFailed { ckpt_id },
            };
            link.send(msg)?;
            exec.was_last_offline = true;
            debug!(ckpt_id, %level, rank, "post-processing offloaded");
            write_result.map(|_| ()).map_err(CkptError::from)
        } else {
            write_result?;
            let post_started = Instant::now();
            self.post.process(level, rank, ckpt_id).inspect_err(
                |err| error!(ckpt_id, %level, rank, %err, "post-processing failed"),
            )?;
            info!(
                ckpt_id,
                %level,
                rank,
                elapsed_ms = post_started.elapsed().as_millis() as u64,
                "post-processing complete"
            );
            exec.was_last_offline = false;
            exec.last_ckpt_level = Some(level);
            Ok(())
        }
    }

    /// Tell the head this rank is finalizing. No-op without a link.
    pub fn send_end(&mut self) -> Result<(), CkptError> {
        if let Some(link) = &self.link {
            link.send(RankMessage::End)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
