// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public checkpoint context.
//!
//! One opaque handle per application rank carries all library state:
//! configuration, topology, type table, registry, level policy,
//! scheduler, reactor, and the controller. Dedicated heads never hold a
//! context; [`run_head`] drives them until every rank in their group has
//! finalized.

use crate::controller::Controller;
use crate::error::CkptError;
use crate::inject::Injection;
use crate::policy::LevelTable;
use crate::reactor::{default_rules, NotificationRule, Reactor};
use crate::scheduler::SnapshotScheduler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_config::{update_status, Config, RestartStatus, Verbosity};
use strata_core::{
    Clock, ExecState, Level, MemRegion, Registry, SystemClock, Topology, TypeDescriptor, TypeKind,
    TypeTable,
};
use strata_head::{listen, Barrier, HeadLink, LinkBarrier, ListenSummary, NullBarrier, RankLink};
use strata_storage::{clean, recover, CleanScope, FsPostprocessor, Layout};
use tracing::{error, info};

/// The communication endpoint a process brings to [`launch`], matching its
/// topology role.
pub enum NodeLink {
    /// Application rank; `None` only when every tier is inline and no
    /// dedicated head serves this node.
    App(Option<Arc<dyn RankLink>>),
    /// Dedicated head.
    Head(Box<dyn HeadLink>),
}

/// What [`launch`] turned this process into.
pub enum LaunchOutcome {
    /// An application rank, ready to protect and checkpoint.
    Rank(Box<Context>),
    /// A head that has already served its group to completion.
    HeadDone(ListenSummary),
}

/// Initialize the library for this process. Head ranks are diverted into
/// the listen loop and only come back once their group has finalized;
/// application ranks receive a [`Context`].
pub fn launch(config_path: &Path, topo: Topology, link: NodeLink) -> Result<LaunchOutcome, CkptError> {
    match (topo.am_i_a_head, link) {
        (true, NodeLink::Head(head_link)) => {
            run_head(config_path, &topo, head_link.as_ref()).map(LaunchOutcome::HeadDone)
        }
        (false, NodeLink::App(rank_link)) => Context::init(config_path, topo, rank_link)
            .map(|context| LaunchOutcome::Rank(Box::new(context))),
        _ => Err(CkptError::RoleMismatch),
    }
}

/// Run the dedicated head for one node: listen until every application
/// rank in the group has sent `End` and every finalize barrier round has
/// been released. A keep-last finalize has two rounds (stage/swap and
/// pre-clean), a plain finalize one.
pub fn run_head(
    config_path: &Path,
    topo: &Topology,
    link: &dyn HeadLink,
) -> Result<ListenSummary, CkptError> {
    let config = Config::load(config_path)?;
    init_tracing(config.verbosity);
    let layout = Layout::new(&config.ckpt_dir, &config.glob_dir, &config.meta_dir);
    let mut post = FsPostprocessor::new(layout, topo.clone());
    let barrier_rounds = if config.keep_last { 2 } else { 1 };
    let summary = listen(link, &mut post, topo.group_size as usize, barrier_rounds)?;
    Ok(summary)
}

pub struct Context {
    config: Config,
    config_path: PathBuf,
    topo: Topology,
    clock: Arc<dyn Clock>,
    layout: Layout,
    types: TypeTable,
    registry: Registry,
    exec: ExecState,
    levels: LevelTable,
    scheduler: SnapshotScheduler,
    reactor: Reactor,
    controller: Controller,
    barrier: Box<dyn Barrier>,
    injection: Option<Injection>,
}

impl Context {
    /// Initialize an application rank against the system clock.
    pub fn init(
        config_path: &Path,
        topo: Topology,
        link: Option<Arc<dyn RankLink>>,
    ) -> Result<Self, CkptError> {
        Self::init_with_clock(config_path, topo, link, Arc::new(SystemClock))
    }

    /// Initialize with an injected clock; tests drive minutes manually.
    pub fn init_with_clock(
        config_path: &Path,
        topo: Topology,
        link: Option<Arc<dyn RankLink>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CkptError> {
        let config = Config::load(config_path)?;
        init_tracing(config.verbosity);
        let reco = config.restart.requires_recovery();
        if topo.split_rank == 0 {
            update_status(config_path, RestartStatus::InProgress)?;
        }
        let layout = Layout::new(&config.ckpt_dir, &config.glob_dir, &config.meta_dir);
        let levels = LevelTable::from_config(&config);
        let now = clock.now();
        let scheduler = SnapshotScheduler::new(now);
        let reactor = Reactor::new(&config.noti_file, default_rules());
        let post = FsPostprocessor::new(layout.clone(), topo.clone());
        // The finalize barrier shares the link; without a head the
        // external communicator owns collective synchronization.
        let barrier: Box<dyn Barrier> = match &link {
            Some(link) => Box::new(LinkBarrier::new(Arc::clone(link))),
            None => Box::new(NullBarrier),
        };
        let controller = Controller::new(layout.clone(), Box::new(post), link);
        let injection = config
            .injection
            .clone()
            .map(|injection| Injection::new(injection, now));
        let exec = ExecState {
            reco,
            ..ExecState::default()
        };
        info!(rank = topo.split_rank, reco, "strata initialized");
        Ok(Self {
            config,
            config_path: config_path.to_owned(),
            topo,
            clock,
            layout,
            types: TypeTable::with_primitives(),
            registry: Registry::new(),
            exec,
            levels,
            scheduler,
            reactor,
            controller,
            barrier,
            injection,
        })
    }

    /// The recovery flag: true until a successful [`Context::recover`].
    pub fn status(&self) -> bool {
        self.exec.reco
    }

    /// Register an application-defined composite type of `size` bytes.
    pub fn init_type(&mut self, size: usize) -> TypeDescriptor {
        self.types.init_type(size)
    }

    /// Look up a primitive descriptor.
    pub fn primitive(&self, kind: TypeKind) -> Option<TypeDescriptor> {
        self.types.primitive(kind)
    }

    /// Bind `region` to dataset `id`; idempotent on `id`.
    pub fn protect(
        &mut self,
        id: i32,
        region: &MemRegion,
        count: u64,
        ty: TypeDescriptor,
    ) -> Result<(), CkptError> {
        self.registry
            .protect(id, region.clone(), count, ty)
            .map_err(CkptError::from)
    }

    /// Bytes one checkpoint of this rank occupies.
    pub fn ckpt_size(&self) -> u64 {
        self.registry.ckpt_size()
    }

    /// Registered datasets.
    pub fn nb_vars(&self) -> usize {
        self.registry.len()
    }

    /// Registered types, primitives included.
    pub fn nb_types(&self) -> usize {
        self.types.len()
    }

    /// Level of the most recent checkpoint known to have completed.
    pub fn last_ckpt_level(&self) -> Option<Level> {
        self.exec.last_ckpt_level
    }

    /// Minutes ticked on the checkpoint clock.
    pub fn ckpt_count(&self) -> u64 {
        self.exec.ckpt_count
    }

    /// Effective interval of a tier, regulation included.
    pub fn current_interval(&self, level: Level) -> u32 {
        self.levels.current_interval(level)
    }

    /// Replace the notification rule table; first match wins.
    pub fn set_notification_rules(&mut self, rules: Vec<NotificationRule>) {
        self.reactor.set_rules(rules);
    }

    /// Take a checkpoint of every protected dataset at `level` (1..=4).
    pub fn checkpoint(&mut self, ckpt_id: u64, level: u8) -> Result<(), CkptError> {
        let level = Level::from_number(level).ok_or(CkptError::InvalidLevel(level))?;
        self.controller.checkpoint(
            &mut self.exec,
            &self.levels,
            &self.registry,
            &self.topo,
            ckpt_id,
            level,
        )
    }

    /// Rehydrate every protected dataset from the strongest surviving
    /// tier. The registry must match the writing run exactly.
    pub fn recover(&mut self) -> Result<(), CkptError> {
        let group = self.topo.group_id;
        let rank = self.topo.split_rank;
        let found =
            recover::locate(&self.layout, group, rank).ok_or(CkptError::NothingToRecover)?;
        recover::restore(&self.registry, &found.path)?;
        info!(
            ckpt_id = found.ckpt_id,
            level = %found.level,
            rank,
            "checkpoint data recovered"
        );
        self.exec.reco = false;
        self.exec.ckpt_id = found.ckpt_id;
        // Resume the minute clock where the surviving checkpoint left it so
        // ids keep growing monotonically across restarts.
        self.exec.ckpt_count = found.ckpt_id;
        self.exec.last_ckpt_level = Some(found.level);
        Ok(())
    }

    /// One call per iteration boundary: recover when restarting, otherwise
    /// tick the minute clock and take whatever checkpoint the policy
    /// selects.
    pub fn snapshot(&mut self) -> Result<(), CkptError> {
        if self.exec.reco {
            return self.recover();
        }
        let now = self.clock.now();
        if self.scheduler.observe_iteration(now) {
            self.exec.ckpt_count += 1;
            let minute = self.exec.ckpt_count;
            self.reactor.poll(minute, &mut self.levels);
            if let Some(level) = self.levels.select(minute) {
                return self.controller.checkpoint(
                    &mut self.exec,
                    &self.levels,
                    &self.registry,
                    &self.topo,
                    minute,
                    level,
                );
            }
        }
        Ok(())
    }

    /// Drain outstanding offload work, notify the head, optionally promote
    /// the last checkpoint to the archival tier, update the restart
    /// sentinel, and clean up.
    ///
    /// Two barriers order the group: one after staging, before rank 0
    /// swaps the staging tree into the archive, and one before cleaning,
    /// so no rank reclaims tiers a sibling is still finalizing against.
    /// The head serves both rounds and exits only after the last.
    pub fn finalize(mut self) -> Result<(), CkptError> {
        self.controller.drain(&mut self.exec)?;
        self.controller.send_end()?;
        let group = self.topo.group_id;
        if self.config.keep_last {
            if let Some(last) = self.exec.last_ckpt_level {
                if last != Level::L4 {
                    // A failed staging must not desert the barrier: log it
                    // and let the group finish with an incomplete archive.
                    if let Err(err) = self.stage_for_archive(last) {
                        error!(
                            rank = self.topo.split_rank,
                            %err,
                            "staging the last checkpoint failed"
                        );
                    }
                }
            }
            // Every rank must have staged before the swap.
            self.barrier.wait()?;
            if self.topo.split_rank == 0 {
                self.swap_archive()?;
                update_status(&self.config_path, RestartStatus::KeepLast)?;
            }
            // Nobody cleans until the swap has landed.
            self.barrier.wait()?;
            clean(&self.layout, group, CleanScope::LocalOnly)?;
        } else {
            if self.topo.split_rank == 0 {
                update_status(&self.config_path, RestartStatus::Fresh)?;
            }
            // Cleaning must wait for every rank (and the head's queue).
            self.barrier.wait()?;
            clean(&self.layout, group, CleanScope::All)?;
        }
        info!(rank = self.topo.split_rank, "strata finalized");
        Ok(())
    }

    /// Stage this rank's newest file from `last` into the global staging
    /// directory.
    fn stage_for_archive(&self, last: Level) -> Result<(), CkptError> {
        let group = self.topo.group_id;
        let rank = self.topo.split_rank;
        let Some(found) = recover::locate_in(&self.layout, last, group, rank) else {
            return Err(CkptError::NothingToRecover);
        };
        let staged = self.layout.global_tmp_path(group, rank, found.ckpt_id);
        if let Some(parent) = staged.parent() {
            std::fs::create_dir_all(parent).map_err(strata_storage::StorageError::from)?;
        }
        std::fs::copy(&found.path, &staged).map_err(strata_storage::StorageError::from)?;
        info!(ckpt_id = found.ckpt_id, tier = %last, "last checkpoint staged for archive");
        Ok(())
    }

    /// Swap the staging tree into the archival tier, metadata following
    /// the data. Rank 0 only, after the whole group has staged.
    fn swap_archive(&self) -> Result<(), CkptError> {
        let staging = self.layout.global_tmp_dir();
        if !staging.is_dir() {
            return Ok(()); // nothing staged; the archive already holds the last level
        }
        let archive = self.layout.level_root(Level::L4);
        remove_tree(&archive)?;
        std::fs::rename(staging, &archive).map_err(strata_storage::StorageError::from)?;

        if let Some(last) = self.exec.last_ckpt_level {
            let meta_from = self.layout.meta_level_root(last);
            if last != Level::L4 && meta_from.is_dir() {
                let meta_to = self.layout.meta_level_root(Level::L4);
                remove_tree(&meta_to)?;
                std::fs::rename(meta_from, meta_to)
                    .map_err(strata_storage::StorageError::from)?;
            }
        }
        info!("staging directory swapped into the archival tier");
        Ok(())
    }

    /// Clean everything and terminate the process hard. Recovery from a
    /// later restart is impossible; for operator-visible failures only.
    pub fn abort(self) -> ! {
        error!(rank = self.topo.split_rank, "aborting; cleaning all tiers");
        let _ = clean(&self.layout, self.topo.group_id, CleanScope::All);
        std::process::exit(1);
    }

    /// Inject one bit-flip into `dataset_id` per the `[injection]` config.
    pub fn bit_flip(&mut self, dataset_id: i32) -> Result<bool, CkptError> {
        let now = self.clock.now();
        let injection = self
            .injection
            .as_mut()
            .ok_or(CkptError::InjectionNotConfigured)?;
        injection
            .bit_flip(&self.registry, &self.topo, dataset_id, now)
            .map_err(CkptError::from)
    }
}

fn remove_tree(path: &Path) -> Result<(), CkptError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(CkptError::Storage(err.into())),
    }
}

fn init_tracing(verbosity: Verbosity) {
    use tracing::level_filters::LevelFilter;
    let filter = match verbosity {
        Verbosity::Quiet => LevelFilter::OFF,
        Verbosity::Error => LevelFilter::ERROR,
        Verbosity::Warn => LevelFilter::WARN,
        Verbosity::Info => LevelFilter::INFO,
        Verbosity::Debug => LevelFilter::DEBUG,
    };
    // Later contexts in the same process keep the first sink.
    let _ = tracing_subscriber::fmt()
        .with_max_level(filter)
        .try_init();
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
