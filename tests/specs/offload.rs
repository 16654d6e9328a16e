//! S2: L2 offload with the drain barrier.

use crate::prelude::{ckpt_file, write_config, ConfigOptions};
use std::sync::Arc;
use std::thread;
use strata_core::{Level, MemRegion, Topology, TypeKind};
use strata_engine::{run_head, Context};
use strata_head::LocalNode;

#[test]
fn offloaded_checkpoints_drain_one_period_later() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &ConfigOptions {
            inline_l2: false,
            ..ConfigOptions::default()
        },
    );

    let group_size = 2u32;
    let (head_link, rank_links) = LocalNode::new(&[0, 1]);
    let head_config = config.clone();
    let head = thread::spawn(move || {
        run_head(&head_config, &Topology::head_of(group_size), &head_link).unwrap()
    });

    // Each rank runs its full lifecycle concurrently, as real processes
    // would; only the head and the finalize barrier order the group.
    let mut workers = Vec::new();
    for (rank, link) in rank_links.into_iter().enumerate() {
        let rank = rank as u32;
        let config = config.clone();
        let root = dir.path().to_path_buf();
        workers.push(thread::spawn(move || {
            let mut context = Context::init(
                &config,
                Topology::with_head(rank, group_size),
                Some(Arc::new(link)),
            )
            .unwrap();
            let region = MemRegion::from_f64s(&[f64::from(rank); 32]);
            let double = context.primitive(TypeKind::Double).unwrap();
            context.protect(1, &region, 32, double).unwrap();

            // The first offload returns immediately; nothing acknowledged yet.
            context.checkpoint(1, 2).unwrap();
            assert_eq!(context.last_ckpt_level(), None);

            // The second call blocks until the head's reply for id 1 arrives.
            context.checkpoint(2, 2).unwrap();
            assert_eq!(context.last_ckpt_level(), Some(Level::L2));

            // This rank's files are on disk before finalize reclaims them.
            assert!(ckpt_file(&root, 2, 0, rank, 1).is_file());
            assert!(ckpt_file(&root, 2, 0, rank, 2).is_file());

            // Finalize drains the reply for id 2, then the barrier holds
            // cleanup until every rank (and the head's queue) is done.
            context.finalize().unwrap();
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }

    let summary = head.join().unwrap();
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.rejected, 0);

    // Nothing survives a finalize without keep_last.
    assert!(!dir.path().join("ckpt").join("l2").join("0").exists());
}
