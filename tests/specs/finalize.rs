//! S5: keep-last promotion to the archival tier.

use crate::prelude::{write_config, ConfigOptions};
use strata_config::{read_status, RestartStatus};
use strata_core::{MemRegion, Topology, TypeKind};
use strata_engine::Context;

#[test]
fn finalize_promotes_the_last_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &ConfigOptions {
            keep_last: true,
            ..ConfigOptions::default()
        },
    );
    let mut context = Context::init(&config, Topology::solo(), None).unwrap();
    let payload: Vec<f64> = (0..64).map(|i| i as f64 * 2.0).collect();
    let region = MemRegion::from_f64s(&payload);
    let double = context.primitive(TypeKind::Double).unwrap();
    context.protect(1, &region, 64, double).unwrap();

    context.checkpoint(1, 2).unwrap();
    let l2_bytes = std::fs::read(
        dir.path()
            .join("ckpt")
            .join("l2")
            .join("0")
            .join("rank-0-ckpt-1"),
    )
    .unwrap();

    context.finalize().unwrap();

    // The archival tier now holds the last L2 content verbatim.
    let archived = dir
        .path()
        .join("glob")
        .join("l4")
        .join("0")
        .join("rank-0-ckpt-1");
    assert_eq!(std::fs::read(&archived).unwrap(), l2_bytes);

    // The sentinel advertises the promoted checkpoint.
    assert_eq!(read_status(&config).unwrap(), RestartStatus::KeepLast);

    // Local tiers and staging are reclaimed.
    assert!(!dir.path().join("ckpt").join("l2").join("0").exists());
    assert!(!dir.path().join("glob").join("gtmp").exists());
}

#[test]
fn a_restart_can_recover_from_the_promoted_archive() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &ConfigOptions {
            keep_last: true,
            ..ConfigOptions::default()
        },
    );
    let payload = [9.75f64, -1.25, 0.5];
    {
        let mut context = Context::init(&config, Topology::solo(), None).unwrap();
        let region = MemRegion::from_f64s(&payload);
        let double = context.primitive(TypeKind::Double).unwrap();
        context.protect(1, &region, 3, double).unwrap();
        context.checkpoint(1, 2).unwrap();
        context.finalize().unwrap();
    }

    let mut restarted = Context::init(&config, Topology::solo(), None).unwrap();
    assert!(restarted.status(), "keep-last sentinel arms recovery");
    let region = MemRegion::zeroed(24);
    let double = restarted.primitive(TypeKind::Double).unwrap();
    restarted.protect(1, &region, 3, double).unwrap();

    restarted.recover().unwrap();
    assert_eq!(region.to_f64s(), payload);
}

#[test]
fn without_keep_last_nothing_survives() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &ConfigOptions::default());
    let mut context = Context::init(&config, Topology::solo(), None).unwrap();
    let region = MemRegion::zeroed(16);
    let double = context.primitive(TypeKind::Double).unwrap();
    context.protect(1, &region, 2, double).unwrap();
    context.checkpoint(1, 2).unwrap();

    context.finalize().unwrap();

    assert_eq!(read_status(&config).unwrap(), RestartStatus::Fresh);
    assert!(!dir.path().join("glob").join("l4").join("0").exists());
    assert!(!dir.path().join("ckpt").join("l2").join("0").exists());
}
