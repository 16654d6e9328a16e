//! S1: inline L1 round-trip across two ranks.

use crate::prelude::{write_config, ConfigOptions};
use strata_core::{MemRegion, Topology, TypeKind};
use strata_engine::Context;

fn app_rank(rank: u32, nb: u32) -> Topology {
    Topology {
        my_rank: rank,
        split_rank: rank,
        nb_proc: nb,
        am_i_a_head: false,
        head_rank: 0,
        group_id: 0,
        group_rank: rank,
        group_size: nb,
        nb_heads: 0,
    }
}

#[test]
fn two_ranks_roundtrip_their_doubles() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &ConfigOptions::default());

    let mut regions = Vec::new();
    for rank in 0..2u32 {
        let mut context = Context::init(&config, app_rank(rank, 2), None).unwrap();
        // Rank-local sequence: rank*10_000 + i.
        let values: Vec<f64> = (0..1024).map(|i| f64::from(rank * 10_000 + i)).collect();
        let region = MemRegion::from_f64s(&values);
        let double = context.primitive(TypeKind::Double).unwrap();
        context.protect(1, &region, 1024, double).unwrap();

        context.checkpoint(1, 1).unwrap();
        regions.push((region, values, context));
    }

    // Simulate a blown-away working set, then recover in place.
    for (region, values, context) in &mut regions {
        region.zero();
        assert!(region.to_f64s().iter().all(|v| *v == 0.0));
        context.recover().unwrap();
        assert_eq!(&region.to_f64s(), values);
    }
}

#[test]
fn a_fresh_process_recovers_the_same_image() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &ConfigOptions::default());
    let values: Vec<f64> = (0..256).map(|i| i as f64 * 0.25).collect();

    {
        let mut context = Context::init(&config, app_rank(0, 1), None).unwrap();
        let region = MemRegion::from_f64s(&values);
        let double = context.primitive(TypeKind::Double).unwrap();
        context.protect(42, &region, 256, double).unwrap();
        context.checkpoint(1, 1).unwrap();
        // Process "dies" here: no finalize.
    }

    let mut restarted = Context::init(&config, app_rank(0, 1), None).unwrap();
    assert!(restarted.status(), "unfinalized run must arm recovery");
    let region = MemRegion::zeroed(2048);
    let double = restarted.primitive(TypeKind::Double).unwrap();
    restarted.protect(42, &region, 256, double).unwrap();

    restarted.snapshot().unwrap();
    assert_eq!(region.to_f64s(), values);
    assert!(!restarted.status());
}
