//! S3: tier coincidence through the scheduler.

use crate::prelude::{ckpt_file, write_config, ConfigOptions};
use std::sync::Arc;
use std::time::Duration;
use strata_core::{FakeClock, Level, MemRegion, Topology, TypeKind};
use strata_engine::Context;

#[test]
fn the_highest_coincident_tier_fires() {
    let dir = tempfile::tempdir().unwrap();
    // L1 every minute, L2 every 2, L3 every 4; L4 far away.
    let config = write_config(
        dir.path(),
        &ConfigOptions {
            intervals: [1, 2, 4, 1000],
            ..ConfigOptions::default()
        },
    );
    let clock = FakeClock::new();
    let mut context =
        Context::init_with_clock(&config, Topology::solo(), None, Arc::new(clock.clone()))
            .unwrap();
    let region = MemRegion::zeroed(256);
    let double = context.primitive(TypeKind::Double).unwrap();
    context.protect(1, &region, 32, double).unwrap();

    for minute in 1..=4u64 {
        clock.advance(Duration::from_secs(60));
        context.snapshot().unwrap();
        assert_eq!(context.ckpt_count(), minute);
    }

    // Minute 3: only L1 matched.
    assert!(ckpt_file(dir.path(), 1, 0, 0, 3).is_file());
    assert!(!ckpt_file(dir.path(), 2, 0, 0, 3).exists());

    // Minute 4: L1, L2, and L3 coincide; only the strongest fires.
    assert!(ckpt_file(dir.path(), 3, 0, 0, 4).is_file());
    assert!(!ckpt_file(dir.path(), 1, 0, 0, 4).exists());
    assert!(!ckpt_file(dir.path(), 2, 0, 0, 4).exists());
    assert_eq!(context.last_ckpt_level(), Some(Level::L3));

    // Minute 2 went to L2.
    assert!(ckpt_file(dir.path(), 2, 0, 0, 2).is_file());
}
