//! S6/S7: registry replacement and idempotence through the public API.

use crate::prelude::{ckpt_file, write_config, ConfigOptions};
use strata_core::{MemRegion, Topology, TypeKind};
use strata_engine::Context;

#[test]
fn reprotecting_an_id_shrinks_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &ConfigOptions::default());
    let mut context = Context::init(&config, Topology::solo(), None).unwrap();
    let double = context.primitive(TypeKind::Double).unwrap();
    let float = context.primitive(TypeKind::Float).unwrap();

    let p = MemRegion::zeroed(800);
    context.protect(7, &p, 100, double).unwrap();
    assert_eq!(context.ckpt_size(), 800);

    let q = MemRegion::from_f32s(&[1.0; 50]);
    context.protect(7, &q, 50, float).unwrap();
    // Delta is 50*4 - 100*8.
    assert_eq!(context.ckpt_size(), 200);
    assert_eq!(context.nb_vars(), 1);

    // The next checkpoint writes 200 bytes for id 7.
    context.checkpoint(1, 1).unwrap();
    let file = ckpt_file(dir.path(), 1, 0, 0, 1);
    assert_eq!(std::fs::metadata(file).unwrap().len(), 200);
}

#[test]
fn identical_protect_calls_change_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &ConfigOptions::default());
    let mut context = Context::init(&config, Topology::solo(), None).unwrap();
    let double = context.primitive(TypeKind::Double).unwrap();
    let region = MemRegion::zeroed(160);

    context.protect(3, &region, 20, double).unwrap();
    let size = context.ckpt_size();
    let vars = context.nb_vars();

    context.protect(3, &region, 20, double).unwrap();
    assert_eq!(context.ckpt_size(), size);
    assert_eq!(context.nb_vars(), vars);
}

#[test]
fn composite_types_checkpoint_like_primitives() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &ConfigOptions::default());
    let mut context = Context::init(&config, Topology::solo(), None).unwrap();

    // A 24-byte application struct, three of them.
    let cell = context.init_type(24);
    let region = MemRegion::from_vec((0..72u8).collect());
    context.protect(1, &region, 3, cell).unwrap();
    assert_eq!(context.ckpt_size(), 72);

    context.checkpoint(1, 1).unwrap();
    region.zero();
    context.recover().unwrap();
    assert_eq!(region.to_vec(), (0..72u8).collect::<Vec<u8>>());
}
