// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{locate, locate_in, restore};
use crate::layout::Layout;
use crate::writer::write_checkpoint;
use crate::StorageError;
use strata_core::{Level, MemRegion, Registry, TypeKind, TypeTable};
use tempfile::TempDir;

fn fixture() -> (TempDir, Layout) {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(
        dir.path().join("ckpt"),
        dir.path().join("glob"),
        dir.path().join("meta"),
    );
    (dir, layout)
}

fn registry_with(values: &[f64]) -> Registry {
    let types = TypeTable::with_primitives();
    let double = types.primitive(TypeKind::Double).unwrap();
    let mut registry = Registry::new();
    registry
        .protect(1, MemRegion::from_f64s(values), values.len() as u64, double)
        .unwrap();
    registry
}

#[test]
fn strongest_surviving_tier_wins() {
    let (_dir, layout) = fixture();
    let registry = registry_with(&[1.0, 2.0]);
    write_checkpoint(&registry, &layout.ckpt_path(Level::L1, 0, 0, 9)).unwrap();
    write_checkpoint(&registry, &layout.ckpt_path(Level::L3, 0, 0, 4)).unwrap();

    let found = locate(&layout, 0, 0).unwrap();
    assert_eq!(found.level, Level::L3);
    assert_eq!(found.ckpt_id, 4);
}

#[test]
fn newest_id_wins_within_a_tier() {
    let (_dir, layout) = fixture();
    let registry = registry_with(&[3.0]);
    write_checkpoint(&registry, &layout.ckpt_path(Level::L1, 0, 0, 2)).unwrap();
    write_checkpoint(&registry, &layout.ckpt_path(Level::L1, 0, 0, 7)).unwrap();
    write_checkpoint(&registry, &layout.ckpt_path(Level::L1, 0, 0, 5)).unwrap();

    let found = locate_in(&layout, Level::L1, 0, 0).unwrap();
    assert_eq!(found.ckpt_id, 7);
}

#[test]
fn other_ranks_files_are_ignored() {
    let (_dir, layout) = fixture();
    let registry = registry_with(&[3.0]);
    write_checkpoint(&registry, &layout.ckpt_path(Level::L1, 0, 3, 2)).unwrap();

    assert!(locate(&layout, 0, 0).is_none());
    assert!(locate(&layout, 0, 3).is_some());
}

#[test]
fn restore_is_byte_exact() {
    let (_dir, layout) = fixture();
    let values: Vec<f64> = (0..64).map(|i| i as f64 * 0.5).collect();
    let registry = registry_with(&values);
    let path = layout.ckpt_path(Level::L2, 0, 0, 1);
    write_checkpoint(&registry, &path).unwrap();

    registry.vars()[0].region.zero();
    restore(&registry, &path).unwrap();
    assert_eq!(registry.vars()[0].region.to_f64s(), values);
}

#[test]
fn size_mismatch_is_rejected() {
    let (_dir, layout) = fixture();
    let registry = registry_with(&[1.0, 2.0]);
    let path = layout.ckpt_path(Level::L1, 0, 0, 1);
    write_checkpoint(&registry, &path).unwrap();

    // Re-register with a different shape; the file no longer matches.
    let types = TypeTable::with_primitives();
    let double = types.primitive(TypeKind::Double).unwrap();
    let mut changed = Registry::new();
    changed
        .protect(1, MemRegion::zeroed(24), 3, double)
        .unwrap();

    assert!(matches!(
        restore(&changed, &path),
        Err(StorageError::SizeMismatch {
            expected: 24,
            actual: 16,
            ..
        })
    ));
}

#[test]
fn empty_tree_has_nothing_to_recover() {
    let (_dir, layout) = fixture();
    assert!(locate(&layout, 0, 0).is_none());
}
