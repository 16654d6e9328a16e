// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::write_checkpoint;
use strata_core::{MemRegion, Registry, TypeKind, TypeTable};

#[test]
fn datasets_concatenate_in_registration_order() {
    let types = TypeTable::with_primitives();
    let ch = types.primitive(TypeKind::Char).unwrap();
    let mut registry = Registry::new();
    registry
        .protect(10, MemRegion::from_vec(vec![1, 2, 3]), 3, ch)
        .unwrap();
    registry
        .protect(5, MemRegion::from_vec(vec![9, 8]), 2, ch)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("l1/0/rank-0-ckpt-1");
    let written = write_checkpoint(&registry, &path).unwrap();

    assert_eq!(written, registry.ckpt_size());
    assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 9, 8]);
}

#[test]
fn file_size_equals_image_size() {
    let types = TypeTable::with_primitives();
    let double = types.primitive(TypeKind::Double).unwrap();
    let mut registry = Registry::new();
    let values: Vec<f64> = (0..1024).map(f64::from).collect();
    registry
        .protect(1, MemRegion::from_f64s(&values), 1024, double)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rank-0-ckpt-7");
    write_checkpoint(&registry, &path).unwrap();

    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        registry.ckpt_size()
    );
}

#[test]
fn empty_registry_writes_an_empty_file() {
    let registry = Registry::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rank-0-ckpt-1");
    assert_eq!(write_checkpoint(&registry, &path).unwrap(), 0);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn unwritable_target_errors() {
    let dir = tempfile::tempdir().unwrap();
    // A plain file where a directory is needed.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let registry = Registry::new();
    assert!(write_checkpoint(&registry, &blocker.join("rank-0-ckpt-1")).is_err());
}
