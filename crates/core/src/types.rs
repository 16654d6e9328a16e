// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Element type descriptors.
//!
//! Payloads are opaque byte runs; element size is the only semantic
//! attribute the library relies on. The kind tag exists so fault injection
//! (and future endian-aware codecs) can specialize on floating-point
//! elements without the library growing type awareness anywhere else.

use serde::{Deserialize, Serialize};

/// What kind of element a descriptor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Char,
    Short,
    Int,
    Long,
    UnsignedChar,
    UnsignedShort,
    UnsignedInt,
    UnsignedLong,
    Float,
    Double,
    LongDouble,
    /// Application-defined composite; size is all we know.
    Composite,
}

impl TypeKind {
    /// True for the element kinds fault injection supports.
    pub fn is_float(self) -> bool {
        matches!(self, TypeKind::Float | TypeKind::Double)
    }
}

/// An identified element type: `id` for registry bookkeeping, `size` in
/// bytes for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub id: u32,
    pub size: usize,
    pub kind: TypeKind,
}

/// Sizes of the primitive set, registered in a fixed order at startup so
/// their ids are stable across runs.
const PRIMITIVES: [(TypeKind, usize); 11] = [
    (TypeKind::Char, 1),
    (TypeKind::Short, 2),
    (TypeKind::Int, 4),
    (TypeKind::Long, 8),
    (TypeKind::UnsignedChar, 1),
    (TypeKind::UnsignedShort, 2),
    (TypeKind::UnsignedInt, 4),
    (TypeKind::UnsignedLong, 8),
    (TypeKind::Float, 4),
    (TypeKind::Double, 8),
    (TypeKind::LongDouble, 16),
];

/// Assigns type ids: the primitive set gets fixed ids at startup,
/// application composites get successive ids after it.
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: Vec<TypeDescriptor>,
}

impl TypeTable {
    /// A table pre-populated with the primitive descriptors.
    pub fn with_primitives() -> Self {
        let types = PRIMITIVES
            .iter()
            .enumerate()
            .map(|(id, &(kind, size))| TypeDescriptor {
                id: id as u32,
                size,
                kind,
            })
            .collect();
        Self { types }
    }

    /// Register an application-defined composite of `size` bytes and hand
    /// back its descriptor.
    pub fn init_type(&mut self, size: usize) -> TypeDescriptor {
        let ty = TypeDescriptor {
            id: self.types.len() as u32,
            size,
            kind: TypeKind::Composite,
        };
        self.types.push(ty);
        ty
    }

    /// Look up a primitive descriptor by kind. `None` for `Composite`.
    pub fn primitive(&self, kind: TypeKind) -> Option<TypeDescriptor> {
        if kind == TypeKind::Composite {
            return None;
        }
        self.types.iter().copied().find(|t| t.kind == kind)
    }

    /// Number of registered types, primitives included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::with_primitives()
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
