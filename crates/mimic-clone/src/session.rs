//! Identity map of one clone operation.

use mimic_core::ObjRef;
use rustc_hash::FxHashMap;

/// Maps each source object visited so far to its copy.
///
/// A copy is registered before its own fields or elements are filled, so a
/// reference back to an object still under construction resolves to the
/// same copy. Lives for exactly one top-level clone call.
#[derive(Debug, Default)]
pub struct CloneSession {
    copies: FxHashMap<ObjRef, ObjRef>,
}

impl CloneSession {
    /// Empty session with room for `capacity` objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            copies: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Copy already made for `source`
    pub fn lookup(&self, source: ObjRef) -> Option<ObjRef> {
        self.copies.get(&source).copied()
    }

    /// Record `copy` as the copy of `source`
    pub fn register(&mut self, source: ObjRef, copy: ObjRef) {
        let previous = self.copies.insert(source, copy);
        debug_assert!(previous.is_none(), "{:?} copied twice", source);
    }

    /// Number of objects copied
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    /// Whether nothing has been copied
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}
