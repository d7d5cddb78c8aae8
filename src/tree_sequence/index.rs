//! The three ordered edge indexes.
//!
//! Each index here is a `BTreeMap` keyed by an explicit sort-key tuple
//! type. `BTreeMap` already gives insert, remove, get, and in-order
//! (`.iter()`) traversal, so no hand-rolled balanced-tree logic is
//! needed; the comparator is simply each key type's derived `Ord`.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use super::edge::EdgeId;
use crate::ids::NodeId;

/// `(left, parent_time ascending, parent, child)`: the left index enables
/// left-to-right tree streaming, edges-in by increasing left.
pub type LeftKey = (i32, OrderedFloat<f64>, i32, i32);

/// `(right, parent_time descending, parent, child)`: the right index
/// enables edges-out by increasing right.
pub type RightKey = (i32, Reverse<OrderedFloat<f64>>, i32, i32);

/// `(parent, child, left)`: the path index gives an O(log n) lookup of an
/// existing edge to extend.
pub type PathKey = (i32, i32, i32);

pub fn left_key(e: &super::edge::EdgeRecord) -> LeftKey {
    (e.left, OrderedFloat(e.time), e.parent.0, e.child.0)
}

pub fn right_key(e: &super::edge::EdgeRecord) -> RightKey {
    (e.right, Reverse(OrderedFloat(e.time)), e.parent.0, e.child.0)
}

pub fn path_key(e: &super::edge::EdgeRecord) -> PathKey {
    (e.parent.0, e.child.0, e.left)
}

/// Bundles the three edge indexes. Each is kept in exact 1:1
/// correspondence with the edge arena: every edge has exactly one entry
/// in each index.
#[derive(Debug, Default)]
pub struct EdgeIndexes {
    pub left: BTreeMap<LeftKey, EdgeId>,
    pub right: BTreeMap<RightKey, EdgeId>,
    pub path: BTreeMap<PathKey, EdgeId>,
}

impl EdgeIndexes {
    pub fn insert(&mut self, edge: &super::edge::EdgeRecord, id: EdgeId) {
        self.left.insert(left_key(edge), id);
        self.right.insert(right_key(edge), id);
        self.path.insert(path_key(edge), id);
    }

    pub fn remove(&mut self, edge: &super::edge::EdgeRecord) {
        self.left.remove(&left_key(edge));
        self.right.remove(&right_key(edge));
        self.path.remove(&path_key(edge));
    }

    /// Find an existing edge for `(parent, child)` whose effective right
    /// endpoint equals `left`, the lookup used to extend a path rather
    /// than appending a fresh edge. `O(log n)` via a bounded range query
    /// on the path index rather than a linear scan.
    pub fn find_extendable(
        &self,
        parent: NodeId,
        child: NodeId,
        left: i32,
        effective_right: impl Fn(EdgeId) -> i32,
    ) -> Option<EdgeId> {
        let upper = (parent.0, child.0, left);
        let lower = (parent.0, child.0, i32::MIN);
        self.path
            .range(lower..upper)
            .next_back()
            .map(|(_, &id)| id)
            .filter(|&id| effective_right(id) == left)
    }

    /// All edges whose `left` equals `site`, in no particular order among
    /// themselves (the matcher applies them as a set).
    pub fn starting_at(&self, site: i32) -> impl Iterator<Item = EdgeId> + '_ {
        let lower = (site, OrderedFloat(f64::NEG_INFINITY), i32::MIN, i32::MIN);
        let upper = (site, OrderedFloat(f64::INFINITY), i32::MAX, i32::MAX);
        self.left.range(lower..=upper).map(|(_, &id)| id)
    }

    /// All edges whose `right` equals `site`.
    pub fn ending_at(&self, site: i32) -> impl Iterator<Item = EdgeId> + '_ {
        let lower = (site, Reverse(OrderedFloat(f64::INFINITY)), i32::MIN, i32::MIN);
        let upper = (site, Reverse(OrderedFloat(f64::NEG_INFINITY)), i32::MAX, i32::MAX);
        self.right.range(lower..=upper).map(|(_, &id)| id)
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.path.clear();
    }
}
