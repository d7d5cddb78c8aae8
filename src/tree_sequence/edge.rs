//! Edge storage.

use crate::ids::NodeId;

/// Stable index of an edge inside the [`super::builder::TreeSequenceBuilder`]'s
/// edge arena, taking the place of a pointer into a linked edge list.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct EdgeId(pub usize);

/// One edge: over `[left, right)` in site coordinates, `child` copies from
/// `parent`.
///
/// `end` caches the effective right endpoint under path-compressed
/// indexing. `right` is always the edge's current, authoritative right
/// endpoint, the value invariants and `dump_edges` are checked against.
/// `end` records what `right` would have been before
/// `TSI_RESOLVE_SHARED_RECOMBS` coalescing rewrote this edge to terminate
/// at a synthetic intermediate node; when coalescing is disabled, or an
/// edge was never rewritten, `end == right`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    pub left: i32,
    pub right: i32,
    pub end: i32,
    pub parent: NodeId,
    pub child: NodeId,
    pub time: f64,
}

impl EdgeRecord {
    pub fn new(left: i32, right: i32, parent: NodeId, child: NodeId, time: f64) -> Self {
        Self {
            left,
            right,
            end: right,
            parent,
            child,
            time,
        }
    }
}
