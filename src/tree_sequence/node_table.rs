//! Node storage.

use crate::error::{TsinferError, TsinferResult};
use crate::flags::NodeFlags;
use crate::ids::NodeId;

/// Append-only node storage.
///
/// Row `i` is `(flags[i], time[i])`, matching the dump/restore layout
/// `(flags: u32, time: f64)`.
#[derive(Debug, Default)]
pub struct NodeTable {
    time: Vec<f64>,
    flags: Vec<NodeFlags>,
}

impl NodeTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            flags: Vec::with_capacity(capacity),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.time.len()
    }

    /// Append a row, performing no ordering validation; used both by the
    /// validated public `add_node` path and by the internal synthetic
    /// nodes that `TSI_RESOLVE_SHARED_RECOMBS` coalescing inserts, which
    /// are intentionally exempt from the insertion-order monotonicity
    /// check.
    pub fn push(&mut self, time: f64, flags: NodeFlags) -> NodeId {
        self.time.push(time);
        self.flags.push(flags);
        NodeId::from(self.time.len() - 1)
    }

    pub fn time(&self, node: NodeId) -> TsinferResult<f64> {
        self.time
            .get(node.as_usize())
            .copied()
            .ok_or_else(|| TsinferError::argument(format!("node {node} out of range")))
    }

    pub fn flags(&self, node: NodeId) -> TsinferResult<NodeFlags> {
        self.flags
            .get(node.as_usize())
            .copied()
            .ok_or_else(|| TsinferError::argument(format!("node {node} out of range")))
    }

    pub fn is_valid(&self, node: NodeId) -> bool {
        !node.is_null() && node.as_usize() < self.num_rows()
    }

    pub fn clear(&mut self) {
        self.time.clear();
        self.flags.clear();
    }

    pub fn dump(&self) -> (Vec<u32>, Vec<f64>) {
        (
            self.flags.iter().map(|f| f.bits()).collect(),
            self.time.clone(),
        )
    }

    pub fn restore(&mut self, flags: &[u32], time: &[f64]) -> TsinferResult<()> {
        if flags.len() != time.len() {
            return Err(TsinferError::argument(
                "restore_nodes: flags and time arrays must have equal length",
            ));
        }
        self.clear();
        self.time.reserve(time.len());
        self.flags.reserve(flags.len());
        for (&f, &t) in flags.iter().zip(time.iter()) {
            self.time.push(t);
            self.flags.push(NodeFlags::from_bits_truncate(f));
        }
        Ok(())
    }
}
