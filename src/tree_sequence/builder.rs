//! The append-only tree sequence store.

use std::collections::{BTreeMap, HashSet};

use crate::alloc::{BlockAllocator, ObjectHeap};
use crate::error::{TsinferError, TsinferResult};
use crate::flags::{NodeFlags, TreeSequenceBuilderOptions};
use crate::ids::{Allele, MutationId, NodeId, SiteId};

use super::edge::{EdgeId, EdgeRecord};
use super::index::EdgeIndexes;
use super::mutation_table::MutationTable;
use super::node_table::NodeTable;

/// One segment of a copying path passed to [`TreeSequenceBuilder::add_path`]:
/// over `[left, right)`, `child` copies from `parent`.
#[derive(Copy, Clone, Debug)]
pub struct PathSegment {
    pub left: SiteId,
    pub right: SiteId,
    pub parent: NodeId,
}

#[derive(Copy, Clone, Debug)]
struct SiteInfo {
    position: f64,
    recombination_rate: f64,
}

/// An append-only store of nodes, edges, and mutations, indexed by three
/// ordered maps over edges to support efficient tree traversal during
/// matching.
#[derive(Debug)]
pub struct TreeSequenceBuilder {
    sequence_length: f64,
    sites: Vec<SiteInfo>,
    mutations: MutationTable,
    nodes: NodeTable,
    edges: ObjectHeap<EdgeRecord>,
    indexes: EdgeIndexes,
    options: TreeSequenceBuilderOptions,
    last_non_sample_time: Option<f64>,
    /// `(parent, left, right) -> current target`, used only when
    /// `TSI_RESOLVE_SHARED_RECOMBS` is enabled. The target is either a
    /// plain child (no coalescence has happened yet for this breakpoint)
    /// or a synthetic intermediate node.
    shared_recomb_targets: BTreeMap<(i32, i32, i32), NodeId>,
    synthetic_nodes: HashSet<NodeId>,
    block_allocator: BlockAllocator,
}

impl TreeSequenceBuilder {
    /// `positions` must be strictly increasing and `recombination_rates`
    /// the same length; both become immutable for the builder's lifetime.
    pub fn new(
        sequence_length: f64,
        positions: &[f64],
        recombination_rates: &[f64],
        options: TreeSequenceBuilderOptions,
    ) -> TsinferResult<Self> {
        if positions.len() != recombination_rates.len() {
            return Err(TsinferError::argument(
                "positions and recombination_rates must have equal length",
            ));
        }
        if positions.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(TsinferError::argument(
                "positions must be strictly increasing",
            ));
        }
        if positions.iter().any(|&p| p < 0.0 || p >= sequence_length) {
            return Err(TsinferError::argument(
                "positions must lie within [0, sequence_length)",
            ));
        }
        let sites = positions
            .iter()
            .zip(recombination_rates.iter())
            .map(|(&position, &recombination_rate)| SiteInfo {
                position,
                recombination_rate,
            })
            .collect::<Vec<_>>();
        let num_sites = sites.len();
        Ok(Self {
            sequence_length,
            sites,
            mutations: MutationTable::new(num_sites),
            nodes: NodeTable::with_capacity(options.nodes_chunk_size),
            edges: ObjectHeap::with_capacity(options.edges_chunk_size),
            indexes: EdgeIndexes::default(),
            options,
            last_non_sample_time: None,
            shared_recomb_targets: BTreeMap::new(),
            synthetic_nodes: HashSet::new(),
            block_allocator: BlockAllocator::new(options.edges_chunk_size * 64),
        })
    }

    pub fn sequence_length(&self) -> f64 {
        self.sequence_length
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn position(&self, site: SiteId) -> TsinferResult<f64> {
        self.sites
            .get(site.as_usize())
            .map(|s| s.position)
            .ok_or_else(|| TsinferError::argument(format!("site {site} out of range")))
    }

    pub fn recombination_rate(&self, site: SiteId) -> TsinferResult<f64> {
        self.sites
            .get(site.as_usize())
            .map(|s| s.recombination_rate)
            .ok_or_else(|| TsinferError::argument(format!("site {site} out of range")))
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.num_rows()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.num_allocated()
    }

    pub fn num_mutations(&self) -> usize {
        self.mutations.num_mutations()
    }

    pub fn node_time(&self, node: NodeId) -> TsinferResult<f64> {
        self.nodes.time(node)
    }

    pub fn node_flags(&self, node: NodeId) -> TsinferResult<NodeFlags> {
        self.nodes.flags(node)
    }

    pub fn total_memory(&self) -> usize {
        self.block_allocator.total_memory() + self.edges.get_total_memory()
    }

    /// Append a node. Node times are strictly monotone-decreasing with
    /// insertion order among non-samples; sample nodes may share time `0`.
    pub fn add_node(&mut self, time: f64, is_sample: bool) -> TsinferResult<NodeId> {
        if !time.is_finite() {
            return Err(TsinferError::argument("node time must be finite"));
        }
        if is_sample {
            if time < 0.0 {
                return Err(TsinferError::argument("sample node time must be >= 0"));
            }
        } else {
            if let Some(last) = self.last_non_sample_time {
                if !(time < last) {
                    return Err(TsinferError::argument(
                        "non-sample node times must strictly decrease with insertion order",
                    ));
                }
            }
            self.last_non_sample_time = Some(time);
        }
        let flags = if is_sample {
            NodeFlags::sample()
        } else {
            NodeFlags::NONE
        };
        let id = self.nodes.push(time, flags);
        self.block_allocator.allocate(16);
        log::debug!("add_node: id={id} time={time} is_sample={is_sample}");
        Ok(id)
    }

    /// Internal append used only for `TSI_RESOLVE_SHARED_RECOMBS`
    /// synthetic intermediate nodes, which are exempt from the
    /// monotonic-time check above.
    fn add_synthetic_node(&mut self, time: f64) -> NodeId {
        let id = self.nodes.push(time, NodeFlags::NONE);
        self.synthetic_nodes.insert(id);
        id
    }

    fn validate_node(&self, node: NodeId) -> TsinferResult<()> {
        if !self.nodes.is_valid(node) {
            return Err(TsinferError::argument(format!("node {node} out of range")));
        }
        Ok(())
    }

    fn insert_edge(&mut self, record: EdgeRecord) -> EdgeId {
        let id = EdgeId(self.edges.alloc_object(record));
        let stored = *self.edges.get(id.0).unwrap();
        self.indexes.insert(&stored, id);
        self.block_allocator.allocate(32);
        id
    }

    fn remove_edge(&mut self, id: EdgeId) -> EdgeRecord {
        let record = self.edges.free_object(id.0);
        self.indexes.remove(&record);
        record
    }

    fn update_edge_right(&mut self, id: EdgeId, new_right: i32, new_end: i32) {
        let old = *self.edges.get(id.0).unwrap();
        self.indexes.remove(&old);
        let mut updated = old;
        updated.right = new_right;
        updated.end = new_end;
        *self.edges.get_mut(id.0).unwrap() = updated;
        self.indexes.insert(&updated, id);
    }

    /// Append the edges of a single child's copying path.
    ///
    /// `edges` must be sorted by `left`, tile a contiguous non-overlapping
    /// span, and satisfy `time(parent) > time(child)` for every segment.
    /// `flags` is reserved for future per-call overrides; no bits are
    /// currently recognized.
    pub fn add_path(
        &mut self,
        child: NodeId,
        edges: &[PathSegment],
        _flags: u32,
    ) -> TsinferResult<()> {
        self.validate_node(child)?;
        if edges.is_empty() {
            return Ok(());
        }
        let child_time = self.nodes.time(child)?;

        let num_sites = self.num_sites() as i32;
        let mut prev_right: Option<i32> = None;
        for seg in edges {
            let left = seg.left.0;
            let right = seg.right.0;
            if left < 0 || right > num_sites || left >= right {
                return Err(TsinferError::argument(format!(
                    "edge [{left}, {right}) is not a valid interval in [0, {num_sites})"
                )));
            }
            if let Some(pr) = prev_right {
                if left != pr {
                    return Err(TsinferError::argument(
                        "edges for a single add_path call must tile a contiguous, non-overlapping span",
                    ));
                }
            }
            prev_right = Some(right);
            self.validate_node(seg.parent)?;
            let parent_time = self.nodes.time(seg.parent)?;
            if !(parent_time > child_time) {
                return Err(TsinferError::argument(format!(
                    "edge parent time {parent_time} must exceed child time {child_time}"
                )));
            }
        }

        for (i, seg) in edges.iter().enumerate() {
            let left = seg.left.0;
            let right = seg.right.0;
            let parent_time = self.nodes.time(seg.parent)?;

            if i == 0 {
                if let Some(existing) = self.indexes.find_extendable(
                    seg.parent,
                    child,
                    left,
                    |id| self.edges.get(id.0).unwrap().right,
                ) {
                    let new_end = self.edges.get(existing.0).unwrap().end.max(right);
                    self.update_edge_right(existing, right, new_end);
                    log::debug!(
                        "add_path: extended edge parent={} child={child} to right={right}",
                        seg.parent
                    );
                    continue;
                }
            }
            self.insert_edge_with_coalescing(left, right, seg.parent, child, parent_time);
        }
        log::debug!(
            "add_path: child={child} num_edges={} total_edges={}",
            edges.len(),
            self.num_edges()
        );
        Ok(())
    }

    fn insert_edge_with_coalescing(
        &mut self,
        left: i32,
        right: i32,
        parent: NodeId,
        child: NodeId,
        parent_time: f64,
    ) {
        if !self.options.resolve_shared_recombinations {
            self.insert_edge(EdgeRecord::new(left, right, parent, child, parent_time));
            return;
        }
        let key = (parent.0, left, right);
        match self.shared_recomb_targets.get(&key).copied() {
            None => {
                self.insert_edge(EdgeRecord::new(left, right, parent, child, parent_time));
                self.shared_recomb_targets.insert(key, child);
            }
            Some(target) if self.synthetic_nodes.contains(&target) => {
                let target_time = self.nodes.time(target).unwrap();
                self.insert_edge(EdgeRecord::new(left, right, target, child, target_time));
            }
            Some(previous_child) => {
                // First collision at this breakpoint: introduce a
                // synthetic intermediate node and rewrite the earlier
                // child's edge to hang off it.
                let previous_time = self.nodes.time(previous_child).unwrap();
                let child_time = self.nodes.time(child).unwrap();
                let synthetic_time =
                    parent_time - (parent_time - previous_time.max(child_time)) / 2.0;
                let synthetic = self.add_synthetic_node(synthetic_time);

                if let Some(&old_edge_id) = self
                    .indexes
                    .path
                    .get(&(parent.0, previous_child.0, left))
                {
                    self.remove_edge(old_edge_id);
                }
                self.insert_edge(EdgeRecord::new(
                    left,
                    right,
                    parent,
                    synthetic,
                    parent_time,
                ));
                self.insert_edge(EdgeRecord::new(
                    left,
                    right,
                    synthetic,
                    previous_child,
                    synthetic_time,
                ));
                self.insert_edge(EdgeRecord::new(left, right, synthetic, child, synthetic_time));
                self.shared_recomb_targets.insert(key, synthetic);
                log::debug!(
                    "add_path: coalesced shared breakpoint parent={parent} [{left},{right}) via synthetic node {synthetic}"
                );
            }
        }
    }

    /// Append mutations. Each `(site, node)` pair must be unique.
    pub fn add_mutations(
        &mut self,
        node: NodeId,
        sites: &[SiteId],
        derived_states: &[Allele],
    ) -> TsinferResult<()> {
        self.validate_node(node)?;
        if sites.len() != derived_states.len() {
            return Err(TsinferError::argument(
                "sites and derived_states must have equal length",
            ));
        }
        for (&site, &state) in sites.iter().zip(derived_states.iter()) {
            if site.as_usize() >= self.num_sites() {
                return Err(TsinferError::argument(format!("site {site} out of range")));
            }
            if !(-1..=1).contains(&state) {
                return Err(TsinferError::argument(format!(
                    "derived_state {state} is not a valid allele"
                )));
            }
            if self.mutations.contains(site, node) {
                return Err(TsinferError::argument(format!(
                    "duplicate mutation at site {site} for node {node}"
                )));
            }
            self.mutations.push(site, node, state);
            self.block_allocator.allocate(24);
        }
        log::debug!(
            "add_mutations: node={node} count={} total_mutations={}",
            sites.len(),
            self.num_mutations()
        );
        Ok(())
    }

    /// Mutations recorded at `site`, in insertion order.
    pub fn mutations_at(&self, site: SiteId) -> &[super::mutation_table::MutationRecord] {
        self.mutations.at_site(site)
    }

    /// Edges whose `left` equals `site.0`, by value.
    pub fn edges_starting_at(&self, site: i32) -> Vec<EdgeRecord> {
        self.indexes
            .starting_at(site)
            .map(|id| *self.edges.get(id.0).unwrap())
            .collect()
    }

    /// Edges whose `right` equals `site.0`.
    pub fn edges_ending_at(&self, site: i32) -> Vec<EdgeRecord> {
        self.indexes
            .ending_at(site)
            .map(|id| *self.edges.get(id.0).unwrap())
            .collect()
    }

    /// All edges, in the canonical dump order: `(parent_time ascending,
    /// parent, child, left)`.
    pub fn dump_edges(&self) -> (Vec<i32>, Vec<i32>, Vec<i32>, Vec<i32>) {
        let mut all: Vec<(usize, EdgeRecord)> =
            self.edges.iter().map(|(slot, e)| (slot, *e)).collect();
        all.sort_by(|(_, a), (_, b)| {
            ordered_float::OrderedFloat(a.time)
                .cmp(&ordered_float::OrderedFloat(b.time))
                .then(a.parent.0.cmp(&b.parent.0))
                .then(a.child.0.cmp(&b.child.0))
                .then(a.left.cmp(&b.left))
        });
        let mut left = Vec::with_capacity(all.len());
        let mut right = Vec::with_capacity(all.len());
        let mut parent = Vec::with_capacity(all.len());
        let mut child = Vec::with_capacity(all.len());
        for (_, e) in all {
            left.push(e.left);
            right.push(e.right);
            parent.push(e.parent.0);
            child.push(e.child.0);
        }
        (left, right, parent, child)
    }

    pub fn dump_nodes(&self) -> (Vec<u32>, Vec<f64>) {
        self.nodes.dump()
    }

    pub fn dump_mutations(&self) -> (Vec<i32>, Vec<i32>, Vec<Allele>, Vec<i32>) {
        self.mutations.dump()
    }

    /// Restore node rows, rebuilding table state from scratch.
    pub fn restore_nodes(&mut self, flags: &[u32], time: &[f64]) -> TsinferResult<()> {
        self.nodes.restore(flags, time)?;
        self.last_non_sample_time = time
            .iter()
            .zip(flags.iter())
            .filter(|(_, f)| !NodeFlags::from_bits_truncate(**f).is_sample())
            .map(|(t, _)| *t)
            .fold(None, |acc: Option<f64>, t| match acc {
                None => Some(t),
                Some(a) => Some(a.min(t)),
            });
        Ok(())
    }

    /// Restore edges, rebuilding all three indexes from scratch; the
    /// post-restore state is byte-equivalent to sequential insertion.
    pub fn restore_edges(
        &mut self,
        left: &[i32],
        right: &[i32],
        parent: &[i32],
        child: &[i32],
    ) -> TsinferResult<()> {
        let n = left.len();
        if right.len() != n || parent.len() != n || child.len() != n {
            return Err(TsinferError::argument(
                "restore_edges: array lengths must match",
            ));
        }
        self.edges = ObjectHeap::with_capacity(n);
        self.indexes.clear();
        self.shared_recomb_targets.clear();
        for i in 0..n {
            let p = NodeId::from(parent[i]);
            let time = self.nodes.time(p)?;
            self.insert_edge(EdgeRecord::new(left[i], right[i], p, NodeId::from(child[i]), time));
        }
        Ok(())
    }

    pub fn restore_mutations(
        &mut self,
        site: &[i32],
        node: &[i32],
        derived_state: &[Allele],
        parent: &[i32],
    ) -> TsinferResult<()> {
        self.mutations.restore(site, node, derived_state, parent)
    }
}
