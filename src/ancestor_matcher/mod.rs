//! Ancestor Matcher.
//!
//! A Li-Stephens copying HMM solved against the evolving topology held by
//! [`crate::tree_sequence::TreeSequenceBuilder`]: a quintuply linked tree
//! (`parent`/`left_child`/`right_child`/`left_sib`/`right_sib`) updated site
//! by site, with compressed per-node likelihoods and a compressed
//! traceback.

use std::collections::BTreeSet;

use crate::error::{TsinferError, TsinferResult};
use crate::ids::{Allele, NodeId, SiteId, MISSING_ALLELE};
use crate::tree_sequence::TreeSequenceBuilder;

/// Observation error rate, either a single scalar applied at every site or
/// a per-site array.
#[derive(Debug, Clone)]
pub enum Theta {
    Uniform(f64),
    PerSite(Vec<f64>),
}

impl Theta {
    fn at(&self, site: usize) -> f64 {
        match self {
            Theta::Uniform(t) => *t,
            Theta::PerSite(v) => v[site],
        }
    }
}

/// Per-node likelihood: `Null` means "inherit the nearest non-null
/// ancestor's value". A root carrying an explicit value is represented as
/// an ordinary `Value(1.0)` rather than a distinct tagged state.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Likelihood {
    Null,
    Value(f64),
}

/// One segment of the returned copying path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathSegment {
    pub left: SiteId,
    pub right: SiteId,
    pub parent: NodeId,
}

/// Result of [`AncestorMatcher::find_path`].
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub segments: Vec<PathSegment>,
    /// Sites in `[start, end)` where the copied allele differed from the
    /// query.
    pub mismatches: Vec<SiteId>,
    /// The copied allele at every site in `[start, end)`, indexed from 0
    /// (i.e. `matched[i]` is the allele for site `start + i`).
    pub matched: Vec<Allele>,
}

/// Per-site bookkeeping retained only for the duration of one
/// [`AncestorMatcher::find_path`] call.
struct SiteTrace {
    /// Nodes whose recombination choice at this site departed from the
    /// default.
    recombination_required: BTreeSet<NodeId>,
    /// Any focal node achieving the post-emission maximum, ties broken
    /// toward the lower node id.
    best_node: NodeId,
    /// `parent` array as of this site, snapshotted so mismatch resolution
    /// can walk a past site's lineage after the live tree has moved on.
    parent_snapshot: Vec<NodeId>,
}

/// Solves the copying HMM over a [`TreeSequenceBuilder`]'s topology.
///
/// Allocated once with `max_nodes` and reused across calls.
pub struct AncestorMatcher {
    theta: Theta,
    max_nodes: usize,
    parent: Vec<NodeId>,
    left_child: Vec<NodeId>,
    right_child: Vec<NodeId>,
    left_sib: Vec<NodeId>,
    right_sib: Vec<NodeId>,
    likelihood: Vec<Likelihood>,
    likelihood_nodes: BTreeSet<NodeId>,
    traceback_calls: usize,
    traceback_total_sites: usize,
}

impl AncestorMatcher {
    pub fn new(max_nodes: usize, theta: Theta) -> Self {
        Self {
            theta,
            max_nodes,
            parent: vec![NodeId::NULL; max_nodes],
            left_child: vec![NodeId::NULL; max_nodes],
            right_child: vec![NodeId::NULL; max_nodes],
            left_sib: vec![NodeId::NULL; max_nodes],
            right_sib: vec![NodeId::NULL; max_nodes],
            likelihood: vec![Likelihood::Null; max_nodes],
            likelihood_nodes: BTreeSet::new(),
            traceback_calls: 0,
            traceback_total_sites: 0,
        }
    }

    /// Mean number of traceback entries recorded per processed site across
    /// all calls so far.
    pub fn get_mean_traceback_size(&self) -> f64 {
        if self.traceback_calls == 0 {
            0.0
        } else {
            self.traceback_total_sites as f64 / self.traceback_calls as f64
        }
    }

    pub fn get_total_memory(&self) -> usize {
        self.max_nodes * std::mem::size_of::<NodeId>() * 5
            + self.max_nodes * std::mem::size_of::<Likelihood>()
    }

    fn reset_tree(&mut self, num_nodes: usize) {
        for i in 0..num_nodes {
            self.parent[i] = NodeId::NULL;
            self.left_child[i] = NodeId::NULL;
            self.right_child[i] = NodeId::NULL;
            self.left_sib[i] = NodeId::NULL;
            self.right_sib[i] = NodeId::NULL;
            self.likelihood[i] = Likelihood::Null;
        }
        self.likelihood_nodes.clear();
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        // Preserve the child's current effective value before it loses its
        // parent link, else it would silently reset to the default root
        // value on the next lookup.
        self.ensure_focal(child);
        let ls = self.left_sib[child.as_usize()];
        let rs = self.right_sib[child.as_usize()];
        if ls.is_null() {
            self.left_child[parent.as_usize()] = rs;
        } else {
            self.right_sib[ls.as_usize()] = rs;
        }
        if rs.is_null() {
            self.right_child[parent.as_usize()] = ls;
        } else {
            self.left_sib[rs.as_usize()] = ls;
        }
        self.parent[child.as_usize()] = NodeId::NULL;
        self.left_sib[child.as_usize()] = NodeId::NULL;
        self.right_sib[child.as_usize()] = NodeId::NULL;
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let cur = self.right_child[parent.as_usize()];
        self.left_sib[child.as_usize()] = cur;
        self.right_sib[child.as_usize()] = NodeId::NULL;
        if cur.is_null() {
            self.left_child[parent.as_usize()] = child;
        } else {
            self.right_sib[cur.as_usize()] = child;
        }
        self.right_child[parent.as_usize()] = child;
        self.parent[child.as_usize()] = parent;
    }

    fn apply_edge_events(&mut self, ts: &TreeSequenceBuilder, site: i32) {
        for edge in ts.edges_ending_at(site) {
            self.detach(NodeId::from(edge.parent), edge.child);
        }
        for edge in ts.edges_starting_at(site) {
            self.attach(edge.parent, edge.child);
        }
    }

    /// Effective likelihood of `u`: its own value if explicit, else its
    /// nearest non-null ancestor's, else the implicit root default of `1.0`.
    fn effective(&self, mut u: NodeId) -> f64 {
        loop {
            match self.likelihood[u.as_usize()] {
                Likelihood::Value(v) => return v,
                Likelihood::Null => {
                    let p = self.parent[u.as_usize()];
                    if p.is_null() {
                        return 1.0;
                    }
                    u = p;
                }
            }
        }
    }

    /// Make `u` carry an explicit value equal to its current effective
    /// value, adding it to the focal set if it was inherited.
    fn ensure_focal(&mut self, u: NodeId) {
        if matches!(self.likelihood[u.as_usize()], Likelihood::Null) {
            let v = self.effective(u);
            self.likelihood[u.as_usize()] = Likelihood::Value(v);
            self.likelihood_nodes.insert(u);
        }
    }

    /// Drop any focal node whose value equals its parent's effective value;
    /// roots are never dropped since nothing stands above them to inherit
    /// from.
    fn compress(&mut self) {
        let focal: Vec<NodeId> = self.likelihood_nodes.iter().copied().collect();
        for u in focal {
            let p = self.parent[u.as_usize()];
            if p.is_null() {
                continue;
            }
            if let Likelihood::Value(v) = self.likelihood[u.as_usize()] {
                let pv = self.effective(p);
                if (v - pv).abs() < 1e-12 {
                    self.likelihood[u.as_usize()] = Likelihood::Null;
                    self.likelihood_nodes.remove(&u);
                }
            }
        }
    }

    /// Run the forward step for `site`, returning the set of nodes whose
    /// recombination choice departed from the default.
    fn forward_step(
        &mut self,
        ts: &TreeSequenceBuilder,
        site: SiteId,
        query_allele: Allele,
    ) -> TsinferResult<(BTreeSet<NodeId>, NodeId)> {
        // A node bearing a mutation at this site needs its own emission
        // probability distinct from its inherited ancestor's, so it must
        // hold an explicit (possibly still-equal) value before emission.
        for mutation in ts.mutations_at(site) {
            self.ensure_focal(mutation.node);
        }

        let rho = ts.recombination_rate(site)?;
        let theta = self.theta.at(site.as_usize());

        let focal: Vec<NodeId> = self.likelihood_nodes.iter().copied().collect();
        if focal.is_empty() {
            return Err(TsinferError::numerical(format!(
                "no copying candidates available at site {site}"
            )));
        }
        let z = rho / focal.len() as f64;

        let mut y = Vec::with_capacity(focal.len());
        let mut max_y = f64::NEG_INFINITY;
        for &u in &focal {
            let l = match self.likelihood[u.as_usize()] {
                Likelihood::Value(v) => v,
                Likelihood::Null => unreachable!("focal node must carry an explicit value"),
            };
            let yu = l * (1.0 - rho);
            max_y = max_y.max(yu);
            y.push(yu);
        }

        let mut recombination_required = BTreeSet::new();
        let mut stage1 = Vec::with_capacity(focal.len());
        for (i, &u) in focal.iter().enumerate() {
            if max_y >= z && (y[i] - max_y).abs() < 1e-12 {
                stage1.push(y[i]);
            } else {
                stage1.push(z);
                recombination_required.insert(u);
            }
        }

        let mut emitted = Vec::with_capacity(focal.len());
        let mut max_emitted = f64::NEG_INFINITY;
        for (i, &u) in focal.iter().enumerate() {
            let allele_u = lineage_allele(ts, &self.parent, u, site);
            let emission = if query_allele == MISSING_ALLELE || allele_u == MISSING_ALLELE {
                1.0
            } else if allele_u == query_allele {
                1.0 - theta
            } else {
                theta
            };
            let v = stage1[i] * emission;
            max_emitted = max_emitted.max(v);
            emitted.push(v);
        }

        if !(max_emitted > 0.0) {
            return Err(TsinferError::numerical(format!(
                "every candidate parent has zero likelihood at site {site}"
            )));
        }

        let mut best_node = focal[0];
        let mut best_value = f64::NEG_INFINITY;
        for (i, &u) in focal.iter().enumerate() {
            let normalized = emitted[i] / max_emitted;
            self.likelihood[u.as_usize()] = Likelihood::Value(normalized);
            if normalized > best_value + 1e-12
                || ((normalized - best_value).abs() <= 1e-12 && u.0 < best_node.0)
            {
                best_value = normalized;
                best_node = u;
            }
        }
        self.compress();
        Ok((recombination_required, best_node))
    }

    /// Find a maximum-likelihood copying path for `haplotype` over
    /// `[start, end)` against `ts`'s current topology.
    pub fn find_path(
        &mut self,
        ts: &TreeSequenceBuilder,
        start: SiteId,
        end: SiteId,
        haplotype: &[Allele],
    ) -> TsinferResult<MatchResult> {
        if start.0 > end.0 {
            return Err(TsinferError::argument("start must not exceed end"));
        }
        if start.0 == end.0 {
            return Ok(MatchResult {
                segments: Vec::new(),
                mismatches: Vec::new(),
                matched: Vec::new(),
            });
        }
        let num_sites = ts.num_sites();
        if start.as_usize() >= num_sites || end.as_usize() > num_sites {
            return Err(TsinferError::argument("[start, end) is out of range"));
        }
        if haplotype.len() != (end.0 - start.0) as usize {
            return Err(TsinferError::argument(
                "haplotype length must equal end - start",
            ));
        }
        let num_nodes = ts.num_nodes();
        if num_nodes > self.max_nodes {
            return Err(TsinferError::resource_exhausted(format!(
                "ancestor matcher allocated for max_nodes={} but the tree sequence has {} nodes",
                self.max_nodes, num_nodes
            )));
        }

        self.reset_tree(num_nodes);

        // Catch up the quintuply linked tree to the topology immediately
        // before `start`; the real per-site loop below applies `start`'s
        // own edge events as its first step. `detach` during catch-up may
        // populate `likelihood`/`likelihood_nodes` for nodes that briefly
        // lost a parent, so that state is cleared before priming below;
        // only the topology arrays are meant to survive catch-up.
        for s in 0..start.0 {
            self.apply_edge_events(ts, s);
        }
        for i in 0..num_nodes {
            self.likelihood[i] = Likelihood::Null;
        }
        self.likelihood_nodes.clear();

        let mut traces: Vec<SiteTrace> = Vec::with_capacity(haplotype.len());
        for (i, &allele) in haplotype.iter().enumerate() {
            let site = SiteId::from(start.0 + i as i32);
            self.apply_edge_events(ts, site.0);
            if i == 0 {
                // Prime the focal set with the tree's roots as of `start`,
                // after `start`'s own incoming edges are attached above.
                for node in 0..num_nodes {
                    let id = NodeId::from(node);
                    if self.parent[node].is_null() {
                        self.likelihood[node] = Likelihood::Value(1.0);
                        self.likelihood_nodes.insert(id);
                    }
                }
            }
            let (recombination_required, best_node) = self.forward_step(ts, site, allele)?;
            traces.push(SiteTrace {
                recombination_required,
                best_node,
                parent_snapshot: self.parent.clone(),
            });
        }

        self.traceback_calls += 1;
        self.traceback_total_sites += traces
            .iter()
            .map(|t| t.recombination_required.len())
            .sum::<usize>();

        let segments = self.traceback(start, end, &traces);

        let mut mismatches = Vec::new();
        let mut matched = Vec::with_capacity(haplotype.len());
        for segment in &segments {
            for site_raw in segment.left.0..segment.right.0 {
                let idx = (site_raw - start.0) as usize;
                let copied = lineage_allele(
                    ts,
                    &traces[idx].parent_snapshot,
                    segment.parent,
                    SiteId::from(site_raw),
                );
                matched.push(copied);
                if haplotype[idx] != MISSING_ALLELE && copied != haplotype[idx] {
                    mismatches.push(SiteId::from(site_raw));
                }
            }
        }

        Ok(MatchResult {
            segments,
            mismatches,
            matched,
        })
    }

    fn traceback(&self, start: SiteId, end: SiteId, traces: &[SiteTrace]) -> Vec<PathSegment> {
        let last_idx = traces.len() - 1;
        let mut segments = Vec::new();
        let mut current = traces[last_idx].best_node;
        let mut seg_right = end.0;

        let mut i = last_idx as isize;
        while i >= 0 {
            let idx = i as usize;
            let site_abs = start.0 + idx as i32;
            if traces[idx].recombination_required.contains(&current) {
                segments.push(PathSegment {
                    left: SiteId::from(site_abs),
                    right: SiteId::from(seg_right),
                    parent: current,
                });
                seg_right = site_abs;
                if idx > 0 {
                    current = traces[idx - 1].best_node;
                }
            }
            i -= 1;
        }
        if seg_right > start.0 {
            segments.push(PathSegment {
                left: start,
                right: SiteId::from(seg_right),
                parent: current,
            });
        }
        segments.reverse();
        segments
    }
}

/// Walk `node`'s lineage up through `parent` until a mutation at `site` or
/// a root is found, returning the allele that lineage carries there.
/// Ancestral (un-mutated) state is `0`.
fn lineage_allele(
    ts: &TreeSequenceBuilder,
    parent: &[NodeId],
    mut node: NodeId,
    site: SiteId,
) -> Allele {
    loop {
        if let Some(m) = ts.mutations_at(site).iter().find(|m| m.node == node) {
            return m.derived_state;
        }
        let p = parent[node.as_usize()];
        if p.is_null() {
            return 0;
        }
        node = p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::TreeSequenceBuilderOptions;
    use crate::tree_sequence::PathSegment as TsPathSegment;

    fn sites(n: usize) -> (Vec<f64>, Vec<f64>) {
        ((0..n).map(|i| i as f64).collect(), vec![0.0; n])
    }

    #[test]
    fn single_ancestor_exact_copy_zero_theta() {
        // Three samples, two sites, genotypes [[1,0],[1,0],[1,0]]; theta=0,
        // rho=0. A single ancestor node copies the common haplotype.
        let (positions, rho) = sites(2);
        let mut ts = TreeSequenceBuilder::new(2.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        let root = ts.add_node(1.0, false).unwrap();
        let ancestor = ts.add_node(0.0, true).unwrap();
        ts.add_path(
            ancestor,
            &[TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(2usize), parent: root }],
            0,
        )
        .unwrap();
        // Ancestral state defaults to 0; the common haplotype's `1` at site
        // 0 is recorded as a derived mutation.
        ts.add_mutations(ancestor, &[SiteId::from(0usize)], &[1]).unwrap();

        let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.0));
        let result = matcher
            .find_path(&ts, SiteId::from(0usize), SiteId::from(2usize), &[1, 0])
            .unwrap();

        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].parent, ancestor);
        assert_eq!(result.segments[0].left, SiteId::from(0usize));
        assert_eq!(result.segments[0].right, SiteId::from(2usize));
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn single_mismatch_reported_with_nonzero_theta() {
        let (positions, rho) = sites(4);
        let mut ts = TreeSequenceBuilder::new(4.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        let root = ts.add_node(1.0, false).unwrap();
        let ancestor = ts.add_node(0.0, true).unwrap();
        ts.add_path(
            ancestor,
            &[TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(4usize), parent: root }],
            0,
        )
        .unwrap();
        ts.add_mutations(
            ancestor,
            &[SiteId::from(0usize), SiteId::from(1usize), SiteId::from(2usize), SiteId::from(3usize)],
            &[1, 1, 1, 1],
        )
        .unwrap();

        let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.01));
        let result = matcher
            .find_path(&ts, SiteId::from(0usize), SiteId::from(4usize), &[1, 1, 0, 1])
            .unwrap();

        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].parent, ancestor);
        assert_eq!(result.mismatches, vec![SiteId::from(2usize)]);
    }

    #[test]
    fn two_ancestors_split_at_forced_recombination_site() {
        // Two ancestors over four sites: A=[1,1,0,0], B=[0,0,1,1]; query =
        // [1,1,1,1]; theta=0, rho=0.5 at site 2 (a break between the A and
        // B segments), 0 elsewhere.
        let positions = vec![0.0, 1.0, 2.0, 3.0];
        let rho = vec![0.0, 0.0, 0.5, 0.0];
        let mut ts = TreeSequenceBuilder::new(4.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        let root = ts.add_node(2.0, false).unwrap();
        let a = ts.add_node(1.0, true).unwrap();
        let b = ts.add_node(1.0, true).unwrap();
        ts.add_path(a, &[TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(4usize), parent: root }], 0).unwrap();
        ts.add_path(b, &[TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(4usize), parent: root }], 0).unwrap();
        ts.add_mutations(a, &[SiteId::from(0usize), SiteId::from(1usize)], &[1, 1]).unwrap();
        ts.add_mutations(b, &[SiteId::from(2usize), SiteId::from(3usize)], &[1, 1]).unwrap();

        let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.0));
        let result = matcher
            .find_path(&ts, SiteId::from(0usize), SiteId::from(4usize), &[1, 1, 1, 1])
            .unwrap();

        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0], PathSegment { left: SiteId::from(0usize), right: SiteId::from(2usize), parent: a });
        assert_eq!(result.segments[1], PathSegment { left: SiteId::from(2usize), right: SiteId::from(4usize), parent: b });
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn empty_range_returns_empty_path() {
        let (positions, rho) = sites(3);
        let ts = TreeSequenceBuilder::new(3.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        let mut matcher = AncestorMatcher::new(4, Theta::Uniform(0.0));
        let result = matcher
            .find_path(&ts, SiteId::from(1usize), SiteId::from(1usize), &[])
            .unwrap();
        assert!(result.segments.is_empty());
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn all_missing_query_has_no_mismatches() {
        let (positions, rho) = sites(3);
        let mut ts = TreeSequenceBuilder::new(3.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        let root = ts.add_node(1.0, false).unwrap();
        let ancestor = ts.add_node(0.0, true).unwrap();
        ts.add_path(ancestor, &[TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(3usize), parent: root }], 0).unwrap();

        let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.01));
        let result = matcher
            .find_path(&ts, SiteId::from(0usize), SiteId::from(3usize), &[MISSING_ALLELE; 3])
            .unwrap();
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn exhausted_matcher_capacity_is_a_resource_error() {
        let (positions, rho) = sites(2);
        let mut ts = TreeSequenceBuilder::new(2.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        ts.add_node(1.0, false).unwrap();
        ts.add_node(0.0, true).unwrap();
        let mut matcher = AncestorMatcher::new(1, Theta::Uniform(0.0));
        let err = matcher.find_path(&ts, SiteId::from(0usize), SiteId::from(2usize), &[0, 0]);
        assert!(err.is_err());
    }

    /// A `find_path` call starting past site 0 must catch up the tree
    /// topology without leaving stale focal-set entries behind. `child`
    /// copies from `root_one` over `[0, 2)` then from `root_two` over
    /// `[2, 4)`; catching up to site 3 detaches and reattaches `child`
    /// along the way. Once root-priming runs, the focal set must contain
    /// exactly the two roots, not a leftover entry for `child`.
    #[test]
    fn find_path_from_nonzero_start_does_not_inflate_focal_set() {
        let (positions, rho) = sites(4);
        let mut ts = TreeSequenceBuilder::new(4.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        let root_one = ts.add_node(3.0, false).unwrap();
        let root_two = ts.add_node(3.0, false).unwrap();
        let child = ts.add_node(1.0, true).unwrap();
        ts.add_path(
            child,
            &[
                TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(2usize), parent: root_one },
                TsPathSegment { left: SiteId::from(2usize), right: SiteId::from(4usize), parent: root_two },
            ],
            0,
        )
        .unwrap();

        let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.0));
        let result = matcher
            .find_path(&ts, SiteId::from(3usize), SiteId::from(4usize), &[0])
            .unwrap();

        assert!(result.mismatches.is_empty());
        assert_eq!(matcher.likelihood_nodes.len(), 2);
        assert!(matcher.likelihood_nodes.contains(&root_one));
        assert!(matcher.likelihood_nodes.contains(&root_two));
        assert!(!matcher.likelihood_nodes.contains(&child));
    }

    /// After a compression pass runs, a node left `Null` must still read
    /// the same effective value an uncompressed forward pass would have
    /// computed for it. With `theta == 0` and `rho == 0` throughout, and no
    /// mutations that would make any lineage's allele diverge from the all-
    /// ancestral-state haplotype, every node that ever carries an explicit
    /// value keeps it at exactly `1.0` (a perfect, unpenalized match), so a
    /// compressed-away node's inherited value must also read `1.0`.
    #[test]
    fn compressed_node_effective_value_matches_uncompressed_forward_value() {
        let (positions, rho) = sites(3);
        let mut ts = TreeSequenceBuilder::new(3.0, &positions, &rho, TreeSequenceBuilderOptions::default()).unwrap();
        let root = ts.add_node(2.0, false).unwrap();
        let a = ts.add_node(1.0, true).unwrap();
        let b = ts.add_node(0.0, true).unwrap();
        ts.add_path(a, &[TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(3usize), parent: root }], 0).unwrap();
        ts.add_path(b, &[TsPathSegment { left: SiteId::from(0usize), right: SiteId::from(3usize), parent: a }], 0).unwrap();
        // Neither mutation changes the logical allele (ancestral state is
        // already 0); they only force `a` and `b` into the focal set so the
        // compression pass has something to collapse.
        ts.add_mutations(a, &[SiteId::from(0usize)], &[0]).unwrap();
        ts.add_mutations(b, &[SiteId::from(2usize)], &[0]).unwrap();

        let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.0));
        let result = matcher
            .find_path(&ts, SiteId::from(0usize), SiteId::from(3usize), &[0, 0, 0])
            .unwrap();
        assert!(result.mismatches.is_empty());

        assert_eq!(matcher.likelihood[a.as_usize()], Likelihood::Null);
        assert_eq!(matcher.likelihood[b.as_usize()], Likelihood::Null);
        assert_eq!(matcher.effective(a), 1.0);
        assert_eq!(matcher.effective(b), 1.0);
    }
}
