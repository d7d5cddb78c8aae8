//! Cross-component integration tests spanning all three subsystems.
//! Matches `tskit-rust`'s own integration-test placement
//! (`tests/test_edge_buffer.rs`) for coverage that exceeds one module.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tsinfer::ancestor_matcher::Theta;
use tsinfer::tree_sequence::PathSegment;
use tsinfer::{AncestorBuilder, AncestorMatcher, SiteId, TreeSequenceBuilder, TreeSequenceBuilderOptions};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn uniform_sites(n: usize, rho: f64) -> (Vec<f64>, Vec<f64>) {
    ((0..n).map(|i| i as f64).collect(), vec![rho; n])
}

/// Frequency-ordered ancestor build, exercised end to end: four samples,
/// three sites, columns [1,1,0,0], [1,1,0,0], [1,0,0,0]. Sites 0 and 1
/// must group together (frequency 2); site 2 is separate.
#[test]
fn frequency_ordered_ancestor_build_groups_matching_columns() {
    init_logger();
    let mut b = AncestorBuilder::new(4, 3);
    b.add_site(SiteId::from(0usize), 2, &[1, 1, 0, 0]).unwrap();
    b.add_site(SiteId::from(1usize), 2, &[1, 1, 0, 0]).unwrap();
    b.add_site(SiteId::from(2usize), 1, &[1, 0, 0, 0]).unwrap();

    assert_eq!(b.num_ancestors(), 2);

    let mut frequencies: Vec<usize> = b.frequency_classes().collect();
    frequencies.sort_unstable();
    assert_eq!(frequencies, vec![1, 2]);

    let group_f2: Vec<_> = b.groups_at_frequency(2).collect();
    assert_eq!(group_f2.len(), 1);
    assert_eq!(
        group_f2[0],
        &[SiteId::from(0usize), SiteId::from(1usize)][..]
    );

    let (start, end, hap) = b.make_ancestor(group_f2[0]).unwrap();
    assert!(start.as_usize() <= 0);
    assert!(end.as_usize() >= 2);
    assert_eq!(hap[0], 1);
    assert_eq!(hap[1], 1);
}

/// Build a single-ancestor-then-query pipeline and confirm `find_path`
/// reproduces the ancestor's own haplotype with zero mismatches when
/// queried immediately after insertion.
#[test]
fn matching_a_just_inserted_haplotype_is_exact_with_zero_theta() {
    init_logger();
    let (positions, rho) = uniform_sites(5, 0.0);
    let mut ts = TreeSequenceBuilder::new(5.0, &positions, &rho, TreeSequenceBuilderOptions::default())
        .unwrap();
    let root = ts.add_node(10.0, false).unwrap();
    let ancestor = ts.add_node(1.0, true).unwrap();
    ts.add_path(
        ancestor,
        &[PathSegment {
            left: SiteId::from(0usize),
            right: SiteId::from(5usize),
            parent: root,
        }],
        0,
    )
    .unwrap();
    ts.add_mutations(
        ancestor,
        &[SiteId::from(1usize), SiteId::from(3usize)],
        &[1, 1],
    )
    .unwrap();
    // Ancestor's own haplotype: 0,1,0,1,0 (mutations at sites 1 and 3).
    let haplotype = [0, 1, 0, 1, 0];

    let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.0));
    let result = matcher
        .find_path(&ts, SiteId::from(0usize), SiteId::from(5usize), &haplotype)
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].parent, ancestor);
    assert!(result.mismatches.is_empty());
}

/// Dump/restore idempotence on a larger, randomly generated tree sequence
/// (>= 50 nodes).
#[test]
fn dump_restore_idempotence_on_fifty_plus_nodes() {
    init_logger();
    let num_sites = 20;
    let (positions, rho) = uniform_sites(num_sites, 1e-8);
    let mut ts = TreeSequenceBuilder::new(num_sites as f64, &positions, &rho, TreeSequenceBuilderOptions::default())
        .unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let mut time = 1000.0;
    let mut prev_nodes = Vec::new();
    let root = ts.add_node(time, false).unwrap();
    prev_nodes.push(root);

    for _ in 0..60 {
        time -= 1.0;
        let parent = prev_nodes[rng.gen_range(0..prev_nodes.len())];
        let child = ts.add_node(time, false).unwrap();
        ts.add_path(
            child,
            &[PathSegment {
                left: SiteId::from(0usize),
                right: SiteId::from(num_sites),
                parent,
            }],
            0,
        )
        .unwrap();
        if rng.gen_bool(0.3) {
            let site = SiteId::from(rng.gen_range(0..num_sites));
            ts.add_mutations(child, &[site], &[1]).unwrap();
        }
        prev_nodes.push(child);
    }

    assert!(ts.num_nodes() >= 50);

    let nodes1 = ts.dump_nodes();
    let edges1 = ts.dump_edges();
    let mutations1 = ts.dump_mutations();

    let mut restored = TreeSequenceBuilder::new(num_sites as f64, &positions, &rho, TreeSequenceBuilderOptions::default())
        .unwrap();
    restored.restore_nodes(&nodes1.0, &nodes1.1).unwrap();
    restored
        .restore_edges(&edges1.0, &edges1.1, &edges1.2, &edges1.3)
        .unwrap();
    restored
        .restore_mutations(&mutations1.0, &mutations1.1, &mutations1.2, &mutations1.3)
        .unwrap();

    assert_eq!(nodes1, restored.dump_nodes());
    assert_eq!(edges1, restored.dump_edges());
    assert_eq!(mutations1, restored.dump_mutations());

    let nodes2 = restored.dump_nodes();
    let edges2 = restored.dump_edges();
    let mutations2 = restored.dump_mutations();
    assert_eq!(nodes1, nodes2);
    assert_eq!(edges1, edges2);
    assert_eq!(mutations1, mutations2);
}

/// Invariant: for every edge, `time(parent) > time(child)` and
/// `0 <= left < right <= num_sites`.
#[test]
fn edge_invariants_hold_after_many_insertions() {
    init_logger();
    let num_sites = 10;
    let (positions, rho) = uniform_sites(num_sites, 1e-8);
    let mut ts = TreeSequenceBuilder::new(num_sites as f64, &positions, &rho, TreeSequenceBuilderOptions::default())
        .unwrap();
    let root = ts.add_node(100.0, false).unwrap();
    let mut time = 99.0;
    let mut nodes = vec![root];
    for _ in 0..20 {
        let child = ts.add_node(time, false).unwrap();
        ts.add_path(
            child,
            &[PathSegment {
                left: SiteId::from(0usize),
                right: SiteId::from(num_sites),
                parent: *nodes.last().unwrap(),
            }],
            0,
        )
        .unwrap();
        nodes.push(child);
        time -= 1.0;
    }

    let (left, right, parent, child) = ts.dump_edges();
    for i in 0..left.len() {
        assert!(left[i] >= 0 && left[i] < right[i] && right[i] <= num_sites as i32);
        let pt = ts.node_time(tsinfer::NodeId::from(parent[i])).unwrap();
        let ct = ts.node_time(tsinfer::NodeId::from(child[i])).unwrap();
        assert!(pt > ct);
    }
}

/// Boundary: a site with `recombination_rate == 1` always introduces a
/// segment boundary at that site. Two ancestors A=[1,1,0,0], B=[0,0,1,1]
/// under a common root, with the breakpoint rate at site 2 raised to 1.0;
/// the copying choice is unchanged (A best explains the first half, B the
/// second) and the mandatory split still lands at site 2.
#[test]
fn recombination_rate_one_always_splits() {
    init_logger();
    let positions = vec![0.0, 1.0, 2.0, 3.0];
    let rho = vec![0.0, 0.0, 1.0, 0.0];
    let mut ts = TreeSequenceBuilder::new(4.0, &positions, &rho, TreeSequenceBuilderOptions::default())
        .unwrap();
    let root = ts.add_node(2.0, false).unwrap();
    let a = ts.add_node(1.0, true).unwrap();
    let b = ts.add_node(1.0, true).unwrap();
    ts.add_path(
        a,
        &[PathSegment {
            left: SiteId::from(0usize),
            right: SiteId::from(4usize),
            parent: root,
        }],
        0,
    )
    .unwrap();
    ts.add_path(
        b,
        &[PathSegment {
            left: SiteId::from(0usize),
            right: SiteId::from(4usize),
            parent: root,
        }],
        0,
    )
    .unwrap();
    ts.add_mutations(a, &[SiteId::from(0usize), SiteId::from(1usize)], &[1, 1])
        .unwrap();
    ts.add_mutations(b, &[SiteId::from(2usize), SiteId::from(3usize)], &[1, 1])
        .unwrap();

    let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.0));
    let result = matcher
        .find_path(&ts, SiteId::from(0usize), SiteId::from(4usize), &[1, 1, 1, 1])
        .unwrap();

    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].left, SiteId::from(0usize));
    assert_eq!(result.segments[0].right, SiteId::from(2usize));
    assert_eq!(result.segments[0].parent, a);
    assert_eq!(result.segments[1].left, SiteId::from(2usize));
    assert_eq!(result.segments[1].right, SiteId::from(4usize));
    assert_eq!(result.segments[1].parent, b);
    assert!(result.mismatches.is_empty());
}

/// Boundary: a site with `recombination_rate == 0` never introduces a
/// segment boundary there, even with a second, differently-patterned
/// ancestor available to copy from. Same topology as the `rho == 1` case
/// above, but every site has `recombination_rate == 0` and the query
/// matches ancestor `a` exactly throughout, so the path stays on `a` with
/// no forced split.
#[test]
fn recombination_rate_zero_never_splits() {
    init_logger();
    let positions = vec![0.0, 1.0, 2.0, 3.0];
    let rho = vec![0.0, 0.0, 0.0, 0.0];
    let mut ts = TreeSequenceBuilder::new(4.0, &positions, &rho, TreeSequenceBuilderOptions::default())
        .unwrap();
    let root = ts.add_node(2.0, false).unwrap();
    let a = ts.add_node(1.0, true).unwrap();
    let b = ts.add_node(1.0, true).unwrap();
    ts.add_path(
        a,
        &[PathSegment {
            left: SiteId::from(0usize),
            right: SiteId::from(4usize),
            parent: root,
        }],
        0,
    )
    .unwrap();
    ts.add_path(
        b,
        &[PathSegment {
            left: SiteId::from(0usize),
            right: SiteId::from(4usize),
            parent: root,
        }],
        0,
    )
    .unwrap();
    ts.add_mutations(a, &[SiteId::from(0usize), SiteId::from(1usize)], &[1, 1])
        .unwrap();
    ts.add_mutations(b, &[SiteId::from(2usize), SiteId::from(3usize)], &[1, 1])
        .unwrap();

    let mut matcher = AncestorMatcher::new(8, Theta::Uniform(0.0));
    let result = matcher
        .find_path(&ts, SiteId::from(0usize), SiteId::from(4usize), &[1, 1, 0, 0])
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].left, SiteId::from(0usize));
    assert_eq!(result.segments[0].right, SiteId::from(4usize));
    assert_eq!(result.segments[0].parent, a);
    assert!(result.mismatches.is_empty());
}
