//! Mutation storage.

use crate::ids::{Allele, MutationId, NodeId, SiteId};

/// One mutation: `node` carries the mutation, changing the allele at its
/// site to `derived_state`. `parent` is the id of the mutation (if any)
/// that this one is a recurrence of along the same lineage; this crate's
/// biallelic, non-recurrent mutation model never produces a non-null
/// parent, but the field is retained for the dump/restore layout's
/// field-for-field parity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MutationRecord {
    pub site: SiteId,
    pub node: NodeId,
    pub derived_state: Allele,
    pub parent: MutationId,
}

/// Per-site lists of mutations, in insertion order. Realized as one `Vec`
/// per site rather than an intrusive linked list; a `Vec` already
/// preserves insertion order.
#[derive(Debug, Default)]
pub struct MutationTable {
    by_site: Vec<Vec<MutationRecord>>,
    num_mutations: usize,
}

impl MutationTable {
    pub fn new(num_sites: usize) -> Self {
        Self {
            by_site: (0..num_sites).map(|_| Vec::new()).collect(),
            num_mutations: 0,
        }
    }

    pub fn num_mutations(&self) -> usize {
        self.num_mutations
    }

    pub fn at_site(&self, site: SiteId) -> &[MutationRecord] {
        &self.by_site[site.as_usize()]
    }

    /// Append a mutation. Caller must already have verified the
    /// `(site, node)` uniqueness invariant.
    pub fn push(&mut self, site: SiteId, node: NodeId, derived_state: Allele) -> MutationId {
        let id = MutationId::from(self.num_mutations);
        self.by_site[site.as_usize()].push(MutationRecord {
            site,
            node,
            derived_state,
            parent: MutationId::NULL,
        });
        self.num_mutations += 1;
        id
    }

    pub fn contains(&self, site: SiteId, node: NodeId) -> bool {
        self.by_site[site.as_usize()]
            .iter()
            .any(|m| m.node == node)
    }

    pub fn clear(&mut self) {
        for v in &mut self.by_site {
            v.clear();
        }
        self.num_mutations = 0;
    }

    /// Dump in `(site, insertion order)` canonical order.
    pub fn dump(&self) -> (Vec<i32>, Vec<i32>, Vec<Allele>, Vec<i32>) {
        let mut site = Vec::with_capacity(self.num_mutations);
        let mut node = Vec::with_capacity(self.num_mutations);
        let mut derived_state = Vec::with_capacity(self.num_mutations);
        let mut parent = Vec::with_capacity(self.num_mutations);
        for rows in &self.by_site {
            for m in rows {
                site.push(m.site.0);
                node.push(m.node.0);
                derived_state.push(m.derived_state);
                parent.push(m.parent.0);
            }
        }
        (site, node, derived_state, parent)
    }

    pub fn restore(
        &mut self,
        site: &[i32],
        node: &[i32],
        derived_state: &[Allele],
        parent: &[i32],
    ) -> crate::error::TsinferResult<()> {
        let n = site.len();
        if node.len() != n || derived_state.len() != n || parent.len() != n {
            return Err(crate::error::TsinferError::argument(
                "restore_mutations: array lengths must match",
            ));
        }
        self.clear();
        for i in 0..n {
            let s = SiteId::from(site[i]);
            self.by_site[s.as_usize()].push(MutationRecord {
                site: s,
                node: NodeId::from(node[i]),
                derived_state: derived_state[i],
                parent: MutationId::from(parent[i]),
            });
        }
        self.num_mutations = n;
        Ok(())
    }
}
