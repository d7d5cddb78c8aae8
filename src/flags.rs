//! Bitfield types. The only recognized node flag bit is `IS_SAMPLE`.

use bitflags::bitflags;

/// Raw representation backing all flag types in this crate.
pub type RawFlags = u32;

bitflags! {
    /// Per-node flags stored in the tree sequence builder's node table.
    ///
    /// Only one bit is currently recognized; the type is still a proper
    /// `bitflags` set (rather than a `bool`) so that a future flag can be
    /// added without an API break, matching `tskit-rust`'s `NodeFlags`.
    #[derive(Default)]
    #[repr(transparent)]
    pub struct NodeFlags: RawFlags {
        /// Default (empty): an inferred ancestor, not a sample.
        const NONE = 0;
        /// The node represents one of the input sample haplotypes.
        const IS_SAMPLE = 1 << 0;
    }
}

impl NodeFlags {
    /// Shorthand for `NodeFlags::IS_SAMPLE`.
    pub fn sample() -> Self {
        Self::IS_SAMPLE
    }

    pub fn is_sample(&self) -> bool {
        self.contains(Self::IS_SAMPLE)
    }
}

/// Construction-time options for [`crate::tree_sequence::TreeSequenceBuilder`].
///
/// This is modeled as a dedicated option rather than folded into a generic
/// bitflags set because it changes index maintenance behavior rather than
/// tagging table rows.
#[derive(Debug, Clone, Copy)]
pub struct TreeSequenceBuilderOptions {
    /// When `true`, identical recombination breakpoints shared by multiple
    /// children against the same parent pair are coalesced through a
    /// synthetic intermediate node.
    pub resolve_shared_recombinations: bool,
    /// Initial capacity hint for the node arena. Purely a performance hint;
    /// the arena grows past it transparently.
    pub nodes_chunk_size: usize,
    /// Initial capacity hint for the edge arena.
    pub edges_chunk_size: usize,
}

impl Default for TreeSequenceBuilderOptions {
    fn default() -> Self {
        Self {
            resolve_shared_recombinations: false,
            nodes_chunk_size: 1024,
            edges_chunk_size: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_node_flags_is_not_sample() {
        assert!(!NodeFlags::default().is_sample());
    }

    #[test]
    fn is_sample_flag() {
        assert!(NodeFlags::sample().is_sample());
    }
}
