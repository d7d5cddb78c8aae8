//! `tsinfer`: ancestor inference and tree sequence matching core.
//!
//! This crate implements the inference core of a tree-sequence builder for
//! population genomics: given a panel of sampled haplotypes over a set of
//! biallelic sites, it infers ancestral haplotypes ([`ancestor_builder`])
//! and reconstructs, for each query haplotype, a piecewise-copy path
//! through previously inserted haplotypes ([`ancestor_matcher`]) against
//! an append-only store of nodes, edges, and mutations ([`tree_sequence`]).
//!
//! Dependency order, leaves first: [`alloc`] utilities, then
//! [`tree_sequence`], then [`ancestor_matcher`]; [`ancestor_builder`] is
//! independent of the other two.
//!
//! This crate does not decide iteration order over ancestors, read variant
//! panel files, or define a wire/persistence format beyond the flat-array
//! dump/restore exchange. Those are the outer driver's responsibility.

pub mod alloc;
pub mod ancestor_builder;
pub mod ancestor_matcher;
pub mod error;
pub mod flags;
pub mod ids;
pub mod tree_sequence;

pub use ancestor_builder::AncestorBuilder;
pub use ancestor_matcher::{AncestorMatcher, MatchResult, Theta};
pub use error::{TsinferError, TsinferResult};
pub use flags::{NodeFlags, TreeSequenceBuilderOptions};
pub use ids::{Allele, MutationId, NodeId, SiteId, MISSING_ALLELE, NULL_NODE};
pub use tree_sequence::{PathSegment, TreeSequenceBuilder};
