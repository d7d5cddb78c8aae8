//! Dense integer identifiers.
//!
//! A single [`NodeId`] type is used for both ancestor/sample nodes and for
//! "which node does this edge/mutation reference" throughout, rather than
//! separate ancestor and node id types.

use std::fmt;

/// Raw representation of every id type in this crate.
pub type RawId = i32;

/// Sentinel for "no node".
pub const NULL_NODE: RawId = -1;

macro_rules! define_id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub RawId);

        impl $name {
            /// The sentinel value denoting absence.
            pub const NULL: Self = Self(NULL_NODE);

            /// `true` if this id is the [`Self::NULL`] sentinel.
            pub fn is_null(&self) -> bool {
                self.0 == NULL_NODE
            }

            /// This id as a `usize` array index.
            ///
            /// # Panics
            ///
            /// Panics if `self` is negative (including [`Self::NULL`]).
            pub fn as_usize(&self) -> usize {
                assert!(self.0 >= 0, "cannot index with a negative/null id");
                self.0 as usize
            }
        }

        impl From<RawId> for $name {
            fn from(value: RawId) -> Self {
                Self(value)
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value as RawId)
            }
        }

        impl From<$name> for RawId {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id_type!(
    /// The id of a node: a sample, an inferred ancestor, or any other
    /// node appended to a [`crate::tree_sequence::TreeSequenceBuilder`].
    NodeId
);
define_id_type!(
    /// The id of a site: a dense index in `[0, num_sites)`.
    SiteId
);
define_id_type!(
    /// The id of a mutation, in insertion order.
    MutationId
);

/// An allele: `0` or `1` in the biallelic base case, `-1` for missing data.
///
/// This crate supports only biallelic sites, so `Allele` stays a plain
/// `i8` rather than an enum over an open allele set.
pub type Allele = i8;

/// Sentinel allele value meaning "missing/unknown".
pub const MISSING_ALLELE: Allele = -1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_node_is_null() {
        assert!(NodeId::NULL.is_null());
        assert_eq!(NodeId::NULL.0, -1);
    }

    #[test]
    fn node_id_roundtrips_through_usize() {
        let n: NodeId = 4usize.into();
        assert_eq!(n.as_usize(), 4);
    }

    #[test]
    #[should_panic]
    fn as_usize_panics_on_null() {
        let _ = NodeId::NULL.as_usize();
    }
}
