//! Error taxonomy shared by all three components.

/// The four failure kinds produced by this crate's public operations.
///
/// Every fallible operation in [`crate::ancestor_builder`],
/// [`crate::tree_sequence`], and [`crate::ancestor_matcher`] returns
/// `Result<T, TsinferError>`. This mirrors `tskit-rust`'s `TskitError`: a
/// flat, `thiserror`-derived enum of named variants rather than an error
/// trait hierarchy.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TsinferError {
    /// An allocator or arena could not satisfy a request and growth was not
    /// possible (e.g. the traceback arena's growable limit was exceeded).
    #[error("resource exhausted: {description}")]
    ResourceExhausted { description: String },

    /// A caller-supplied argument violated a documented precondition: an
    /// out-of-range id, unsorted input, overlapping intervals, or a bad
    /// time ordering.
    #[error("argument error: {description}")]
    ArgumentError { description: String },

    /// An operation was invoked on an instance that is not in a state that
    /// supports it (e.g. reused after a failed call left it undefined).
    #[error("state error: {description}")]
    StateError { description: String },

    /// The Li-Stephens HMM reached a site with no viable copying parent,
    /// i.e. every candidate node had zero likelihood. This indicates
    /// inconsistent input (a haplotype that cannot be explained by any
    /// path through the current tree topology, even allowing a fresh
    /// recombination everywhere).
    #[error("numerical degeneracy: {description}")]
    NumericalDegeneracy { description: String },
}

impl TsinferError {
    pub fn resource_exhausted(description: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            description: description.into(),
        }
    }

    pub fn argument(description: impl Into<String>) -> Self {
        Self::ArgumentError {
            description: description.into(),
        }
    }

    pub fn state(description: impl Into<String>) -> Self {
        Self::StateError {
            description: description.into(),
        }
    }

    pub fn numerical(description: impl Into<String>) -> Self {
        Self::NumericalDegeneracy {
            description: description.into(),
        }
    }
}

pub type TsinferResult<T> = Result<T, TsinferError>;
