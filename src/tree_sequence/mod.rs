//! Append-only tree sequence storage and its three ordered edge indexes.

mod builder;
mod edge;
mod index;
mod mutation_table;
mod node_table;

pub use builder::{PathSegment, TreeSequenceBuilder};
pub use edge::{EdgeId, EdgeRecord};
pub use index::EdgeIndexes;
pub use mutation_table::MutationRecord;
pub use node_table::NodeTable;
