//! On-disk state: objects, index, trees, commit log, refs, config.
//!
//! Everything under `.kitkat/` is owned by this layer. Higher-level
//! operations in [`crate::repo`] compose these stores but never touch the
//! metadata directory directly.

pub mod atomic;
pub mod commits;
pub mod config;
pub mod index;
pub mod objects;
pub mod refs;
pub mod tree;
pub mod types;

pub use commits::CommitLog;
pub use config::Config;
pub use index::{Index, IndexMap};
pub use objects::ObjectStore;
pub use refs::{HeadRef, RefStore};
pub use tree::TreeMap;
pub use types::{BranchName, Commit, ObjectHash};
