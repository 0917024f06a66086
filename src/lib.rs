//! kitkat - a content-addressed version control engine.
//!
//! A working directory is staged into an index, committed as an immutable
//! snapshot, and arranged into a history graph reachable through named
//! branch pointers. Blobs and trees live in a content-addressed object
//! store; commits live in an append-only log; refs are single-hash files
//! updated atomically.
//!
//! # Example
//!
//! ```no_run
//! use kitkat::repo::Repository;
//!
//! let repo = Repository::init(".").unwrap();
//! std::fs::write("a.txt", "hello\n").unwrap();
//! repo.add("a.txt").unwrap();
//! let outcome = repo.commit("first").unwrap();
//! println!("{} {}", outcome.commit.id.short(), outcome.summary);
//! ```

pub mod diff;
pub mod error;
pub mod repo;
pub mod storage;

pub use error::{RepoError, Result};
