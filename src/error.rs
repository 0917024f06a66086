//! Error types for the engine.
//!
//! Every fallible operation in the crate returns [`RepoError`]. The CLI
//! dispatcher maps these to exit codes and messages; the engine itself never
//! signals failure through sentinel strings.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RepoError>;

/// The error type for all repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// the current directory is not inside a kitkat repository
    #[error("not a kitkat repository (run `kitkat init`)")]
    NotARepo,

    /// the path escapes the working tree or points into the repo directory
    #[error("unsafe path: {0}")]
    UnsafePath(String),

    /// the index file exists but does not parse
    #[error("index file corrupted")]
    IndexCorrupt(#[source] serde_json::Error),

    /// an object referenced by a tree or the index is missing from the store
    #[error("object {0} not found")]
    ObjectNotFound(String),

    /// no commit matches the given id or prefix
    #[error("commit with hash {0} not found")]
    CommitNotFound(String),

    /// a short hash matched more than one commit
    #[error("ambiguous short hash {hash} (matches {count} commits)")]
    AmbiguousHash { hash: String, count: usize },

    /// the new tree is identical to the HEAD tree
    #[error("nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("branch '{0}' already exists")]
    BranchExists(String),

    /// refusing to delete the branch HEAD currently points at
    #[error("branch '{0}' is currently checked out; switch branches first")]
    BranchInUse(String),

    /// HEAD names a branch whose pointer file is gone
    #[error("current branch '{0}' not found")]
    BranchMissing(String),

    /// the operation needs a branch but HEAD holds a raw commit hash
    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    /// uncommitted changes would be overwritten
    #[error("local changes to '{0}' would be overwritten; commit or discard them first")]
    LocalChanges(String),

    /// an untracked file sits where a checkout wants to write
    #[error("untracked file '{0}' would be overwritten")]
    WouldOverwriteUntracked(String),

    /// the branches diverged; only fast-forward merges are supported
    #[error("not possible to fast-forward, aborting; rebase '{0}' onto the current branch")]
    NonFastForward(String),

    /// another process holds the commit-log lock
    #[error("repository is busy: another kitkat process holds the lock")]
    RepoBusy,

    #[error("no commits yet")]
    NoCommits,

    #[error("no common ancestor found")]
    NoCommonAncestor,

    /// the operation failed after moving a ref; the pointer was restored
    #[error("{source}; branch pointer rolled back to {restored}")]
    RolledBack {
        #[source]
        source: Box<RepoError>,
        restored: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// catch-all for operation-specific failures with no recovery contract
    #[error("{0}")]
    Other(String),
}

impl RepoError {
    /// Wrap `self` in a rollback note after a pointer restore.
    pub fn rolled_back(self, restored: impl Into<String>) -> Self {
        RepoError::RolledBack {
            source: Box::new(self),
            restored: restored.into(),
        }
    }
}
