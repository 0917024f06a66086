//! Fast-forward merge.
//!
//! Only the strict fast-forward case moves anything. Divergent histories are
//! refused with guidance rather than attempting a three-way merge.

use crate::error::{RepoError, Result};
use crate::repo::Repository;
use crate::storage::{tree, ObjectHash};

/// What `merge` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The current branch was moved forward.
    FastForward {
        from: ObjectHash,
        to: ObjectHash,
    },
    /// The other branch is already an ancestor of HEAD.
    AlreadyUpToDate,
}

impl Repository {
    /// Merge `branch` into the current branch, fast-forward only.
    pub fn merge(&self, branch: &str) -> Result<MergeOutcome> {
        if self.is_dirty()? {
            return Err(RepoError::LocalChanges("the working tree".to_string()));
        }

        let their_head = self.refs.read_branch(branch)?;
        let our_head = self.refs.resolve_head()?;

        let base = self
            .log
            .merge_base(our_head.as_str(), their_head.as_str())?;

        if base.id == their_head {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }
        if base.id != our_head {
            return Err(RepoError::NonFastForward(branch.to_string()));
        }

        // Fast-forward: move the pointer, then materialize the tree. If the
        // tree application fails the pointer goes back where it was.
        let target = self.log.find(their_head.as_str())?;
        let target_tree = tree::parse(&self.objects, &target.tree_hash)?;

        self.refs.update_current(&their_head)?;
        if let Err(e) = self.apply_tree(&target_tree) {
            let restore = self.refs.update_current(&our_head);
            return Err(match restore {
                Ok(()) => e.rolled_back(our_head.as_str()),
                Err(restore_err) => RepoError::Other(format!(
                    "{e}; additionally failed to roll back branch pointer: {restore_err}"
                )),
            });
        }

        Ok(MergeOutcome::FastForward {
            from: our_head,
            to: their_head,
        })
    }
}
