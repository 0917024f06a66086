//! Hard reset: move the branch pointer and force the working tree to match.

use crate::error::{RepoError, Result};
use crate::repo::Repository;
use crate::storage::{tree, Commit};

impl Repository {
    /// `reset --hard`: point the current branch (or detached HEAD) at
    /// `id_or_prefix` and overwrite both the working tree and the index with
    /// that commit's tree. Destructive by contract — no dirty-tree guard.
    ///
    /// If the tree application fails, the pointer is restored and the error
    /// carries a rollback note.
    pub fn reset_hard(&self, id_or_prefix: &str) -> Result<Commit> {
        let target = self.log.find(id_or_prefix)?;
        let target_tree = tree::parse(&self.objects, &target.tree_hash)?;

        // Snapshot for rollback before anything moves.
        let old_head = self.refs.resolve_head()?;

        self.refs.update_current(&target.id)?;
        if let Err(e) = self.apply_tree(&target_tree) {
            let restore = self.refs.update_current(&old_head);
            return Err(match restore {
                Ok(()) => e.rolled_back(old_head.as_str()),
                Err(restore_err) => RepoError::Other(format!(
                    "{e}; additionally failed to roll back branch pointer: {restore_err}"
                )),
            });
        }

        Ok(target)
    }
}
