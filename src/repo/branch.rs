//! Branch and tag management at the repository level.

use crate::error::{RepoError, Result};
use crate::repo::Repository;
use crate::storage::BranchName;

impl Repository {
    /// Create a branch pointing at the current HEAD commit.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        let name = parse_name(name)?;
        let head = self.head_commit()?;
        self.refs.create_branch(&name, &head.id)
    }

    /// Sorted branch names plus the one HEAD is on, if any.
    pub fn list_branches(&self) -> Result<(Vec<String>, Option<String>)> {
        let branches = self.refs.list_branches()?;
        let current = self.refs.current_branch().unwrap_or(None);
        Ok((branches, current))
    }

    /// Delete a branch. The active branch is protected.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        self.refs.delete_branch(name)
    }

    /// Rename the branch HEAD is on.
    pub fn rename_current_branch(&self, new_name: &str) -> Result<()> {
        self.refs.rename_current_branch(&parse_name(new_name)?)
    }

    /// Create a tag pointing at a commit (full hash or unique prefix).
    pub fn create_tag(&self, name: &str, id_or_prefix: &str) -> Result<()> {
        let name = parse_name(name)?;
        let commit = self.log.find(id_or_prefix)?;
        self.refs.create_tag(&name, &commit.id)
    }

    /// Sorted tag names.
    pub fn list_tags(&self) -> Result<Vec<String>> {
        self.refs.list_tags()
    }
}

fn parse_name(name: &str) -> Result<BranchName> {
    BranchName::new(name).ok_or_else(|| RepoError::Other(format!("invalid ref name: '{name}'")))
}
