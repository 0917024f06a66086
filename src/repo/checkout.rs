//! Checkout: restoring a file, switching branches, detaching onto a commit.

use std::fs;

use crate::error::{RepoError, Result};
use crate::repo::{ensure_safe_path, Repository};
use crate::storage::{tree, BranchName};

impl Repository {
    /// Restore one file to its state in the HEAD commit.
    ///
    /// Refuses to clobber local modifications (`LocalChanges`) or a file
    /// the index knows nothing about (`WouldOverwriteUntracked`).
    pub fn checkout_file(&self, path: &str) -> Result<()> {
        let path = ensure_safe_path(path)?;

        let head = self.head_commit()?;
        let head_tree = tree::parse(&self.objects, &head.tree_hash)?;
        let blob_hash = head_tree
            .get(&path)
            .ok_or_else(|| RepoError::Other(format!("'{path}' not found in the HEAD commit")))?;

        let abs = self.work_path(&path);
        if abs.exists() {
            let on_disk = super::stage::hash_on_disk(self, &path)?;
            let index = self.index.load()?;
            match index.get(&path) {
                Some(tracked) if *tracked != on_disk => {
                    return Err(RepoError::LocalChanges(path.to_string()));
                }
                Some(_) => {}
                None => {
                    return Err(RepoError::WouldOverwriteUntracked(path.to_string()));
                }
            }
        }

        let bytes = self.objects.get(blob_hash)?;
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(abs, bytes)?;
        Ok(())
    }

    /// Switch HEAD to a branch, rewriting the working tree and index.
    pub fn checkout_branch(&self, name: &str) -> Result<()> {
        if !self.refs.branch_exists(name) {
            return Err(RepoError::BranchNotFound(name.to_string()));
        }
        if self.is_dirty()? {
            return Err(RepoError::LocalChanges("the working tree".to_string()));
        }

        let target_hash = self.refs.read_branch(name)?;
        let commit = self.log.find(target_hash.as_str())?;
        let target_tree = tree::parse(&self.objects, &commit.tree_hash)?;

        self.apply_tree(&target_tree)?;
        self.refs.set_head_branch(name)
    }

    /// Create a branch at HEAD and switch to it (`checkout -b`).
    pub fn checkout_new_branch(&self, name: &str) -> Result<()> {
        self.create_branch(name)?;
        self.checkout_branch(name)
    }

    /// Detach HEAD onto a commit (full hash or unique prefix).
    pub fn checkout_commit(&self, id_or_prefix: &str) -> Result<()> {
        let commit = self.log.find(id_or_prefix)?;
        if self.is_dirty()? {
            return Err(RepoError::LocalChanges("the working tree".to_string()));
        }

        let target_tree = tree::parse(&self.objects, &commit.tree_hash)?;
        self.apply_tree(&target_tree)?;
        self.refs.set_head_detached(&commit.id)
    }

    /// Whether `name` refers to an existing branch. The dispatcher uses this
    /// to decide between branch checkout and file checkout.
    pub fn is_branch(&self, name: &str) -> bool {
        BranchName::new(name).is_some() && self.refs.branch_exists(name)
    }

    /// Whether the argument resolves to exactly one commit in the log.
    pub fn resolves_to_commit(&self, id_or_prefix: &str) -> bool {
        self.log.find(id_or_prefix).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::testutil::*;
    use crate::storage::HeadRef;

    /// Repo with one commit containing a.txt.
    fn setup_committed() -> (tempfile::TempDir, Repository) {
        let (dir, repo) = setup();
        write_file(&repo, "a.txt", "original\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();
        (dir, repo)
    }

    #[test]
    fn test_checkout_file_restores_clean_tracked_file() {
        let (_dir, repo) = setup_committed();
        // Tracked and clean: restoring is a no-op rewrite.
        repo.checkout_file("a.txt").unwrap();
        assert_eq!(read_file(&repo, "a.txt"), "original\n");
    }

    #[test]
    fn test_checkout_file_restores_deleted_file() {
        let (_dir, repo) = setup_committed();
        fs::remove_file(repo.work_path("a.txt")).unwrap();
        repo.checkout_file("a.txt").unwrap();
        assert_eq!(read_file(&repo, "a.txt"), "original\n");
    }

    #[test]
    fn test_checkout_file_refuses_local_changes() {
        let (_dir, repo) = setup_committed();
        write_file(&repo, "a.txt", "edited but not staged\n");
        assert!(matches!(
            repo.checkout_file("a.txt"),
            Err(RepoError::LocalChanges(_))
        ));
    }

    #[test]
    fn test_checkout_file_refuses_untracked() {
        let (_dir, repo) = setup_committed();
        // b.txt was committed on another branch scenario is overkill; simulate
        // by dropping it from the index while it exists on disk.
        write_file(&repo, "b.txt", "untracked");
        // Not in HEAD tree at all -> different error.
        assert!(repo.checkout_file("b.txt").is_err());

        // Make it part of HEAD via a second commit, then untrack and recreate.
        repo.add("b.txt").unwrap();
        repo.commit("add b").unwrap();
        repo.index.remove("b.txt").unwrap();
        assert!(matches!(
            repo.checkout_file("b.txt"),
            Err(RepoError::WouldOverwriteUntracked(_))
        ));
    }

    #[test]
    fn test_checkout_branch_switches_tree_and_index() {
        let (_dir, repo) = setup_committed();

        repo.checkout_new_branch("feat").unwrap();
        write_file(&repo, "b.txt", "feature work\n");
        repo.add("b.txt").unwrap();
        repo.commit("add b").unwrap();

        repo.checkout_branch("main").unwrap();
        assert!(!file_exists(&repo, "b.txt"), "b.txt belongs to feat only");
        assert_eq!(read_file(&repo, "a.txt"), "original\n");
        assert!(!repo.index.load().unwrap().contains_key("b.txt"));

        repo.checkout_branch("feat").unwrap();
        assert_eq!(read_file(&repo, "b.txt"), "feature work\n");
    }

    #[test]
    fn test_checkout_branch_requires_clean_tree() {
        let (_dir, repo) = setup_committed();
        repo.create_branch("feat").unwrap();

        write_file(&repo, "a.txt", "dirty\n");
        assert!(matches!(
            repo.checkout_branch("feat"),
            Err(RepoError::LocalChanges(_))
        ));
    }

    #[test]
    fn test_checkout_unknown_branch() {
        let (_dir, repo) = setup_committed();
        assert!(matches!(
            repo.checkout_branch("ghost"),
            Err(RepoError::BranchNotFound(_))
        ));
    }

    #[test]
    fn test_checkout_commit_detaches_head() {
        let (_dir, repo) = setup_committed();
        let first = repo.log.last().unwrap();

        write_file(&repo, "a.txt", "second version\n");
        repo.add("a.txt").unwrap();
        repo.commit("second").unwrap();

        repo.checkout_commit(first.id.short()).unwrap();
        assert_eq!(read_file(&repo, "a.txt"), "original\n");
        assert_eq!(
            repo.refs.head_ref().unwrap(),
            HeadRef::Detached(first.id.clone())
        );
    }
}
