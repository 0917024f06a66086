//! Staging operations: add, add-all, rm, mv, ls-files.

use std::fs;

use crate::error::{RepoError, Result};
use crate::repo::{ensure_safe_path, ignore, Repository};
use crate::storage::ObjectStore;

impl Repository {
    /// Stage one file: hash it, store the blob, record it in the index.
    /// A file already staged with the same hash is left alone.
    pub fn add(&self, path: &str) -> Result<()> {
        let path = ensure_safe_path(path)?;

        let abs = self.work_path(&path);
        if !abs.is_file() {
            return Err(RepoError::Other(format!(
                "pathspec '{path}' did not match any files"
            )));
        }

        let hash = self.objects.put_file(&abs)?;
        let index = self.index.load()?;
        if index.get(&path) == Some(&hash) {
            return Ok(());
        }
        self.index.set(&path, hash)
    }

    /// Stage every change in the working tree: new and modified files are
    /// hashed and recorded, files that vanished from disk are dropped from
    /// the index. Ignored paths are skipped unless already tracked.
    ///
    /// Individual file failures are reported and skipped; the walk goes on.
    pub fn add_all(&self) -> Result<()> {
        let mut index = self.index.load()?;
        let patterns = ignore::load_patterns(self.root())?;

        let mut seen = std::collections::BTreeSet::new();
        for path in self.walk_files()? {
            if !super::is_safe_path(&path) {
                eprintln!("warning: skipping unsafe path: {path}");
                continue;
            }
            if ignore::should_ignore(&path, &patterns, &index) {
                continue;
            }
            seen.insert(path.clone());

            match self.objects.put_file(&self.work_path(&path)) {
                Ok(hash) => {
                    index.insert(path, hash);
                }
                Err(e) => {
                    eprintln!("warning: could not add file {path}: {e}");
                }
            }
        }

        // Anything tracked but no longer on disk was deleted; stage that too.
        index.retain(|path, _| seen.contains(path));

        self.index.save(&index)
    }

    /// Unstage a file and delete it from the working tree.
    pub fn remove_file(&self, path: &str) -> Result<()> {
        let path = ensure_safe_path(path)?;

        if !self.index.remove(&path)? {
            return Err(RepoError::Other(format!(
                "pathspec '{path}' did not match any tracked files"
            )));
        }
        match fs::remove_file(self.work_path(&path)) {
            Ok(()) => Ok(()),
            // Already gone from disk is fine; the index entry was the point.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Rename a file and restage it under the new path.
    pub fn move_file(&self, old: &str, new: &str, force: bool) -> Result<()> {
        let old = ensure_safe_path(old)?;
        let new = ensure_safe_path(new)?;
        if old == new {
            return Err(RepoError::Other(
                "source and destination paths are the same".to_string(),
            ));
        }

        let dest = self.work_path(&new);
        if force {
            if dest.exists() {
                if dest.is_dir() {
                    fs::remove_dir_all(&dest)?;
                } else {
                    fs::remove_file(&dest)?;
                }
            }
        } else if dest.exists() {
            return Err(RepoError::Other(format!(
                "destination path '{new}' already exists"
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(self.work_path(&old), &dest)?;

        self.add(&new)?;
        self.index.remove(&old)?;
        Ok(())
    }

    /// Sorted list of tracked paths.
    pub fn ls_files(&self) -> Result<Vec<String>> {
        Ok(self.index.load()?.into_keys().collect())
    }
}

/// Hash a working-tree file without writing to the store.
pub(crate) fn hash_on_disk(repo: &Repository, path: &str) -> Result<crate::storage::ObjectHash> {
    ObjectStore::hash_file(&repo.work_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::testutil::*;

    #[test]
    fn test_add_stores_blob_and_stages() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "hello\n");
        repo.add("a.txt").unwrap();

        let index = repo.index.load().unwrap();
        let hash = index.get("a.txt").expect("a.txt staged");
        assert_eq!(repo.objects.get(hash).unwrap(), b"hello\n");
    }

    #[test]
    fn test_add_missing_file() {
        let (_dir, repo) = setup();
        assert!(repo.add("nope.txt").is_err());
    }

    #[test]
    fn test_add_rejects_unsafe_paths() {
        let (_dir, repo) = setup();
        assert!(matches!(
            repo.add("../outside.txt"),
            Err(RepoError::UnsafePath(_))
        ));
        assert!(matches!(
            repo.add(".kitkat/index"),
            Err(RepoError::UnsafePath(_))
        ));
    }

    #[test]
    fn test_add_all_stages_new_modified_and_deleted() {
        let (_dir, repo) = setup();
        write_file(&repo, "keep.txt", "keep");
        write_file(&repo, "gone.txt", "gone");
        repo.add("keep.txt").unwrap();
        repo.add("gone.txt").unwrap();

        fs::remove_file(repo.work_path("gone.txt")).unwrap();
        write_file(&repo, "keep.txt", "keep v2");
        write_file(&repo, "new.txt", "new");
        repo.add_all().unwrap();

        let index = repo.index.load().unwrap();
        assert!(index.contains_key("new.txt"));
        assert!(!index.contains_key("gone.txt"));
        assert_eq!(
            repo.objects.get(index.get("keep.txt").unwrap()).unwrap(),
            b"keep v2"
        );
    }

    #[test]
    fn test_add_all_respects_ignore_file() {
        let (_dir, repo) = setup();
        write_file(&repo, ".kitkatignore", "*.log\n");
        write_file(&repo, "debug.log", "noise");
        write_file(&repo, "code.rs", "fn main() {}");
        repo.add_all().unwrap();

        let index = repo.index.load().unwrap();
        assert!(index.contains_key("code.rs"));
        assert!(index.contains_key(".kitkatignore"));
        assert!(!index.contains_key("debug.log"));
    }

    #[test]
    fn test_add_all_keeps_tracked_ignored_files() {
        let (_dir, repo) = setup();
        write_file(&repo, ".kitkatignore", "*.log\n");
        write_file(&repo, "debug.log", "v1");
        repo.add("debug.log").unwrap();

        write_file(&repo, "debug.log", "v2");
        repo.add_all().unwrap();

        let index = repo.index.load().unwrap();
        assert_eq!(
            repo.objects.get(index.get("debug.log").unwrap()).unwrap(),
            b"v2",
            "tracked file is restaged despite matching an ignore pattern"
        );
    }

    #[test]
    fn test_remove_file() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "a");
        repo.add("a.txt").unwrap();

        repo.remove_file("a.txt").unwrap();
        assert!(!file_exists(&repo, "a.txt"));
        assert!(repo.index.load().unwrap().is_empty());

        assert!(repo.remove_file("a.txt").is_err());
    }

    #[test]
    fn test_move_file() {
        let (_dir, repo) = setup();
        write_file(&repo, "old.txt", "content");
        repo.add("old.txt").unwrap();

        repo.move_file("old.txt", "new.txt", false).unwrap();
        assert!(!file_exists(&repo, "old.txt"));
        assert_eq!(read_file(&repo, "new.txt"), "content");

        let index = repo.index.load().unwrap();
        assert!(index.contains_key("new.txt"));
        assert!(!index.contains_key("old.txt"));
    }

    #[test]
    fn test_move_refuses_existing_destination_unless_forced() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "a");
        write_file(&repo, "b.txt", "b");
        repo.add("a.txt").unwrap();

        assert!(repo.move_file("a.txt", "b.txt", false).is_err());
        repo.move_file("a.txt", "b.txt", true).unwrap();
        assert_eq!(read_file(&repo, "b.txt"), "a");
    }

    #[test]
    fn test_ls_files_sorted() {
        let (_dir, repo) = setup();
        for name in ["z.txt", "a.txt", "m.txt"] {
            write_file(&repo, name, name);
            repo.add(name).unwrap();
        }
        assert_eq!(repo.ls_files().unwrap(), vec!["a.txt", "m.txt", "z.txt"]);
    }
}
