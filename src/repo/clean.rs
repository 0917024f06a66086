//! Removing untracked files from the working tree.

use std::fs;

use crate::error::Result;
use crate::repo::{ignore, Repository};

/// One file `clean` removed, or would remove in a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedFile {
    pub path: String,
    pub ignored: bool,
}

impl Repository {
    /// Delete untracked files. Without `force` nothing is touched — the
    /// returned list is the preview. Ignored files are kept unless
    /// `include_ignored` is set.
    ///
    /// A file that fails to delete is reported and skipped.
    pub fn clean(&self, force: bool, include_ignored: bool) -> Result<Vec<CleanedFile>> {
        let index = self.index.load()?;
        let patterns = ignore::load_patterns(self.root())?;

        let mut cleaned = Vec::new();
        for path in self.walk_files()? {
            if index.contains_key(&path) {
                continue;
            }
            let ignored = ignore::should_ignore(&path, &patterns, &index);
            if ignored && !include_ignored {
                continue;
            }

            if force {
                if let Err(e) = fs::remove_file(self.work_path(&path)) {
                    eprintln!("warning: could not remove {path}: {e}");
                    continue;
                }
            }
            cleaned.push(CleanedFile { path, ignored });
        }
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::testutil::*;

    fn setup_mixed() -> (tempfile::TempDir, Repository) {
        let (dir, repo) = setup();
        write_file(&repo, ".kitkatignore", "*.log\n");
        write_file(&repo, "tracked.txt", "tracked");
        write_file(&repo, "untracked.txt", "junk");
        write_file(&repo, "debug.log", "ignored junk");
        repo.add(".kitkatignore").unwrap();
        repo.add("tracked.txt").unwrap();
        (dir, repo)
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let (_dir, repo) = setup_mixed();
        let preview = repo.clean(false, false).unwrap();

        assert_eq!(
            preview,
            vec![CleanedFile {
                path: "untracked.txt".to_string(),
                ignored: false
            }]
        );
        assert!(file_exists(&repo, "untracked.txt"));
        assert!(file_exists(&repo, "debug.log"));
    }

    #[test]
    fn test_force_removes_untracked_only() {
        let (_dir, repo) = setup_mixed();
        repo.clean(true, false).unwrap();

        assert!(!file_exists(&repo, "untracked.txt"));
        assert!(file_exists(&repo, "tracked.txt"));
        assert!(file_exists(&repo, "debug.log"), "ignored file kept without -x");
    }

    #[test]
    fn test_include_ignored_removes_ignored_too() {
        let (_dir, repo) = setup_mixed();
        let cleaned = repo.clean(true, true).unwrap();

        assert!(!file_exists(&repo, "untracked.txt"));
        assert!(!file_exists(&repo, "debug.log"));
        assert!(cleaned.iter().any(|c| c.path == "debug.log" && c.ignored));
    }
}
