//! Rendering diffs between the trees the engine tracks.
//!
//! Staged mode compares the index against the HEAD tree; unstaged mode
//! compares the working tree against the index and also shows untracked
//! files as pure insertions.

use std::fmt::Write as _;
use std::fs;

use crate::diff::{diff_slices, split_lines, DiffOp, DiffRun};
use crate::error::{RepoError, Result};
use crate::repo::Repository;

impl Repository {
    /// Render the requested diff as display text.
    pub fn diff(&self, staged: bool) -> Result<String> {
        // Nothing committed yet means nothing to compare against.
        match self.head_commit() {
            Ok(_) => {}
            Err(RepoError::NoCommits) => {
                return Ok("No commits yet. Nothing to diff against.\n".to_string())
            }
            Err(e) => return Err(e),
        }

        if staged {
            self.diff_staged()
        } else {
            self.diff_unstaged()
        }
    }

    fn diff_staged(&self) -> Result<String> {
        let head_tree = self.head_tree_or_empty()?;
        let index = self.index.load()?;
        let mut out = String::new();

        for (path, index_hash) in &index {
            match head_tree.get(path) {
                None => {
                    writeln!(out, "Added file: {path}").unwrap();
                    let content = self.blob_text(index_hash)?;
                    render_runs(&mut out, &diff_slices(&[], &split_lines(&content)));
                }
                Some(tree_hash) if tree_hash != index_hash => {
                    writeln!(out, "Modified file: {path}").unwrap();
                    let old = self.blob_text(tree_hash)?;
                    let new = self.blob_text(index_hash)?;
                    render_runs(
                        &mut out,
                        &diff_slices(&split_lines(&old), &split_lines(&new)),
                    );
                }
                Some(_) => {}
            }
        }

        for path in head_tree.keys() {
            if !index.contains_key(path) {
                writeln!(out, "Deleted file: {path}").unwrap();
            }
        }

        Ok(out)
    }

    fn diff_unstaged(&self) -> Result<String> {
        let index = self.index.load()?;
        let mut out = String::new();

        for (path, index_hash) in &index {
            let disk = match fs::read_to_string(self.work_path(path)) {
                Ok(content) => content,
                Err(_) => {
                    // Still staged, gone from disk.
                    writeln!(out, "Deleted (unstaged): {path}").unwrap();
                    continue;
                }
            };
            let staged = self.blob_text(index_hash)?;
            if disk != staged {
                writeln!(out, "Changed (unstaged): {path}").unwrap();
                render_runs(
                    &mut out,
                    &diff_slices(&split_lines(&staged), &split_lines(&disk)),
                );
            }
        }

        // Untracked files render as all-new content.
        for path in self.walk_files()? {
            if index.contains_key(&path) {
                continue;
            }
            let content = match fs::read_to_string(self.work_path(&path)) {
                Ok(content) => content,
                Err(_) => continue,
            };
            writeln!(out, "Untracked: {path}").unwrap();
            render_runs(&mut out, &diff_slices(&[], &split_lines(&content)));
        }

        Ok(out)
    }

    fn blob_text(&self, hash: &crate::storage::ObjectHash) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.objects.get(hash)?).into_owned())
    }
}

/// `+`/`-` prefixes for changes, two spaces of context for equal lines.
fn render_runs(out: &mut String, runs: &[DiffRun<String>]) {
    for run in runs {
        let prefix = match run.op {
            DiffOp::Insert => "+ ",
            DiffOp::Delete => "- ",
            DiffOp::Equal => "  ",
        };
        for line in &run.items {
            writeln!(out, "{prefix}{line}").unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::repo::testutil::*;

    #[test]
    fn test_diff_without_commits() {
        let (_dir, repo) = setup();
        let out = repo.diff(false).unwrap();
        assert!(out.contains("No commits yet"));
    }

    #[test]
    fn test_staged_diff_shows_added_and_modified() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "one\ntwo\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        write_file(&repo, "a.txt", "one\nTWO\n");
        write_file(&repo, "b.txt", "brand new\n");
        repo.add("a.txt").unwrap();
        repo.add("b.txt").unwrap();

        let out = repo.diff(true).unwrap();
        assert!(out.contains("Modified file: a.txt"));
        assert!(out.contains("- two"));
        assert!(out.contains("+ TWO"));
        assert!(out.contains("  one"));
        assert!(out.contains("Added file: b.txt"));
        assert!(out.contains("+ brand new"));
    }

    #[test]
    fn test_staged_diff_shows_deletions() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "a\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        repo.remove_file("a.txt").unwrap();
        let out = repo.diff(true).unwrap();
        assert!(out.contains("Deleted file: a.txt"));
    }

    #[test]
    fn test_unstaged_diff_shows_working_tree_edits() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "one\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        write_file(&repo, "a.txt", "one\nand more\n");
        let out = repo.diff(false).unwrap();
        assert!(out.contains("Changed (unstaged): a.txt"));
        assert!(out.contains("+ and more"));
    }

    #[test]
    fn test_unstaged_diff_lists_untracked_content() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "a\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        write_file(&repo, "notes.txt", "draft\n");
        let out = repo.diff(false).unwrap();
        assert!(out.contains("Untracked: notes.txt"));
        assert!(out.contains("+ draft"));
    }

    #[test]
    fn test_unstaged_diff_reports_deleted_files() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "a\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        std::fs::remove_file(repo.work_path("a.txt")).unwrap();
        let out = repo.diff(false).unwrap();
        assert!(out.contains("Deleted (unstaged): a.txt"));
    }
}
