//! Creating snapshots: commit, commit-all, amend.

use chrono::Utc;

use crate::diff::{diff_slices, DiffOp};
use crate::error::{RepoError, Result};
use crate::repo::Repository;
use crate::storage::{tree, Commit, TreeMap};

/// A created commit plus its human-readable change summary.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub commit: Commit,
    pub summary: String,
}

impl Repository {
    /// Snapshot the index as a new commit on the current branch.
    pub fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let author_name = self
            .config
            .get("user.name")?
            .unwrap_or_else(|| "Unknown".to_string());
        let author_email = self
            .config
            .get("user.email")?
            .unwrap_or_else(|| "unknown@example.com".to_string());

        // Committing moves a branch pointer; detached HEAD has none.
        let branch = self.refs.current_branch()?.ok_or(RepoError::DetachedHead)?;

        let index = self.index.load()?;
        let tree_hash = tree::build(&self.objects, &index)?;

        let (parent_id, parent_tree) = match self.head_commit() {
            Ok(parent) => {
                let parent_tree = tree::parse(&self.objects, &parent.tree_hash)?;
                (parent.id.as_str().to_string(), parent_tree)
            }
            Err(RepoError::NoCommits) => (String::new(), TreeMap::new()),
            Err(e) => return Err(e),
        };

        let parent_tree_hash = tree::build(&self.objects, &parent_tree)?;
        if tree_hash == parent_tree_hash {
            return Err(RepoError::NothingToCommit);
        }

        let timestamp = Utc::now();
        let commit = Commit {
            id: Commit::compute_id(&tree_hash, &parent_id, message, timestamp),
            parent: parent_id,
            message: message.to_string(),
            timestamp,
            tree_hash,
            author_name,
            author_email,
        };

        self.log.append(&commit)?;
        // First commit on a branch creates its pointer file.
        self.refs.write_branch(&branch, &commit.id)?;

        let new_tree = tree::parse(&self.objects, &commit.tree_hash)?;
        let summary = self.change_summary(&parent_tree, &new_tree)?;

        Ok(CommitOutcome { commit, summary })
    }

    /// `commit -am`: stage everything, then commit.
    pub fn commit_all(&self, message: &str) -> Result<CommitOutcome> {
        self.add_all()?;
        self.commit(message)
    }

    /// Replace the last commit's message.
    ///
    /// The amended record keeps the original tree, parent, author, and
    /// timestamp; only the message (and therefore the id) changes. The
    /// superseded record stays in the log — history is append-only.
    pub fn amend(&self, new_message: &str) -> Result<Commit> {
        let last = self.log.last()?;
        let branch = self.refs.current_branch()?.ok_or(RepoError::DetachedHead)?;

        let amended = Commit {
            id: Commit::compute_id(&last.tree_hash, &last.parent, new_message, last.timestamp),
            parent: last.parent,
            message: new_message.to_string(),
            timestamp: last.timestamp,
            tree_hash: last.tree_hash,
            author_name: last.author_name,
            author_email: last.author_email,
        };

        self.log.append(&amended)?;
        self.refs.write_branch(&branch, &amended.id)?;
        Ok(amended)
    }

    /// `N file(s) changed, I insertion(s)(+), D deletion(s)(-)` between two
    /// trees. Added and deleted files count whole-file lines; modified files
    /// count changed lines from the Myers runs.
    pub(crate) fn change_summary(&self, old_tree: &TreeMap, new_tree: &TreeMap) -> Result<String> {
        let mut files_changed = 0usize;
        let mut insertions = 0usize;
        let mut deletions = 0usize;

        let mut all_paths: Vec<&String> = old_tree.keys().chain(new_tree.keys()).collect();
        all_paths.sort();
        all_paths.dedup();

        for path in all_paths {
            match (old_tree.get(path), new_tree.get(path)) {
                (Some(old_hash), None) => {
                    files_changed += 1;
                    deletions += self.blob_line_count(old_hash)?;
                }
                (None, Some(new_hash)) => {
                    files_changed += 1;
                    insertions += self.blob_line_count(new_hash)?;
                }
                (Some(old_hash), Some(new_hash)) if old_hash != new_hash => {
                    files_changed += 1;
                    let old_lines = self.blob_raw_lines(old_hash)?;
                    let new_lines = self.blob_raw_lines(new_hash)?;
                    for run in diff_slices(&old_lines, &new_lines) {
                        match run.op {
                            DiffOp::Insert => insertions += run.items.len(),
                            DiffOp::Delete => deletions += run.items.len(),
                            DiffOp::Equal => {}
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(format!(
            "{} file{} changed, {} insertion{}(+), {} deletion{}(-)",
            files_changed,
            plural(files_changed),
            insertions,
            plural(insertions),
            deletions,
            plural(deletions)
        ))
    }

    /// Raw `\n`-split lines of a stored blob (a trailing newline yields a
    /// final empty line, so counts match the on-disk byte content).
    fn blob_raw_lines(&self, hash: &crate::storage::ObjectHash) -> Result<Vec<String>> {
        let bytes = self.objects.get(hash)?;
        Ok(String::from_utf8_lossy(&bytes)
            .split('\n')
            .map(|s| s.to_string())
            .collect())
    }

    fn blob_line_count(&self, hash: &crate::storage::ObjectHash) -> Result<usize> {
        Ok(self.blob_raw_lines(hash)?.len())
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::testutil::*;

    #[test]
    fn test_first_commit() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "hello\n");
        repo.add("a.txt").unwrap();

        let outcome = repo.commit("first").unwrap();
        assert_eq!(outcome.commit.message, "first");
        assert_eq!(outcome.commit.parent, "");
        assert_eq!(outcome.commit.author_name, "Test");
        assert!(outcome.summary.starts_with("1 file changed"));

        // The branch pointer now exists and matches the log.
        assert_eq!(
            repo.refs.read_branch("main").unwrap(),
            outcome.commit.id
        );
        assert_eq!(repo.log.last().unwrap(), outcome.commit);
    }

    #[test]
    fn test_commit_links_parent() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "v1\n");
        repo.add("a.txt").unwrap();
        let first = repo.commit("first").unwrap().commit;

        write_file(&repo, "a.txt", "v2\n");
        repo.add("a.txt").unwrap();
        let second = repo.commit("second").unwrap().commit;

        assert_eq!(second.parent, first.id.as_str());
    }

    #[test]
    fn test_nothing_to_commit() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "hello\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        assert!(matches!(
            repo.commit("again"),
            Err(RepoError::NothingToCommit)
        ));
    }

    #[test]
    fn test_empty_repo_empty_index_is_nothing_to_commit() {
        let (_dir, repo) = setup();
        assert!(matches!(
            repo.commit("empty"),
            Err(RepoError::NothingToCommit)
        ));
    }

    #[test]
    fn test_commit_defaults_author() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        write_file(&repo, "a.txt", "x\n");
        repo.add("a.txt").unwrap();

        let commit = repo.commit("first").unwrap().commit;
        assert_eq!(commit.author_name, "Unknown");
        assert_eq!(commit.author_email, "unknown@example.com");
    }

    #[test]
    fn test_commit_refuses_detached_head() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "x\n");
        repo.add("a.txt").unwrap();
        let first = repo.commit("first").unwrap().commit;

        repo.refs.set_head_detached(&first.id).unwrap();
        write_file(&repo, "b.txt", "y\n");
        repo.add("b.txt").unwrap();
        assert!(matches!(repo.commit("nope"), Err(RepoError::DetachedHead)));
    }

    #[test]
    fn test_find_by_id_and_prefix_after_commit() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "x\n");
        repo.add("a.txt").unwrap();
        let commit = repo.commit("first").unwrap().commit;

        assert_eq!(repo.log.find(commit.id.as_str()).unwrap(), commit);
        assert_eq!(repo.log.find(&commit.id.as_str()[..7]).unwrap(), commit);
    }

    #[test]
    fn test_amend_keeps_everything_but_message() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "x\n");
        repo.add("a.txt").unwrap();
        let original = repo.commit("typo mesage").unwrap().commit;

        let amended = repo.amend("typo message").unwrap();
        assert_eq!(amended.message, "typo message");
        assert_eq!(amended.tree_hash, original.tree_hash);
        assert_eq!(amended.parent, original.parent);
        assert_eq!(amended.timestamp, original.timestamp);
        assert_ne!(amended.id, original.id);

        // Pointer moved; the original record is still in the log.
        assert_eq!(repo.refs.read_branch("main").unwrap(), amended.id);
        assert_eq!(repo.log.find(original.id.as_str()).unwrap(), original);
    }

    #[test]
    fn test_amend_with_no_commits() {
        let (_dir, repo) = setup();
        assert!(matches!(repo.amend("msg"), Err(RepoError::NoCommits)));
    }

    #[test]
    fn test_summary_counts() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "one\ntwo\n");
        repo.add("a.txt").unwrap();
        let first = repo.commit("first").unwrap();
        // New file: whole content counts as insertions (raw split includes
        // the trailing empty line).
        assert_eq!(first.summary, "1 file changed, 3 insertions(+), 0 deletions(-)");

        write_file(&repo, "a.txt", "one\nTWO\n");
        repo.add("a.txt").unwrap();
        let second = repo.commit("second").unwrap();
        assert_eq!(second.summary, "1 file changed, 1 insertion(+), 1 deletion(-)");
    }

    #[test]
    fn test_commit_all_stages_then_commits() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "x\n");

        let outcome = repo.commit_all("all in one").unwrap();
        assert_eq!(outcome.commit.message, "all in one");
        assert!(repo.index.load().unwrap().contains_key("a.txt"));
    }
}
