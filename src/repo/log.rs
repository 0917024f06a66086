//! History inspection: log and shortlog.

use crate::error::{RepoError, Result};
use crate::repo::Repository;
use crate::storage::Commit;

impl Repository {
    /// Commits reachable from HEAD, newest first, walking parent links.
    ///
    /// Walking from HEAD rather than the log tail matters: after a reset the
    /// log still holds newer records, but they are no longer history.
    pub fn log_entries(&self, limit: Option<usize>) -> Result<Vec<Commit>> {
        let head = match self.head_commit() {
            Ok(commit) => commit,
            Err(RepoError::NoCommits) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        let mut current = Some(head);
        while let Some(commit) = current {
            if let Some(n) = limit {
                if entries.len() >= n {
                    break;
                }
            }
            current = match commit.parent_id() {
                Some(parent) => Some(self.log.find(parent)?),
                None => None,
            };
            entries.push(commit);
        }
        Ok(entries)
    }

    /// Commit messages grouped by author, most prolific authors first.
    pub fn shortlog(&self) -> Result<Vec<(String, Vec<String>)>> {
        let mut by_author: Vec<(String, Vec<String>)> = Vec::new();
        for commit in self.log.read_all()? {
            match by_author.iter().position(|(name, _)| *name == commit.author_name) {
                Some(i) => by_author[i].1.push(commit.message),
                None => by_author.push((commit.author_name, vec![commit.message])),
            }
        }
        by_author.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        Ok(by_author)
    }
}

/// Long-form rendering of a single log entry.
pub fn format_commit(commit: &Commit) -> String {
    format!(
        "commit {}\nAuthor: {} <{}>\nDate:   {}\n\n    {}\n",
        commit.id,
        commit.author_name,
        commit.author_email,
        commit.timestamp.format("%a %b %d %H:%M:%S %Y %z"),
        commit.message
    )
}

/// Oneline rendering: `<short-id> <message>`.
pub fn format_commit_oneline(commit: &Commit) -> String {
    format!("{} {}", commit.id.short(), commit.message)
}
