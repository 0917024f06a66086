//! The append-only commit log and the ancestry queries built on it.
//!
//! Commits are not objects in the store; they live in `commits.log`, one
//! JSON record per line. Appends are serialised across processes through an
//! exclusive lockfile; readers stream the file line by line and skip lines
//! that fail to parse, so one corrupt record never takes the history down
//! with it.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{RepoError, Result};
use crate::storage::atomic::Lockfile;
use crate::storage::types::Commit;

#[derive(Debug, Clone)]
pub struct CommitLog {
    path: PathBuf,
}

impl CommitLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Append one commit record under the repository lock.
    pub fn append(&self, commit: &Commit) -> Result<()> {
        let _lock = Lockfile::acquire(&self.lock_path())?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_vec(commit)?;
        line.push(b'\n');
        file.write_all(&line)?;
        file.sync_all()?;
        Ok(())
    }

    /// Stream every parseable record in log order.
    pub fn read_all(&self) -> Result<Vec<Commit>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut commits = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            // Malformed lines are skipped, not fatal.
            if let Ok(commit) = serde_json::from_str::<Commit>(&line) {
                commits.push(commit);
            }
        }
        Ok(commits)
    }

    /// The most recently appended commit.
    pub fn last(&self) -> Result<Commit> {
        self.read_all()?.pop().ok_or(RepoError::NoCommits)
    }

    /// Look up a commit by full hash or unique prefix.
    pub fn find(&self, id_or_prefix: &str) -> Result<Commit> {
        let commits = self.read_all()?;
        if commits.is_empty() {
            return Err(RepoError::NoCommits);
        }

        let mut matches = Vec::new();
        for commit in commits {
            if commit.id.as_str() == id_or_prefix {
                return Ok(commit);
            }
            if commit.id.as_str().starts_with(id_or_prefix) {
                matches.push(commit);
            }
        }

        match matches.len() {
            1 => Ok(matches.into_iter().next().unwrap()),
            0 => Err(RepoError::CommitNotFound(id_or_prefix.to_string())),
            n => Err(RepoError::AmbiguousHash {
                hash: id_or_prefix.to_string(),
                count: n,
            }),
        }
    }

    /// True when `ancestor` is `descendant` or on its parent chain.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        if ancestor.is_empty() || descendant.is_empty() {
            return Ok(false);
        }
        if ancestor == descendant {
            return Ok(true);
        }

        let mut current = descendant.to_string();
        loop {
            let commit = self.find(&current)?;
            if commit.id.as_str() == ancestor {
                return Ok(true);
            }
            match commit.parent_id() {
                Some(parent) => current = parent.to_string(),
                None => return Ok(false),
            }
        }
    }

    /// Nearest common ancestor of two commits.
    pub fn merge_base(&self, a: &str, b: &str) -> Result<Commit> {
        if a == b {
            return self.find(a);
        }

        let mut ancestors_of_a = std::collections::HashSet::new();
        let mut current = a.to_string();
        loop {
            let commit = self.find(&current)?;
            ancestors_of_a.insert(commit.id.as_str().to_string());
            match commit.parent_id() {
                Some(parent) => current = parent.to_string(),
                None => break,
            }
        }

        let mut current = b.to_string();
        loop {
            let commit = self.find(&current)?;
            if ancestors_of_a.contains(commit.id.as_str()) {
                return Ok(commit);
            }
            match commit.parent_id() {
                Some(parent) => current = parent.to_string(),
                None => return Err(RepoError::NoCommonAncestor),
            }
        }
    }
}
