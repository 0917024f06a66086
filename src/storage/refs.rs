//! HEAD, branch pointers, and tags.
//!
//! HEAD is either symbolic (`ref: refs/heads/<name>`) or a bare commit hash
//! (detached). Branches and tags are single-hash files under `refs/heads/`
//! and `refs/tags/`. All writes go through the atomic writer, so a pointer
//! is never observed half-updated.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};
use crate::storage::atomic::atomic_write;
use crate::storage::types::{BranchName, ObjectHash};

const SYMREF_PREFIX: &str = "ref: ";
const HEADS_PREFIX: &str = "refs/heads/";

/// Where HEAD currently points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadRef {
    /// Attached to a branch by name.
    Branch(String),
    /// Detached, holding a raw commit hash.
    Detached(ObjectHash),
}

#[derive(Debug, Clone)]
pub struct RefStore {
    /// The repository metadata directory (`.kitkat`).
    dir: PathBuf,
}

impl RefStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn head_path(&self) -> PathBuf {
        self.dir.join("HEAD")
    }

    fn heads_dir(&self) -> PathBuf {
        self.dir.join("refs").join("heads")
    }

    fn tags_dir(&self) -> PathBuf {
        self.dir.join("refs").join("tags")
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_dir().join(name)
    }

    /// Parse the HEAD file.
    pub fn head_ref(&self) -> Result<HeadRef> {
        let raw = fs::read_to_string(self.head_path())?;
        let raw = raw.trim();

        if let Some(ref_path) = raw.strip_prefix(SYMREF_PREFIX) {
            let name = ref_path.strip_prefix(HEADS_PREFIX).unwrap_or(ref_path);
            return Ok(HeadRef::Branch(name.to_string()));
        }

        match ObjectHash::parse(raw) {
            Some(hash) => Ok(HeadRef::Detached(hash)),
            None => Err(RepoError::Other(format!("invalid HEAD contents: {raw:?}"))),
        }
    }

    /// The branch HEAD is attached to, if any.
    pub fn current_branch(&self) -> Result<Option<String>> {
        match self.head_ref()? {
            HeadRef::Branch(name) => Ok(Some(name)),
            HeadRef::Detached(_) => Ok(None),
        }
    }

    /// Resolve HEAD to a commit hash.
    ///
    /// An attached HEAD whose branch file does not exist yet means the branch
    /// is unborn: no commits have been made.
    pub fn resolve_head(&self) -> Result<ObjectHash> {
        match self.head_ref()? {
            HeadRef::Detached(hash) => Ok(hash),
            HeadRef::Branch(name) => match read_hash_file(&self.branch_path(&name)) {
                Ok(Some(hash)) => Ok(hash),
                Ok(None) => Err(RepoError::NoCommits),
                Err(e) => Err(e),
            },
        }
    }

    /// Move whatever HEAD points through to `hash`.
    ///
    /// Attached: rewrite the branch file (which must already exist).
    /// Detached: rewrite HEAD itself.
    pub fn update_current(&self, hash: &ObjectHash) -> Result<()> {
        match self.head_ref()? {
            HeadRef::Branch(name) => {
                let path = self.branch_path(&name);
                if !path.exists() {
                    return Err(RepoError::BranchMissing(name));
                }
                atomic_write(&path, hash.as_str().as_bytes())
            }
            HeadRef::Detached(_) => self.set_head_detached(hash),
        }
    }

    /// Point HEAD at a branch.
    pub fn set_head_branch(&self, name: &str) -> Result<()> {
        let contents = format!("{SYMREF_PREFIX}{HEADS_PREFIX}{name}\n");
        atomic_write(&self.head_path(), contents.as_bytes())
    }

    /// Detach HEAD onto a bare commit hash. No `ref:` prefix — downstream
    /// parsing depends on this encoding.
    pub fn set_head_detached(&self, hash: &ObjectHash) -> Result<()> {
        atomic_write(&self.head_path(), hash.as_str().as_bytes())
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.branch_path(name).exists()
    }

    pub fn read_branch(&self, name: &str) -> Result<ObjectHash> {
        match read_hash_file(&self.branch_path(name))? {
            Some(hash) => Ok(hash),
            None => Err(RepoError::BranchNotFound(name.to_string())),
        }
    }

    pub fn create_branch(&self, name: &BranchName, hash: &ObjectHash) -> Result<()> {
        if self.branch_exists(name.as_str()) {
            return Err(RepoError::BranchExists(name.to_string()));
        }
        atomic_write(&self.branch_path(name.as_str()), hash.as_str().as_bytes())
    }

    /// Overwrite a branch pointer, creating it if needed.
    pub fn write_branch(&self, name: &str, hash: &ObjectHash) -> Result<()> {
        atomic_write(&self.branch_path(name), hash.as_str().as_bytes())
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        if let Ok(Some(current)) = self.current_branch() {
            if current == name {
                return Err(RepoError::BranchInUse(name.to_string()));
            }
        }
        match fs::remove_file(self.branch_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RepoError::BranchNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rename the branch HEAD is on, rewriting HEAD's symbolic target.
    pub fn rename_current_branch(&self, new_name: &BranchName) -> Result<()> {
        let old = match self.head_ref()? {
            HeadRef::Branch(name) => name,
            HeadRef::Detached(_) => return Err(RepoError::DetachedHead),
        };
        if self.branch_exists(new_name.as_str()) {
            return Err(RepoError::BranchExists(new_name.to_string()));
        }
        // The old pointer may not exist yet on an unborn branch; the rename
        // then reduces to retargeting HEAD.
        let old_path = self.branch_path(&old);
        if old_path.exists() {
            fs::rename(old_path, self.branch_path(new_name.as_str()))?;
        }
        self.set_head_branch(new_name.as_str())
    }

    /// Sorted list of branch names.
    pub fn list_branches(&self) -> Result<Vec<String>> {
        list_ref_dir(&self.heads_dir())
    }

    pub fn create_tag(&self, name: &BranchName, hash: &ObjectHash) -> Result<()> {
        atomic_write(&self.tags_dir().join(name.as_str()), hash.as_str().as_bytes())
    }

    /// Sorted list of tag names.
    pub fn list_tags(&self) -> Result<Vec<String>> {
        list_ref_dir(&self.tags_dir())
    }
}

fn read_hash_file(path: &Path) -> Result<Option<ObjectHash>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match ObjectHash::parse(raw.trim()) {
        Some(hash) => Ok(Some(hash)),
        None => Err(RepoError::Other(format!(
            "ref file {} does not contain a commit hash",
            path.display()
        ))),
    }
}

fn list_ref_dir(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}
