//! The staging index: the mutable map that becomes the next commit's tree.
//!
//! On disk it is a single JSON object `{path: hash}` at `<repo>/index`,
//! rewritten atomically on every mutation. An absent or empty file is an
//! empty index; unparseable contents surface as `IndexCorrupt` rather than
//! being silently discarded.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{RepoError, Result};
use crate::storage::atomic::atomic_write;
use crate::storage::types::ObjectHash;

/// Path → blob hash, ordered for deterministic serialization.
pub type IndexMap = BTreeMap<String, ObjectHash>;

#[derive(Debug, Clone)]
pub struct Index {
    path: PathBuf,
}

impl Index {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<IndexMap> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(e) => return Err(e.into()),
        };
        if data.is_empty() {
            return Ok(IndexMap::new());
        }
        serde_json::from_slice(&data).map_err(RepoError::IndexCorrupt)
    }

    pub fn save(&self, map: &IndexMap) -> Result<()> {
        let data = serde_json::to_vec(map)?;
        atomic_write(&self.path, &data)
    }

    /// Stage a single path. Loads, updates, and saves.
    pub fn set(&self, path: &str, hash: ObjectHash) -> Result<()> {
        let mut map = self.load()?;
        map.insert(path.to_string(), hash);
        self.save(&map)
    }

    /// Unstage a single path. Returns whether it was present.
    pub fn remove(&self, path: &str) -> Result<bool> {
        let mut map = self.load()?;
        let present = map.remove(path).is_some();
        if present {
            self.save(&map)?;
        }
        Ok(present)
    }
}
