//! The key/value configuration store.
//!
//! A single JSON object at `<repo>/config`. The engine only ever asks for
//! `user.name` and `user.email`, but the store is generic: `config --global`
//! can set anything.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::storage::atomic::atomic_write;

#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
}

impl Config {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if data.is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        atomic_write(&self.path, &serde_json::to_vec(&map)?)
    }

    /// All entries, sorted by key.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        Ok(self.load()?.into_iter().collect())
    }
}
