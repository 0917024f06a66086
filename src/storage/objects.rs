//! The content-addressed object store.
//!
//! Objects are opaque byte sequences keyed by the hex SHA-1 of their content
//! and laid out git-style: `objects/<hash[0..2]>/<hash[2..]>`. They are
//! written once and never modified or deleted; a put of existing content is
//! a no-op that returns the same hash.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

use crate::error::{RepoError, Result};
use crate::storage::atomic::atomic_write;
use crate::storage::types::ObjectHash;

#[derive(Debug, Clone)]
pub struct ObjectStore {
    dir: PathBuf,
}

impl ObjectStore {
    /// An object store rooted at `<repo>/objects`.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn object_path(&self, hash: &ObjectHash) -> PathBuf {
        let hex = hash.as_str();
        self.dir.join(&hex[..2]).join(&hex[2..])
    }

    /// Store `bytes`, returning their hash. Idempotent.
    pub fn put(&self, bytes: &[u8]) -> Result<ObjectHash> {
        let hash = ObjectHash::of_bytes(bytes);
        let path = self.object_path(&hash);
        if !path.exists() {
            atomic_write(&path, bytes)?;
        }
        Ok(hash)
    }

    /// Fetch the bytes for `hash`.
    pub fn get(&self, hash: &ObjectHash) -> Result<Vec<u8>> {
        fs::read(self.object_path(hash))
            .map_err(|_| RepoError::ObjectNotFound(hash.to_string()))
    }

    pub fn exists(&self, hash: &ObjectHash) -> bool {
        self.object_path(hash).exists()
    }

    /// Hash a working-tree file without staging it.
    ///
    /// Streams through the hasher so large files are never held in memory
    /// just to learn their hash.
    pub fn hash_file(path: &Path) -> Result<ObjectHash> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Sha1::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(ObjectHash::from_hex_unchecked(hex::encode(
            hasher.finalize(),
        )))
    }

    /// Hash a file and store its contents, returning the blob hash.
    pub fn put_file(&self, path: &Path) -> Result<ObjectHash> {
        let bytes = fs::read(path)?;
        self.put(&bytes)
    }
}
