//! Tree snapshots: the flat path→blob manifest a commit points at.
//!
//! A tree is serialized one entry per line, `<hash><SP><path>\n`, sorted by
//! path so the same index always produces the same tree hash. Trees are
//! stored in the object store like any other content.

use std::collections::BTreeMap;

use crate::error::{RepoError, Result};
use crate::storage::objects::ObjectStore;
use crate::storage::types::ObjectHash;

/// Path → blob hash as recorded in a snapshot.
pub type TreeMap = BTreeMap<String, ObjectHash>;

/// Serialize `map` and store it, returning the tree hash.
///
/// An empty map serializes to zero bytes, so every empty snapshot shares one
/// well-known hash.
pub fn build(store: &ObjectStore, map: &TreeMap) -> Result<ObjectHash> {
    let mut out = String::new();
    for (path, hash) in map {
        out.push_str(hash.as_str());
        out.push(' ');
        out.push_str(path);
        out.push('\n');
    }
    store.put(out.as_bytes())
}

/// Load and parse the tree stored at `hash`.
pub fn parse(store: &ObjectStore, hash: &ObjectHash) -> Result<TreeMap> {
    let bytes = store.get(hash)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| RepoError::Other(format!("tree object {} is not UTF-8", hash.short())))?;

    let mut map = TreeMap::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let (hex, path) = line.split_once(' ').ok_or_else(|| {
            RepoError::Other(format!("malformed tree entry in {}: {:?}", hash.short(), line))
        })?;
        let blob = ObjectHash::parse(hex).ok_or_else(|| {
            RepoError::Other(format!("malformed blob hash in {}: {:?}", hash.short(), hex))
        })?;
        map.insert(path.to_string(), blob);
    }
    Ok(map)
}
