//! Type-safe wrappers around the raw strings the storage layer trades in.
//!
//! Hashes and branch names travel through a lot of code as plain text; the
//! newtypes here make sure a branch name is never handed to something that
//! expects a hash, and centralize validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Hex-encoded SHA-1 of an object's content. Also used for commit ids,
/// which hash the commit metadata rather than stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHash(String);

impl ObjectHash {
    /// Length of a full hex hash.
    pub const HEX_LEN: usize = 40;

    /// Hash raw bytes into an [`ObjectHash`].
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha1::digest(bytes);
        Self(hex::encode(digest))
    }

    /// Wrap an already hex-encoded hash. The caller is trusted to hand in
    /// 40 lowercase hex chars; use [`ObjectHash::parse`] for external input.
    pub(crate) fn from_hex_unchecked(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Parse and validate external input as a full hash.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == Self::HEX_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form shown to users.
    pub fn short(&self) -> &str {
        &self.0[..7.min(self.0.len())]
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ObjectHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated branch (or tag) name.
///
/// Kept restrictive on purpose: the name becomes a filename under
/// `refs/heads/`, so anything path-like is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty()
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
            || name.starts_with('.')
        {
            return None;
        }
        Some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full ref path stored in a symbolic HEAD, e.g. `refs/heads/main`.
    pub fn ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record in the commit log.
///
/// Field names are pinned to the on-disk NDJSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "ID")]
    pub id: ObjectHash,
    /// Empty string for the root commit.
    #[serde(rename = "Parent")]
    pub parent: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Timestamp", with = "rfc3339_nanos")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "TreeHash")]
    pub tree_hash: ObjectHash,
    #[serde(rename = "AuthorName")]
    pub author_name: String,
    #[serde(rename = "AuthorEmail")]
    pub author_email: String,
}

impl Commit {
    /// Compute the content id of a commit record.
    ///
    /// Author fields are deliberately excluded: two authors producing the
    /// same tree, message and timestamp is treated as infeasible.
    pub fn compute_id(
        tree_hash: &ObjectHash,
        parent: &str,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> ObjectHash {
        let mut hasher = Sha1::new();
        hasher.update(tree_hash.as_str().as_bytes());
        hasher.update(parent.as_bytes());
        hasher.update(message.as_bytes());
        hasher.update(rfc3339_nanos::format(timestamp).as_bytes());
        ObjectHash::from_hex_unchecked(hex::encode(hasher.finalize()))
    }

    /// The parent id, if this is not the root commit.
    pub fn parent_id(&self) -> Option<&str> {
        if self.parent.is_empty() {
            None
        } else {
            Some(&self.parent)
        }
    }
}

/// Serde adapter pinning timestamps to RFC3339 with nanoseconds and a `Z`
/// suffix. The commit id is hashed over this exact rendering, so it must not
/// drift with chrono defaults.
pub(crate) mod rfc3339_nanos {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn format(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&format(*ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(de)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
