//! The repository handle and the operations built on it.
//!
//! [`Repository`] owns the working-tree root explicitly; every path the
//! engine touches is resolved against it. There is no reliance on the
//! process working directory below the dispatcher.

mod branch;
mod checkout;
mod clean;
mod commit;
mod diff;
pub mod ignore;
pub mod log;
mod merge;
mod reset;
mod stage;
mod status;

pub use clean::CleanedFile;
pub use commit::CommitOutcome;
pub use merge::MergeOutcome;
pub use status::StatusReport;

use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{RepoError, Result};
use crate::storage::{
    tree, Commit, CommitLog, Config, Index, ObjectStore, RefStore, TreeMap,
};

/// Name of the metadata directory at the working-tree root.
pub const REPO_DIR: &str = ".kitkat";
/// Name of the ignore-pattern file at the working-tree root.
pub const IGNORE_FILE: &str = ".kitkatignore";
/// Branch created by `init`.
pub const DEFAULT_BRANCH: &str = "main";

/// An opened kitkat repository.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    pub(crate) objects: ObjectStore,
    pub(crate) index: Index,
    pub(crate) log: CommitLog,
    pub(crate) refs: RefStore,
    pub(crate) config: Config,
}

impl Repository {
    fn at(root: PathBuf) -> Self {
        let kit = root.join(REPO_DIR);
        Self {
            objects: ObjectStore::new(kit.join("objects")),
            index: Index::new(kit.join("index")),
            log: CommitLog::new(kit.join("commits.log")),
            refs: RefStore::new(kit.clone()),
            config: Config::new(kit.join("config")),
            root,
        }
    }

    /// Create a new repository at `root`.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let kit = root.join(REPO_DIR);
        if kit.exists() {
            return Err(RepoError::Other(format!(
                "{} already exists",
                kit.display()
            )));
        }

        fs::create_dir_all(kit.join("objects"))?;
        fs::create_dir_all(kit.join("refs").join("heads"))?;
        fs::create_dir_all(kit.join("refs").join("tags"))?;

        let repo = Self::at(root);
        repo.refs.set_head_branch(DEFAULT_BRANCH)?;
        repo.index.save(&Default::default())?;
        Ok(repo)
    }

    /// Open the repository rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(REPO_DIR).is_dir() {
            return Err(RepoError::NotARepo);
        }
        Ok(Self::at(root))
    }

    /// The working-tree root this handle owns.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Raw object bytes, for `show-object`.
    pub fn show_object(&self, hash: &str) -> Result<Vec<u8>> {
        let hash = crate::storage::ObjectHash::parse(hash)
            .ok_or_else(|| RepoError::ObjectNotFound(hash.to_string()))?;
        self.objects.get(&hash)
    }

    /// Absolute path for a repo-relative file.
    pub(crate) fn work_path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// The commit HEAD resolves to.
    pub(crate) fn head_commit(&self) -> Result<Commit> {
        let hash = self.refs.resolve_head()?;
        self.log.find(hash.as_str())
    }

    /// The tree of the HEAD commit, or an empty tree before the first commit.
    pub(crate) fn head_tree_or_empty(&self) -> Result<TreeMap> {
        match self.head_commit() {
            Ok(commit) => tree::parse(&self.objects, &commit.tree_hash),
            Err(RepoError::NoCommits) => Ok(TreeMap::new()),
            Err(e) => Err(e),
        }
    }

    /// Human-readable description of where HEAD is: a branch name, or a
    /// detached-HEAD note.
    pub fn head_state(&self) -> Result<String> {
        match self.refs.head_ref()? {
            crate::storage::HeadRef::Branch(name) => Ok(name),
            crate::storage::HeadRef::Detached(hash) => {
                Ok(format!("HEAD (detached at {})", hash.short()))
            }
        }
    }

    /// Reset working directory and index to the tree of `target`.
    ///
    /// Shared by checkout, merge, and reset. Paths tracked in the current
    /// index but absent from the target tree are removed from disk; every
    /// target entry is materialized; the index is overwritten to match.
    pub(crate) fn apply_tree(&self, target: &TreeMap) -> Result<()> {
        let current = self.index.load().unwrap_or_default();
        for path in current.keys() {
            if !target.contains_key(path) {
                let _ = fs::remove_file(self.work_path(path));
            }
        }

        for (path, hash) in target {
            let bytes = self.objects.get(hash)?;
            let dest = self.work_path(path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, bytes)?;
        }

        self.index.save(target)
    }

    /// Every regular file under the root, repo-relative with forward
    /// slashes, `.kitkat/` excluded. Sorted for deterministic output.
    pub(crate) fn walk_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != REPO_DIR);

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .expect("walked path is under root");
            files.push(path_to_slash(rel));
        }
        Ok(files)
    }
}

/// Convert a relative path to the forward-slash form stored in the index.
/// A leading `./` is dropped so `./a.txt` and `a.txt` name the same entry.
pub(crate) fn path_to_slash(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// A path is safe iff it is relative, contains no `..` component, and does
/// not point at or into the metadata directory.
pub fn is_safe_path(path: &str) -> bool {
    let p = Path::new(path);
    if p.is_absolute() {
        return false;
    }
    for component in p.components() {
        match component {
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => return false,
            _ => {}
        }
    }
    let normalized = path_to_slash(p);
    normalized != REPO_DIR && !normalized.starts_with(&format!("{REPO_DIR}/"))
}

/// Reject unsafe paths with a typed error; return the normalized form used
/// as the index key.
pub(crate) fn ensure_safe_path(path: &str) -> Result<String> {
    if is_safe_path(path) {
        Ok(path_to_slash(Path::new(path)))
    } else {
        Err(RepoError::UnsafePath(path.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn test_init_creates_layout() {
        let (dir, _repo) = setup();
        let kit = dir.path().join(REPO_DIR);
        assert!(kit.join("objects").is_dir());
        assert!(kit.join("refs").join("heads").is_dir());
        assert!(kit.join("refs").join("tags").is_dir());
        assert_eq!(
            fs::read_to_string(kit.join("HEAD")).unwrap(),
            "ref: refs/heads/main\n"
        );
    }

    #[test]
    fn test_init_twice_fails() {
        let (dir, _repo) = setup();
        assert!(Repository::init(dir.path()).is_err());
    }

    #[test]
    fn test_open_requires_repo() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(RepoError::NotARepo)
        ));
        Repository::init(dir.path()).unwrap();
        assert!(Repository::open(dir.path()).is_ok());
    }

    #[test]
    fn test_safe_path_rules() {
        assert!(is_safe_path("a.txt"));
        assert!(is_safe_path("dir/sub/file.rs"));
        assert!(!is_safe_path("../escape"));
        assert!(!is_safe_path("dir/../../escape"));
        assert!(!is_safe_path("/absolute"));
        assert!(!is_safe_path(".kitkat"));
        assert!(!is_safe_path(".kitkat/index"));
        assert!(is_safe_path(".kitkatignore"));
    }

    #[test]
    fn test_walk_skips_repo_dir() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "a");
        write_file(&repo, "sub/b.txt", "b");

        let files = repo.walk_files().unwrap();
        assert_eq!(files, vec!["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn test_head_state_on_fresh_repo() {
        let (_dir, repo) = setup();
        assert_eq!(repo.head_state().unwrap(), "main");
    }

    #[test]
    fn test_init_add_commit_workflow() {
        let (_dir, repo) = setup();
        write_file(&repo, "a.txt", "hello\n");
        repo.add("a.txt").unwrap();
        let outcome = repo.commit("first").unwrap();

        let entries = repo.log_entries(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[0].id, outcome.commit.id);

        assert!(repo.status().unwrap().is_clean());

        // Refs never point at missing commits, and the commit's tree is
        // fully materialized in the object store.
        let head = repo.head_commit().unwrap();
        let snapshot = crate::storage::tree::parse(&repo.objects, &head.tree_hash).unwrap();
        for hash in snapshot.values() {
            assert!(repo.objects.exists(hash));
        }
    }
}
