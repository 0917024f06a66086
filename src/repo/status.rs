//! Working-tree status: what is staged, what is not, what is untracked.

use crate::error::Result;
use crate::repo::{ignore, stage, Repository};

/// The three change lists `status` reports, plus where HEAD is.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    /// Branch name or detached-HEAD description.
    pub head_state: String,
    /// Index vs HEAD tree, formatted `new file:`/`modified:`/`deleted:`.
    pub staged: Vec<String>,
    /// Working tree vs index.
    pub unstaged: Vec<String>,
    /// On disk, not tracked, not ignored.
    pub untracked: Vec<String>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

impl Repository {
    /// Compute the full status report.
    pub fn status(&self) -> Result<StatusReport> {
        let head_state = self
            .head_state()
            .unwrap_or_else(|_| "no commits yet".to_string());
        let head_tree = self.head_tree_or_empty()?;
        let index = self.index.load()?;
        let patterns = ignore::load_patterns(self.root())?;

        let mut report = StatusReport {
            head_state,
            ..Default::default()
        };

        // Staged: index vs HEAD tree, over the union of paths.
        let mut all_paths: Vec<&String> = head_tree.keys().chain(index.keys()).collect();
        all_paths.sort();
        all_paths.dedup();
        for path in all_paths {
            match (head_tree.get(path.as_str()), index.get(path.as_str())) {
                (None, Some(_)) => report.staged.push(format!("new file:  {path}")),
                (Some(_), None) => report.staged.push(format!("deleted:   {path}")),
                (Some(head_hash), Some(index_hash)) if head_hash != index_hash => {
                    report.staged.push(format!("modified:  {path}"))
                }
                _ => {}
            }
        }

        // Unstaged and untracked: working tree vs index.
        let on_disk = self.walk_files()?;
        for path in &on_disk {
            match index.get(path) {
                None => {
                    if !ignore::should_ignore(path, &patterns, &index) {
                        report.untracked.push(path.clone());
                    }
                }
                Some(index_hash) => {
                    if stage::hash_on_disk(self, path)? != *index_hash {
                        report.unstaged.push(format!("modified:  {path}"));
                    }
                }
            }
        }
        // Tracked paths missing from the walk were deleted without staging.
        for path in index.keys() {
            if !self.work_path(path).exists() {
                report.unstaged.push(format!("deleted:   {path}"));
            }
        }
        report.unstaged.sort();

        Ok(report)
    }

    /// True when any staged, unstaged, or untracked (non-ignored) change
    /// exists. Short-circuits on the first difference found.
    pub fn is_dirty(&self) -> Result<bool> {
        let head_tree = self.head_tree_or_empty()?;
        let index = self.index.load()?;

        // Staged differences.
        if head_tree != index {
            return Ok(true);
        }

        // Unstaged and untracked differences.
        let patterns = ignore::load_patterns(self.root())?;
        let mut seen = 0usize;
        for path in self.walk_files()? {
            match index.get(&path) {
                None => {
                    if !ignore::should_ignore(&path, &patterns, &index) {
                        return Ok(true);
                    }
                }
                Some(index_hash) => {
                    seen += 1;
                    if stage::hash_on_disk(self, &path)? != *index_hash {
                        return Ok(true);
                    }
                }
            }
        }
        // A tracked file the walk never produced is gone from disk.
        Ok(seen != index.len())
    }
}
