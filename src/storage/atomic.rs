//! Crash-consistent write primitives.
//!
//! Every metadata write in the repository (index, HEAD, branch and tag
//! pointers, config, objects) goes through [`atomic_write`]: temp file in the
//! destination directory, fsync, rename, fsync the directory. A reader
//! concurrent with a writer sees either the old or the new contents, never a
//! torn file.
//!
//! Commit-log appends cannot use rename (they extend a shared file), so they
//! are serialised through [`Lockfile`] instead — an exclusive OS-level file
//! lock that fails fast when contended.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{RepoError, Result};

/// Write `data` to `target` atomically.
///
/// The temp file is created in the target's parent directory so the final
/// rename never crosses a filesystem boundary.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile_in(dir)?;
    let result = write_and_rename(&mut tmp.file, &tmp.path, target, dir, data);
    if result.is_ok() {
        tmp.keep();
    }
    result
}

fn write_and_rename(
    file: &mut File,
    tmp_path: &Path,
    target: &Path,
    dir: &Path,
    data: &[u8],
) -> Result<()> {
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp_path, target)?;
    // Persist the rename itself. Directory fsync is not a thing on Windows;
    // opening a directory read-only works on Unix.
    #[cfg(unix)]
    {
        File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
    Ok(())
}

/// A temp file that removes itself unless kept.
struct TempSlot {
    file: File,
    path: PathBuf,
    delete: bool,
}

impl TempSlot {
    fn keep(mut self) {
        self.delete = false;
    }
}

impl Drop for TempSlot {
    fn drop(&mut self) {
        if self.delete {
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn tempfile_in(dir: &Path) -> Result<TempSlot> {
    // A process-unique suffix is enough: concurrent writers each get their
    // own temp name, and the final rename decides who wins.
    for attempt in 0u32.. {
        let path = dir.join(format!("atomic-{}-{}", std::process::id(), attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                return Ok(TempSlot {
                    file,
                    path,
                    delete: true,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    unreachable!()
}

/// Exclusive cross-process lock backed by a file.
///
/// Held for the duration of a commit-log append; released on drop. Contention
/// surfaces as [`RepoError::RepoBusy`] immediately rather than blocking — a
/// second writer racing an append should retry, not queue invisibly.
pub struct Lockfile {
    file: File,
    path: PathBuf,
}

impl Lockfile {
    /// Acquire the lock at `path`, failing fast if another process holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)?;
        file.try_lock_exclusive().map_err(|_| RepoError::RepoBusy)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}
