//! Workspace accessor.
//!
//! Every file the dashboard reads or writes lives under one root directory
//! owned by the agent system. Reads never fail: a missing or unreadable
//! file looks exactly like an empty one. Writes create parent directories
//! and report errors.

use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Primary override for the workspace root.
pub const WORKSPACE_ENV: &str = "MISSION_CONTROL_WORKSPACE";
/// Override honoured for deployments configured before the rename.
pub const LEGACY_WORKSPACE_ENV: &str = "OPENCLAW_WORKSPACE_PATH";

static ROOT: OnceCell<PathBuf> = OnceCell::new();
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Expand a leading `~` to the home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(raw),
    }
}

/// Resolve the root from an environment lookup. Split out from
/// [`resolve_root`] so the precedence can be tested without touching the
/// process environment.
pub fn resolve_root_with<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    [WORKSPACE_ENV, LEGACY_WORKSPACE_ENV]
        .iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map(|value| expand_home(&value))
        .unwrap_or_else(|| expand_home("~/.openclaw/workspace"))
}

/// Workspace root for this process, resolved once.
pub fn resolve_root() -> PathBuf {
    ROOT.get_or_init(|| resolve_root_with(|key| std::env::var(key).ok()))
        .clone()
}

/// Size and modification time of a workspace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_dir: bool,
}

/// Handle to the workspace directory.
///
/// Cheap to clone; clones share the per-file writer locks.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Workspace rooted at [`resolve_root`].
    pub fn from_env() -> Self {
        Self::new(resolve_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join relative parts under the root.
    pub fn path<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        parts
            .into_iter()
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    /// Path relative to the root, `/`-separated.
    pub fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// File contents, or an empty string on any error.
    pub async fn read_text(&self, path: impl AsRef<Path>) -> String {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tracing::trace!(path = %path.display(), error = %err, "read_text miss");
                String::new()
            }
        }
    }

    /// Parsed JSON, or `fallback` verbatim when the file is missing or
    /// does not parse as `T`.
    pub async fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>, fallback: T) -> T {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(_) => return fallback,
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "Unparseable JSON document");
                fallback
            }
        }
    }

    /// Pretty-print `value` and replace the file atomically: the document
    /// is written to a sibling temporary file that is then renamed over
    /// the target, so readers never observe a partial write.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        let mut body = serde_json::to_vec_pretty(value)?;
        body.push(b'\n');

        let parent = path
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?;

        let file_name = path
            .file_name()
            .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?
            .to_string_lossy();
        let temp = parent.join(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = tokio::fs::write(&temp, &body).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::io(&temp, e));
        }
        if let Err(e) = tokio::fs::rename(&temp, path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::io(path, e));
        }
        Ok(())
    }

    /// Append raw text, creating the file and its parents as needed.
    pub async fn append_text(&self, path: impl AsRef<Path>, text: &str) -> StorageResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| StorageError::io(path, e))?;
        file.flush().await.map_err(|e| StorageError::io(path, e))
    }

    /// Entry names sorted lexicographically; empty on any error.
    pub async fn list_dir(&self, path: impl AsRef<Path>) -> Vec<String> {
        let Ok(mut entries) = tokio::fs::read_dir(path.as_ref()).await else {
            return Vec::new();
        };
        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        names
    }

    pub async fn stat(&self, path: impl AsRef<Path>) -> Option<FileStat> {
        let meta = tokio::fs::metadata(path.as_ref()).await.ok()?;
        let modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Some(FileStat {
            size: meta.len(),
            modified,
            is_dir: meta.is_dir(),
        })
    }

    pub async fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        tokio::fs::try_exists(path.as_ref()).await.unwrap_or(false)
    }

    /// Acquire the writer lock for `path`. Every read-modify-write of a
    /// workspace file holds this guard for its whole duration.
    pub async fn lock(&self, path: impl AsRef<Path>) -> WriteGuard {
        let path = path.as_ref().to_path_buf();
        let mutex = self
            .locks
            .entry(path.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        WriteGuard {
            guard: Some(mutex.lock_owned().await),
            path,
            locks: Arc::clone(&self.locks),
        }
    }

    /// Paths with a writer lock currently held or awaited.
    pub fn held_locks(&self) -> usize {
        self.locks.len()
    }
}

/// Writer lock on one workspace file. The lock table entry is removed on
/// drop once no other writer holds or awaits it.
pub struct WriteGuard {
    guard: Option<OwnedMutexGuard<()>>,
    path: PathBuf,
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for WriteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteGuard").field("path", &self.path).finish()
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.path, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
