//! Mission Control Storage - Workspace Files and Local Sources
//!
//! Everything the dashboard knows comes from files under the workspace
//! root, plus a scan of local git repositories. This crate owns that I/O:
//! lossless-or-empty reads, atomic writes serialised per file, and the
//! higher-level stores built on them.

pub mod agents;
pub mod chat_log;
pub mod error;
pub mod knowledge;
pub mod repos;
pub mod task_store;
pub mod workspace;

pub use agents::{AgentDetail, AgentDirectory, AgentRoster};
pub use chat_log::{ChatLog, HistoryPage, HistoryQuery};
pub use error::{StorageError, StorageResult};
pub use repos::{detect_language, GitRunner, RepoScanner, SystemGit};
pub use task_store::{TaskList, TaskStore};
pub use workspace::{expand_home, resolve_root, resolve_root_with, FileStat, Workspace, WriteGuard};
