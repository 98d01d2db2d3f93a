//! Local git repository scan.
//!
//! Each immediate subdirectory of a scan directory that contains `.git`
//! is reported with its branch, last commit and working-tree state.
//! Every git invocation has its own timeout; a failed or slow command
//! degrades only the field it feeds.

use async_trait::async_trait;
use mission_core::GitRepo;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(3);
const REMOTE_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs git subcommands inside a repository.
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Trimmed stdout of `git <args>`, or `None` on spawn failure,
    /// non-zero exit or timeout.
    async fn run(&self, repo: &Path, args: &[&str], timeout: Duration) -> Option<String>;
}

/// [`GitRunner`] that shells out to the `git` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, repo: &Path, args: &[&str], timeout: Duration) -> Option<String> {
        let child = Command::new("git")
            .args(args)
            .current_dir(repo)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::debug!(repo = %repo.display(), error = %e, "git failed to start");
                return None;
            }
            Err(_) => {
                tracing::debug!(repo = %repo.display(), ?args, "git timed out");
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Guess the main language from marker files in the repository root.
pub fn detect_language(names: &[String]) -> &'static str {
    let lower: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let has = |pred: fn(&str) -> bool| lower.iter().any(|n| pred(n));

    if has(|n| n == "package.json") {
        "TypeScript/JavaScript"
    } else if has(|n| n.ends_with(".py") || n == "requirements.txt") {
        "Python"
    } else if has(|n| n == "go.mod") {
        "Go"
    } else if has(|n| n == "cargo.toml") {
        "Rust"
    } else if has(|n| n.ends_with(".rb") || n == "gemfile") {
        "Ruby"
    } else {
        "Unknown"
    }
}

/// Scanner over a fixed list of parent directories.
pub struct RepoScanner<G = SystemGit> {
    dirs: Vec<PathBuf>,
    git: G,
}

impl RepoScanner<SystemGit> {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self::with_runner(dirs, SystemGit)
    }
}

impl<G: GitRunner> RepoScanner<G> {
    pub fn with_runner(dirs: Vec<PathBuf>, git: G) -> Self {
        Self { dirs, git }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub async fn scan(&self) -> Vec<GitRepo> {
        let mut repos = Vec::new();
        for dir in &self.dirs {
            let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
                continue;
            };
            let mut candidates = Vec::new();
            while let Ok(Some(entry)) = entries.next_entry().await {
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                if is_dir && tokio::fs::try_exists(entry.path().join(".git")).await.unwrap_or(false) {
                    candidates.push(entry.path());
                }
            }
            candidates.sort();
            for path in candidates {
                repos.push(self.inspect(&path).await);
            }
        }
        repos
    }

    async fn inspect(&self, path: &Path) -> GitRepo {
        let branch = self
            .git
            .run(path, &["branch", "--show-current"], COMMAND_TIMEOUT)
            .await
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let (last_commit, last_commit_msg) = self
            .git
            .run(path, &["log", "-1", "--format=%H|%s|%ar"], COMMAND_TIMEOUT)
            .await
            .map(|line| parse_log_line(&line))
            .unwrap_or((None, None));

        let dirty_count = self
            .git
            .run(path, &["status", "--porcelain"], COMMAND_TIMEOUT)
            .await
            .map(|out| out.lines().filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0);

        let remote_url = self
            .git
            .run(path, &["remote", "get-url", "origin"], REMOTE_TIMEOUT)
            .await
            .filter(|url| !url.is_empty());

        let mut names = Vec::new();
        if let Ok(mut entries) = tokio::fs::read_dir(path).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        GitRepo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.display().to_string(),
            branch,
            last_commit,
            last_commit_msg,
            dirty: dirty_count > 0,
            dirty_count,
            remote_url,
            language: detect_language(&names).to_string(),
        }
    }
}

/// Split `hash|subject|relative-age` into (age, subject). The subject may
/// itself contain `|`.
fn parse_log_line(line: &str) -> (Option<String>, Option<String>) {
    let mut parts = line.splitn(2, '|');
    let _hash = parts.next();
    let Some(rest) = parts.next() else {
        return (None, None);
    };
    match rest.rsplit_once('|') {
        Some((subject, age)) => (Some(age.to_string()), Some(subject.to_string())),
        None => (None, Some(rest.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeGit(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl GitRunner for FakeGit {
        async fn run(&self, _repo: &Path, args: &[&str], _timeout: Duration) -> Option<String> {
            self.0.get(args[0]).map(|s| s.to_string())
        }
    }

    #[test]
    fn test_language_markers() {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(detect_language(&names(&["Cargo.toml", "src"])), "Rust");
        assert_eq!(detect_language(&names(&["package.json", "main.py"])), "TypeScript/JavaScript");
        assert_eq!(detect_language(&names(&["setup.py"])), "Python");
        assert_eq!(detect_language(&names(&["Gemfile"])), "Ruby");
        assert_eq!(detect_language(&names(&["go.mod"])), "Go");
        assert_eq!(detect_language(&names(&["README"])), "Unknown");
    }

    #[test]
    fn test_log_line() {
        assert_eq!(
            parse_log_line("abc123|Fix a|b parsing|5 minutes ago"),
            (Some("5 minutes ago".into()), Some("Fix a|b parsing".into()))
        );
        assert_eq!(parse_log_line(""), (None, None));
    }

    #[tokio::test]
    async fn test_scan_with_fake_git() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("alpha");
        std::fs::create_dir_all(repo.join(".git")).unwrap();
        std::fs::write(repo.join("go.mod"), "module alpha").unwrap();
        std::fs::create_dir_all(dir.path().join("not-a-repo")).unwrap();

        let git = FakeGit(HashMap::from([
            ("branch", "main"),
            ("log", "deadbeef|Initial commit|2 hours ago"),
            ("status", " M README.md\n?? new.txt"),
        ]));
        let scanner = RepoScanner::with_runner(
            vec![dir.path().to_path_buf(), dir.path().join("missing")],
            git,
        );

        let repos = scanner.scan().await;
        assert_eq!(repos.len(), 1);
        let alpha = &repos[0];
        assert_eq!(alpha.name, "alpha");
        assert_eq!(alpha.branch, "main");
        assert_eq!(alpha.last_commit.as_deref(), Some("2 hours ago"));
        assert_eq!(alpha.last_commit_msg.as_deref(), Some("Initial commit"));
        assert!(alpha.dirty);
        assert_eq!(alpha.dirty_count, 2);
        assert!(alpha.remote_url.is_none());
        assert_eq!(alpha.language, "Go");
    }
}
