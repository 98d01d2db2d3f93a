//! Knowledge search over the workspace tree.

use crate::workspace::Workspace;
use mission_core::{truncate_chars, KnowledgeEntry};
use std::path::{Path, PathBuf};

/// Maximum number of entries one search returns.
pub const RESULT_BUDGET: usize = 50;

const EXCERPT_CHARS: usize = 200;
const EXCERPT_LEAD: usize = 50;
const EXTENSIONS: [&str; 3] = [".md", ".txt", ".json"];

enum Frame {
    Dir(PathBuf),
    Files(Vec<PathBuf>),
}

fn title_for(name: &str) -> String {
    let stem = EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name);
    stem.replace(['-', '_'], " ")
}

/// Lowercase per character so char positions in the folded text line up
/// with the original.
fn fold(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn excerpt_around(content: &str, pos: usize) -> String {
    let start = pos.saturating_sub(EXCERPT_LEAD);
    content
        .chars()
        .skip(start)
        .take(pos + EXCERPT_CHARS - start)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Depth-first walk of the workspace. Within each directory entries are
/// taken in name order, subdirectories before files, and hidden entries
/// are skipped. With a non-empty `query`, a file matches when its title
/// or content contains the query case-insensitively.
pub async fn search(workspace: &Workspace, query: &str) -> Vec<KnowledgeEntry> {
    let query = query.trim();
    let needle = fold(query);
    let mut results = Vec::new();
    let mut stack = vec![Frame::Dir(workspace.root().to_path_buf())];

    while let Some(frame) = stack.pop() {
        if results.len() >= RESULT_BUDGET {
            break;
        }
        match frame {
            Frame::Dir(dir) => {
                let mut dirs = Vec::new();
                let mut files = Vec::new();
                for name in workspace.list_dir(&dir).await {
                    if name.starts_with('.') {
                        continue;
                    }
                    let path = dir.join(&name);
                    match workspace.stat(&path).await {
                        Some(stat) if stat.is_dir => dirs.push(path),
                        Some(_) if EXTENSIONS.iter().any(|ext| name.ends_with(ext)) => {
                            files.push(path)
                        }
                        _ => {}
                    }
                }
                stack.push(Frame::Files(files));
                stack.extend(dirs.into_iter().rev().map(Frame::Dir));
            }
            Frame::Files(files) => {
                for path in files {
                    if results.len() >= RESULT_BUDGET {
                        break;
                    }
                    if let Some(entry) = match_file(workspace, &path, &needle).await {
                        results.push(entry);
                    }
                }
            }
        }
    }

    results
}

async fn match_file(workspace: &Workspace, path: &Path, needle: &[char]) -> Option<KnowledgeEntry> {
    let stat = workspace.stat(path).await?;
    let name = path.file_name()?.to_string_lossy().into_owned();
    let title = title_for(&name);
    let content = workspace.read_text(path).await;

    let title_hit = needle.is_empty() || find_chars(&fold(&title), needle).is_some();
    let excerpt = if title_hit {
        truncate_chars(&content, EXCERPT_CHARS).trim().to_string()
    } else {
        let pos = find_chars(&fold(&content), needle)?;
        excerpt_around(&content, pos)
    };

    let relative = workspace.relative(path);
    let category = relative.split('/').next().unwrap_or_default().to_string();

    Some(KnowledgeEntry {
        path: relative,
        title,
        excerpt,
        last_modified: stat.modified,
        size: stat.size,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn workspace_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        for (path, body) in files {
            let parts: Vec<&str> = path.split('/').collect();
            ws.append_text(ws.path(parts), body).await.unwrap();
        }
        (dir, ws)
    }

    #[test]
    fn test_title_and_excerpt_helpers() {
        assert_eq!(title_for("launch-plan_v2.md"), "launch plan v2");
        assert_eq!(title_for("registry.json"), "registry");
        let content = format!("{}NEEDLE{}", "a".repeat(80), "b".repeat(300));
        let excerpt = excerpt_around(&content, 80);
        assert_eq!(excerpt.chars().count(), 250);
        assert!(excerpt.starts_with(&"a".repeat(50)));
        assert_eq!(excerpt_around("needle here", 0), "needle here");
    }

    #[tokio::test]
    async fn test_walk_order_and_filters() {
        let (_dir, ws) = workspace_with(&[
            ("top.md", "root file"),
            ("agents/registry.json", "{}"),
            ("agents/nebula/SOUL.md", "soul"),
            ("memory/notes.txt", "notes"),
            ("memory/image.png", "binary"),
            (".git/HEAD.md", "hidden"),
        ])
        .await;

        let results = search(&ws, "").await;
        let paths: Vec<_> = results.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["agents/nebula/SOUL.md", "agents/registry.json", "memory/notes.txt", "top.md"]
        );
        assert_eq!(results[0].category, "agents");
        assert_eq!(results[3].category, "top.md");
    }

    #[tokio::test]
    async fn test_content_match_excerpt() {
        let body = format!("{}Quarterly Revenue target{}", "x".repeat(100), "y".repeat(400));
        let (_dir, ws) = workspace_with(&[("state/report.md", body.as_str()), ("other.md", "nothing")]).await;

        let results = search(&ws, "revenue").await;
        assert_eq!(results.len(), 1);
        let excerpt = &results[0].excerpt;
        assert!(excerpt.starts_with(&"x".repeat(40)));
        assert!(excerpt.contains("Quarterly Revenue"));
        assert_eq!(excerpt.chars().count(), 250);
    }

    #[tokio::test]
    async fn test_title_match_uses_leading_excerpt() {
        let (_dir, ws) = workspace_with(&[("docs/Revenue-Plan.md", "  first line  ")]).await;
        let results = search(&ws, "revenue plan").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].excerpt, "first line");
        assert_eq!(results[0].title, "Revenue Plan");
    }

    #[tokio::test]
    async fn test_budget_caps_results() {
        let files: Vec<(String, String)> = (0..70)
            .map(|i| (format!("notes/n{i:03}.md"), "x".to_string()))
            .collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(p, b)| (p.as_str(), b.as_str())).collect();
        let (_dir, ws) = workspace_with(&refs).await;
        let results = search(&ws, "").await;
        assert_eq!(results.len(), RESULT_BUDGET);
        assert_eq!(results[0].path, "notes/n000.md");
    }
}
