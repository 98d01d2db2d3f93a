//! `content/queue.md` parser

use crate::content::ContentItem;
use crate::enums::ContentStatus;
use crate::truncate_chars;
use chrono::Utc;

static_regex!(HEADING_RE, r"^##\s+(.+)");
static_regex!(BULLET_RE, r"^[-*]\s+(.+)");
static_regex!(PLATFORM_RE, r"\[(.+?)\]");
static_regex!(TAG_RE, r"#(\w+)");

const DEFAULT_PLATFORM: &str = "General";
const PREVIEW_CHARS: usize = 120;

/// Heading keywords checked in order; the first hit wins.
const STATUS_KEYWORDS: [(&str, ContentStatus); 4] = [
    ("draft", ContentStatus::Draft),
    ("review", ContentStatus::Review),
    ("approved", ContentStatus::Approved),
    ("published", ContentStatus::Published),
];

fn status_for_heading(label: &str) -> Option<ContentStatus> {
    let label = label.to_lowercase();
    STATUS_KEYWORDS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, status)| *status)
}

/// Scan the queue line by line. `## ` headings switch the current status
/// bucket (unmatched headings keep it); each bullet becomes an item in the
/// current bucket.
pub fn parse_content_queue(text: &str) -> Vec<ContentItem> {
    let now = Utc::now();
    let mut status = ContentStatus::Draft;
    let mut items = Vec::new();

    for line in text.lines() {
        if let Some(caps) = HEADING_RE.captures(line) {
            if let Some(next) = status_for_heading(&caps[1]) {
                status = next;
            }
            continue;
        }

        let Some(caps) = BULLET_RE.captures(line) else {
            continue;
        };
        let raw = &caps[1];

        let platform = PLATFORM_RE
            .captures(raw)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

        let mut tags: Vec<String> = Vec::new();
        for tag in TAG_RE.captures_iter(raw) {
            let tag = tag[1].to_string();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let stripped = PLATFORM_RE.replace_all(raw, "");
        let stripped = TAG_RE.replace_all(&stripped, "");
        let stripped = stripped.trim();
        let title = if stripped.is_empty() {
            raw.trim().to_string()
        } else {
            stripped.to_string()
        };

        items.push(ContentItem {
            id: format!("item-{}", items.len() + 1),
            preview: Some(truncate_chars(&title, PREVIEW_CHARS)),
            title,
            platform,
            status,
            created_at: now,
            tags,
        });
    }

    items
}
