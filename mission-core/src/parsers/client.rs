//! `clients/<name>.md` parser

use crate::crm::CrmClient;
use crate::enums::CrmStage;

static_regex!(NAME_RE, r"(?m)^#[ \t]+(.+)");
static_regex!(STAGE_RE, r"(?i)(?:stage|status):[ \t]*(.+)");
static_regex!(COMPANY_RE, r"(?i)(?:company|org):[ \t]*(.+)");
static_regex!(VALUE_RE, r"(?i)(?:value|deal):[ \t]*\$?([\d,]+)");
static_regex!(NEXT_RE, r"(?i)(?:next action|next step):[ \t]*(.+)");
static_regex!(LAST_RE, r"(?i)(?:last interaction|last contact):[ \t]*(.+)");
static_regex!(NOTES_RE, r"(?is)##[ \t]*Notes\s+(.+?)(?:##|\z)");

/// Derive a client id from its file name: `.md` dropped, anything outside
/// `[A-Za-z0-9-]` replaced with `-`, lowercased.
pub fn client_id_from_filename(filename: &str) -> String {
    filename
        .strip_suffix(".md")
        .unwrap_or(filename)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

fn capture(re: &regex::Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse one client document. Never fails; absent fields stay `None` and
/// the stage defaults to `Prospect`.
pub fn parse_client(filename: &str, text: &str) -> CrmClient {
    let id = client_id_from_filename(filename);

    let stage = capture(&STAGE_RE, text)
        .and_then(|raw| CrmStage::parse_loose(&raw))
        .unwrap_or_default();

    let value = VALUE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok());

    CrmClient {
        name: capture(&NAME_RE, text).unwrap_or_else(|| id.clone()),
        company: capture(&COMPANY_RE, text),
        stage,
        value,
        next_action: capture(&NEXT_RE, text),
        last_interaction: capture(&LAST_RE, text),
        notes: capture(&NOTES_RE, text),
        tags: Vec::new(),
        id,
    }
}
