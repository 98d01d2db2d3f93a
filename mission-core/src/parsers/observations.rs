//! `state/observations.md` parser

use crate::knowledge::Observation;
use crate::{Timestamp, MAX_OBSERVATIONS};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

static_regex!(LINE_RE, r"^(?:[-*]\s+)?(?:\[(.+?)\]\s+)?(.+)$");

const CATEGORY: &str = "observation";

/// Accepts RFC 3339 plus the date formats people type by hand.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One observation per non-empty, non-heading line, newest (last in the
/// file) first, capped at [`MAX_OBSERVATIONS`].
pub fn parse_observations(text: &str) -> Vec<Observation> {
    let now = Utc::now();
    let mut observations = Vec::new();

    for line in text.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(caps) = LINE_RE.captures(line) else {
            continue;
        };
        let content = caps[2].trim();
        if content.is_empty() {
            continue;
        }
        let timestamp = caps
            .get(1)
            .and_then(|stamp| parse_timestamp(stamp.as_str()))
            .unwrap_or(now);

        observations.push(Observation {
            id: format!("obs-{}", observations.len() + 1),
            timestamp,
            content: content.to_string(),
            category: CATEGORY.to_string(),
        });
    }

    observations.reverse();
    observations.truncate(MAX_OBSERVATIONS);
    observations
}
