//! `shared-context/priorities.md` parser

use crate::knowledge::PrioritySection;

static_regex!(HEADING_RE, r"^#{1,3}\s+(.+)");
static_regex!(ITEM_RE, r"^(?:[-*]|\d+[.)])\s*(.+)$");

/// Group list items under their nearest level 1-3 heading. Lines before
/// the first heading are ignored; sections without items are kept.
pub fn parse_priorities(text: &str) -> Vec<PrioritySection> {
    let mut sections: Vec<PrioritySection> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = HEADING_RE.captures(line) {
            sections.push(PrioritySection {
                title: caps[1].trim().to_string(),
                items: Vec::new(),
            });
            continue;
        }

        let Some(current) = sections.last_mut() else {
            continue;
        };
        if let Some(caps) = ITEM_RE.captures(line) {
            let item = caps[1].trim();
            if !item.is_empty() {
                current.items.push(item.to_string());
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_and_items() {
        let text = "\
preamble ignored
- also ignored
# This Week
- ship dashboard
* fix crons
1. call ACME
12) renew domain
## Later
### Someday
- learn piano
plain text line
";
        let sections = parse_priorities(text);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "This Week");
        assert_eq!(
            sections[0].items,
            vec!["ship dashboard", "fix crons", "call ACME", "renew domain"]
        );
        assert!(sections[1].items.is_empty());
        assert_eq!(sections[2].items, vec!["learn piano"]);
    }

    #[test]
    fn test_deep_headings_are_not_sections() {
        let sections = parse_priorities("#### Deep\n- item");
        assert!(sections.is_empty());
    }
}
