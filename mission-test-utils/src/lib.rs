//! Mission Control Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Throwaway workspace directories with helpers to seed documents
//! - Proptest generators for records and workspace documents
//! - Assertions for the wire envelopes

pub use mission_core::{
    AgentLevel, AgentStatus, ChatRole, ContentStatus, CrmStage, MessageChannel, SuggestedTask,
    TaskAction, TaskEffort, TaskPriority, TaskStatus, Timestamp,
};

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// TEMP WORKSPACE
// ============================================================================

/// A workspace root in a temporary directory, removed on drop.
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace.
    ///
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp workspace"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path for a `/`-separated relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root().to_path_buf(), |acc, part| acc.join(part))
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> &Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    pub fn write_json(&self, relative: &str, value: &serde_json::Value) -> &Self {
        let body = serde_json::to_string_pretty(value).expect("serialize fixture");
        self.write(relative, &body)
    }

    pub fn mkdir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.path(relative)).expect("create fixture dir");
        self
    }

    /// Contents of `relative`, or `None` if it does not exist.
    pub fn read(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.path(relative)).ok()
    }

    pub fn read_json(&self, relative: &str) -> Option<serde_json::Value> {
        self.read(relative)
            .and_then(|text| serde_json::from_str(&text).ok())
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built workspace documents.

    use super::*;
    use serde_json::{json, Value};

    pub fn task(id: &str, status: &str) -> Value {
        json!({
            "id": id,
            "title": format!("Task {id}"),
            "category": "Operations",
            "priority": "high",
            "effort": "quick",
            "status": status,
            "createdAt": Utc::now().to_rfc3339(),
        })
    }

    pub fn task_document(tasks: Vec<Value>) -> Value {
        json!({ "tasks": tasks, "lastUpdated": Utc::now().to_rfc3339(), "version": 1 })
    }

    pub fn registry(ids: &[(&str, &str)]) -> Value {
        let agents: Vec<Value> = ids
            .iter()
            .map(|(id, status)| {
                json!({
                    "id": id,
                    "name": id.to_uppercase(),
                    "role": "Specialist",
                    "model": "claude-sonnet-4",
                    "level": "L2",
                    "status": status,
                })
            })
            .collect();
        json!({ "agents": agents })
    }

    pub const CLIENT_ACME: &str = "\
# ACME Corp
Company: ACME
Stage: proposal
Value: $5,000
Next Action: Send contract

## Notes
Decision maker is the CFO.
";

    pub const CONTENT_QUEUE: &str = "\
## Drafts
- [Twitter] Launch thread #launch #ai
- Blog post on agents
## Review
- [LinkedIn] Hiring update #hiring
## Published
* [Email] Newsletter #newsletter
";

    pub const PRIORITIES: &str = "\
# This Week
- Ship dashboard
- Fix cron alerts
## Later
1. Hire designer
";

    /// A workspace with every read-model document present.
    pub fn populated() -> TestWorkspace {
        let ws = TestWorkspace::new();
        ws.write_json("agents/registry.json", &registry(&[("scout", "active"), ("quill", "idle")]))
            .write("agents/scout/SOUL.md", "Curious and thorough.")
            .write("agents/scout/RULES.md", "Cite sources.")
            .write("shared-context/agent-outputs/scout-report.md", "Findings")
            .write("clients/acme.md", CLIENT_ACME)
            .write("content/queue.md", CONTENT_QUEUE)
            .write("shared-context/priorities.md", PRIORITIES)
            .write("state/observations.md", "# Log\n- [2026-01-01] first\n- second\n")
            .write_json(
                "state/crons.json",
                &json!({"jobs": [
                    {"id": "a", "name": "A", "schedule": "* * * * *", "lastStatus": "success", "consecutiveErrors": 0},
                    {"id": "b", "name": "B", "schedule": "0 * * * *", "lastStatus": "error", "consecutiveErrors": 3}
                ]}),
            )
            .write_json("state/revenue.json", &json!({"currentMRR": 4200, "monthlyBurn": 1200}))
            .write_json(
                "state/servers.json",
                &json!({"services": [{"name": "API", "status": "up", "port": 8080, "lastCheck": "now"}]}),
            )
            .write_json(
                "state/branch-check.json",
                &json!({"branches": [{"repo": "mc", "branch": "main", "status": "clean", "lastCommit": "now"}]}),
            )
            .write_json("state/suggested-tasks.json", &task_document(vec![task("t1", "pending"), task("t2", "approved")]))
            .write(
                "transcripts/ops-sync.jsonl",
                "{\"id\":\"1\",\"role\":\"user\",\"content\":\"status?\",\"channel\":\"discord\"}\n",
            )
            .write_json(
                "memory/ecosystem/products.json",
                &json!({"products": [{"slug": "atlas", "name": "Atlas", "status": "Active", "healthScore": 80}]}),
            )
            .write("memory/atlas/overview.md", "Atlas overview");
        ws
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for workspace documents and records.

    use super::*;
    use proptest::prelude::*;

    /// Generate a Timestamp within 2020-2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_crm_stage() -> impl Strategy<Value = CrmStage> {
        proptest::sample::select(CrmStage::ALL.to_vec())
    }

    pub fn arb_content_status() -> impl Strategy<Value = ContentStatus> {
        proptest::sample::select(ContentStatus::ALL.to_vec())
    }

    pub fn arb_task_action() -> impl Strategy<Value = TaskAction> {
        prop_oneof![Just(TaskAction::Approve), Just(TaskAction::Reject)]
    }

    pub fn arb_channel() -> impl Strategy<Value = MessageChannel> {
        proptest::sample::select(MessageChannel::ALL.to_vec())
    }

    /// Stage text with random casing and padding.
    pub fn arb_stage_text() -> impl Strategy<Value = (CrmStage, String)> {
        (arb_crm_stage(), any::<u64>(), 0usize..3).prop_map(|(stage, mask, pad)| {
            let text: String = stage
                .as_str()
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    if (mask >> (i % 64)) & 1 == 1 {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    }
                })
                .collect();
            (stage, format!("{}{}", " ".repeat(pad), text))
        })
    }

    /// A client document with a known stage and value.
    pub fn arb_client_markdown() -> impl Strategy<Value = (CrmStage, u64, String)> {
        (arb_stage_text(), 0u64..10_000_000, "[A-Z][a-z]{2,12}").prop_map(
            |((stage, stage_text), value, name)| {
                let mut digits = value.to_string();
                let mut i = digits.len() as isize - 3;
                while i > 0 {
                    digits.insert(i as usize, ',');
                    i -= 3;
                }
                let doc = format!("# {name}\n\nStage:{stage_text}\nValue: ${digits}\n");
                (stage, value, doc)
            },
        )
    }

    /// One transcript line, valid or not.
    pub fn arb_chat_line() -> impl Strategy<Value = String> {
        prop_oneof![
            (arb_channel(), "[a-z ]{0,30}").prop_map(|(channel, text)| {
                serde_json::json!({"role": "user", "content": text, "channel": channel.as_str()})
                    .to_string()
            }),
            "[a-z ]{0,30}".prop_map(|text| serde_json::json!({ "text": text }).to_string()),
            "\\PC{0,40}",
        ]
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over JSON envelopes returned by the API.

    use serde_json::Value;

    /// Assert no key of `value` (recursively) is snake_case or kebab-case.
    ///
    /// Capitalised keys are allowed: maps keyed by data, such as counts per
    /// CRM stage, carry the data's own spelling.
    #[track_caller]
    pub fn assert_camel_case_keys(value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    assert!(
                        !key.contains('_') && !key.contains('-'),
                        "Key is not camelCase: {key}"
                    );
                    assert_camel_case_keys(child);
                }
            }
            Value::Array(items) => items.iter().for_each(assert_camel_case_keys),
            _ => {}
        }
    }

    /// Assert `value[key]` is a non-empty array and return its length.
    #[track_caller]
    pub fn assert_non_empty_array(value: &Value, key: &str) -> usize {
        let len = value
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or_else(|| panic!("Expected array at `{key}` in {value}"));
        assert!(len > 0, "Expected non-empty `{key}` in {value}");
        len
    }
}
