//! Agent registry and per-agent files under `agents/` and
//! `shared-context/agent-outputs/`.

use crate::workspace::Workspace;
use mission_core::agent::is_valid_agent_id;
use mission_core::ops::decode_records;
use mission_core::{fallback, truncate_chars, AgentOutput, AgentRecord, AgentStatus};
use serde_json::Value;

const OUTPUT_LIMIT: usize = 5;
const OUTPUT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct AgentRoster {
    pub agents: Vec<AgentRecord>,
    pub from_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct AgentDetail {
    pub agent: AgentRecord,
    pub soul: String,
    pub rules: String,
    pub outputs: Vec<AgentOutput>,
}

#[derive(Debug, Clone)]
pub struct AgentDirectory {
    workspace: Workspace,
}

impl AgentDirectory {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// Valid registry records, or `None` when the registry is missing,
    /// corrupt or holds no usable record.
    async fn registry(&self) -> Option<Vec<AgentRecord>> {
        let doc: Value = self
            .workspace
            .read_json(self.workspace.path(["agents", "registry.json"]), Value::Null)
            .await;
        let records: Vec<AgentRecord> = decode_records(doc.get("agents")?.as_array()?);
        (!records.is_empty()).then_some(records)
    }

    async fn agent_file(&self, id: &str, file: &str) -> String {
        self.workspace
            .read_text(self.workspace.path(["agents", id, file]))
            .await
    }

    /// Every registered agent with its `SOUL.md` attached when present.
    pub async fn roster(&self) -> AgentRoster {
        let (mut agents, from_fallback) = match self.registry().await {
            Some(agents) => (agents, false),
            None => (fallback::agents(), true),
        };
        for agent in agents.iter_mut().filter(|a| is_valid_agent_id(&a.id)) {
            let soul = self.agent_file(&agent.id, "SOUL.md").await;
            if !soul.is_empty() {
                agent.soul = Some(soul);
            }
        }
        AgentRoster {
            agents,
            from_fallback,
        }
    }

    /// Detail view for one agent, or `None` when the id is unusable or
    /// names neither a registered agent nor an `agents/<id>/` directory.
    pub async fn detail(&self, id: &str) -> Option<AgentDetail> {
        if !is_valid_agent_id(id) {
            return None;
        }

        let registered = self
            .registry()
            .await
            .unwrap_or_else(fallback::agents)
            .into_iter()
            .find(|agent| agent.id == id);

        let agent = match registered {
            Some(agent) => agent,
            None => {
                let dir = self.workspace.stat(self.workspace.path(["agents", id])).await;
                if !dir.is_some_and(|stat| stat.is_dir) {
                    return None;
                }
                AgentRecord {
                    id: id.to_string(),
                    name: id.to_string(),
                    role: String::new(),
                    model: String::new(),
                    level: Default::default(),
                    status: AgentStatus::Offline,
                    description: None,
                    soul: None,
                    rules: None,
                }
            }
        };

        let soul = self.agent_file(id, "SOUL.md").await;
        let rules = self.agent_file(id, "RULES.md").await;
        let outputs = self.recent_outputs(id).await;

        Some(AgentDetail {
            agent,
            soul,
            rules,
            outputs,
        })
    }

    /// The last few output files whose names mention `id`, in name order.
    pub async fn recent_outputs(&self, id: &str) -> Vec<AgentOutput> {
        let dir = self.workspace.path(["shared-context", "agent-outputs"]);
        let names: Vec<String> = self
            .workspace
            .list_dir(&dir)
            .await
            .into_iter()
            .filter(|name| name.contains(id))
            .collect();
        let skip = names.len().saturating_sub(OUTPUT_LIMIT);

        let mut outputs = Vec::new();
        for filename in names.into_iter().skip(skip) {
            let content = self.workspace.read_text(dir.join(&filename)).await;
            outputs.push(AgentOutput {
                filename,
                content: truncate_chars(&content, OUTPUT_PREVIEW_CHARS),
            });
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn directory() -> (tempfile::TempDir, AgentDirectory, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        (dir, AgentDirectory::new(ws.clone()), ws)
    }

    #[tokio::test]
    async fn test_missing_registry_uses_fallback() {
        let (_dir, agents, _ws) = directory().await;
        let roster = agents.roster().await;
        assert!(roster.from_fallback);
        assert_eq!(roster.agents.len(), 5);
    }

    #[tokio::test]
    async fn test_registry_records_are_enriched_and_filtered() {
        let (_dir, agents, ws) = directory().await;
        ws.write_json(
            ws.path(["agents", "registry.json"]),
            &json!({"agents": [
                {"id": "scout", "name": "Scout", "status": "running", "level": "L2"},
                {"name": "no id"},
                {"id": "quill", "name": "Quill", "status": "idle"}
            ]}),
        )
        .await
        .unwrap();
        ws.append_text(ws.path(["agents", "scout", "SOUL.md"]), "curious")
            .await
            .unwrap();

        let roster = agents.roster().await;
        assert!(!roster.from_fallback);
        assert_eq!(roster.agents.len(), 2);
        assert_eq!(roster.agents[0].status, AgentStatus::Active);
        assert_eq!(roster.agents[0].soul.as_deref(), Some("curious"));
        assert!(roster.agents[1].soul.is_none());
    }

    #[tokio::test]
    async fn test_detail_lookup_rules() {
        let (_dir, agents, ws) = directory().await;
        assert!(agents.detail("nebula").await.is_some());
        assert!(agents.detail("ghost").await.is_none());
        assert!(agents.detail("../etc").await.is_none());

        ws.append_text(ws.path(["agents", "ghost", "RULES.md"]), "be quiet")
            .await
            .unwrap();
        let detail = agents.detail("ghost").await.unwrap();
        assert_eq!(detail.agent.name, "ghost");
        assert_eq!(detail.agent.status, AgentStatus::Offline);
        assert_eq!(detail.rules, "be quiet");
        assert_eq!(detail.soul, "");
    }

    #[tokio::test]
    async fn test_recent_outputs_are_capped_and_truncated() {
        let (_dir, agents, ws) = directory().await;
        for i in 0..7 {
            ws.append_text(
                ws.path(["shared-context", "agent-outputs", format!("writer-{i}.md").as_str()]),
                &"w".repeat(800),
            )
            .await
            .unwrap();
        }
        ws.append_text(ws.path(["shared-context", "agent-outputs", "analyst-1.md"]), "a")
            .await
            .unwrap();

        let outputs = agents.recent_outputs("writer").await;
        let names: Vec<_> = outputs.iter().map(|o| o.filename.as_str()).collect();
        assert_eq!(names, vec!["writer-2.md", "writer-3.md", "writer-4.md", "writer-5.md", "writer-6.md"]);
        assert!(outputs.iter().all(|o| o.content.chars().count() == 500));
    }
}
