//! Fallback datasets.
//!
//! Served whenever the backing document is missing, unreadable or yields
//! nothing usable, so the dashboard always has something to render.
//! Relative timestamps are computed from the `now` passed in.

use crate::agent::AgentRecord;
use crate::chat::{ChatMessage, ChatSession};
use crate::content::ContentItem;
use crate::crm::CrmClient;
use crate::enums::{
    AgentLevel, AgentStatus, ChatRole, ContentStatus, CrmStage, MessageChannel, TaskEffort,
    TaskPriority, TaskStatus,
};
use crate::knowledge::{KnowledgeEntry, Observation, PrioritySection};
use crate::ops::{BranchStatus, CronJob, EcosystemProduct, GitRepo, ServiceStatus};
use crate::task::SuggestedTask;
use crate::Timestamp;
use chrono::{Duration, SecondsFormat};
use serde_json::json;
use std::collections::BTreeMap;

const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn iso(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn ago(now: Timestamp, secs: i64) -> Timestamp {
    now - Duration::seconds(secs)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn agents() -> Vec<AgentRecord> {
    let agent = |id: &str, name: &str, role: &str, model: &str, level, status, description: &str| {
        AgentRecord {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            model: model.to_string(),
            level,
            status,
            description: Some(description.to_string()),
            soul: None,
            rules: None,
        }
    };

    vec![
        agent("nebula", "Nebula", "Orchestrator", "claude-opus-4", AgentLevel::L4, AgentStatus::Active, "Primary AI orchestrator"),
        agent("analyst", "Analyst", "Investment Strategist", "claude-sonnet-4", AgentLevel::L3, AgentStatus::Idle, "Market and investment analysis"),
        agent("marketer", "Marketer", "Marketing Strategist", "claude-sonnet-4", AgentLevel::L3, AgentStatus::Idle, "Campaign planning and execution"),
        agent("writer", "Writer", "Content Creator", "claude-haiku-4", AgentLevel::L2, AgentStatus::Idle, "Content generation and editing"),
        agent("bizdev", "BizDev", "Business Developer", "claude-sonnet-4", AgentLevel::L3, AgentStatus::Idle, "Partnership and growth strategy"),
    ]
}

pub fn clients(now: Timestamp) -> Vec<CrmClient> {
    vec![
        CrmClient {
            id: "acme".into(),
            name: "ACME Corp".into(),
            company: Some("ACME".into()),
            stage: CrmStage::Proposal,
            value: Some(5_000),
            next_action: Some("Send contract".into()),
            last_interaction: Some(iso(ago(now, 2 * DAY))),
            notes: None,
            tags: strings(&["enterprise"]),
        },
        CrmClient {
            id: "globex".into(),
            name: "Globex".into(),
            company: Some("Globex Inc".into()),
            stage: CrmStage::Meeting,
            value: Some(2_500),
            next_action: Some("Follow up call".into()),
            last_interaction: Some(iso(ago(now, DAY))),
            notes: None,
            tags: strings(&["smb"]),
        },
        CrmClient {
            id: "initech".into(),
            name: "Initech".into(),
            company: Some("Initech LLC".into()),
            stage: CrmStage::Contacted,
            value: None,
            next_action: Some("Schedule demo".into()),
            last_interaction: None,
            notes: None,
            tags: Vec::new(),
        },
        CrmClient {
            id: "umbrella".into(),
            name: "Umbrella".into(),
            company: Some("Umbrella Corp".into()),
            stage: CrmStage::Active,
            value: Some(12_000),
            next_action: Some("Monthly check-in".into()),
            last_interaction: None,
            notes: None,
            tags: strings(&["enterprise"]),
        },
    ]
}

pub fn content_items(now: Timestamp) -> Vec<ContentItem> {
    let item = |id: &str, title: &str, platform: &str, status, tag: &str| ContentItem {
        id: id.to_string(),
        title: title.to_string(),
        platform: platform.to_string(),
        status,
        preview: None,
        created_at: now,
        tags: strings(&[tag]),
    };

    vec![
        item("1", "OpenClaw launch post", "Twitter", ContentStatus::Draft, "launch"),
        item("2", "AI agent tutorial thread", "Twitter", ContentStatus::Review, "education"),
        item("3", "Monthly update newsletter", "Email", ContentStatus::Approved, "newsletter"),
    ]
}

pub fn cron_jobs(now: Timestamp) -> Vec<CronJob> {
    let job = |id: &str, name: &str, schedule: &str, secs_ago: i64| CronJob {
        id: id.to_string(),
        name: name.to_string(),
        schedule: schedule.to_string(),
        last_status: "success".to_string(),
        consecutive_errors: 0,
        last_run: Some(iso(ago(now, secs_ago))),
    };

    vec![
        job("daily-report", "Daily Report", "0 8 * * *", HOUR),
        job("market-scan", "Market Scan", "*/30 * * * *", HOUR / 2),
        job("memory-consolidation", "Memory Consolidation", "0 2 * * *", DAY),
        job("content-scheduler", "Content Scheduler", "0 9 * * 1-5", 2 * HOUR),
        job("health-check", "Health Check", "*/5 * * * *", 300),
    ]
}

pub fn products() -> Vec<EcosystemProduct> {
    let product = |slug: &str, name: &str, tagline: &str, status: &str, score, metrics: serde_json::Value| {
        EcosystemProduct {
            slug: slug.to_string(),
            name: name.to_string(),
            tagline: Some(tagline.to_string()),
            status: status.to_string(),
            health_score: Some(score),
            metrics: metrics
                .as_object()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_else(BTreeMap::new),
        }
    };

    vec![
        product("openclaw", "OpenClaw", "Autonomous AI agent platform", "Active", 95,
            json!({"uptime": "99.9%", "sessions": 142, "tasks": 847})),
        product("nebula-os", "Nebula OS", "Operating system for AI agents", "Development", 60,
            json!({"version": "0.3.2", "tests": "87%"})),
        product("tradegpt", "TradeGPT", "AI-powered trading signals", "Concept", 20,
            json!({"stage": "research"})),
    ]
}

pub fn knowledge(now: Timestamp) -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry {
            path: "shared-context/priorities.md".into(),
            title: "Priorities".into(),
            excerpt: "System priorities and focus areas for the OpenClaw agent system.".into(),
            last_modified: now,
            size: 512,
            category: "shared-context".into(),
        },
        KnowledgeEntry {
            path: "agents/registry.json".into(),
            title: "Agent Registry".into(),
            excerpt: "Registry of all configured agents in the system.".into(),
            last_modified: now,
            size: 1024,
            category: "agents".into(),
        },
    ]
}

pub fn observations(now: Timestamp) -> Vec<Observation> {
    vec![
        Observation {
            id: "obs-1".into(),
            timestamp: now,
            content: "Agent system initialized and operating normally.".into(),
            category: "system".into(),
        },
        Observation {
            id: "obs-2".into(),
            timestamp: ago(now, HOUR),
            content: "Market data feed connected successfully.".into(),
            category: "data".into(),
        },
    ]
}

pub fn priorities() -> Vec<PrioritySection> {
    vec![
        PrioritySection {
            title: "This Week".into(),
            items: strings(&[
                "Complete Mission Control dashboard deployment",
                "Set up automated agent health monitoring",
                "Configure revenue tracking pipeline",
            ]),
        },
        PrioritySection {
            title: "This Month".into(),
            items: strings(&[
                "Launch content automation system",
                "Integrate all communication channels",
                "Build ecosystem product tracking",
            ]),
        },
    ]
}

pub fn repos() -> Vec<GitRepo> {
    vec![GitRepo {
        name: "mission-control".into(),
        path: "/home/user/mission-control".into(),
        branch: "main".into(),
        last_commit: Some("5m ago".into()),
        last_commit_msg: Some("Initial setup".into()),
        dirty: false,
        dirty_count: 0,
        remote_url: None,
        language: "TypeScript/JavaScript".into(),
    }]
}

pub fn services(now: Timestamp) -> Vec<ServiceStatus> {
    let checked = iso(now);
    [
        ("Telegram Bot", Some(443)),
        ("Discord Bot", Some(443)),
        ("OpenClaw API", Some(3000)),
        ("Cron Scheduler", None),
        ("Memory System", None),
    ]
    .into_iter()
    .map(|(name, port)| ServiceStatus {
        name: name.to_string(),
        status: "up".to_string(),
        port,
        last_check: checked.clone(),
    })
    .collect()
}

pub fn branches(now: Timestamp) -> Vec<BranchStatus> {
    vec![BranchStatus {
        repo: "mission-control".into(),
        branch: "main".into(),
        status: "clean".into(),
        last_commit: iso(now),
    }]
}

pub fn sessions(now: Timestamp) -> Vec<ChatSession> {
    let messages = vec![
        ChatMessage {
            id: "m1".into(),
            role: ChatRole::User,
            content: "How is the agent system performing?".into(),
            timestamp: ago(now, HOUR + 100),
            channel: MessageChannel::Webchat,
            agent_id: None,
            session_id: None,
        },
        ChatMessage {
            id: "m2".into(),
            role: ChatRole::Assistant,
            content: "All systems are nominal. The orchestrator is running with 5 active \
                      sub-agents. Revenue tracking is online and all cron jobs are healthy."
                .into(),
            timestamp: ago(now, HOUR),
            channel: MessageChannel::Webchat,
            agent_id: None,
            session_id: None,
        },
    ];

    vec![ChatSession {
        id: "session-1".into(),
        title: "OpenClaw setup discussion".into(),
        channel: MessageChannel::Webchat,
        message_count: 12,
        created_at: ago(now, DAY),
        updated_at: ago(now, HOUR),
        messages,
    }]
}

pub fn tasks(now: Timestamp) -> Vec<SuggestedTask> {
    let created = iso(now);
    let task = |id: &str, title: &str, category: &str, reasoning: &str, next: &str, priority, effort| {
        SuggestedTask {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            reasoning: Some(reasoning.to_string()),
            next_action: Some(next.to_string()),
            priority,
            effort,
            status: TaskStatus::Pending,
            created_at: Some(created.clone()),
            reviewed_at: None,
        }
    };

    vec![
        task(
            "task-1",
            "Set up automated revenue tracking",
            "Revenue",
            "No revenue tracking is currently connected. Automating this will give real-time visibility into MRR and burn rate.",
            "Connect Stripe webhook to state/revenue.json updater script",
            TaskPriority::High,
            TaskEffort::Medium,
        ),
        task(
            "task-2",
            "Create weekly content calendar",
            "Content",
            "Consistent content output requires pre-planning. A structured calendar improves publishing consistency.",
            "Ask agent to draft 4-week content plan across all platforms",
            TaskPriority::Medium,
            TaskEffort::Quick,
        ),
        task(
            "task-3",
            "Audit all sub-agent capabilities",
            "Operations",
            "Current agent registry may be outdated. An audit ensures all agents have up-to-date SOUL and RULES files.",
            "Run registry validation script and update stale agents",
            TaskPriority::Medium,
            TaskEffort::Heavy,
        ),
        task(
            "task-4",
            "Set up Discord community onboarding flow",
            "Community",
            "New members need a clear onboarding path to become engaged. An automated welcome flow reduces churn.",
            "Design welcome message sequence and configure Discord bot",
            TaskPriority::High,
            TaskEffort::Medium,
        ),
    ]
}
