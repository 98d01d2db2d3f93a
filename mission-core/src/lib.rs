//! Mission Control Core - Entity Types and Document Parsers
//!
//! Plain records read from the workspace, the closed enums that classify
//! them, the markdown/JSONL parsers that build them from loosely structured
//! text, and the fallback datasets served when nothing usable is on disk.
//!
//! Nothing in this crate touches the filesystem.

use chrono::{DateTime, Utc};

pub mod agent;
pub mod chat;
pub mod content;
pub mod crm;
pub mod enums;
pub mod error;
pub mod fallback;
pub mod knowledge;
pub mod ops;
pub mod parsers;
pub mod task;

pub use agent::{AgentOutput, AgentRecord};
pub use chat::{ChatMessage, ChatSession};
pub use content::{ContentItem, ContentStats};
pub use crm::CrmClient;
pub use enums::{
    AgentLevel, AgentStatus, ChatRole, ContentStatus, CrmStage, MessageChannel, TaskAction,
    TaskEffort, TaskPriority, TaskStatus,
};
pub use error::{CoreError, CoreResult};
pub use knowledge::{KnowledgeEntry, Observation, PrioritySection};
pub use ops::{
    BranchStatus, CronJob, EcosystemProduct, GitRepo, RevenueSnapshot, ServiceStatus,
};
pub use parsers::{
    parse_chat_log, parse_client, parse_content_queue, parse_observations, parse_priorities,
};
pub use task::SuggestedTask;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Maximum number of observations returned by the observations parser.
pub const MAX_OBSERVATIONS: usize = 50;

/// Generate an identifier for a chat message.
pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Take at most `max` characters from the start of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
