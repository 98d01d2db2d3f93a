//! Chat transcripts (`transcripts/*.jsonl`) and the outbound message queue
//! (`state/message-queue.jsonl`).

use crate::error::StorageResult;
use crate::workspace::Workspace;
use chrono::Utc;
use mission_core::chat::is_valid_session_id;
use mission_core::{fallback, parse_chat_log, ChatMessage, ChatSession, MessageChannel};
use std::path::PathBuf;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 200;

/// Parameters of a chat-history lookup.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// 1-based; 0 is treated as 1.
    pub page: usize,
    pub limit: Option<usize>,
    pub search: Option<String>,
    /// Raw channel filter; a value matching no message empties every session.
    pub channel: Option<String>,
}

impl HistoryQuery {
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub sessions: Vec<ChatSession>,
    pub total: usize,
    pub page: usize,
    pub from_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct ChatLog {
    workspace: Workspace,
}

impl ChatLog {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn queue_path(&self) -> PathBuf {
        self.workspace.path(["state", "message-queue.jsonl"])
    }

    pub fn transcript_path(&self, session_id: &str) -> PathBuf {
        self.workspace
            .path(["transcripts".to_string(), format!("{session_id}.jsonl")])
    }

    async fn load_session(&self, file_name: &str, query: &HistoryQuery) -> ChatSession {
        let id = file_name.strip_suffix(".jsonl").unwrap_or(file_name).to_string();
        let text = self
            .workspace
            .read_text(self.workspace.path(["transcripts", file_name]))
            .await;

        let messages: Vec<ChatMessage> = parse_chat_log(&text)
            .into_iter()
            .filter(|m| {
                query
                    .channel
                    .as_deref()
                    .map_or(true, |channel| m.channel.as_str() == channel)
            })
            .collect();

        let now = Utc::now();
        let created_at = messages.first().map_or(now, |m| m.timestamp);
        let updated_at = messages.last().map_or(now, |m| m.timestamp);
        let channel = messages.first().map_or(MessageChannel::Webchat, |m| m.channel);
        let message_count = messages.len();
        let keep_from = message_count.saturating_sub(query.limit());

        ChatSession {
            title: id.replace('-', " "),
            id,
            channel,
            message_count,
            created_at,
            updated_at,
            messages: messages.into_iter().skip(keep_from).collect(),
        }
    }

    /// One page of sessions, one per transcript file. An empty page is
    /// replaced by the fallback sessions.
    pub async fn history(&self, query: &HistoryQuery) -> HistoryPage {
        let files: Vec<String> = self
            .workspace
            .list_dir(self.workspace.path(["transcripts"]))
            .await
            .into_iter()
            .filter(|name| name.ends_with(".jsonl"))
            .collect();

        let mut sessions = Vec::with_capacity(files.len());
        for file in &files {
            let session = self.load_session(file, query).await;
            if session.message_count == 0 {
                continue;
            }
            if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
                if !session.matches_search(search) {
                    continue;
                }
            }
            sessions.push(session);
        }

        let total = sessions.len();
        let limit = query.limit();
        let page: Vec<ChatSession> = sessions
            .into_iter()
            .skip((query.page() - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        if page.is_empty() {
            let sessions = fallback::sessions(Utc::now());
            return HistoryPage {
                total: if total > 0 { total } else { sessions.len() },
                sessions,
                page: query.page(),
                from_fallback: true,
            };
        }

        HistoryPage {
            sessions: page,
            total,
            page: query.page(),
            from_fallback: false,
        }
    }

    /// Append `message` to the outbound queue and, when `transcript` is
    /// set and the session id is safe to use as a file name, to that
    /// session's transcript.
    pub async fn enqueue(&self, message: &ChatMessage, transcript: bool) -> StorageResult<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        let queue = self.queue_path();
        {
            let _guard = self.workspace.lock(&queue).await;
            self.workspace.append_text(&queue, &line).await?;
        }

        if !transcript {
            return Ok(());
        }
        match message.session_id.as_deref() {
            Some(session_id) if is_valid_session_id(session_id) => {
                let path = self.transcript_path(session_id);
                let _guard = self.workspace.lock(&path).await;
                self.workspace.append_text(&path, &line).await
            }
            Some(session_id) => {
                tracing::warn!(session_id, "Rejected unsafe session id; transcript not written");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
