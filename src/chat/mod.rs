//! Chat session coordination: the session list, the active session and its
//! ordered transcript, and the per-turn assistant round-trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::remote::RemoteError;
use crate::schema::{ChatMessage, ChatSession, MessageRole};

/// Opening message shown whenever no chat history exists. Never persisted.
pub const GREETING: &str =
    "Hello, I'm Tameny - the medical assistant for your child's health. How can I help you today?";

pub const NEW_CONSULTATION_TITLE: &str = "New consultation";
pub const UNTITLED_SESSION: &str = "Previous conversation";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("please sign in first")]
    NotSignedIn,
    /// Generic, retry-prompting send failure; the optimistic user entry stays.
    #[error("sorry, a connection error occurred. please try again")]
    SendFailed(#[source] RemoteError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// One rendered transcript line. Ids are client-generated for entries that
/// have not (or will never) come back from the store.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub citations: Option<serde_json::Value>,
    pub at: DateTime<Utc>,
}

impl ChatEntry {
    fn local(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            citations: None,
            at: Utc::now(),
        }
    }

    fn greeting() -> Self {
        Self::local(MessageRole::Assistant, GREETING)
    }
}

impl From<ChatMessage> for ChatEntry {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id.to_string(),
            role: m.role,
            content: m.content,
            citations: m.source_chunks,
            at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Sessions for an identity, most-recently-updated first.
    async fn sessions_for(&self, user: Uuid) -> Result<Vec<ChatSession>, RemoteError>;

    /// Messages of a session, creation time ascending.
    async fn messages_for(&self, session: Uuid) -> Result<Vec<ChatMessage>, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub session_id: Uuid,
    pub response: String,
}

/// The AI chat backend, invoked as a black-box request/response function.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn send(
        &self,
        session: Option<Uuid>,
        message: &str,
        user: Uuid,
    ) -> Result<AssistantReply, RemoteError>;
}

pub struct ChatCoordinator {
    store: Arc<dyn ChatStore>,
    assistant: Arc<dyn Assistant>,
    user: Option<Uuid>,
    sessions: Vec<ChatSession>,
    active: Option<Uuid>,
    entries: Vec<ChatEntry>,
    loading_sessions: bool,
    sending: bool,
}

impl ChatCoordinator {
    pub fn new(store: Arc<dyn ChatStore>, assistant: Arc<dyn Assistant>, user: Option<Uuid>) -> Self {
        Self {
            store,
            assistant,
            user,
            sessions: Vec::new(),
            active: None,
            entries: vec![ChatEntry::greeting()],
            loading_sessions: false,
            sending: false,
        }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn active_session(&self) -> Option<Uuid> {
        self.active
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_loading_sessions(&self) -> bool {
        self.loading_sessions
    }

    /// Display name of the active session.
    pub fn current_title(&self) -> &str {
        match self.active {
            None => NEW_CONSULTATION_TITLE,
            Some(id) => self
                .sessions
                .iter()
                .find(|s| s.id == id)
                .and_then(|s| s.name.as_deref())
                .unwrap_or(UNTITLED_SESSION),
        }
    }

    /// Fetch the identity's sessions and open the most recent one. With no
    /// history, the transcript stays on the unpersisted greeting.
    pub async fn load_sessions(&mut self) -> Result<(), ChatError> {
        let user = match self.user {
            Some(user) => user,
            None => return Ok(()),
        };

        self.loading_sessions = true;
        let fetched = self.store.sessions_for(user).await;
        self.loading_sessions = false;

        self.sessions = fetched?;
        if let Some(most_recent) = self.sessions.first().map(|s| s.id) {
            self.select_session(most_recent).await?;
        }
        Ok(())
    }

    /// Replace the transcript with the stored messages of `id`. An empty
    /// fetch falls back to the greeting.
    pub async fn select_session(&mut self, id: Uuid) -> Result<(), ChatError> {
        self.active = Some(id);
        let fetched = self.store.messages_for(id).await?;

        // A response landing after the active session moved on is stale;
        // never apply it over the newer selection.
        if self.active != Some(id) {
            return Ok(());
        }

        self.entries = if fetched.is_empty() {
            vec![ChatEntry::greeting()]
        } else {
            fetched.into_iter().map(ChatEntry::from).collect()
        };
        Ok(())
    }

    /// One user turn: optimistic local append, assistant invocation, adoption
    /// of a newly created session, assistant reply append. On failure the
    /// optimistic entry is kept so the user's words are never silently lost.
    pub async fn send_message(&mut self, text: &str) -> Result<(), ChatError> {
        let user = self.user.ok_or(ChatError::NotSignedIn)?;

        self.entries
            .push(ChatEntry::local(MessageRole::User, text));
        self.sending = true;

        let result = self.assistant.send(self.active, text, user).await;
        self.sending = false;

        let reply = result.map_err(ChatError::SendFailed)?;

        if self.active.is_none() {
            self.active = Some(reply.session_id);
            // Refresh so the newly auto-titled session shows up; the reply
            // itself is already in hand, so a listing failure only warns.
            match self.store.sessions_for(user).await {
                Ok(sessions) => self.sessions = sessions,
                Err(e) => warn!(error = %e, "session list refresh failed"),
            }
        }

        self.entries
            .push(ChatEntry::local(MessageRole::Assistant, reply.response));
        Ok(())
    }

    /// Reset to an unsaved new session without contacting the store.
    pub fn start_new_chat(&mut self) {
        self.active = None;
        self.entries = vec![ChatEntry::greeting()];
    }
}
