//! services/client/src/session/chat.rs
//!
//! The chat panel: resolves a durable chat session for the user on startup,
//! hydrates prior messages, and appends user/assistant turns to both the
//! local list and the backend. Message persistence is optimistic: the local
//! list is updated first and storage failures are logged, never rolled back.

use std::sync::Arc;

use study_assistant_core::domain::{ChatMessage, ChatRole};
use tracing::warn;

use crate::session::state::{ActionError, AppState};

/// At most this many characters of selected-source content are prefixed onto
/// an outgoing message as context.
pub const CONTEXT_PREFIX_LIMIT: usize = 3000;

const FALLBACK_REPLY: &str =
    "Sorry, I couldn't process your message. Please try again.";

pub struct ChatPanel {
    state: Arc<AppState>,
    user_id: i64,
    session_id: Option<i64>,
    messages: Vec<ChatMessage>,
    hydrated: bool,
    busy: bool,
}

impl ChatPanel {
    pub fn new(state: Arc<AppState>, user_id: i64) -> Self {
        Self {
            state,
            user_id,
            session_id: None,
            messages: Vec::new(),
            hydrated: false,
            busy: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn session_id(&self) -> Option<i64> {
        self.session_id
    }

    /// True once history has been fetched; gates the "empty chat" welcome so
    /// it never shows before hydration finishes.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Resolves the user's chat session and hydrates its messages: adopts the
    /// most recently created session if any exist, otherwise creates one.
    pub async fn bootstrap(&mut self, token: &str) -> Result<(), ActionError> {
        let sessions = self
            .state
            .chat_api
            .list_sessions(token, self.user_id)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        let session = match sessions.into_iter().next() {
            Some(existing) => existing,
            None => self
                .state
                .chat_api
                .create_session(token, self.user_id)
                .await
                .map_err(|e| self.state.map_port_error(e))?,
        };
        self.session_id = Some(session.id);
        self.messages = self
            .state
            .chat_api
            .list_messages(token, session.id)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.hydrated = true;
        Ok(())
    }

    /// Builds the outgoing completion payload, prefixing up to
    /// [`CONTEXT_PREFIX_LIMIT`] characters of selected content when any
    /// sources are selected.
    fn outgoing_payload(text: &str, selected_content: &str) -> String {
        if selected_content.trim().is_empty() {
            return text.to_string();
        }
        let context: String = selected_content.chars().take(CONTEXT_PREFIX_LIMIT).collect();
        format!(
            "Use the following study material as context:\n{}\n\nQuestion: {}",
            context, text
        )
    }

    /// Sends a user message. A blank message, an in-flight send, or an
    /// unresolved session makes this a no-op. The user turn is appended
    /// locally before any network call; persistence of either turn is
    /// best-effort, but a completion failure surfaces after appending a
    /// fallback assistant turn.
    pub async fn send_message(
        &mut self,
        token: &str,
        text: &str,
        selected_content: &str,
    ) -> Result<(), ActionError> {
        let text = text.trim();
        if text.is_empty() || self.busy {
            return Ok(());
        }
        let Some(session_id) = self.session_id else {
            return Ok(());
        };
        self.busy = true;

        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: text.to_string(),
        });
        if let Err(e) = self
            .state
            .chat_api
            .save_message(token, session_id, ChatRole::User, text)
            .await
        {
            warn!("Failed to persist user message: {}", e);
        }

        let payload = Self::outgoing_payload(text, selected_content);
        let result = self.state.chat_api.complete(token, session_id, &payload).await;
        self.busy = false;

        match result {
            Ok(reply) => {
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: reply.clone(),
                });
                if let Err(e) = self
                    .state
                    .chat_api
                    .save_message(token, session_id, ChatRole::Assistant, &reply)
                    .await
                {
                    warn!("Failed to persist assistant message: {}", e);
                }
                Ok(())
            }
            Err(error) => {
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: FALLBACK_REPLY.to_string(),
                });
                Err(self.state.map_port_error(error))
            }
        }
    }

    /// Discards the conversation: deletes the current session server-side,
    /// creates a fresh one, and empties the local list.
    pub async fn clear_chat(&mut self, token: &str) -> Result<(), ActionError> {
        if let Some(session_id) = self.session_id {
            self.state
                .chat_api
                .delete_session(token, session_id)
                .await
                .map_err(|e| self.state.map_port_error(e))?;
        }
        let fresh = self
            .state
            .chat_api
            .create_session(token, self.user_id)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.session_id = Some(fresh.id);
        self.messages.clear();
        Ok(())
    }
}
