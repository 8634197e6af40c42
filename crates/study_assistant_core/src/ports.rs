//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the HTTP backend
//! or the browser-storage-style key-value tiers.

use async_trait::async_trait;

use crate::domain::{
    ChatMessage, ChatRole, ChatSession, Credential, Difficulty, Flashcard, FlashcardSet,
    Generated, QuizQuestion, QuizSet, Source,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network,
/// storage) into the categories the session machines actually branch on.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The backend rejected the stored token (HTTP 401). Fatal to the session:
    /// callers wipe the credential vault and restart from the auth flow.
    #[error("Session expired")]
    Unauthorized,
    /// The request body exceeded the backend's limit (HTTP 413, or a server
    /// message mentioning an oversize payload).
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    /// The response body was neither a bare array nor any known wrapper.
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    /// Any other non-2xx response, carrying the status and the server-provided
    /// message (or a generic fallback).
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A transport-level or otherwise unexpected error.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Backend API Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges a username/password pair for a credential.
    async fn login(&self, username: &str, password: &str) -> PortResult<Credential>;

    /// Creates an account. Returns the same payload shape as `login`; the
    /// caller treats both identically (register does not auto-login beyond
    /// handing back this credential).
    async fn register(&self, username: &str, email: &str, password: &str)
        -> PortResult<Credential>;
}

#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Uploads a document for text extraction and returns the resulting
    /// source. When the backend returns raw extracted sections instead of a
    /// persisted source, the adapter constructs a client-side `Source`
    /// wrapping the joined text.
    async fn upload_document(
        &self,
        token: &str,
        user_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortResult<Source>;

    /// Persists pasted text as a `text`-typed source.
    async fn create_text_source(
        &self,
        token: &str,
        user_id: i64,
        content: &str,
    ) -> PortResult<Source>;

    async fn list_sources(&self, token: &str, user_id: i64) -> PortResult<Vec<Source>>;

    async fn delete_source(&self, token: &str, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn generate_flashcards(
        &self,
        token: &str,
        study_material: &str,
        count: u32,
        user_id: i64,
        title: &str,
    ) -> PortResult<Generated<Flashcard>>;

    async fn generate_quiz(
        &self,
        token: &str,
        study_material: &str,
        count: u32,
        difficulty: Difficulty,
        user_id: i64,
        title: &str,
    ) -> PortResult<Generated<QuizQuestion>>;

    async fn flashcard_history(&self, token: &str) -> PortResult<Vec<FlashcardSet>>;

    async fn quiz_history(&self, token: &str) -> PortResult<Vec<QuizSet>>;

    async fn delete_flashcard_set(&self, token: &str, id: i64) -> PortResult<()>;

    async fn delete_quiz_set(&self, token: &str, id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Lists the user's chat sessions, most recently created first.
    async fn list_sessions(&self, token: &str, user_id: i64) -> PortResult<Vec<ChatSession>>;

    async fn create_session(&self, token: &str, user_id: i64) -> PortResult<ChatSession>;

    async fn delete_session(&self, token: &str, session_id: i64) -> PortResult<()>;

    /// Returns a session's messages in their original order.
    async fn list_messages(&self, token: &str, session_id: i64) -> PortResult<Vec<ChatMessage>>;

    async fn save_message(
        &self,
        token: &str,
        session_id: i64,
        role: ChatRole,
        content: &str,
    ) -> PortResult<()>;

    /// Sends a message to the completion endpoint and returns the assistant's
    /// reply text.
    async fn complete(&self, token: &str, session_id: i64, message: &str) -> PortResult<String>;
}

//=========================================================================================
// Storage Port
//=========================================================================================

/// A string key-value slot, one per storage tier (durable vs session-scoped).
///
/// Storage failures are not part of the contract: implementations log and
/// swallow write errors, and `get` answers `None` for anything unreadable.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
