//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any wire format or storage layout;
//! the adapters decode backend payloads into these shapes at the boundary.

use chrono::{DateTime, Utc};

/// The authenticated identity returned by the backend on login or register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// A backend token plus the profile it belongs to.
///
/// Lives until logout or until the backend answers 401, whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub user: UserProfile,
}

/// The kind of study material a source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Ppt,
    Text,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Pdf => "pdf",
            SourceKind::Ppt => "ppt",
            SourceKind::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(SourceKind::Pdf),
            "ppt" | "pptx" => Some(SourceKind::Ppt),
            "text" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

/// A unit of study material (uploaded document text or pasted text).
///
/// Ids are opaque strings: persisted sources carry the backend id, while
/// sources built locally from raw extraction output get a client uuid.
#[derive(Debug, Clone)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A single question/answer card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// A persisted, titled collection of flashcards.
#[derive(Debug, Clone)]
pub struct FlashcardSet {
    pub id: i64,
    pub title: String,
    pub flashcards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
}

/// One multiple-choice question with its options in display order.
///
/// `correct_answer` is the normalized form: an index into `options`, or
/// `None` when the backend's answer code could not be matched to an option.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: Option<usize>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Wire spelling used by the generation endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// The outcome of a generation call: the produced items plus the backend's
/// optional advisory warning (e.g. fewer items than requested).
#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub items: Vec<T>,
    pub warning: Option<String>,
}

/// A persisted, titled quiz.
#[derive(Debug, Clone)]
pub struct QuizSet {
    pub id: i64,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

/// A durable, backend-tracked conversation thread tied to one user.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// One turn within a chat session. Ordered, append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}
