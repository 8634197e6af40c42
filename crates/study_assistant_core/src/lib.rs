pub mod domain;
pub mod password;
pub mod ports;
pub mod quiz;
pub mod selection;
pub mod vault;

pub use domain::{
    ChatMessage, ChatRole, ChatSession, Credential, Difficulty, Flashcard, FlashcardSet,
    Generated, QuizQuestion, QuizSet, Source, SourceKind, UserProfile,
};
pub use ports::{AuthApi, ChatApi, GenerationApi, KeyValueStore, PortError, PortResult, SourceApi};
pub use quiz::{normalize_answer, QuizAttempt, ScoreBand};
pub use selection::SelectionSet;
pub use vault::CredentialVault;
