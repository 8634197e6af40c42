//! services/client/src/session/mock.rs
//!
//! Programmable port doubles for the session-machine tests. Each mock records
//! call counts and can be scripted to fail in the ways the machines must
//! handle (rejection messages, oversize payloads, session expiry).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use study_assistant_core::domain::{
    ChatMessage, ChatRole, ChatSession, Credential, Difficulty, Flashcard, FlashcardSet,
    Generated, QuizQuestion, QuizSet, Source, SourceKind, UserProfile,
};
use study_assistant_core::ports::{
    AuthApi, ChatApi, GenerationApi, PortError, PortResult, SourceApi,
};
use study_assistant_core::vault::CredentialVault;

use crate::adapters::storage::MemoryStore;
use crate::session::state::AppState;

pub(crate) fn test_credential() -> Credential {
    Credential {
        token: "tok".to_string(),
        user: UserProfile {
            id: 7,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        },
    }
}

/// Builds an `AppState` over the given mocks with in-memory storage tiers.
pub(crate) fn test_state(
    auth: Arc<MockAuth>,
    sources: Arc<MockSources>,
    generation: Arc<MockGeneration>,
    chat: Arc<MockChat>,
) -> Arc<AppState> {
    let durable = Arc::new(MemoryStore::new());
    let session = Arc::new(MemoryStore::new());
    let vault = Arc::new(CredentialVault::new(durable.clone(), session));
    Arc::new(AppState {
        auth_api: auth,
        source_api: sources,
        generation_api: generation,
        chat_api: chat,
        vault,
        durable_store: durable,
    })
}

//=========================================================================================
// MockAuth
//=========================================================================================

enum AuthScript {
    Succeed,
    Fail { status: u16, message: String },
    Unauthorized,
}

pub(crate) struct MockAuth {
    script: AuthScript,
    pub calls: AtomicUsize,
}

impl Default for MockAuth {
    fn default() -> Self {
        Self::succeeding()
    }
}

impl MockAuth {
    pub fn succeeding() -> Self {
        Self {
            script: AuthScript::Succeed,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            script: AuthScript::Fail {
                status,
                message: message.to_string(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            script: AuthScript::Unauthorized,
            calls: AtomicUsize::new(0),
        }
    }

    fn answer(&self) -> PortResult<Credential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            AuthScript::Succeed => Ok(test_credential()),
            AuthScript::Fail { status, message } => Err(PortError::Http {
                status: *status,
                message: message.clone(),
            }),
            AuthScript::Unauthorized => Err(PortError::Unauthorized),
        }
    }
}

#[async_trait]
impl AuthApi for MockAuth {
    async fn login(&self, _username: &str, _password: &str) -> PortResult<Credential> {
        self.answer()
    }

    async fn register(
        &self,
        _username: &str,
        _email: &str,
        _password: &str,
    ) -> PortResult<Credential> {
        self.answer()
    }
}

//=========================================================================================
// MockSources
//=========================================================================================

#[derive(Default)]
pub(crate) struct MockSources {
    backend: Mutex<Vec<Source>>,
    next_id: AtomicUsize,
    failing_upload: Mutex<Option<(String, u16, String)>>,
    expire: AtomicBool,
    pub upload_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockSources {
    pub fn fail_upload_named(&self, name: &str, status: u16, message: &str) {
        *self.failing_upload.lock().unwrap() =
            Some((name.to_string(), status, message.to_string()));
    }

    pub fn expire_uploads(&self) {
        self.expire.store(true, Ordering::SeqCst);
    }

    pub fn remove_backend_source(&self, id: &str) {
        self.backend.lock().unwrap().retain(|s| s.id != id);
    }

    fn new_source(&self, name: &str, kind: SourceKind, content: &str) -> Source {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let source = Source {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.backend.lock().unwrap().push(source.clone());
        source
    }
}

#[async_trait]
impl SourceApi for MockSources {
    async fn upload_document(
        &self,
        _token: &str,
        _user_id: i64,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> PortResult<Source> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.expire.load(Ordering::SeqCst) {
            return Err(PortError::Unauthorized);
        }
        if let Some((name, status, message)) = self.failing_upload.lock().unwrap().clone() {
            if name == file_name {
                return Err(PortError::Http { status, message });
            }
        }
        let kind = if file_name.to_lowercase().ends_with(".pdf") {
            SourceKind::Pdf
        } else {
            SourceKind::Ppt
        };
        Ok(self.new_source(file_name, kind, &format!("content of {}", file_name)))
    }

    async fn create_text_source(
        &self,
        _token: &str,
        _user_id: i64,
        content: &str,
    ) -> PortResult<Source> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.new_source("Text Source", SourceKind::Text, content))
    }

    async fn list_sources(&self, _token: &str, _user_id: i64) -> PortResult<Vec<Source>> {
        Ok(self.backend.lock().unwrap().clone())
    }

    async fn delete_source(&self, _token: &str, id: &str) -> PortResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.backend.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }
}

//=========================================================================================
// MockGeneration
//=========================================================================================

#[derive(Clone, Copy, PartialEq)]
enum GenFailure {
    None,
    Unauthorized,
    TooLarge,
}

pub(crate) struct MockGeneration {
    flashcard_count: AtomicUsize,
    quiz_shape: Mutex<Option<(usize, usize)>>,
    warning: Mutex<Option<String>>,
    failure: Mutex<GenFailure>,
    fail_history: AtomicBool,
    flashcard_sets: Mutex<Vec<FlashcardSet>>,
    quiz_sets: Mutex<Vec<QuizSet>>,
    pub flashcard_calls: AtomicUsize,
    pub quiz_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl Default for MockGeneration {
    fn default() -> Self {
        Self {
            flashcard_count: AtomicUsize::new(1),
            quiz_shape: Mutex::new(None),
            warning: Mutex::new(None),
            failure: Mutex::new(GenFailure::None),
            fail_history: AtomicBool::new(false),
            flashcard_sets: Mutex::new(Vec::new()),
            quiz_sets: Mutex::new(Vec::new()),
            flashcard_calls: AtomicUsize::new(0),
            quiz_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

fn sample_question(correct: usize) -> QuizQuestion {
    QuizQuestion {
        question: "What is the powerhouse of the cell?".to_string(),
        options: vec![
            "Nucleus".to_string(),
            "Mitochondria".to_string(),
            "Ribosome".to_string(),
            "Golgi apparatus".to_string(),
        ],
        correct_answer: Some(correct),
        explanation: None,
    }
}

impl MockGeneration {
    pub fn with_flashcards(count: usize) -> Self {
        let mock = Self::default();
        mock.flashcard_count.store(count, Ordering::SeqCst);
        mock
    }

    pub fn with_quiz(count: usize, correct: usize) -> Self {
        let mock = Self::default();
        *mock.quiz_shape.lock().unwrap() = Some((count, correct));
        mock
    }

    pub fn with_history(flashcard_sets: usize, quiz_sets: usize) -> Self {
        let mock = Self::default();
        {
            let mut sets = mock.flashcard_sets.lock().unwrap();
            for i in 0..flashcard_sets {
                sets.push(FlashcardSet {
                    id: i as i64 + 1,
                    title: format!("Set {}", i + 1),
                    flashcards: vec![Flashcard {
                        question: "q".to_string(),
                        answer: "a".to_string(),
                    }],
                    created_at: Utc::now(),
                });
            }
        }
        {
            let mut sets = mock.quiz_sets.lock().unwrap();
            for i in 0..quiz_sets {
                sets.push(QuizSet {
                    id: i as i64 + 1,
                    title: format!("Quiz {}", i + 1),
                    questions: vec![sample_question(2)],
                    difficulty: Difficulty::Medium,
                    created_at: Utc::now(),
                });
            }
        }
        mock
    }

    pub fn set_flashcard_count(&self, count: usize) {
        self.flashcard_count.store(count, Ordering::SeqCst);
    }

    pub fn set_warning(&self, warning: &str) {
        *self.warning.lock().unwrap() = Some(warning.to_string());
    }

    pub fn expire(&self) {
        *self.failure.lock().unwrap() = GenFailure::Unauthorized;
    }

    pub fn reject_too_large(&self) {
        *self.failure.lock().unwrap() = GenFailure::TooLarge;
    }

    pub fn fail_history(&self) {
        self.fail_history.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> PortResult<()> {
        match *self.failure.lock().unwrap() {
            GenFailure::None => Ok(()),
            GenFailure::Unauthorized => Err(PortError::Unauthorized),
            GenFailure::TooLarge => Err(PortError::PayloadTooLarge(
                "Study material is too large".to_string(),
            )),
        }
    }

    fn history_guard(&self) -> PortResult<()> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(PortError::Http {
                status: 500,
                message: "history unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GenerationApi for MockGeneration {
    async fn generate_flashcards(
        &self,
        _token: &str,
        _study_material: &str,
        _count: u32,
        _user_id: i64,
        _title: &str,
    ) -> PortResult<Generated<Flashcard>> {
        self.flashcard_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let count = self.flashcard_count.load(Ordering::SeqCst);
        let items = (0..count)
            .map(|i| Flashcard {
                question: format!("Question {}", i + 1),
                answer: format!("Answer {}", i + 1),
            })
            .collect();
        Ok(Generated {
            items,
            warning: self.warning.lock().unwrap().clone(),
        })
    }

    async fn generate_quiz(
        &self,
        _token: &str,
        _study_material: &str,
        count: u32,
        _difficulty: Difficulty,
        _user_id: i64,
        _title: &str,
    ) -> PortResult<Generated<QuizQuestion>> {
        self.quiz_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let (count, correct) = self
            .quiz_shape
            .lock()
            .unwrap()
            .unwrap_or((count as usize, 0));
        let items = (0..count).map(|_| sample_question(correct)).collect();
        Ok(Generated {
            items,
            warning: self.warning.lock().unwrap().clone(),
        })
    }

    async fn flashcard_history(&self, _token: &str) -> PortResult<Vec<FlashcardSet>> {
        self.history_guard()?;
        Ok(self.flashcard_sets.lock().unwrap().clone())
    }

    async fn quiz_history(&self, _token: &str) -> PortResult<Vec<QuizSet>> {
        self.history_guard()?;
        Ok(self.quiz_sets.lock().unwrap().clone())
    }

    async fn delete_flashcard_set(&self, _token: &str, id: i64) -> PortResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.flashcard_sets.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }

    async fn delete_quiz_set(&self, _token: &str, id: i64) -> PortResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.quiz_sets.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }
}

//=========================================================================================
// MockChat
//=========================================================================================

#[derive(Default)]
pub(crate) struct MockChat {
    sessions: Mutex<Vec<ChatSession>>,
    history: Mutex<HashMap<i64, Vec<ChatMessage>>>,
    next_session_id: AtomicI64,
    reply: Mutex<Option<String>>,
    fail_complete: AtomicBool,
    fail_save: AtomicBool,
    saved: Mutex<Vec<(i64, ChatRole, String)>>,
    last_completion: Mutex<Option<String>>,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
}

impl MockChat {
    /// Seeds existing sessions; later ids are more recently created, and the
    /// listing answers most-recent-first like the HTTP adapter does.
    pub fn with_sessions(ids: &[i64]) -> Self {
        let mock = Self::default();
        {
            let mut sessions = mock.sessions.lock().unwrap();
            let base = Utc::now();
            for (i, id) in ids.iter().enumerate() {
                sessions.push(ChatSession {
                    id: *id,
                    user_id: 7,
                    created_at: base + Duration::minutes(i as i64),
                });
            }
        }
        mock.next_session_id.store(1000, Ordering::SeqCst);
        mock
    }

    pub fn push_history(&self, session_id: i64, role: ChatRole, content: &str) {
        self.history
            .lock()
            .unwrap()
            .entry(session_id)
            .or_default()
            .push(ChatMessage {
                role,
                content: content.to_string(),
            });
    }

    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = Some(reply.to_string());
    }

    pub fn fail_completion(&self) {
        self.fail_complete.store(true, Ordering::SeqCst);
    }

    pub fn fail_saves(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn last_completion_message(&self) -> Option<String> {
        self.last_completion.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for MockChat {
    async fn list_sessions(&self, _token: &str, _user_id: i64) -> PortResult<Vec<ChatSession>> {
        let mut sessions = self.sessions.lock().unwrap().clone();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn create_session(&self, _token: &str, user_id: i64) -> PortResult<ChatSession> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst) + 1;
        let session = ChatSession {
            id,
            user_id,
            created_at: Utc::now(),
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn delete_session(&self, _token: &str, session_id: i64) -> PortResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().unwrap().retain(|s| s.id != session_id);
        self.history.lock().unwrap().remove(&session_id);
        Ok(())
    }

    async fn list_messages(&self, _token: &str, session_id: i64) -> PortResult<Vec<ChatMessage>> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_message(
        &self,
        _token: &str,
        session_id: i64,
        role: ChatRole,
        content: &str,
    ) -> PortResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(PortError::Http {
                status: 500,
                message: "storage unavailable".to_string(),
            });
        }
        self.saved
            .lock()
            .unwrap()
            .push((session_id, role, content.to_string()));
        Ok(())
    }

    async fn complete(&self, _token: &str, _session_id: i64, message: &str) -> PortResult<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_completion.lock().unwrap() = Some(message.to_string());
        if self.fail_complete.load(Ordering::SeqCst) {
            return Err(PortError::Http {
                status: 502,
                message: "model unavailable".to_string(),
            });
        }
        Ok(self
            .reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "Understood.".to_string()))
    }
}
