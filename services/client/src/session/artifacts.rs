//! services/client/src/session/artifacts.rs
//!
//! The artifact generator: requests flashcards and quizzes from the backend
//! and tracks the per-artifact display state (revealed answers, the quiz
//! attempt, the active tab). Incoming payloads are already canonical; the
//! HTTP adapter decodes the backend's envelope variants at the boundary.

use std::sync::Arc;

use chrono::Utc;
use study_assistant_core::domain::{
    Difficulty, Flashcard, FlashcardSet, QuizQuestion, QuizSet,
};
use study_assistant_core::quiz::QuizAttempt;

use crate::session::history::HistoryBrowser;
use crate::session::state::{ActionError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTab {
    Flashcards,
    Quiz,
}

/// The flashcard list currently on screen, with a reveal flag per card.
pub struct FlashcardView {
    pub title: String,
    pub cards: Vec<Flashcard>,
    pub warning: Option<String>,
    revealed: Vec<bool>,
}

impl FlashcardView {
    fn new(title: String, cards: Vec<Flashcard>, warning: Option<String>) -> Self {
        let revealed = vec![false; cards.len()];
        Self {
            title,
            cards,
            warning,
            revealed,
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn toggle_reveal(&mut self, index: usize) {
        if let Some(flag) = self.revealed.get_mut(index) {
            *flag = !*flag;
        }
    }
}

/// The quiz currently on screen plus the user's attempt over it.
pub struct QuizView {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub warning: Option<String>,
    pub attempt: QuizAttempt,
}

impl QuizView {
    fn new(title: String, questions: Vec<QuizQuestion>, warning: Option<String>) -> Self {
        let attempt = QuizAttempt::new(questions.len());
        Self {
            title,
            questions,
            warning,
            attempt,
        }
    }

    /// Records a choice after bounds-checking it against the question's
    /// options. Returns false for an unknown question or option index, so an
    /// out-of-range pick never counts as answered.
    pub fn select_answer(&mut self, question: usize, option: usize) -> bool {
        match self.questions.get(question) {
            Some(q) if option < q.options.len() => {
                self.attempt.select(question, option);
                true
            }
            _ => false,
        }
    }
}

pub struct ArtifactGenerator {
    state: Arc<AppState>,
    user_id: i64,
    pub active_tab: ActiveTab,
    flashcards: Option<FlashcardView>,
    quiz: Option<QuizView>,
}

impl ArtifactGenerator {
    pub fn new(state: Arc<AppState>, user_id: i64) -> Self {
        Self {
            state,
            user_id,
            active_tab: ActiveTab::Flashcards,
            flashcards: None,
            quiz: None,
        }
    }

    pub fn flashcards(&self) -> Option<&FlashcardView> {
        self.flashcards.as_ref()
    }

    pub fn flashcards_mut(&mut self) -> Option<&mut FlashcardView> {
        self.flashcards.as_mut()
    }

    pub fn quiz(&self) -> Option<&QuizView> {
        self.quiz.as_ref()
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizView> {
        self.quiz.as_mut()
    }

    /// Generates a flashcard set from the selected content. The new set
    /// replaces whatever was active; a second in-flight generation is only
    /// prevented by the caller disabling its control, so the later response
    /// simply wins. Success also refreshes the history lists best-effort.
    pub async fn generate_flashcards(
        &mut self,
        token: &str,
        study_material: &str,
        count: u32,
        history: &mut HistoryBrowser,
    ) -> Result<(), ActionError> {
        if study_material.trim().is_empty() {
            return Err(ActionError::Message(
                "Please select a source or add some study material first".to_string(),
            ));
        }
        let title = format!("Flashcards {}", Utc::now().format("%Y-%m-%d %H:%M"));
        let generated = self
            .state
            .generation_api
            .generate_flashcards(token, study_material, count, self.user_id, &title)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.flashcards = Some(FlashcardView::new(title, generated.items, generated.warning));
        self.active_tab = ActiveTab::Flashcards;
        history.refresh_best_effort(token).await;
        Ok(())
    }

    /// Generates a quiz from the selected content, replacing the active one.
    /// Success also refreshes the history lists best-effort.
    pub async fn generate_quiz(
        &mut self,
        token: &str,
        study_material: &str,
        count: u32,
        difficulty: Difficulty,
        history: &mut HistoryBrowser,
    ) -> Result<(), ActionError> {
        if study_material.trim().is_empty() {
            return Err(ActionError::Message(
                "Please select a source or add some study material first".to_string(),
            ));
        }
        let title = format!("Quiz {}", Utc::now().format("%Y-%m-%d %H:%M"));
        let generated = self
            .state
            .generation_api
            .generate_quiz(token, study_material, count, difficulty, self.user_id, &title)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.quiz = Some(QuizView::new(title, generated.items, generated.warning));
        self.active_tab = ActiveTab::Quiz;
        history.refresh_best_effort(token).await;
        Ok(())
    }

    /// Reinstates a stored flashcard set as the active display.
    pub fn show_flashcard_set(&mut self, set: FlashcardSet) {
        self.flashcards = Some(FlashcardView::new(set.title, set.flashcards, None));
        self.active_tab = ActiveTab::Flashcards;
    }

    /// Reinstates a stored quiz as the active display with a fresh attempt.
    pub fn show_quiz_set(&mut self, set: QuizSet) {
        self.quiz = Some(QuizView::new(set.title, set.questions, None));
        self.active_tab = ActiveTab::Quiz;
    }
}
