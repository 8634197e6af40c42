//! services/client/src/session/history.rs
//!
//! The history browser: lists previously generated flashcard and quiz sets,
//! reinstates one as the active artifact, and deletes sets (after the caller
//! has confirmed with the user).

use std::sync::Arc;

use study_assistant_core::domain::{FlashcardSet, QuizSet};
use tracing::warn;

use crate::session::artifacts::ArtifactGenerator;
use crate::session::state::{ActionError, AppState};

pub struct HistoryBrowser {
    state: Arc<AppState>,
    flashcard_sets: Vec<FlashcardSet>,
    quiz_sets: Vec<QuizSet>,
}

impl HistoryBrowser {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            flashcard_sets: Vec::new(),
            quiz_sets: Vec::new(),
        }
    }

    pub fn flashcard_sets(&self) -> &[FlashcardSet] {
        &self.flashcard_sets
    }

    pub fn quiz_sets(&self) -> &[QuizSet] {
        &self.quiz_sets
    }

    pub async fn refresh_flashcards(&mut self, token: &str) -> Result<(), ActionError> {
        self.flashcard_sets = self
            .state
            .generation_api
            .flashcard_history(token)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        Ok(())
    }

    pub async fn refresh_quizzes(&mut self, token: &str) -> Result<(), ActionError> {
        self.quiz_sets = self
            .state
            .generation_api
            .quiz_history(token)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        Ok(())
    }

    /// Best-effort refresh of both lists after a generation: failures are
    /// logged, never surfaced, and never block the action that triggered it.
    pub async fn refresh_best_effort(&mut self, token: &str) {
        if let Err(e) = self.refresh_flashcards(token).await {
            warn!("Flashcard history refresh failed: {}", e);
        }
        if let Err(e) = self.refresh_quizzes(token).await {
            warn!("Quiz history refresh failed: {}", e);
        }
    }

    /// Reinstates a stored flashcard set as the generator's active display.
    pub fn view_flashcard_set(&self, index: usize, generator: &mut ArtifactGenerator) -> bool {
        match self.flashcard_sets.get(index) {
            Some(set) => {
                generator.show_flashcard_set(set.clone());
                true
            }
            None => false,
        }
    }

    /// Reinstates a stored quiz; answer codes were normalized at decode time,
    /// so the generator receives index-form answers only.
    pub fn view_quiz_set(&self, index: usize, generator: &mut ArtifactGenerator) -> bool {
        match self.quiz_sets.get(index) {
            Some(set) => {
                generator.show_quiz_set(set.clone());
                true
            }
            None => false,
        }
    }

    /// Deletes a stored flashcard set, then re-fetches the list so the local
    /// view reconciles with the backend.
    pub async fn delete_flashcard_set(&mut self, token: &str, id: i64) -> Result<(), ActionError> {
        self.state
            .generation_api
            .delete_flashcard_set(token, id)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.refresh_flashcards(token).await
    }

    pub async fn delete_quiz_set(&mut self, token: &str, id: i64) -> Result<(), ActionError> {
        self.state
            .generation_api
            .delete_quiz_set(token, id)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.refresh_quizzes(token).await
    }
}
