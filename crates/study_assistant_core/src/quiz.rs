//! crates/study_assistant_core/src/quiz.rs
//!
//! Quiz answer normalization and the per-attempt state: selected options,
//! the submitted flag, and the derived score with its color band.

use crate::domain::QuizQuestion;

/// Normalizes a backend answer code into an option index.
///
/// History rows code the answer as a single letter A-D (either case); newer
/// payloads send the index directly as a digit string. Anything unrecognized
/// yields `None` rather than an error.
pub fn normalize_answer(raw: &str, option_count: usize) -> Option<usize> {
    let raw = raw.trim();
    if let Ok(idx) = raw.parse::<usize>() {
        return (idx < option_count).then_some(idx);
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            let idx = (c.to_ascii_uppercase() as u8 - b'A') as usize;
            (idx < option_count).then_some(idx)
        }
        _ => None,
    }
}

/// The tier a score percentage falls into, used for the result banner color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Success,
    Warning,
    Danger,
}

impl ScoreBand {
    pub fn for_percentage(percentage: u32) -> Self {
        if percentage >= 70 {
            ScoreBand::Success
        } else if percentage >= 50 {
            ScoreBand::Warning
        } else {
            ScoreBand::Danger
        }
    }
}

/// One user's pass through the active quiz. The question set itself lives
/// elsewhere; this only tracks the chosen option per question and whether the
/// attempt has been submitted.
#[derive(Debug, Clone, Default)]
pub struct QuizAttempt {
    answers: Vec<Option<usize>>,
    submitted: bool,
}

impl QuizAttempt {
    pub fn new(question_count: usize) -> Self {
        Self {
            answers: vec![None; question_count],
            submitted: false,
        }
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn selected(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Records a choice. Ignored once the attempt is submitted (answers are
    /// locked for review until an explicit retake).
    pub fn select(&mut self, question: usize, option: usize) {
        if self.submitted {
            return;
        }
        if let Some(slot) = self.answers.get_mut(question) {
            *slot = Some(option);
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Submission is blocked until every question has a selected answer.
    pub fn all_answered(&self) -> bool {
        self.answered_count() == self.answers.len()
    }

    /// Locks the attempt for scoring. Returns false (and stays unsubmitted)
    /// when any question is unanswered.
    pub fn submit(&mut self) -> bool {
        if !self.all_answered() {
            return false;
        }
        self.submitted = true;
        true
    }

    /// Clears answers and the submitted flag, keeping the question set.
    pub fn retake(&mut self) {
        for slot in &mut self.answers {
            *slot = None;
        }
        self.submitted = false;
    }

    /// Count of questions whose selected option matches the normalized
    /// correct answer. A `None` correct answer can never be matched.
    pub fn score(&self, questions: &[QuizQuestion]) -> usize {
        questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.is_some() && **a == q.correct_answer)
            .count()
    }

    pub fn percentage(&self, questions: &[QuizQuestion]) -> u32 {
        if questions.is_empty() {
            return 0;
        }
        let score = self.score(questions) as f64;
        (score / questions.len() as f64 * 100.0).round() as u32
    }

    pub fn band(&self, questions: &[QuizQuestion]) -> ScoreBand {
        ScoreBand::for_percentage(self.percentage(questions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: Option<usize>) -> QuizQuestion {
        QuizQuestion {
            question: "q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: correct,
            explanation: None,
        }
    }

    #[test]
    fn normalizes_letters_to_indices() {
        assert_eq!(normalize_answer("A", 4), Some(0));
        assert_eq!(normalize_answer("C", 4), Some(2));
        assert_eq!(normalize_answer("d", 4), Some(3));
    }

    #[test]
    fn unrecognized_codes_yield_no_match() {
        assert_eq!(normalize_answer("Z", 4), None);
        assert_eq!(normalize_answer("", 4), None);
        assert_eq!(normalize_answer("AB", 4), None);
        assert_eq!(normalize_answer("7", 4), None);
    }

    #[test]
    fn numeric_codes_pass_through_when_in_range() {
        assert_eq!(normalize_answer("2", 4), Some(2));
        assert_eq!(normalize_answer("4", 4), None);
    }

    #[test]
    fn score_counts_matching_answers() {
        // 10 questions, all with correct answer 1; answer 7 of them right.
        let questions: Vec<_> = (0..10).map(|_| question(Some(1))).collect();
        let mut attempt = QuizAttempt::new(10);
        for i in 0..7 {
            attempt.select(i, 1);
        }
        for i in 7..10 {
            attempt.select(i, 0);
        }
        assert_eq!(attempt.score(&questions), 7);
        assert_eq!(attempt.percentage(&questions), 70);
        assert_eq!(attempt.band(&questions), ScoreBand::Success);
    }

    #[test]
    fn bands_follow_the_percentage_tiers() {
        assert_eq!(ScoreBand::for_percentage(70), ScoreBand::Success);
        assert_eq!(ScoreBand::for_percentage(69), ScoreBand::Warning);
        assert_eq!(ScoreBand::for_percentage(50), ScoreBand::Warning);
        assert_eq!(ScoreBand::for_percentage(49), ScoreBand::Danger);
    }

    #[test]
    fn submit_is_gated_on_answering_everything() {
        let mut attempt = QuizAttempt::new(5);
        for i in 0..4 {
            attempt.select(i, 0);
        }
        assert!(!attempt.all_answered());
        assert!(!attempt.submit());
        assert!(!attempt.is_submitted());

        attempt.select(4, 2);
        assert!(attempt.all_answered());
        assert!(attempt.submit());
        assert!(attempt.is_submitted());
    }

    #[test]
    fn answers_lock_after_submission_until_retake() {
        let mut attempt = QuizAttempt::new(1);
        attempt.select(0, 0);
        attempt.submit();
        attempt.select(0, 3);
        assert_eq!(attempt.selected(0), Some(0));

        attempt.retake();
        assert!(!attempt.is_submitted());
        assert_eq!(attempt.selected(0), None);
        attempt.select(0, 3);
        assert_eq!(attempt.selected(0), Some(3));
    }

    #[test]
    fn no_match_sentinel_never_scores() {
        let questions = vec![question(None)];
        let mut attempt = QuizAttempt::new(1);
        attempt.select(0, 0);
        assert_eq!(attempt.score(&questions), 0);
    }
}
