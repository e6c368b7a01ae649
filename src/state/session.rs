//! In-memory quiz session owned by the server.
//!
//! One user holds at most one session. All mutation funnels through the
//! transition table in [`super::state_machine`], and completion is the only
//! place a score is computed, so the result can never drift from the answers.

use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    dao::models::{NewAttempt, QuestionEntity, QuizEntity},
    scoring::{self, ScoreBreakdown},
};

use super::state_machine::{InvalidTransition, SessionEvent, SessionPhase, compute_transition};

/// Failure while operating on a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested event is not valid in the current phase.
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    /// The selected option index does not exist on the current question.
    #[error("option index {index} is out of range for the current question")]
    OptionOutOfRange {
        /// Rejected index.
        index: usize,
    },
    /// Advancing requires a selected option.
    #[error("no option is selected for the current question")]
    NoSelection,
    /// The operation requires a running attempt.
    #[error("no attempt is currently running")]
    NotActive,
}

/// Why an attempt reached the completed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// The user confirmed the final question.
    Finished,
    /// The countdown reached zero.
    TimedOut,
}

/// Progress of the detached attempt persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// Persistence has been started but has not resolved yet.
    Pending,
    /// Attempt record and point total were written.
    Saved,
    /// Persistence failed; the result stays on screen regardless.
    Failed,
}

/// Frozen outcome of a completed attempt.
#[derive(Debug)]
pub struct CompletedAttempt {
    /// Graded breakdown at the moment of completion.
    pub breakdown: ScoreBreakdown,
    /// How the attempt ended.
    pub reason: CompletionReason,
    /// Live view of the persistence progress.
    pub save: watch::Receiver<SaveState>,
}

/// Outcome of confirming an answer.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// Moved to the question at this index.
    Next(usize),
    /// The confirmed question was the last one; the attempt is graded.
    Completed {
        /// Graded breakdown.
        breakdown: ScoreBreakdown,
        /// Sender the caller uses to report persistence progress.
        save: watch::Sender<SaveState>,
    },
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown still running; carries the remaining seconds.
    Running(u32),
    /// Countdown reached zero on this tick.
    Expired,
    /// The session left the active phase; the timer should stop.
    Stopped,
}

/// One user's quiz attempt and its surrounding lifecycle state.
#[derive(Debug)]
pub struct QuizSession {
    user_id: Uuid,
    quiz: QuizEntity,
    phase: SessionPhase,
    current_index: usize,
    answers: IndexMap<Uuid, usize>,
    selected: Option<usize>,
    time_left: u32,
    result: Option<CompletedAttempt>,
}

impl QuizSession {
    /// Begin an attempt on the given quiz. The caller guarantees the quiz
    /// has at least one question.
    pub fn start(user_id: Uuid, quiz: QuizEntity) -> Self {
        let time_left = quiz.time_limit_secs;
        Self {
            user_id,
            quiz,
            phase: SessionPhase::Active,
            current_index: 0,
            answers: IndexMap::new(),
            selected: None,
            time_left,
            result: None,
        }
    }

    /// User owning the session.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Quiz being attempted.
    pub fn quiz(&self) -> &QuizEntity {
        &self.quiz
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Zero-based index of the question being presented.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Question currently presented, while the attempt is running.
    pub fn current_question(&self) -> Option<&QuestionEntity> {
        if self.phase == SessionPhase::Active {
            self.quiz.questions.get(self.current_index)
        } else {
            None
        }
    }

    /// Confirmed answers so far.
    pub fn answers(&self) -> &IndexMap<Uuid, usize> {
        &self.answers
    }

    /// Option currently highlighted but not yet confirmed.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Remaining seconds on the countdown.
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Frozen result, once the attempt completed.
    pub fn result(&self) -> Option<&CompletedAttempt> {
        self.result.as_ref()
    }

    /// Highlight an option on the current question.
    pub fn select_option(&mut self, index: usize) -> Result<(), SessionError> {
        let question = self.current_question().ok_or(SessionError::NotActive)?;
        if index >= question.options.len() {
            return Err(SessionError::OptionOutOfRange { index });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Confirm the highlighted option and move to the next question, or
    /// grade the attempt when the final question was confirmed.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        let last_question = self.current_index + 1 >= self.quiz.questions.len();
        // Validate the phase before inspecting the selection so a stale
        // request against a finished session reports the right error.
        compute_transition(self.phase, SessionEvent::Advance { last_question })?;
        if self.selected.is_none() {
            return Err(SessionError::NoSelection);
        }

        if last_question {
            let (breakdown, save) = self.complete(
                SessionEvent::Advance {
                    last_question: true,
                },
                CompletionReason::Finished,
            )?;
            return Ok(AdvanceOutcome::Completed { breakdown, save });
        }

        if let (Some(question), Some(choice)) =
            (self.quiz.questions.get(self.current_index), self.selected)
        {
            self.answers.insert(question.id, choice);
        }
        self.selected = None;
        self.phase = compute_transition(
            self.phase,
            SessionEvent::Advance {
                last_question: false,
            },
        )?;
        self.current_index += 1;
        Ok(AdvanceOutcome::Next(self.current_index))
    }

    /// Decrement the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Active {
            return TickOutcome::Stopped;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.time_left)
        }
    }

    /// Complete the attempt because the countdown ran out. A highlighted
    /// but unconfirmed option still counts as the user's answer.
    pub fn expire(
        &mut self,
    ) -> Result<(ScoreBreakdown, watch::Sender<SaveState>), SessionError> {
        self.complete(SessionEvent::TimeExpired, CompletionReason::TimedOut)
    }

    /// Abandon the running attempt without grading it.
    pub fn exit(&mut self) -> Result<(), SessionError> {
        self.phase = compute_transition(self.phase, SessionEvent::Exit)?;
        Ok(())
    }

    /// Leave the results screen back to quiz selection.
    pub fn try_another(&mut self) -> Result<(), SessionError> {
        self.phase = compute_transition(self.phase, SessionEvent::TryAnother)?;
        Ok(())
    }

    /// Restart the same quiz from the results screen.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        self.phase = compute_transition(self.phase, SessionEvent::Retry)?;
        self.current_index = 0;
        self.answers.clear();
        self.selected = None;
        self.time_left = self.quiz.time_limit_secs;
        self.result = None;
        Ok(())
    }

    /// Attempt record matching the graded result, ready for persistence.
    pub fn attempt_record(&self, breakdown: &ScoreBreakdown) -> NewAttempt {
        NewAttempt {
            user_id: self.user_id,
            quiz_id: self.quiz.id,
            score: breakdown.awarded(),
            answers: self.answers.clone(),
        }
    }

    fn complete(
        &mut self,
        event: SessionEvent,
        reason: CompletionReason,
    ) -> Result<(ScoreBreakdown, watch::Sender<SaveState>), SessionError> {
        self.phase = compute_transition(self.phase, event)?;

        // Fold an in-flight selection into the answer set before grading.
        if let Some(choice) = self.selected.take() {
            if let Some(question) = self.quiz.questions.get(self.current_index) {
                self.answers.insert(question.id, choice);
            }
        }

        let breakdown = scoring::score(&self.quiz.questions, &self.answers, self.quiz.max_points);
        let (save_tx, save_rx) = watch::channel(SaveState::Pending);
        self.result = Some(CompletedAttempt {
            breakdown,
            reason,
            save: save_rx,
        });
        Ok((breakdown, save_tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(question_count: usize, points_each: u32, time_limit: u32) -> QuizEntity {
        let questions = (0..question_count)
            .map(|i| QuestionEntity {
                id: Uuid::from_u128(i as u128 + 1),
                prompt: format!("q{i}"),
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_option: Some(0),
                points: points_each,
            })
            .collect();
        QuizEntity {
            id: Uuid::from_u128(0xAA),
            title: "sample".into(),
            description: String::new(),
            questions,
            max_points: points_each * question_count as u32,
            time_limit_secs: time_limit,
        }
    }

    fn user() -> Uuid {
        Uuid::from_u128(0xBB)
    }

    #[test]
    fn advance_without_selection_is_rejected() {
        let mut session = QuizSession::start(user(), quiz(2, 10, 60));
        assert!(matches!(
            session.advance(),
            Err(SessionError::NoSelection)
        ));
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut session = QuizSession::start(user(), quiz(1, 10, 60));
        assert!(matches!(
            session.select_option(3),
            Err(SessionError::OptionOutOfRange { index: 3 })
        ));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn confirming_the_last_question_completes_and_grades() {
        let mut session = QuizSession::start(user(), quiz(2, 10, 60));

        session.select_option(0).unwrap();
        assert!(matches!(session.advance(), Ok(AdvanceOutcome::Next(1))));

        session.select_option(2).unwrap();
        let outcome = session.advance().unwrap();
        let AdvanceOutcome::Completed { breakdown, .. } = outcome else {
            panic!("expected completion");
        };

        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(breakdown.correct, 1);
        assert_eq!(breakdown.incorrect, 1);
        assert_eq!(breakdown.earned, 10);
    }

    #[test]
    fn expiry_folds_the_inflight_selection() {
        let mut session = QuizSession::start(user(), quiz(1, 10, 60));
        session.select_option(0).unwrap();

        let (breakdown, _save) = session.expire().unwrap();
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(breakdown.correct, 1);
        assert_eq!(breakdown.earned, 10);
        assert!(matches!(
            session.result().unwrap().reason,
            CompletionReason::TimedOut
        ));
    }

    #[test]
    fn tick_counts_down_and_reports_expiry_once() {
        let mut session = QuizSession::start(user(), quiz(1, 10, 3));
        assert_eq!(session.tick(), TickOutcome::Running(2));
        assert_eq!(session.tick(), TickOutcome::Running(1));
        assert_eq!(session.tick(), TickOutcome::Expired);

        session.expire().unwrap();
        assert_eq!(session.tick(), TickOutcome::Stopped);
    }

    #[test]
    fn retry_resets_progress_and_countdown() {
        let mut session = QuizSession::start(user(), quiz(2, 10, 60));
        session.select_option(0).unwrap();
        session.advance().unwrap();
        session.select_option(0).unwrap();
        session.advance().unwrap();
        assert_eq!(session.phase(), SessionPhase::Completed);

        session.retry().unwrap();
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().is_empty());
        assert_eq!(session.time_left(), 60);
        assert!(session.result().is_none());
    }

    #[test]
    fn exit_is_only_valid_while_running() {
        let mut session = QuizSession::start(user(), quiz(1, 10, 60));
        session.select_option(0).unwrap();
        session.advance().unwrap();
        assert!(matches!(
            session.exit(),
            Err(SessionError::Transition(_))
        ));
        session.try_another().unwrap();
        assert_eq!(session.phase(), SessionPhase::Selecting);
    }

    #[test]
    fn attempt_record_uses_the_clamped_score() {
        let mut session = QuizSession::start(user(), quiz(1, 10, 60));
        session.select_option(0).unwrap();
        let AdvanceOutcome::Completed { breakdown, .. } = session.advance().unwrap() else {
            panic!("expected completion");
        };

        let record = session.attempt_record(&breakdown);
        assert_eq!(record.score, 10);
        assert_eq!(record.quiz_id, session.quiz().id);
        assert_eq!(record.answers.len(), 1);
    }
}
