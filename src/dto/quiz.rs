use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::QuizEntity,
    state::{
        session::{CompletedAttempt, CompletionReason, QuizSession, SaveState},
        state_machine::SessionPhase,
    },
};

/// Payload used to start a quiz attempt.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
}

/// Payload highlighting an option on the current question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectOptionRequest {
    /// Zero-based option index.
    pub option: usize,
}

/// Catalogue entry returned by the quiz listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub max_points: u32,
    pub time_limit_secs: u32,
}

impl From<QuizEntity> for QuizSummary {
    fn from(quiz: QuizEntity) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            question_count: quiz.questions.len(),
            max_points: quiz.max_points,
            time_limit_secs: quiz.time_limit_secs,
        }
    }
}

/// Question as presented to the client; the correct option never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
    /// Zero-based position inside the quiz.
    pub index: usize,
    pub total: usize,
}

/// Graded outcome shown on the results screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultView {
    /// Awarded score, clamped to the quiz ceiling.
    pub score: u32,
    pub display_max: u32,
    pub correct: usize,
    pub incorrect: usize,
    pub percentage: u8,
    pub timed_out: bool,
    /// Persistence progress: `pending`, `saved` or `failed`.
    pub save_state: String,
}

impl From<&CompletedAttempt> for ResultView {
    fn from(result: &CompletedAttempt) -> Self {
        let save_state = match *result.save.borrow() {
            SaveState::Pending => "pending",
            SaveState::Saved => "saved",
            SaveState::Failed => "failed",
        };
        Self {
            score: result.breakdown.awarded(),
            display_max: result.breakdown.display_max,
            correct: result.breakdown.correct,
            incorrect: result.breakdown.incorrect,
            percentage: result.breakdown.percentage,
            timed_out: result.reason == CompletionReason::TimedOut,
            save_state: save_state.to_string(),
        }
    }
}

/// Full projection of one user's session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub phase: SessionPhase,
    /// Question currently presented, while the attempt is running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    /// Highlighted but unconfirmed option on the current question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
    pub answered_count: usize,
    pub time_left: u32,
    /// Graded outcome, once the attempt completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
}

impl From<&QuizSession> for SessionView {
    fn from(session: &QuizSession) -> Self {
        let total = session.quiz().questions.len();
        let question = session.current_question().map(|question| QuestionView {
            id: question.id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            index: session.current_index(),
            total,
        });

        Self {
            user_id: session.user_id(),
            quiz_id: session.quiz().id,
            phase: session.phase(),
            question,
            selected: session.selected(),
            answered_count: session.answers().len(),
            time_left: session.time_left(),
            result: session.result().map(Into::into),
        }
    }
}
