//! Quiz catalogue, session lifecycle and the per-session countdown.

use std::sync::{Arc, Weak};

use tokio::{
    sync::Mutex,
    time::{self, Duration, MissedTickBehavior},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::NewAttempt,
    dto::{
        quiz::{QuizSummary, SessionView},
        sse::{
            AttemptSaveFailedEvent, AttemptSavedEvent, QuizCompletedEvent, QuizStartedEvent,
            TimeTickEvent,
        },
    },
    error::ServiceError,
    scoring::ScoreBreakdown,
    services::sse_service,
    state::{
        SessionSlot, SharedState,
        session::{AdvanceOutcome, QuizSession, SaveState, TickOutcome},
        state_machine::SessionPhase,
    },
};

/// List the quiz catalogue.
pub async fn list_quizzes(state: &SharedState) -> Result<Vec<QuizSummary>, ServiceError> {
    let store = state.require_portal_store().await?;
    let quizzes = store.fetch_quizzes().await?;
    Ok(quizzes.into_iter().map(Into::into).collect())
}

/// Start an attempt for a user, replacing a finished session but refusing to
/// interrupt a running one.
pub async fn start_session(
    state: &SharedState,
    user_id: Uuid,
    quiz_id: Uuid,
) -> Result<SessionView, ServiceError> {
    // Fast path; the authoritative check happens inside `install_session`,
    // which rejects racing starts atomically.
    if let Some(existing) = state.session(user_id) {
        let slot = existing.lock().await;
        if slot.session.phase() == SessionPhase::Active {
            return Err(ServiceError::InvalidState(
                "an attempt is already running for this user".into(),
            ));
        }
    }

    let store = state.require_portal_store().await?;
    let quiz = store
        .fetch_quiz(quiz_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz {quiz_id}")))?;
    if quiz.questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "quiz has no presentable questions".into(),
        ));
    }

    let time_limit = quiz.time_limit_secs;
    let session = QuizSession::start(user_id, quiz);
    let view = SessionView::from(&session);
    let slot = Arc::new(Mutex::new(SessionSlot::new(session)));

    state.install_session(user_id, slot.clone())?;
    arm_countdown(state, &slot, user_id).await;

    info!(%user_id, %quiz_id, time_limit, "quiz attempt started");
    sse_service::broadcast_json(
        state.events(),
        "quiz_started",
        &QuizStartedEvent {
            user_id,
            quiz_id,
            time_limit_secs: time_limit,
        },
    );

    Ok(view)
}

/// Highlight an option on the current question.
pub async fn select_option(
    state: &SharedState,
    user_id: Uuid,
    option: usize,
) -> Result<SessionView, ServiceError> {
    let slot = require_session(state, user_id)?;
    let mut slot = slot.lock().await;
    slot.session.select_option(option)?;
    Ok(SessionView::from(&slot.session))
}

/// Confirm the highlighted option; completes and persists the attempt when
/// the final question was confirmed.
pub async fn advance(state: &SharedState, user_id: Uuid) -> Result<SessionView, ServiceError> {
    let slot = require_session(state, user_id)?;
    let mut slot = slot.lock().await;
    match slot.session.advance()? {
        AdvanceOutcome::Next(_) => {}
        AdvanceOutcome::Completed { breakdown, save } => {
            slot.cancel_timer();
            finalize_completion(state, &slot.session, breakdown, save, false);
        }
    }
    Ok(SessionView::from(&slot.session))
}

/// Leave the session: abandon a running attempt, or clear a finished one.
pub async fn exit_session(state: &SharedState, user_id: Uuid) -> Result<(), ServiceError> {
    let slot = require_session(state, user_id)?;
    {
        let mut slot = slot.lock().await;
        match slot.session.phase() {
            SessionPhase::Active => slot.session.exit()?,
            SessionPhase::Completed => slot.session.try_another()?,
            SessionPhase::Selecting => {}
        }
        slot.cancel_timer();
    }
    state.remove_session(user_id);
    info!(%user_id, "quiz session cleared");
    Ok(())
}

/// Restart the same quiz from the results screen.
pub async fn retry(state: &SharedState, user_id: Uuid) -> Result<SessionView, ServiceError> {
    let slot = require_session(state, user_id)?;
    let view = {
        let mut guard = slot.lock().await;
        guard.session.retry()?;
        SessionView::from(&guard.session)
    };
    arm_countdown(state, &slot, user_id).await;

    let quiz_id = view.quiz_id;
    info!(%user_id, %quiz_id, "quiz attempt restarted");
    sse_service::broadcast_json(
        state.events(),
        "quiz_started",
        &QuizStartedEvent {
            user_id,
            quiz_id,
            time_limit_secs: view.time_left,
        },
    );
    Ok(view)
}

/// Current projection of a user's session.
pub async fn session_view(state: &SharedState, user_id: Uuid) -> Result<SessionView, ServiceError> {
    let slot = require_session(state, user_id)?;
    let slot = slot.lock().await;
    Ok(SessionView::from(&slot.session))
}

fn require_session(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Arc<Mutex<SessionSlot>>, ServiceError> {
    state
        .session(user_id)
        .ok_or_else(|| ServiceError::NotFound(format!("no session for user {user_id}")))
}

/// Spawn the one-second countdown task for a slot.
///
/// A quiz with no time limit runs untimed; nothing is armed. The task holds
/// only a weak handle to the slot so a removed session tears its timer down
/// even if the abort never runs.
async fn arm_countdown(state: &SharedState, slot: &Arc<Mutex<SessionSlot>>, user_id: Uuid) {
    let time_limit = {
        let guard = slot.lock().await;
        guard.session.time_left()
    };
    if time_limit == 0 {
        return;
    }

    let handle = tokio::spawn(run_countdown(
        state.clone(),
        Arc::downgrade(slot),
        user_id,
    ));
    let mut guard = slot.lock().await;
    guard.arm_timer(handle);
}

async fn run_countdown(state: SharedState, slot: Weak<Mutex<SessionSlot>>, user_id: Uuid) {
    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(slot) = slot.upgrade() else {
            break;
        };
        let mut slot = slot.lock().await;

        match slot.session.tick() {
            TickOutcome::Running(time_left) => {
                sse_service::broadcast_json(
                    state.events(),
                    "time_tick",
                    &TimeTickEvent { user_id, time_left },
                );
            }
            TickOutcome::Expired => {
                match slot.session.expire() {
                    Ok((breakdown, save)) => {
                        info!(%user_id, "quiz attempt timed out");
                        finalize_completion(&state, &slot.session, breakdown, save, true);
                    }
                    Err(err) => {
                        warn!(%user_id, error = %err, "countdown expiry raced a transition");
                    }
                }
                break;
            }
            TickOutcome::Stopped => break,
        }
    }
}

/// Broadcast the completion and kick off detached persistence.
///
/// Persistence never blocks the results screen: the outcome flows back
/// through the session's save-state channel.
fn finalize_completion(
    state: &SharedState,
    session: &QuizSession,
    breakdown: ScoreBreakdown,
    save: tokio::sync::watch::Sender<SaveState>,
    timed_out: bool,
) {
    let user_id = session.user_id();
    let quiz_id = session.quiz().id;

    sse_service::broadcast_json(
        state.events(),
        "quiz_completed",
        &QuizCompletedEvent {
            user_id,
            quiz_id,
            score: breakdown.awarded(),
            percentage: breakdown.percentage,
            timed_out,
        },
    );

    let record = session.attempt_record(&breakdown);
    tokio::spawn(persist_attempt(state.clone(), record, save));
}

async fn persist_attempt(
    state: SharedState,
    record: NewAttempt,
    save: tokio::sync::watch::Sender<SaveState>,
) {
    let user_id = record.user_id;
    let quiz_id = record.quiz_id;
    let score = record.score;

    let outcome = async {
        let store = state.require_portal_store().await?;
        store.create_attempt(record).await?;
        let user = store
            .fetch_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))?;
        let updated = store
            .update_user_points(user_id, user.points + i64::from(score))
            .await?;
        Ok::<i64, ServiceError>(updated.points)
    }
    .await;

    match outcome {
        Ok(new_point_total) => {
            let _ = save.send(SaveState::Saved);
            info!(%user_id, %quiz_id, score, new_point_total, "quiz attempt persisted");
            sse_service::broadcast_json(
                state.events(),
                "attempt_saved",
                &AttemptSavedEvent {
                    user_id,
                    quiz_id,
                    new_point_total,
                },
            );
        }
        Err(err) => {
            let _ = save.send(SaveState::Failed);
            warn!(%user_id, %quiz_id, error = %err, "failed to persist quiz attempt");
            sse_service::broadcast_json(
                state.events(),
                "attempt_save_failed",
                &AttemptSaveFailedEvent { user_id, quiz_id },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{
                AttemptEntity, IdeaEntity, IdeaPointEvent, NewUser, QuestionEntity, QuizEntity,
                UserEntity, UserRole,
            },
            portal_store::PortalStore,
            storage::StorageResult,
        },
        state::AppState,
    };

    /// Store serving a fixed quiz catalogue out of memory.
    struct FixedStore {
        quizzes: Vec<QuizEntity>,
    }

    impl FixedStore {
        fn user(id: Uuid, points: i64) -> UserEntity {
            UserEntity {
                id,
                email: String::new(),
                full_name: String::new(),
                role: UserRole::Collaborator,
                department: String::new(),
                points,
            }
        }
    }

    impl PortalStore for FixedStore {
        fn fetch_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizEntity>>> {
            let quizzes = self.quizzes.clone();
            Box::pin(async move { Ok(quizzes) })
        }

        fn fetch_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
            let quiz = self.quizzes.iter().find(|quiz| quiz.id == id).cloned();
            Box::pin(async move { Ok(quiz) })
        }

        fn fetch_user(&self, _id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
            Box::pin(async move { Ok(None) })
        }

        fn fetch_ranking(
            &self,
            _limit: usize,
        ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn fetch_attempts_by_user(
            &self,
            _user_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<AttemptEntity>>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn fetch_ideas_by_user(
            &self,
            _user_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<IdeaEntity>>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn fetch_ideas_since(
            &self,
            _days: u32,
        ) -> BoxFuture<'static, StorageResult<Vec<IdeaPointEvent>>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn create_attempt(
            &self,
            attempt: NewAttempt,
        ) -> BoxFuture<'static, StorageResult<AttemptEntity>> {
            Box::pin(async move {
                Ok(AttemptEntity {
                    id: Uuid::new_v4(),
                    user_id: attempt.user_id,
                    quiz_id: attempt.quiz_id,
                    score: attempt.score,
                    answers: attempt.answers,
                    completed_at: None,
                })
            })
        }

        fn update_user_points(
            &self,
            user_id: Uuid,
            new_total: i64,
        ) -> BoxFuture<'static, StorageResult<UserEntity>> {
            Box::pin(async move { Ok(Self::user(user_id, new_total)) })
        }

        fn verify_password(
            &self,
            _email: String,
            _password: String,
        ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
            Box::pin(async move { Ok(None) })
        }

        fn register_user(
            &self,
            _registration: NewUser,
        ) -> BoxFuture<'static, StorageResult<UserEntity>> {
            Box::pin(async move { Ok(Self::user(Uuid::new_v4(), 0)) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async move { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async move { Ok(()) })
        }
    }

    fn sample_quiz(question_count: usize) -> QuizEntity {
        let questions = (0..question_count)
            .map(|i| QuestionEntity {
                id: Uuid::from_u128(i as u128 + 1),
                prompt: format!("q{i}"),
                options: vec!["A".into(), "B".into()],
                correct_option: Some(0),
                points: 10,
            })
            .collect();
        QuizEntity {
            id: Uuid::from_u128(0xAA),
            title: "sample".into(),
            description: String::new(),
            questions,
            max_points: 10 * question_count as u32,
            time_limit_secs: 30,
        }
    }

    async fn state_with(quizzes: Vec<QuizEntity>) -> SharedState {
        let state = AppState::new(AppConfig::default());
        state.install_portal_store(Arc::new(FixedStore { quizzes })).await;
        state
    }

    #[tokio::test]
    async fn start_rejects_an_unknown_quiz() {
        let state = state_with(vec![sample_quiz(2)]).await;
        let user_id = Uuid::from_u128(0xBB);

        let err = start_session(&state, user_id, Uuid::from_u128(0xFF))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(state.session(user_id).is_none());
    }

    #[tokio::test]
    async fn start_rejects_a_quiz_without_questions() {
        let state = state_with(vec![sample_quiz(0)]).await;
        let user_id = Uuid::from_u128(0xBB);

        let err = start_session(&state, user_id, Uuid::from_u128(0xAA))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(state.session(user_id).is_none());
    }

    #[tokio::test]
    async fn start_refuses_to_interrupt_a_running_attempt() {
        let state = state_with(vec![sample_quiz(2)]).await;
        let user_id = Uuid::from_u128(0xBB);
        let quiz_id = Uuid::from_u128(0xAA);

        start_session(&state, user_id, quiz_id).await.unwrap();
        let err = start_session(&state, user_id, quiz_id).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)));
        let slot = state.session(user_id).unwrap();
        let guard = slot.lock().await;
        assert_eq!(guard.session.phase(), SessionPhase::Active);
        assert_eq!(guard.session.current_index(), 0);
    }
}
