pub mod session;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::{
    sync::{Mutex, RwLock, watch},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{config::AppConfig, dao::portal_store::PortalStore, error::ServiceError};

pub use self::sse::SseHub;
use self::{session::QuizSession, state_machine::SessionPhase};

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

const SSE_CHANNEL_CAPACITY: usize = 16;

/// A live session together with its countdown task.
pub struct SessionSlot {
    /// The session itself.
    pub session: QuizSession,
    timer: Option<JoinHandle<()>>,
}

impl SessionSlot {
    /// Wrap a freshly started session; the countdown is armed separately.
    pub fn new(session: QuizSession) -> Self {
        Self {
            session,
            timer: None,
        }
    }

    /// Install the countdown task handle, aborting any previous one.
    pub fn arm_timer(&mut self, handle: JoinHandle<()>) {
        self.cancel_timer();
        self.timer = Some(handle);
    }

    /// Abort the countdown task, if one is running.
    pub fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Central application state storing live sessions, the storage handle and
/// the event fan-out.
pub struct AppState {
    config: AppConfig,
    portal_store: RwLock<Option<Arc<dyn PortalStore>>>,
    sessions: DashMap<Uuid, Arc<Mutex<SessionSlot>>>,
    events: SseHub,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            portal_store: RwLock::new(None),
            sessions: DashMap::new(),
            events: SseHub::new(SSE_CHANNEL_CAPACITY),
            degraded: degraded_tx,
        })
    }

    /// Static application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current portal store, if one is installed.
    pub async fn portal_store(&self) -> Option<Arc<dyn PortalStore>> {
        let guard = self.portal_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the portal store or fail with a degraded-mode error.
    pub async fn require_portal_store(&self) -> Result<Arc<dyn PortalStore>, ServiceError> {
        self.portal_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new portal store implementation and leave degraded mode.
    pub async fn install_portal_store(&self, store: Arc<dyn PortalStore>) {
        {
            let mut guard = self.portal_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current portal store and enter degraded mode.
    pub async fn clear_portal_store(&self) {
        {
            let mut guard = self.portal_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.portal_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }

    /// Look up the live session slot for a user.
    pub fn session(&self, user_id: Uuid) -> Option<Arc<Mutex<SessionSlot>>> {
        self.sessions.get(&user_id).map(|entry| entry.clone())
    }

    /// Atomically install a session slot for a user.
    ///
    /// A finished session is replaced; a running attempt is never
    /// interrupted. The phase check and the insert happen under the map
    /// entry, so two racing starts cannot both succeed. The replaced slot's
    /// countdown is aborted by its [`Drop`] impl once the last handle goes
    /// away.
    pub fn install_session(
        &self,
        user_id: Uuid,
        slot: Arc<Mutex<SessionSlot>>,
    ) -> Result<(), ServiceError> {
        match self.sessions.entry(user_id) {
            Entry::Occupied(mut occupied) => {
                // try_lock: the entry guard must not be held across an await.
                // A contended lock means another request is mutating this
                // session right now, which also rules out replacing it.
                let guard = occupied.get().try_lock().map_err(|_| {
                    ServiceError::InvalidState(
                        "an attempt is already running for this user".into(),
                    )
                })?;
                if guard.session.phase() == SessionPhase::Active {
                    return Err(ServiceError::InvalidState(
                        "an attempt is already running for this user".into(),
                    ));
                }
                drop(guard);
                occupied.insert(slot);
                Ok(())
            }
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
                Ok(())
            }
        }
    }

    /// Remove a user's session slot, returning it when one existed.
    pub fn remove_session(&self, user_id: Uuid) -> Option<Arc<Mutex<SessionSlot>>> {
        self.sessions.remove(&user_id).map(|(_, slot)| slot)
    }

    /// Update and broadcast the degraded flag when the value changes.
    async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::models::{QuestionEntity, QuizEntity},
        state::session::AdvanceOutcome,
    };

    fn one_question_quiz() -> QuizEntity {
        QuizEntity {
            id: Uuid::from_u128(0xAA),
            title: "sample".into(),
            description: String::new(),
            questions: vec![QuestionEntity {
                id: Uuid::from_u128(1),
                prompt: "q0".into(),
                options: vec!["A".into(), "B".into()],
                correct_option: Some(0),
                points: 10,
            }],
            max_points: 10,
            time_limit_secs: 0,
        }
    }

    fn slot_for(session: QuizSession) -> Arc<Mutex<SessionSlot>> {
        Arc::new(Mutex::new(SessionSlot::new(session)))
    }

    #[test]
    fn install_rejects_a_second_running_attempt() {
        let state = AppState::new(AppConfig::default());
        let user_id = Uuid::from_u128(1);

        state
            .install_session(
                user_id,
                slot_for(QuizSession::start(user_id, one_question_quiz())),
            )
            .unwrap();
        let err = state
            .install_session(
                user_id,
                slot_for(QuizSession::start(user_id, one_question_quiz())),
            )
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn install_replaces_a_finished_session() {
        let state = AppState::new(AppConfig::default());
        let user_id = Uuid::from_u128(2);

        let mut finished = QuizSession::start(user_id, one_question_quiz());
        finished.select_option(0).unwrap();
        assert!(matches!(
            finished.advance().unwrap(),
            AdvanceOutcome::Completed { .. }
        ));
        state.install_session(user_id, slot_for(finished)).unwrap();

        state
            .install_session(
                user_id,
                slot_for(QuizSession::start(user_id, one_question_quiz())),
            )
            .unwrap();

        let slot = state.session(user_id).unwrap();
        let guard = slot.try_lock().unwrap();
        assert_eq!(guard.session.phase(), SessionPhase::Active);
    }
}
