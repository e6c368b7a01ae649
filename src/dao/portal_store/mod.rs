pub mod rest;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    AttemptEntity, IdeaEntity, IdeaPointEvent, NewAttempt, NewUser, QuizEntity, UserEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the hosted relational backend holding all portal data.
///
/// Every read returns the canonical entity shapes from [`crate::dao::models`];
/// the wire-level normalization happens inside each implementation so neither
/// the scoring engine nor the session state machine ever sees a raw row.
pub trait PortalStore: Send + Sync {
    /// List every quiz with its embedded, ordered question sequence.
    fn fetch_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizEntity>>>;
    /// Fetch a single quiz by identifier.
    fn fetch_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>>;
    /// Fetch a single user by identifier.
    fn fetch_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Users sorted descending by all-time points, capped at `limit`.
    fn fetch_ranking(&self, limit: usize) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Completed attempts of one user, most recent first.
    fn fetch_attempts_by_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AttemptEntity>>>;
    /// Ideas submitted by one user, for badge aggregates.
    fn fetch_ideas_by_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<IdeaEntity>>>;
    /// Point-bearing idea events inside the trailing window of `days` days.
    fn fetch_ideas_since(
        &self,
        days: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<IdeaPointEvent>>>;
    /// Persist a completed attempt; the record is immutable afterwards.
    fn create_attempt(
        &self,
        attempt: NewAttempt,
    ) -> BoxFuture<'static, StorageResult<AttemptEntity>>;
    /// Overwrite a user's point total. The caller computes `new_total`;
    /// no server-side atomic increment is assumed.
    fn update_user_points(
        &self,
        user_id: Uuid,
        new_total: i64,
    ) -> BoxFuture<'static, StorageResult<UserEntity>>;
    /// Server-side credential check; `None` means the credentials were rejected.
    fn verify_password(
        &self,
        email: String,
        password: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Server-side user creation (domain validation and password hashing
    /// happen in the backend RPC).
    fn register_user(&self, registration: NewUser)
    -> BoxFuture<'static, StorageResult<UserEntity>>;
    /// Cheap reachability probe used by the supervisor and healthcheck.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish connectivity after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
