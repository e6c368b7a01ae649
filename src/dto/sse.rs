use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a user starts a quiz attempt.
pub struct QuizStartedEvent {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub time_limit_secs: u32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once per second while a countdown is running.
pub struct TimeTickEvent {
    pub user_id: Uuid,
    pub time_left: u32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an attempt reaches the completed phase.
pub struct QuizCompletedEvent {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: u32,
    pub percentage: u8,
    /// Whether the countdown ran out before the final confirmation.
    pub timed_out: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a completed attempt has been written to storage.
pub struct AttemptSavedEvent {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub new_point_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when persisting a completed attempt failed.
pub struct AttemptSaveFailedEvent {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
}
