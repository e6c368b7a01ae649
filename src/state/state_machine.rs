//! Quiz session lifecycle as a closed transition table.
//!
//! Every phase change goes through [`compute_transition`]; callers apply the
//! returned phase only after the transition is accepted, so a session can
//! never end up in a phase the table does not produce.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Phase of one user's quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No attempt in flight; the user is browsing the quiz catalogue.
    Selecting,
    /// An attempt is running and the countdown is live.
    Active,
    /// The attempt finished; results are displayed.
    Completed,
}

/// Event that can drive a session from one phase to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Begin an attempt on a chosen quiz.
    Start,
    /// Confirm the current answer and move on.
    Advance {
        /// Whether the confirmed question was the last one.
        last_question: bool,
    },
    /// The countdown reached zero.
    TimeExpired,
    /// Abandon the running attempt.
    Exit,
    /// Restart the same quiz from the results screen.
    Retry,
    /// Leave the results screen to pick a different quiz.
    TryAnother,
}

/// Rejected phase/event combination.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("event {event:?} is not valid in phase {phase:?}")]
pub struct InvalidTransition {
    /// Phase the session was in.
    pub phase: SessionPhase,
    /// Event that was rejected.
    pub event: SessionEvent,
}

/// Resolve the next phase for an event, or reject the combination.
pub fn compute_transition(
    phase: SessionPhase,
    event: SessionEvent,
) -> Result<SessionPhase, InvalidTransition> {
    use SessionEvent as E;
    use SessionPhase as P;

    match (phase, event) {
        (P::Selecting, E::Start) => Ok(P::Active),
        (P::Active, E::Advance { last_question: false }) => Ok(P::Active),
        (P::Active, E::Advance { last_question: true }) => Ok(P::Completed),
        (P::Active, E::TimeExpired) => Ok(P::Completed),
        (P::Active, E::Exit) => Ok(P::Selecting),
        (P::Completed, E::Retry) => Ok(P::Active),
        (P::Completed, E::Start) => Ok(P::Active),
        (P::Completed, E::TryAnother) => Ok(P::Selecting),
        (phase, event) => Err(InvalidTransition { phase, event }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_only_from_rest_phases() {
        assert_eq!(
            compute_transition(SessionPhase::Selecting, SessionEvent::Start),
            Ok(SessionPhase::Active)
        );
        assert_eq!(
            compute_transition(SessionPhase::Completed, SessionEvent::Start),
            Ok(SessionPhase::Active)
        );
        assert!(compute_transition(SessionPhase::Active, SessionEvent::Start).is_err());
    }

    #[test]
    fn advance_stays_active_until_last_question() {
        assert_eq!(
            compute_transition(
                SessionPhase::Active,
                SessionEvent::Advance {
                    last_question: false
                }
            ),
            Ok(SessionPhase::Active)
        );
        assert_eq!(
            compute_transition(
                SessionPhase::Active,
                SessionEvent::Advance {
                    last_question: true
                }
            ),
            Ok(SessionPhase::Completed)
        );
    }

    #[test]
    fn expiry_and_exit_only_apply_to_running_attempts() {
        assert_eq!(
            compute_transition(SessionPhase::Active, SessionEvent::TimeExpired),
            Ok(SessionPhase::Completed)
        );
        assert_eq!(
            compute_transition(SessionPhase::Active, SessionEvent::Exit),
            Ok(SessionPhase::Selecting)
        );
        assert!(compute_transition(SessionPhase::Selecting, SessionEvent::TimeExpired).is_err());
        assert!(compute_transition(SessionPhase::Completed, SessionEvent::Exit).is_err());
    }

    #[test]
    fn results_screen_offers_retry_and_try_another() {
        assert_eq!(
            compute_transition(SessionPhase::Completed, SessionEvent::Retry),
            Ok(SessionPhase::Active)
        );
        assert_eq!(
            compute_transition(SessionPhase::Completed, SessionEvent::TryAnother),
            Ok(SessionPhase::Selecting)
        );
        assert!(compute_transition(SessionPhase::Selecting, SessionEvent::Retry).is_err());
    }

    #[test]
    fn rejected_transition_reports_the_pair() {
        let err = compute_transition(SessionPhase::Selecting, SessionEvent::Exit).unwrap_err();
        assert_eq!(err.phase, SessionPhase::Selecting);
        assert_eq!(err.event, SessionEvent::Exit);
    }
}
