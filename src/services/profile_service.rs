use uuid::Uuid;

use crate::{
    dao::models::IdeaStatus,
    dto::profile::ProfileResponse,
    error::ServiceError,
    services::{
        gamification::{self, ActivityAggregates},
        ranking_service::{self, RankingScope},
    },
    state::SharedState,
};

/// Assemble the profile page payload: user record, quiz history, idea
/// counters and the evaluated badge catalogue.
pub async fn profile(state: &SharedState, user_id: Uuid) -> Result<ProfileResponse, ServiceError> {
    let store = state.require_portal_store().await?;

    let user = store
        .fetch_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))?;
    let attempts = store.fetch_attempts_by_user(user_id).await?;
    let ideas = store.fetch_ideas_by_user(user_id).await?;
    let rank_position = ranking_service::user_position(state, user_id, RankingScope::AllTime).await?;

    let approved = ideas
        .iter()
        .filter(|idea| idea.status == IdeaStatus::Approved)
        .count();
    let aggregates = ActivityAggregates {
        idea_count: ideas.len() as u32,
        approved_idea_count: approved as u32,
        completed_quiz_count: attempts.len() as u32,
        rank_position,
    };
    let badges = gamification::evaluate(state.config().badges(), &aggregates);

    Ok(ProfileResponse {
        user: user.into(),
        ideas_submitted: ideas.len(),
        ideas_approved: approved,
        quizzes_completed: attempts.len(),
        attempts: attempts.into_iter().map(Into::into).collect(),
        badges: badges.into_iter().map(Into::into).collect(),
    })
}
