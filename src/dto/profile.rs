use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::AttemptEntity,
    dto::{auth::UserView, format_timestamp},
    services::gamification::BadgeEvaluation,
};

/// Badge as shown on the profile page.
#[derive(Debug, Serialize, ToSchema)]
pub struct BadgeDto {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
}

impl From<BadgeEvaluation> for BadgeDto {
    fn from(evaluation: BadgeEvaluation) -> Self {
        Self {
            slug: evaluation.rule.slug,
            name: evaluation.rule.name,
            description: evaluation.rule.description,
            icon: evaluation.rule.icon,
            unlocked: evaluation.unlocked,
        }
    }
}

/// Past attempt entry on the profile page.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttemptDto {
    pub quiz_id: Uuid,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<AttemptEntity> for AttemptDto {
    fn from(attempt: AttemptEntity) -> Self {
        Self {
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            completed_at: attempt.completed_at.map(format_timestamp),
        }
    }
}

/// Full profile projection combining user data, history and badges.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserView,
    pub ideas_submitted: usize,
    pub ideas_approved: usize,
    pub quizzes_completed: usize,
    pub attempts: Vec<AttemptDto>,
    pub badges: Vec<BadgeDto>,
}
