//! Wire-level row shapes and their normalization into canonical entities.
//!
//! The hosted backend grew organically, so quiz rows may embed their
//! questions under either `quiz_questions` (relation name) or `questions`
//! (legacy column), and several fields are nullable. Everything is folded
//! into one canonical shape here, before any other layer sees the data.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::warn;
use uuid::Uuid;

use crate::dao::models::{
    AttemptEntity, IdeaEntity, IdeaPointEvent, IdeaStatus, QuestionEntity, QuizEntity, UserEntity,
    UserRole,
};

/// Raw `users` row as returned by the backend.
#[derive(Debug, Deserialize)]
pub struct RawUserRow {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
}

/// Raw question row, from either accepted embedding.
#[derive(Debug, Deserialize)]
pub struct RawQuestionRow {
    pub id: Uuid,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<i64>,
    #[serde(default)]
    pub points: Option<i64>,
}

/// Raw `quizzes` row with both accepted question embeddings.
#[derive(Debug, Deserialize)]
pub struct RawQuizRow {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_points: Option<i64>,
    #[serde(default)]
    pub time_limit: Option<i64>,
    #[serde(default)]
    pub quiz_questions: Option<Vec<RawQuestionRow>>,
    #[serde(default)]
    pub questions: Option<Vec<RawQuestionRow>>,
}

/// Raw `quiz_attempts` row.
#[derive(Debug, Deserialize)]
pub struct RawAttemptRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub answers: Option<IndexMap<Uuid, usize>>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Raw `ideas` row restricted to badge-aggregate fields.
#[derive(Debug, Deserialize)]
pub struct RawIdeaRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub status: Option<IdeaStatus>,
    #[serde(default)]
    pub points_awarded: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Raw projection used for trailing-window point aggregation.
#[derive(Debug, Deserialize)]
pub struct RawIdeaPointRow {
    pub user_id: Uuid,
    #[serde(default)]
    pub points_awarded: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Insert body for `quiz_attempts`.
#[derive(Debug, Serialize)]
pub struct NewAttemptBody {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: u32,
    pub answers: IndexMap<Uuid, usize>,
}

/// Patch body overwriting a user's point total.
#[derive(Debug, Serialize)]
pub struct UpdatePointsBody {
    pub points: i64,
}

/// Body of the `verify_user_password` RPC.
#[derive(Debug, Serialize)]
pub struct VerifyPasswordBody {
    pub p_email: String,
    pub p_password: String,
}

/// Body of the `create_user_with_password` RPC.
#[derive(Debug, Serialize)]
pub struct CreateUserBody {
    pub p_email: String,
    pub p_password: String,
    pub p_full_name: String,
    pub p_department: String,
    pub p_role: String,
}

impl From<RawUserRow> for UserEntity {
    fn from(row: RawUserRow) -> Self {
        Self {
            id: row.id,
            email: row.email.unwrap_or_default(),
            full_name: row.full_name.unwrap_or_default(),
            role: parse_role(row.role.as_deref()),
            department: row.department.unwrap_or_default(),
            points: row.points.unwrap_or(0),
        }
    }
}

impl RawQuestionRow {
    /// Normalize one question row, or drop it when it cannot be presented.
    fn into_entity(self) -> Option<QuestionEntity> {
        let options = self.options.unwrap_or_default();
        if options.len() < 2 {
            warn!(question_id = %self.id, "dropping question with fewer than two options");
            return None;
        }

        let correct_option = self
            .correct_answer
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < options.len());

        Some(QuestionEntity {
            id: self.id,
            prompt: self.question.unwrap_or_default(),
            options,
            correct_option,
            points: clamp_points(self.points),
        })
    }
}

impl From<RawQuizRow> for QuizEntity {
    fn from(row: RawQuizRow) -> Self {
        let questions = row
            .quiz_questions
            .or(row.questions)
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawQuestionRow::into_entity)
            .collect();

        Self {
            id: row.id,
            title: row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            questions,
            max_points: clamp_points(row.max_points),
            time_limit_secs: clamp_points(row.time_limit),
        }
    }
}

impl From<RawAttemptRow> for AttemptEntity {
    fn from(row: RawAttemptRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            quiz_id: row.quiz_id,
            score: clamp_points(row.score),
            answers: row.answers.unwrap_or_default(),
            completed_at: parse_timestamp(row.completed_at.as_deref()),
        }
    }
}

impl From<RawIdeaRow> for IdeaEntity {
    fn from(row: RawIdeaRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            status: row.status.unwrap_or(IdeaStatus::Pending),
            points_awarded: row.points_awarded.unwrap_or(0),
            created_at: parse_timestamp(row.created_at.as_deref())
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
        }
    }
}

impl From<RawIdeaPointRow> for IdeaPointEvent {
    fn from(row: RawIdeaPointRow) -> Self {
        Self {
            user_id: row.user_id,
            points_awarded: row.points_awarded.unwrap_or(0),
            created_at: parse_timestamp(row.created_at.as_deref())
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
        }
    }
}

/// Wire role string used by the user-creation RPC.
pub fn role_wire_name(role: UserRole) -> &'static str {
    match role {
        UserRole::Collaborator => "colaborador",
        UserRole::Manager => "gestor",
        UserRole::Executive => "executivo",
    }
}

fn parse_role(raw: Option<&str>) -> UserRole {
    match raw {
        Some("gestor") => UserRole::Manager,
        Some("executivo") => UserRole::Executive,
        _ => UserRole::Collaborator,
    }
}

fn clamp_points(raw: Option<i64>) -> u32 {
    raw.and_then(|value| u32::try_from(value).ok()).unwrap_or(0)
}

fn parse_timestamp(raw: Option<&str>) -> Option<OffsetDateTime> {
    let raw = raw?;
    match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(timestamp = raw, error = %err, "ignoring unparsable backend timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_json(questions_key: &str) -> String {
        format!(
            r#"{{
                "id": "00000000-0000-0000-0000-000000000001",
                "title": "Innovation basics",
                "description": "Warm-up",
                "max_points": 60,
                "time_limit": 300,
                "{questions_key}": [
                    {{
                        "id": "00000000-0000-0000-0000-000000000011",
                        "question": "Pick A",
                        "options": ["A", "B", "C"],
                        "correct_answer": 0,
                        "points": 10
                    }},
                    {{
                        "id": "00000000-0000-0000-0000-000000000012",
                        "question": "No key given",
                        "options": ["A", "B"],
                        "points": 20
                    }},
                    {{
                        "id": "00000000-0000-0000-0000-000000000013",
                        "question": "Single option",
                        "options": ["only"],
                        "correct_answer": 0,
                        "points": 30
                    }}
                ]
            }}"#
        )
    }

    #[test]
    fn quiz_normalizes_relation_embedding() {
        let raw: RawQuizRow = serde_json::from_str(&quiz_json("quiz_questions")).unwrap();
        let quiz = QuizEntity::from(raw);

        assert_eq!(quiz.max_points, 60);
        assert_eq!(quiz.time_limit_secs, 300);
        // The single-option question is dropped; the keyless one survives.
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.questions[0].correct_option, Some(0));
        assert_eq!(quiz.questions[1].correct_option, None);
        assert_eq!(quiz.questions[1].points, 20);
    }

    #[test]
    fn quiz_normalizes_legacy_column_embedding() {
        let raw: RawQuizRow = serde_json::from_str(&quiz_json("questions")).unwrap();
        let quiz = QuizEntity::from(raw);
        assert_eq!(quiz.questions.len(), 2);
    }

    #[test]
    fn out_of_range_correct_index_becomes_unanswerable() {
        let raw: RawQuestionRow = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000021",
                "question": "broken",
                "options": ["A", "B"],
                "correct_answer": 7,
                "points": 5
            }"#,
        )
        .unwrap();

        let question = raw.into_entity().unwrap();
        assert_eq!(question.correct_option, None);
    }

    #[test]
    fn user_row_defaults_missing_fields() {
        let raw: RawUserRow = serde_json::from_str(
            r#"{"id": "00000000-0000-0000-0000-000000000031", "role": "gestor"}"#,
        )
        .unwrap();

        let user = UserEntity::from(raw);
        assert_eq!(user.role, UserRole::Manager);
        assert_eq!(user.points, 0);
        assert!(user.full_name.is_empty());
    }

    #[test]
    fn attempt_row_tolerates_missing_answers_and_bad_timestamp() {
        let raw: RawAttemptRow = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000041",
                "user_id": "00000000-0000-0000-0000-000000000042",
                "quiz_id": "00000000-0000-0000-0000-000000000043",
                "score": 40,
                "completed_at": "not-a-date"
            }"#,
        )
        .unwrap();

        let attempt = AttemptEntity::from(raw);
        assert_eq!(attempt.score, 40);
        assert!(attempt.answers.is_empty());
        assert!(attempt.completed_at.is_none());
    }
}
