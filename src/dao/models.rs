use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role assigned to a portal user, mirroring the backend `role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    /// Regular employee submitting ideas and taking quizzes.
    #[serde(rename = "colaborador")]
    Collaborator,
    /// Manager reviewing ideas and running projects.
    #[serde(rename = "gestor")]
    Manager,
    /// Executive with portal-wide visibility.
    #[serde(rename = "executivo")]
    Executive,
}

/// Portal user as stored in the backend `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Corporate e-mail address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Portal role.
    pub role: UserRole,
    /// Department the user belongs to.
    pub department: String,
    /// All-time engagement point total.
    pub points: i64,
}

/// Single quiz question after gateway normalization.
///
/// Guaranteed by the normalization step: at least two options and a
/// non-negative point value. A missing or out-of-range correct index on the
/// wire becomes `None`, which the scoring engine treats as never-correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Primary key of the question.
    pub id: Uuid,
    /// Prompt text shown to the user.
    pub prompt: String,
    /// Ordered option strings.
    pub options: Vec<String>,
    /// Zero-based index of the correct option, when the backend supplied one.
    pub correct_option: Option<usize>,
    /// Points awarded for a correct answer.
    pub points: u32,
}

/// Quiz definition with its ordered question sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizEntity {
    /// Primary key of the quiz.
    pub id: Uuid,
    /// Quiz title.
    pub title: String,
    /// Short description shown on the selection screen.
    pub description: String,
    /// Ordered questions; the sequence order drives presentation.
    pub questions: Vec<QuestionEntity>,
    /// Authoritative display ceiling; may differ from the question point sum.
    pub max_points: u32,
    /// Time limit for one attempt, in seconds.
    pub time_limit_secs: u32,
}

/// Completed quiz attempt persisted by the backend. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptEntity {
    /// Primary key of the attempt record.
    pub id: Uuid,
    /// User who took the quiz.
    pub user_id: Uuid,
    /// Quiz that was taken.
    pub quiz_id: Uuid,
    /// Final score, already clamped to the quiz ceiling.
    pub score: u32,
    /// Question identifier to selected option index mapping.
    pub answers: IndexMap<Uuid, usize>,
    /// Completion timestamp, when the backend reported one.
    pub completed_at: Option<OffsetDateTime>,
}

/// Payload for creating a new attempt record.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    /// User who took the quiz.
    pub user_id: Uuid,
    /// Quiz that was taken.
    pub quiz_id: Uuid,
    /// Final score, clamped to the quiz ceiling.
    pub score: u32,
    /// Full answer mapping at completion.
    pub answers: IndexMap<Uuid, usize>,
}

/// Review status of a submitted idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdeaStatus {
    /// Awaiting manager review.
    #[serde(rename = "pendente")]
    Pending,
    /// Approved and point-bearing.
    #[serde(rename = "aprovado")]
    Approved,
    /// Rejected by a reviewer.
    #[serde(rename = "rejeitado")]
    Rejected,
}

/// Idea record as needed for badge aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaEntity {
    /// Primary key of the idea.
    pub id: Uuid,
    /// Submitting user.
    pub user_id: Uuid,
    /// Review status.
    pub status: IdeaStatus,
    /// Points granted on approval.
    pub points_awarded: i64,
    /// Submission timestamp.
    pub created_at: OffsetDateTime,
}

/// Point-bearing idea event inside a trailing ranking window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaPointEvent {
    /// User credited with the points.
    pub user_id: Uuid,
    /// Points granted for the idea.
    pub points_awarded: i64,
    /// Event timestamp.
    pub created_at: OffsetDateTime,
}

/// Registration payload forwarded to the backend user-creation RPC.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Corporate e-mail address; domain validation happens server-side.
    pub email: String,
    /// Plain password; hashing happens server-side.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Department the user belongs to.
    pub department: String,
    /// Requested role; the backend defaults to collaborator when absent.
    pub role: Option<UserRole>,
}
