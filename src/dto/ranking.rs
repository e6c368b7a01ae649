use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::services::ranking_service::{DepartmentStats, LeaderboardEntry, RankingScope};

/// Query parameters accepted by the ranking endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RankingQuery {
    /// Ranking window; defaults to the all-time ranking.
    #[serde(default)]
    pub scope: Option<RankingScope>,
    /// Restrict entries to one department.
    #[serde(default)]
    pub department: Option<String>,
    /// Maximum number of entries to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One row of the leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntryDto {
    /// Competition rank; users with equal points share a rank.
    pub position: u32,
    pub user_id: Uuid,
    pub full_name: String,
    pub department: String,
    /// Points inside the requested window.
    pub points: i64,
}

impl From<LeaderboardEntry> for LeaderboardEntryDto {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            position: entry.position,
            user_id: entry.user.id,
            full_name: entry.user.full_name,
            department: entry.user.department,
            points: entry.points,
        }
    }
}

/// Aggregated engagement numbers for one department.
#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentStatsDto {
    pub department: String,
    pub member_count: usize,
    pub total_points: i64,
    /// Average points per member, rounded to the nearest integer.
    pub average_points: i64,
}

impl From<DepartmentStats> for DepartmentStatsDto {
    fn from(stats: DepartmentStats) -> Self {
        Self {
            department: stats.department,
            member_count: stats.member_count,
            total_points: stats.total_points,
            average_points: stats.average_points,
        }
    }
}

/// Leaderboard returned by the ranking endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingResponse {
    pub scope: RankingScope,
    pub entries: Vec<LeaderboardEntryDto>,
    pub department_stats: Vec<DepartmentStatsDto>,
}

/// A single user's position inside a ranking window.
#[derive(Debug, Serialize, ToSchema)]
pub struct PositionResponse {
    pub user_id: Uuid,
    pub scope: RankingScope,
    /// Competition rank; zero means the user is not ranked in the window.
    pub position: u32,
}
