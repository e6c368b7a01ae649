//! Leaderboard assembly over all-time and trailing-window point totals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::UserEntity, error::ServiceError, state::SharedState};

/// How many users to pull from storage when no explicit limit is given.
const DEFAULT_LIMIT: usize = 50;
/// Hard cap on one leaderboard response.
const MAX_LIMIT: usize = 200;
/// How many users to consider when resolving a single position.
const POSITION_FETCH_LIMIT: usize = 500;

/// Ranking window selected by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingScope {
    /// All-time point totals.
    #[default]
    AllTime,
    /// Points earned in the trailing seven days.
    Weekly,
    /// Points earned in the trailing thirty days.
    Monthly,
}

impl RankingScope {
    /// Trailing window length, when the scope is not all-time.
    fn window_days(self) -> Option<u32> {
        match self {
            RankingScope::AllTime => None,
            RankingScope::Weekly => Some(7),
            RankingScope::Monthly => Some(30),
        }
    }
}

/// One ranked user inside a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// The ranked user.
    pub user: UserEntity,
    /// Competition rank; users with equal points share a rank and the
    /// following rank is skipped accordingly.
    pub position: u32,
    /// Points inside the requested window.
    pub points: i64,
}

/// Aggregated engagement numbers for one department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentStats {
    /// Department name.
    pub department: String,
    /// Users counted into the aggregate.
    pub member_count: usize,
    /// Sum of the members' window points.
    pub total_points: i64,
    /// Average points per member, rounded to the nearest integer.
    pub average_points: i64,
}

/// Build the leaderboard and department aggregates for a scope.
///
/// Department filtering happens after positions are assigned, so a filtered
/// view keeps each user's global rank.
pub async fn leaderboard(
    state: &SharedState,
    scope: RankingScope,
    department: Option<&str>,
    limit: Option<usize>,
) -> Result<(Vec<LeaderboardEntry>, Vec<DepartmentStats>), ServiceError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let entries = ranked_entries(state, scope, limit).await?;
    let stats = department_stats(&entries);

    let entries = match department {
        Some(department) => entries
            .into_iter()
            .filter(|entry| entry.user.department == department)
            .collect(),
        None => entries,
    };

    Ok((entries, stats))
}

/// Resolve one user's competition rank inside a scope; zero means unranked.
pub async fn user_position(
    state: &SharedState,
    user_id: Uuid,
    scope: RankingScope,
) -> Result<u32, ServiceError> {
    let entries = ranked_entries(state, scope, POSITION_FETCH_LIMIT).await?;
    Ok(entries
        .iter()
        .find(|entry| entry.user.id == user_id)
        .map(|entry| entry.position)
        .unwrap_or(0))
}

async fn ranked_entries(
    state: &SharedState,
    scope: RankingScope,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let store = state.require_portal_store().await?;
    let users = store.fetch_ranking(limit).await?;

    let window = match scope.window_days() {
        Some(days) => Some(window_points(state, days).await),
        None => None,
    };

    Ok(rank_users(users, window))
}

/// Sum point-bearing idea events per user inside the trailing window.
///
/// A failure here degrades the window to empty rather than failing the whole
/// leaderboard; the all-time ordering is still worth showing.
async fn window_points(state: &SharedState, days: u32) -> HashMap<Uuid, i64> {
    let store = match state.require_portal_store().await {
        Ok(store) => store,
        Err(_) => return HashMap::new(),
    };

    match store.fetch_ideas_since(days).await {
        Ok(events) => {
            let mut totals: HashMap<Uuid, i64> = HashMap::new();
            for event in events {
                *totals.entry(event.user_id).or_default() += event.points_awarded;
            }
            totals
        }
        Err(err) => {
            warn!(days, error = %err, "failed to load trailing-window points; showing zeros");
            HashMap::new()
        }
    }
}

/// Order users by window points and assign competition ranks.
///
/// `users` arrives ordered by all-time points; the stable sort keeps that
/// order for window ties.
fn rank_users(users: Vec<UserEntity>, window: Option<HashMap<Uuid, i64>>) -> Vec<LeaderboardEntry> {
    let mut scored: Vec<(UserEntity, i64)> = users
        .into_iter()
        .map(|user| {
            let points = match &window {
                Some(totals) => totals.get(&user.id).copied().unwrap_or(0),
                None => user.points,
            };
            (user, points)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut entries = Vec::with_capacity(scored.len());
    let mut previous_points: Option<i64> = None;
    let mut position = 0;

    for (index, (user, points)) in scored.into_iter().enumerate() {
        if previous_points != Some(points) {
            position = index as u32 + 1;
            previous_points = Some(points);
        }
        entries.push(LeaderboardEntry {
            user,
            position,
            points,
        });
    }

    entries
}

/// Group leaderboard entries by department, ordered by total points.
fn department_stats(entries: &[LeaderboardEntry]) -> Vec<DepartmentStats> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (usize, i64)> = HashMap::new();

    for entry in entries {
        let department = entry.user.department.clone();
        let slot = totals.entry(department.clone()).or_insert_with(|| {
            order.push(department);
            (0, 0)
        });
        slot.0 += 1;
        slot.1 += entry.points;
    }

    let mut stats: Vec<DepartmentStats> = order
        .into_iter()
        .map(|department| {
            let (member_count, total_points) = totals[&department];
            let average_points = (total_points as f64 / member_count as f64).round() as i64;
            DepartmentStats {
                department,
                member_count,
                total_points,
                average_points,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::UserRole;

    fn user(id: u128, name: &str, department: &str, points: i64) -> UserEntity {
        UserEntity {
            id: Uuid::from_u128(id),
            email: format!("{name}@example.com"),
            full_name: name.to_string(),
            role: UserRole::Collaborator,
            department: department.to_string(),
            points,
        }
    }

    #[test]
    fn all_time_ties_share_a_rank_and_skip_the_next() {
        let entries = rank_users(
            vec![
                user(1, "ana", "rnd", 100),
                user(2, "bruno", "rnd", 100),
                user(3, "carla", "sales", 40),
            ],
            None,
        );

        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[1].position, 1);
        assert_eq!(entries[2].position, 3);
    }

    #[test]
    fn window_resort_is_stable_for_ties() {
        // All-time order: ana, bruno, carla. Only carla scored this week;
        // ana and bruno tie at zero and keep their all-time order.
        let window: HashMap<Uuid, i64> = [(Uuid::from_u128(3), 25)].into_iter().collect();
        let entries = rank_users(
            vec![
                user(1, "ana", "rnd", 100),
                user(2, "bruno", "rnd", 80),
                user(3, "carla", "sales", 40),
            ],
            Some(window),
        );

        assert_eq!(entries[0].user.full_name, "carla");
        assert_eq!(entries[0].points, 25);
        assert_eq!(entries[1].user.full_name, "ana");
        assert_eq!(entries[2].user.full_name, "bruno");
        assert_eq!(entries[1].position, 2);
        assert_eq!(entries[2].position, 2);
    }

    #[test]
    fn missing_window_entries_score_zero() {
        let entries = rank_users(vec![user(1, "ana", "rnd", 100)], Some(HashMap::new()));
        assert_eq!(entries[0].points, 0);
        assert_eq!(entries[0].position, 1);
    }

    #[test]
    fn department_totals_and_rounded_average() {
        let entries = rank_users(
            vec![
                user(1, "ana", "rnd", 100),
                user(2, "bruno", "rnd", 51),
                user(3, "carla", "sales", 40),
            ],
            None,
        );
        let stats = department_stats(&entries);

        assert_eq!(stats[0].department, "rnd");
        assert_eq!(stats[0].member_count, 2);
        assert_eq!(stats[0].total_points, 151);
        // 151 / 2 = 75.5 rounds to 76.
        assert_eq!(stats[0].average_points, 76);
        assert_eq!(stats[1].department, "sales");
        assert_eq!(stats[1].average_points, 40);
    }
}
