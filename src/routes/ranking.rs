use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::ranking::{PositionResponse, RankingQuery, RankingResponse},
    error::AppError,
    services::ranking_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/ranking",
    params(RankingQuery),
    responses(
        (status = 200, description = "Leaderboard for the requested scope", body = RankingResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Leaderboard and department aggregates for a scope.
pub async fn ranking(
    State(state): State<SharedState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<RankingResponse>, AppError> {
    let scope = query.scope.unwrap_or_default();
    let (entries, stats) =
        ranking_service::leaderboard(&state, scope, query.department.as_deref(), query.limit)
            .await?;

    Ok(Json(RankingResponse {
        scope,
        entries: entries.into_iter().map(Into::into).collect(),
        department_stats: stats.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/ranking/{user_id}/position",
    params(
        ("user_id" = Uuid, Path, description = "User to locate"),
        RankingQuery
    ),
    responses(
        (status = 200, description = "Competition rank; zero when unranked", body = PositionResponse)
    )
)]
/// A single user's position inside a ranking window.
pub async fn position(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<PositionResponse>, AppError> {
    let scope = query.scope.unwrap_or_default();
    let position = ranking_service::user_position(&state, user_id, scope).await?;
    Ok(Json(PositionResponse {
        user_id,
        scope,
        position,
    }))
}

/// Configure the ranking routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/ranking", get(ranking))
        .route("/ranking/{user_id}/position", get(position))
}
