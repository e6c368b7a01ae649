use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::profile::ProfileResponse, error::AppError, services::profile_service, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/users/{user_id}/profile",
    params(("user_id" = Uuid, Path, description = "User to load")),
    responses(
        (status = 200, description = "Profile with history and badges", body = ProfileResponse),
        (status = 404, description = "User not found")
    )
)]
/// Profile page payload: user record, quiz history, idea counters and badges.
pub async fn profile(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let response = profile_service::profile(&state, user_id).await?;
    Ok(Json(response))
}

/// Configure the profile routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/users/{user_id}/profile", get(profile))
}
