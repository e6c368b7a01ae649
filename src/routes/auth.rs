use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use validator::Validate;

use crate::{
    dto::auth::{LoginRequest, RegisterRequest, UserView},
    error::AppError,
    services::auth_service,
    state::SharedState,
};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated user", body = UserView),
        (status = 401, description = "Invalid credentials")
    )
)]
/// Verify credentials and return the authenticated user.
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserView>, AppError> {
    payload.validate()?;
    let user = auth_service::login(&state, payload.email, payload.password).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserView),
        (status = 400, description = "Invalid registration payload")
    )
)]
/// Create a new portal account.
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    payload.validate()?;
    let user = auth_service::register(&state, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Configure the authentication routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}
