use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::quiz::{QuizSummary, SelectOptionRequest, SessionView, StartSessionRequest},
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/quizzes",
    responses(
        (status = 200, description = "Quiz catalogue", body = [QuizSummary]),
        (status = 503, description = "Storage unavailable")
    )
)]
/// List the quiz catalogue.
pub async fn list_quizzes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuizSummary>>, AppError> {
    let quizzes = quiz_service::list_quizzes(&state).await?;
    Ok(Json(quizzes))
}

#[utoipa::path(
    post,
    path = "/quiz/sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Attempt started", body = SessionView),
        (status = 404, description = "Quiz not found"),
        (status = 409, description = "An attempt is already running")
    )
)]
/// Start a quiz attempt for a user.
pub async fn start_session(
    State(state): State<SharedState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let view = quiz_service::start_session(&state, payload.user_id, payload.quiz_id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/quiz/sessions/{user_id}",
    params(("user_id" = Uuid, Path, description = "User owning the session")),
    responses(
        (status = 200, description = "Current session projection", body = SessionView),
        (status = 404, description = "No session for this user")
    )
)]
/// Current projection of a user's session.
pub async fn get_session(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = quiz_service::session_view(&state, user_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/quiz/sessions/{user_id}/select",
    params(("user_id" = Uuid, Path, description = "User owning the session")),
    request_body = SelectOptionRequest,
    responses(
        (status = 200, description = "Option highlighted", body = SessionView),
        (status = 400, description = "Option index out of range"),
        (status = 404, description = "No session for this user")
    )
)]
/// Highlight an option on the current question.
pub async fn select_option(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SelectOptionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = quiz_service::select_option(&state, user_id, payload.option).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/quiz/sessions/{user_id}/advance",
    params(("user_id" = Uuid, Path, description = "User owning the session")),
    responses(
        (status = 200, description = "Answer confirmed", body = SessionView),
        (status = 400, description = "No option selected"),
        (status = 409, description = "Attempt is not running")
    )
)]
/// Confirm the highlighted option and move on; grades the attempt after the
/// final question.
pub async fn advance(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = quiz_service::advance(&state, user_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/quiz/sessions/{user_id}/exit",
    params(("user_id" = Uuid, Path, description = "User owning the session")),
    responses(
        (status = 204, description = "Session cleared"),
        (status = 404, description = "No session for this user")
    )
)]
/// Abandon a running attempt or clear a finished session.
pub async fn exit_session(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    quiz_service::exit_session(&state, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/quiz/sessions/{user_id}/retry",
    params(("user_id" = Uuid, Path, description = "User owning the session")),
    responses(
        (status = 200, description = "Attempt restarted", body = SessionView),
        (status = 409, description = "Session is not on the results screen")
    )
)]
/// Restart the same quiz from the results screen.
pub async fn retry(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = quiz_service::retry(&state, user_id).await?;
    Ok(Json(view))
}

/// Configure the quiz routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/quizzes", get(list_quizzes))
        .route("/quiz/sessions", post(start_session))
        .route("/quiz/sessions/{user_id}", get(get_session))
        .route("/quiz/sessions/{user_id}/select", post(select_option))
        .route("/quiz/sessions/{user_id}/advance", post(advance))
        .route("/quiz/sessions/{user_id}/exit", post(exit_session))
        .route("/quiz/sessions/{user_id}/retry", post(retry))
}
